//! Game-specific composite effects built from single tones.

use crate::service::{AudioService, ToneRequest};
use crate::synth::Waveform;
use crate::tones::names;
use std::time::Duration;

/// Line count that earns the celebratory clear.
pub const QUAD_CLEAR_LINES: u32 = 4;

/// Base frequency of the merge companion tone.
pub const MERGE_BASE_FREQUENCY: f32 = 800.0;

/// Highest merge pitch multiplier.
pub const MERGE_MAX_PITCH: f32 = 2.0;

const CELEBRATION: [(u64, f32); 2] = [(100, 1200.0), (200, 1400.0)];
const CELEBRATION_DURATION: f32 = 0.2;
const CELEBRATION_VOLUME: f32 = 0.8;

const MERGE_DELAY: Duration = Duration::from_millis(50);
const MERGE_DURATION: f32 = 0.15;
const MERGE_VOLUME: f32 = 0.6;

/// Pitch multiplier of the merge companion tone for a merged tile value.
///
/// `1 + log2(value) / 10`, capped at 2.0. Zero is treated as 1.
pub fn merge_pitch(value: u32) -> f32 {
    let value = f64::from(value.max(1));
    let pitch = 1.0 + value.log2() * 0.1;
    (pitch as f32).min(MERGE_MAX_PITCH)
}

impl AudioService {
    /// Lines cleared in the falling-block game.
    ///
    /// Four lines play the quad-clear tone followed by two rising tones
    /// 100 ms and 200 ms later; any other count plays the plain clear tone.
    pub fn play_line_clear_effect(&mut self, line_count: u32) {
        if !self.is_enabled() {
            return;
        }
        if line_count != QUAD_CLEAR_LINES {
            self.play(names::TETRIS_CLEAR);
            return;
        }

        self.play(names::TETRIS_CLEAR4);
        for (delay_ms, frequency) in CELEBRATION {
            self.schedule_tone(
                Duration::from_millis(delay_ms),
                ToneRequest {
                    frequency,
                    duration: CELEBRATION_DURATION,
                    waveform: Waveform::Sine,
                    volume: CELEBRATION_VOLUME,
                },
            );
        }
    }

    /// Two tiles merged into `value` in the sliding-tile game.
    ///
    /// Plays the merge tone, then 50 ms later a companion tone that rises
    /// with the merged value.
    pub fn play_merge_effect(&mut self, value: u32) {
        if !self.is_enabled() {
            return;
        }
        self.play(names::G2048_MERGE);
        self.schedule_tone(
            MERGE_DELAY,
            ToneRequest {
                frequency: MERGE_BASE_FREQUENCY * merge_pitch(value),
                duration: MERGE_DURATION,
                waveform: Waveform::Triangle,
                volume: MERGE_VOLUME,
            },
        );
    }
}
