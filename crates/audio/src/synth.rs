//! Oscillator waveforms and the decaying note envelope.

use crate::error::AudioError;
use crate::graph::Voice;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

/// Basic oscillator shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Pure sine tone
    Sine,
    /// 50% duty square wave
    Square,
    /// Symmetric triangle wave
    Triangle,
    /// Rising sawtooth wave
    Sawtooth,
}

impl Waveform {
    /// Every waveform, in declaration order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
    ];

    /// Lowercase name used in configs and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
        }
    }

    /// Sample the waveform at `phase` (cycles, wrapped into [0, 1)).
    ///
    /// Output lies in [-1, 1].
    pub fn sample(&self, phase: f32) -> f32 {
        let phase = phase.rem_euclid(1.0);
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Waveform::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown waveform '{s}' (expected sine, square, triangle or sawtooth)")
            })
    }
}

/// Gain of a note `t` seconds after it started.
///
/// Ramps exponentially from `peak` toward `floor`, reaching it at `duration`.
/// A silent (non-positive) peak stays silent since an exponential ramp cannot
/// leave zero.
pub fn envelope_gain(peak: f32, floor: f32, t: f32, duration: f32) -> f32 {
    if peak <= 0.0 || duration <= 0.0 {
        return 0.0;
    }
    let progress = (t / duration).clamp(0.0, 1.0);
    peak * (floor / peak).powf(progress)
}

/// Check that a tone can be rendered at all.
pub fn validate_tone(frequency: f32, duration: f32) -> Result<(), AudioError> {
    let valid_frequency = frequency.is_finite() && frequency > 0.0;
    let valid_duration = duration.is_finite() && duration > 0.0;
    if valid_frequency && valid_duration {
        Ok(())
    } else {
        Err(AudioError::InvalidTone {
            frequency,
            duration,
        })
    }
}

/// Mono samples of one voice, generated on demand.
///
/// Yields exactly `duration * sample_rate` (rounded) samples, so playing the
/// iterator out is the voice's scheduled stop. Nothing is buffered, which
/// keeps arbitrarily long notes cheap.
#[derive(Debug, Clone)]
pub struct VoiceSamples {
    waveform: Waveform,
    gain: f32,
    decay_floor: f32,
    duration: f32,
    sample_rate: u32,
    step: f32,
    phase: f32,
    index: u64,
    len: u64,
}

impl VoiceSamples {
    /// Samples for `voice` at `sample_rate` Hz.
    pub fn new(voice: &Voice, sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        let rate = f64::from(sample_rate);
        // Float to int casts saturate, so huge durations stay finite.
        let len = (f64::from(voice.duration) * rate).round() as u64;
        Self {
            waveform: voice.waveform,
            gain: voice.gain,
            decay_floor: voice.decay_floor,
            duration: voice.duration,
            sample_rate,
            step: (f64::from(voice.frequency) / rate) as f32,
            phase: 0.0,
            index: 0,
            len,
        }
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples left to play.
    pub fn remaining(&self) -> u64 {
        self.len - self.index
    }

    /// Seconds of audio the voice covers.
    pub fn duration(&self) -> f32 {
        self.duration
    }
}

impl Iterator for VoiceSamples {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.index >= self.len {
            return None;
        }
        let t = (self.index as f64 / f64::from(self.sample_rate)) as f32;
        let gain = envelope_gain(self.gain, self.decay_floor, t, self.duration);
        let sample = self.waveform.sample(self.phase) * gain;
        self.phase = (self.phase + self.step).fract();
        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
