//! Monophonic melody sequencing.

use crate::scheduler::TimerId;
use std::time::Duration;

/// A melody being stepped through by a repeating timer.
///
/// Notes are frequencies in Hz; zero or negative values are rests.
#[derive(Debug, Clone)]
pub struct MelodySession {
    notes: Vec<f32>,
    tempo_ms: u32,
    cursor: usize,
    timer: Option<TimerId>,
}

impl MelodySession {
    /// Start a session at the first note. Returns `None` for an empty melody.
    pub fn new(notes: Vec<f32>, tempo_ms: u32) -> Option<Self> {
        if notes.is_empty() {
            return None;
        }
        Some(Self {
            notes,
            tempo_ms: tempo_ms.max(1),
            cursor: 0,
            timer: None,
        })
    }

    /// Advance one step.
    ///
    /// Returns the frequency to play, or `None` for a rest. The cursor moves
    /// (and wraps) either way.
    pub fn step(&mut self) -> Option<f32> {
        let note = self.notes[self.cursor];
        self.cursor = (self.cursor + 1) % self.notes.len();
        (note > 0.0).then_some(note)
    }

    /// Index of the next note to play.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Notes of the melody.
    pub fn notes(&self) -> &[f32] {
        &self.notes
    }

    /// Milliseconds per step.
    pub fn tempo_ms(&self) -> u32 {
        self.tempo_ms
    }

    /// Step length.
    pub fn tempo(&self) -> Duration {
        Duration::from_millis(u64::from(self.tempo_ms))
    }

    /// Length of each note in seconds (one full step).
    pub fn note_duration(&self) -> f32 {
        self.tempo_ms as f32 / 1000.0
    }

    /// Attach the repeating timer driving this session.
    pub fn attach_timer(&mut self, timer: TimerId) {
        self.timer = Some(timer);
    }

    /// Release the timer so the owner can cancel it.
    pub fn take_timer(&mut self) -> Option<TimerId> {
        self.timer.take()
    }

    /// Whether `timer` is the one driving this session.
    pub fn is_driven_by(&self, timer: TimerId) -> bool {
        self.timer == Some(timer)
    }
}
