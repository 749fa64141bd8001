//! Named tone definitions.

use crate::synth::{validate_tone, Waveform};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Names of the built-in tones.
pub mod names {
    // Tetris-like game
    /// Piece moved sideways
    pub const TETRIS_MOVE: &str = "tetris-move";
    /// Piece rotated
    pub const TETRIS_ROTATE: &str = "tetris-rotate";
    /// Piece hard-dropped
    pub const TETRIS_DROP: &str = "tetris-drop";
    /// One to three lines cleared
    pub const TETRIS_CLEAR: &str = "tetris-clear";
    /// Four lines cleared at once
    pub const TETRIS_CLEAR4: &str = "tetris-clear4";
    /// Level increased
    pub const TETRIS_LEVELUP: &str = "tetris-levelup";
    /// Board topped out
    pub const TETRIS_GAMEOVER: &str = "tetris-gameover";

    // 2048-like game
    /// Tiles slid
    pub const G2048_MOVE: &str = "2048-move";
    /// Two tiles merged
    pub const G2048_MERGE: &str = "2048-merge";
    /// New tile spawned
    pub const G2048_NEW: &str = "2048-new";
    /// No moves left
    pub const G2048_GAMEOVER: &str = "2048-gameover";

    // 3D shooter
    /// Primary weapon fired
    pub const SHOOT: &str = "shoot";
    /// Secondary weapon fired
    pub const SHOOT2: &str = "shoot2";
    /// Weapon reloaded
    pub const RELOAD: &str = "reload";
    /// Item picked up
    pub const PICKUP: &str = "pickup";
    /// Footstep
    pub const STEP: &str = "step";
    /// Boss appears
    pub const BOSS: &str = "boss";
    /// Player hit
    pub const HIT: &str = "hit";
    /// Enemy killed
    pub const ENEMY_DEATH: &str = "enemy-death";

    // Shared UI
    /// Button click
    pub const CLICK: &str = "click";
    /// Pointer hover
    pub const HOVER: &str = "hover";
    /// Generic success
    pub const SUCCESS: &str = "success";
    /// Generic error
    pub const ERROR: &str = "error";
    /// Countdown tick
    pub const COUNTDOWN: &str = "countdown";
    /// Last countdown tick
    pub const COUNTDOWN_FINAL: &str = "countdown-final";
}

/// Immutable description of a synthesized tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneDescriptor {
    /// Registry name
    pub name: String,
    /// Base frequency in Hz
    pub frequency: f32,
    /// Length in seconds
    pub duration: f32,
    /// Oscillator shape
    pub waveform: Waveform,
}

impl ToneDescriptor {
    /// Create a tone descriptor.
    pub fn new(name: impl Into<String>, frequency: f32, duration: f32, waveform: Waveform) -> Self {
        Self {
            name: name.into(),
            frequency,
            duration,
            waveform,
        }
    }
}

const BUILTIN_TONES: &[(&str, f32, f32, Waveform)] = &[
    (names::TETRIS_MOVE, 200.0, 0.1, Waveform::Sine),
    (names::TETRIS_ROTATE, 300.0, 0.1, Waveform::Sine),
    (names::TETRIS_DROP, 150.0, 0.15, Waveform::Square),
    (names::TETRIS_CLEAR, 800.0, 0.2, Waveform::Sine),
    (names::TETRIS_CLEAR4, 1000.0, 0.3, Waveform::Sine),
    (names::TETRIS_LEVELUP, 600.0, 0.5, Waveform::Triangle),
    (names::TETRIS_GAMEOVER, 100.0, 0.8, Waveform::Sawtooth),
    (names::G2048_MOVE, 400.0, 0.1, Waveform::Sine),
    (names::G2048_MERGE, 600.0, 0.2, Waveform::Sine),
    (names::G2048_NEW, 800.0, 0.15, Waveform::Triangle),
    (names::G2048_GAMEOVER, 200.0, 0.5, Waveform::Sawtooth),
    (names::SHOOT, 150.0, 0.2, Waveform::Square),
    (names::SHOOT2, 600.0, 0.1, Waveform::Sawtooth),
    (names::RELOAD, 600.0, 0.1, Waveform::Square),
    (names::PICKUP, 400.0, 0.1, Waveform::Sine),
    (names::STEP, 100.0, 0.05, Waveform::Sine),
    (names::BOSS, 50.0, 3.0, Waveform::Sawtooth),
    (names::HIT, 300.0, 0.1, Waveform::Sine),
    (names::ENEMY_DEATH, 200.0, 0.3, Waveform::Sawtooth),
    (names::CLICK, 500.0, 0.1, Waveform::Sine),
    (names::HOVER, 300.0, 0.05, Waveform::Sine),
    (names::SUCCESS, 800.0, 0.2, Waveform::Triangle),
    (names::ERROR, 200.0, 0.3, Waveform::Sawtooth),
    (names::COUNTDOWN, 600.0, 0.1, Waveform::Square),
    (names::COUNTDOWN_FINAL, 1000.0, 0.3, Waveform::Square),
];

/// Fixed mapping from tone name to descriptor.
///
/// Built once when the service starts and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ToneRegistry {
    tones: HashMap<String, ToneDescriptor>,
}

impl ToneRegistry {
    /// Registry holding the built-in game tones.
    pub fn builtin() -> Self {
        Self::from_descriptors(
            BUILTIN_TONES
                .iter()
                .map(|&(name, frequency, duration, waveform)| {
                    ToneDescriptor::new(name, frequency, duration, waveform)
                }),
        )
    }

    /// Build a registry from descriptors. Later entries replace earlier ones
    /// with the same name.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ToneDescriptor>) -> Self {
        let tones = descriptors
            .into_iter()
            .map(|tone| (tone.name.clone(), tone))
            .collect();
        Self { tones }
    }

    /// Built-in tones plus `extra` (which may override built-ins by name).
    ///
    /// Extra tones without a positive, finite frequency and duration are
    /// skipped with a warning.
    pub fn with_extra(extra: impl IntoIterator<Item = ToneDescriptor>) -> Self {
        let mut registry = Self::builtin();
        for tone in extra {
            if let Err(e) = validate_tone(tone.frequency, tone.duration) {
                warn!(name = %tone.name, "Skipping configured tone: {}", e);
                continue;
            }
            registry.tones.insert(tone.name.clone(), tone);
        }
        registry
    }

    /// Look up a tone by name.
    pub fn get(&self, name: &str) -> Option<&ToneDescriptor> {
        self.tones.get(name)
    }

    /// Number of registered tones.
    pub fn len(&self) -> usize {
        self.tones.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tones.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
