//! Sound effects and simple melodies for casual games.
//!
//! Tones are synthesized from a small oscillator set and mixed through a
//! fixed graph of three gain buses (master, sfx, music). Uses rodio for
//! output when the `rodio_backend` feature is enabled.
//!
//! # Architecture
//!
//! - [`AudioService`] - Playback API called by game code
//! - [`ToneRegistry`] - Named tones (frequency, duration, waveform)
//! - [`AudioSettings`] - Enabled flag and master/sfx/music volumes
//! - [`KeyValueStore`] - Where settings are persisted
//! - [`OutputDevice`] - Output backend ([`HeadlessDevice`] for tests)
//!
//! # Example
//!
//! ```ignore
//! let mut audio = AudioService::create(AudioConfig::default(), FileStore::new("settings"));
//! audio.on_ready();
//! audio.play(names::TETRIS_ROTATE);
//! audio.play_line_clear_effect(4);
//! loop {
//!     audio.update(frame_dt);
//! }
//! ```

mod backend;
mod config;
mod effects;
mod error;
mod graph;
mod headless;
mod melody;
mod scheduler;
mod service;
mod settings;
mod storage;
mod synth;
mod tones;

pub use backend::open_default_device;
pub use config::{AudioConfig, DEFAULT_STORAGE_KEY};
pub use effects::{merge_pitch, MERGE_BASE_FREQUENCY, MERGE_MAX_PITCH, QUAD_CLEAR_LINES};
pub use error::{AudioError, AudioResult};
pub use graph::{AudioGraph, Bus, BusNode, DeviceState, OutputDevice, Route, Voice, VoiceHandle};
pub use headless::{HeadlessDevice, VoiceRecord};
pub use melody::MelodySession;
pub use scheduler::{Scheduler, TimerId};
pub use service::AudioService;
pub use settings::{clamp_volume, AudioSettings};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use synth::{envelope_gain, VoiceSamples, Waveform};
pub use tones::{names, ToneDescriptor, ToneRegistry};
