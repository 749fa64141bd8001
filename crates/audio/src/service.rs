//! The audio service game code talks to.

use crate::backend::open_default_device;
use crate::config::AudioConfig;
use crate::error::{AudioError, AudioResult};
use crate::graph::{AudioGraph, Bus, OutputDevice, Voice, VoiceHandle};
use crate::melody::MelodySession;
use crate::scheduler::{Scheduler, TimerId};
use crate::settings::AudioSettings;
use crate::storage::KeyValueStore;
use crate::synth::{validate_tone, Waveform};
use crate::tones::ToneRegistry;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// A tone to play later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ToneRequest {
    pub frequency: f32,
    pub duration: f32,
    pub waveform: Waveform,
    pub volume: f32,
}

/// Work the scheduler hands back to the service.
#[derive(Debug, Clone)]
pub(crate) enum Task {
    /// Step the active melody
    MelodyTick,
    /// Fire-and-forget delayed tone
    Tone(ToneRequest),
}

/// Sound effect and melody playback for games.
///
/// Construct one per process and pass it to game code by reference. Every
/// playback call returns immediately and never fails: if audio is
/// unavailable or a single note cannot be synthesized, the call logs a
/// warning and stays silent.
///
/// Time is driven by the host calling [`AudioService::update`] once per frame.
pub struct AudioService {
    config: AudioConfig,
    /// User preferences; `enabled` is the preference, not the effective state
    settings: AudioSettings,
    /// `None` when no output device could be opened
    graph: Option<AudioGraph>,
    registry: ToneRegistry,
    melody: Option<MelodySession>,
    scheduler: Scheduler<Task>,
    store: Box<dyn KeyValueStore>,
    settings_loaded: bool,
}

impl AudioService {
    /// Create the service on the platform's default output device.
    ///
    /// Never fails: without a device the service is permanently disabled.
    pub fn create<S>(config: AudioConfig, store: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let sample_rate = config.sample_rate;
        Self::with_device(config, || open_default_device(sample_rate), store)
    }

    /// Create the service on a device produced by `open`.
    pub fn with_device<F, S>(config: AudioConfig, open: F, store: S) -> Self
    where
        F: FnOnce() -> AudioResult<Box<dyn OutputDevice>>,
        S: KeyValueStore + 'static,
    {
        let settings = AudioSettings::from_config(&config);
        let (graph, registry) = match open() {
            Ok(device) => {
                let graph = AudioGraph::build(
                    device,
                    settings.master_volume,
                    settings.sfx_volume,
                    settings.music_volume,
                );
                let registry = ToneRegistry::with_extra(config.tones.iter().cloned());
                debug!(tones = registry.len(), "Audio service initialized");
                (Some(graph), registry)
            }
            Err(e) => {
                warn!("Failed to initialize audio: {}. Running silent.", e);
                (None, ToneRegistry::default())
            }
        };

        Self {
            config,
            settings,
            graph,
            registry,
            melody: None,
            scheduler: Scheduler::new(),
            store: Box::new(store),
            settings_loaded: false,
        }
    }

    /// Shut the service down: stops the melody, drops pending delayed tones
    /// and releases the output device.
    pub fn dispose(mut self) {
        self.stop_melody();
        let dropped = self.scheduler.pending();
        self.scheduler.clear();
        self.graph = None;
        debug!(dropped, "Audio service disposed");
    }

    /// Whether an output device was opened.
    pub fn is_available(&self) -> bool {
        self.graph.is_some()
    }

    /// Whether playback calls currently produce sound.
    pub fn is_enabled(&self) -> bool {
        self.settings.enabled && self.graph.is_some()
    }

    /// Current preferences.
    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Static configuration.
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Master volume (0.0 to 1.0).
    pub fn master_volume(&self) -> f32 {
        self.settings.master_volume
    }

    /// Sound effects volume (0.0 to 1.0).
    pub fn sfx_volume(&self) -> f32 {
        self.settings.sfx_volume
    }

    /// Music volume (0.0 to 1.0).
    pub fn music_volume(&self) -> f32 {
        self.settings.music_volume
    }

    /// Registered tones. Empty when audio is unavailable.
    pub fn registry(&self) -> &ToneRegistry {
        &self.registry
    }

    /// Time the service clock has advanced to.
    pub fn elapsed(&self) -> Duration {
        self.scheduler.now()
    }

    /// Number of scheduled callbacks (melody timer and delayed tones).
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Advance the clock by `dt`, running every melody step and delayed tone
    /// that falls due, in order.
    pub fn update(&mut self, dt: Duration) {
        let until = self.scheduler.now() + dt;
        while let Some((timer, task)) = self.scheduler.pop_due(until) {
            match task {
                Task::MelodyTick => self.melody_tick(timer),
                Task::Tone(tone) => {
                    self.play_tone(tone.frequency, tone.duration, tone.waveform, tone.volume);
                }
            }
        }
        self.scheduler.finish(until);
    }

    /// Play a raw tone on the sfx bus.
    ///
    /// Starts at `volume * sfx_volume` and decays exponentially toward the
    /// configured floor over `duration` seconds, then stops.
    pub fn play_tone(
        &mut self,
        frequency: f32,
        duration: f32,
        waveform: Waveform,
        volume: f32,
    ) -> Option<VoiceHandle> {
        if !self.settings.enabled {
            return None;
        }
        let graph = self.graph.as_mut()?;
        graph.ensure_running();

        let voice = Voice {
            waveform,
            frequency,
            gain: volume.max(0.0) * self.settings.sfx_volume,
            duration,
            decay_floor: self.config.decay_floor,
            bus: Bus::Sfx,
            start_at: self.scheduler.now(),
        };
        let started = validate_tone(frequency, duration).and_then(|()| graph.start_voice(voice));
        match started {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to play tone ({frequency} Hz, {waveform}): {}", e);
                None
            }
        }
    }

    /// Play a registered tone by name, scaled by `volume` and with its
    /// frequency multiplied by `pitch`.
    pub fn play_sound(&mut self, name: &str, volume: f32, pitch: f32) -> Option<VoiceHandle> {
        if !self.is_enabled() {
            return None;
        }
        let Some(tone) = self.registry.get(name) else {
            warn!("Sound \"{}\" not found", name);
            return None;
        };
        let (frequency, duration, waveform) =
            (tone.frequency * pitch, tone.duration, tone.waveform);
        self.play_tone(frequency, duration, waveform, volume)
    }

    /// Play a registered tone at full volume and natural pitch.
    pub fn play(&mut self, name: &str) -> Option<VoiceHandle> {
        self.play_sound(name, 1.0, 1.0)
    }

    /// Start looping `notes` (Hz, `<= 0` for rests), one step every
    /// `tempo_ms` milliseconds.
    ///
    /// Ignored while another melody is playing.
    pub fn play_melody(&mut self, notes: &[f32], tempo_ms: u32) {
        if !self.is_enabled() {
            return;
        }
        if self.melody.is_some() {
            debug!("Melody already playing, ignoring new melody");
            return;
        }
        let Some(mut session) = MelodySession::new(notes.to_vec(), tempo_ms) else {
            warn!("Ignoring empty melody");
            return;
        };

        self.play_melody_step(&mut session);
        let timer = self
            .scheduler
            .schedule_repeating(session.tempo(), Task::MelodyTick);
        session.attach_timer(timer);
        self.melody = Some(session);
    }

    /// Stop the active melody, if any.
    pub fn stop_melody(&mut self) {
        if let Some(timer) = self.melody.as_mut().and_then(MelodySession::take_timer) {
            self.scheduler.cancel(timer);
        }
        self.melody = None;
    }

    /// Whether a melody session is active.
    pub fn is_melody_playing(&self) -> bool {
        self.melody.is_some()
    }

    /// Index of the next melody note, if a melody is playing.
    pub fn melody_cursor(&self) -> Option<usize> {
        self.melody.as_ref().map(MelodySession::cursor)
    }

    fn melody_tick(&mut self, timer: TimerId) {
        let Some(mut session) = self.melody.take() else {
            self.scheduler.cancel(timer);
            return;
        };
        if !session.is_driven_by(timer) {
            self.scheduler.cancel(timer);
        } else if self.is_enabled() {
            self.play_melody_step(&mut session);
        }
        self.melody = Some(session);
    }

    fn play_melody_step(&mut self, session: &mut MelodySession) {
        if let Some(frequency) = session.step() {
            let waveform = self.config.melody_waveform;
            let volume = self.config.melody_volume;
            self.play_tone(frequency, session.note_duration(), waveform, volume);
        }
    }

    pub(crate) fn schedule_tone(&mut self, delay: Duration, tone: ToneRequest) {
        self.scheduler.schedule_once(delay, Task::Tone(tone));
    }

    /// Set master volume (clamped to 0.0-1.0) and persist.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.settings.set_master(volume);
        self.apply_bus_gain(Bus::Master, self.settings.master_volume);
        self.save();
    }

    /// Set sound effects volume (clamped to 0.0-1.0) and persist.
    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.settings.set_sfx(volume);
        self.apply_bus_gain(Bus::Sfx, self.settings.sfx_volume);
        self.save();
    }

    /// Set music volume (clamped to 0.0-1.0) and persist.
    pub fn set_music_volume(&mut self, volume: f32) {
        self.settings.set_music(volume);
        self.apply_bus_gain(Bus::Music, self.settings.music_volume);
        self.save();
    }

    fn apply_bus_gain(&mut self, bus: Bus, gain: f32) {
        if let Some(graph) = &mut self.graph {
            graph.set_bus_gain(bus, gain);
        }
    }

    /// Flip the enabled preference, stopping the melody when disabling.
    ///
    /// Returns whether audio is now enabled. Without an output device this
    /// is always false.
    pub fn toggle_enabled(&mut self) -> bool {
        self.settings.enabled = !self.settings.enabled;
        if !self.settings.enabled {
            self.stop_melody();
        }
        self.save();
        self.is_enabled()
    }

    /// Persist the current settings. Failures are logged.
    pub fn save(&mut self) {
        if let Err(e) = self.try_save() {
            warn!("Failed to save audio settings: {}", e);
        }
    }

    fn try_save(&mut self) -> AudioResult<()> {
        let json = self.settings.to_json()?;
        self.store.set(&self.config.storage_key, &json)
    }

    /// Restore persisted settings. Missing or malformed records keep the
    /// current values; failures are logged.
    pub fn load(&mut self) {
        let stored = match self.read_stored() {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("No stored audio settings");
                return;
            }
            Err(e) => {
                warn!("Failed to load audio settings: {}", e);
                return;
            }
        };

        let defaults = AudioSettings::from_config(&self.config);
        let restored = AudioSettings::from_stored(&stored, &defaults);
        self.settings.enabled = restored.enabled;
        if !restored.enabled {
            self.stop_melody();
        }
        self.set_master_volume(restored.master_volume);
        self.set_sfx_volume(restored.sfx_volume);
        self.set_music_volume(restored.music_volume);
        debug!(?restored, "Audio settings loaded");
    }

    fn read_stored(&self) -> AudioResult<Option<Value>> {
        let Some(raw) = self.store.get(&self.config.storage_key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(AudioError::Serialization)
    }

    /// Host "ready" signal: restores settings the first time it is called.
    pub fn on_ready(&mut self) {
        if self.settings_loaded {
            debug!("Audio settings already loaded");
            return;
        }
        self.settings_loaded = true;
        self.load();
    }
}
