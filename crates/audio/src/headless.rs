//! Headless output device.
//!
//! Plays nothing and records every voice it is asked to start. Clones share
//! the same state, so a caller can keep one clone to inspect what a service
//! owning another clone has played.

use crate::error::{AudioError, AudioResult};
use crate::graph::{Bus, DeviceState, OutputDevice, Voice, VoiceHandle};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A voice recorded by [`HeadlessDevice`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceRecord {
    /// Handle returned for the voice
    pub handle: VoiceHandle,
    /// The voice as requested
    pub voice: Voice,
    /// Gain of the voice's bus route at start time
    pub bus_gain: f32,
}

#[derive(Debug)]
struct HeadlessState {
    state: DeviceState,
    gains: [f32; 3],
    voices: Vec<VoiceRecord>,
    next_handle: u64,
    resume_count: usize,
    fail_voices: bool,
}

/// Recording device with no real output.
#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    inner: Arc<Mutex<HeadlessState>>,
}

impl HeadlessDevice {
    /// A running device.
    pub fn new() -> Self {
        Self::with_state(DeviceState::Running)
    }

    /// A device whose clock starts suspended, like browsers before a user
    /// gesture.
    pub fn suspended() -> Self {
        Self::with_state(DeviceState::Suspended)
    }

    fn with_state(state: DeviceState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HeadlessState {
                state,
                gains: [1.0; 3],
                voices: Vec::new(),
                next_handle: 1,
                resume_count: 0,
                fail_voices: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following `start_voice` fail (or succeed again).
    pub fn set_fail_voices(&self, fail: bool) {
        self.lock().fail_voices = fail;
    }

    /// Every voice started so far.
    pub fn voices(&self) -> Vec<VoiceRecord> {
        self.lock().voices.clone()
    }

    /// Number of voices started so far.
    pub fn voice_count(&self) -> usize {
        self.lock().voices.len()
    }

    /// Forget recorded voices.
    pub fn clear(&self) {
        self.lock().voices.clear();
    }

    /// Gain last set on a bus node.
    pub fn bus_gain(&self, bus: Bus) -> f32 {
        self.lock().gains[bus.index()]
    }

    /// How many times the clock was resumed.
    pub fn resume_count(&self) -> usize {
        self.lock().resume_count
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDevice for HeadlessDevice {
    fn state(&self) -> DeviceState {
        self.lock().state
    }

    fn resume(&mut self) -> AudioResult<()> {
        let mut state = self.lock();
        state.state = DeviceState::Running;
        state.resume_count += 1;
        Ok(())
    }

    fn set_bus_gain(&mut self, bus: Bus, gain: f32) {
        self.lock().gains[bus.index()] = gain;
    }

    fn start_voice(&mut self, voice: Voice) -> AudioResult<VoiceHandle> {
        let mut state = self.lock();
        if state.fail_voices {
            return Err(AudioError::Synthesis("headless device set to fail".into()));
        }
        let handle = VoiceHandle(state.next_handle);
        state.next_handle += 1;
        let bus_gain = voice.bus.route_gain(&state.gains);
        state.voices.push(VoiceRecord {
            handle,
            voice,
            bus_gain,
        });
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Waveform;
    use std::time::Duration;

    fn voice(frequency: f32) -> Voice {
        Voice {
            waveform: Waveform::Sine,
            frequency,
            gain: 1.0,
            duration: 0.1,
            decay_floor: 0.001,
            bus: Bus::Sfx,
            start_at: Duration::ZERO,
        }
    }

    #[test]
    fn clones_share_recordings() {
        let probe = HeadlessDevice::new();
        let mut device = probe.clone();
        let handle = device.start_voice(voice(440.0)).unwrap();
        assert_eq!(handle, VoiceHandle(1));
        assert_eq!(probe.voice_count(), 1);
        assert_eq!(probe.voices()[0].voice.frequency, 440.0);
    }

    #[test]
    fn records_route_gain() {
        let mut device = HeadlessDevice::new();
        device.set_bus_gain(Bus::Master, 0.5);
        device.set_bus_gain(Bus::Sfx, 0.5);
        device.start_voice(voice(440.0)).unwrap();
        assert!((device.voices()[0].bus_gain - 0.25).abs() < 1e-6);
    }

    #[test]
    fn failing_device_rejects_voices() {
        let mut device = HeadlessDevice::new();
        device.set_fail_voices(true);
        assert!(device.start_voice(voice(440.0)).is_err());
        assert_eq!(device.voice_count(), 0);
    }
}
