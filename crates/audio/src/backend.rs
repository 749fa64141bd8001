//! Output device backends.
//!
//! Real playback goes through rodio when the `rodio_backend` feature is
//! enabled. Without it there is no default device and the service runs
//! silently.

use crate::error::AudioResult;
use crate::graph::OutputDevice;

#[cfg(feature = "rodio_backend")]
mod rodio_device {
    use crate::error::{AudioError, AudioResult};
    use crate::graph::{Bus, DeviceState, OutputDevice, Voice, VoiceHandle};
    use crate::synth::VoiceSamples;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use std::time::Duration;
    use tracing::debug;

    impl Source for VoiceSamples {
        fn current_frame_len(&self) -> Option<usize> {
            None
        }

        fn channels(&self) -> u16 {
            1
        }

        fn sample_rate(&self) -> u32 {
            VoiceSamples::sample_rate(self)
        }

        fn total_duration(&self) -> Option<Duration> {
            Duration::try_from_secs_f32(self.duration()).ok()
        }
    }

    /// A voice still queued on its own sink.
    struct ActiveVoice {
        bus: Bus,
        sink: Sink,
    }

    /// Device backed by the default rodio output stream.
    pub struct RodioDevice {
        /// Output stream (must be kept alive)
        _stream: OutputStream,
        /// Stream handle for creating sinks
        stream_handle: OutputStreamHandle,
        sample_rate: u32,
        gains: [f32; 3],
        state: DeviceState,
        active: Vec<ActiveVoice>,
        next_handle: u64,
    }

    impl RodioDevice {
        pub fn open(sample_rate: u32) -> AudioResult<Self> {
            let (stream, stream_handle) = OutputStream::try_default()
                .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;
            debug!(sample_rate, "Audio backend: rodio");
            Ok(Self {
                _stream: stream,
                stream_handle,
                sample_rate,
                gains: [1.0; 3],
                state: DeviceState::Running,
                active: Vec::new(),
                next_handle: 1,
            })
        }
    }

    impl OutputDevice for RodioDevice {
        fn state(&self) -> DeviceState {
            self.state
        }

        fn resume(&mut self) -> AudioResult<()> {
            for voice in &self.active {
                voice.sink.play();
            }
            self.state = DeviceState::Running;
            Ok(())
        }

        fn set_bus_gain(&mut self, bus: Bus, gain: f32) {
            self.gains[bus.index()] = gain;
            self.active.retain(|v| !v.sink.empty());
            for voice in &self.active {
                voice.sink.set_volume(voice.bus.route_gain(&self.gains));
            }
        }

        fn start_voice(&mut self, voice: Voice) -> AudioResult<VoiceHandle> {
            self.active.retain(|v| !v.sink.empty());

            let sink = Sink::try_new(&self.stream_handle)
                .map_err(|e| AudioError::Synthesis(e.to_string()))?;
            sink.set_volume(voice.bus.route_gain(&self.gains));
            sink.append(VoiceSamples::new(&voice, self.sample_rate));

            let handle = VoiceHandle(self.next_handle);
            self.next_handle += 1;
            self.active.push(ActiveVoice {
                bus: voice.bus,
                sink,
            });
            Ok(handle)
        }
    }
}

/// Open the platform's default output device.
#[cfg(feature = "rodio_backend")]
pub fn open_default_device(sample_rate: u32) -> AudioResult<Box<dyn OutputDevice>> {
    let device = rodio_device::RodioDevice::open(sample_rate)?;
    Ok(Box::new(device))
}

/// Open the platform's default output device.
#[cfg(not(feature = "rodio_backend"))]
pub fn open_default_device(_sample_rate: u32) -> AudioResult<Box<dyn OutputDevice>> {
    Err(crate::error::AudioError::DeviceUnavailable(
        "built without the rodio_backend feature".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "rodio_backend"))]
    #[test]
    fn default_device_unavailable_without_backend() {
        assert!(open_default_device(44_100).is_err());
    }
}
