//! Fixed three-bus mixing graph.
//!
//! ```text
//! sfx   ──┐
//!         ├──> master ──> destination
//! music ──┘
//! ```
//!
//! The graph owns the output device. Voices are started on a bus and the
//! device applies the bus gains along the route to the destination.

use crate::error::AudioResult;
use crate::synth::Waveform;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Gain-controlled buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bus {
    /// Final bus feeding the output
    Master,
    /// Sound effects
    Sfx,
    /// Music
    Music,
}

/// Where a bus sends its signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Straight to the output device
    Destination,
    /// Into another bus
    Bus(Bus),
}

impl Bus {
    /// All buses.
    pub const ALL: [Bus; 3] = [Bus::Master, Bus::Sfx, Bus::Music];

    /// Fixed routing of this bus.
    pub fn route(&self) -> Route {
        match self {
            Bus::Master => Route::Destination,
            Bus::Sfx | Bus::Music => Route::Bus(Bus::Master),
        }
    }

    /// Product of per-bus `gains` (indexed master, sfx, music) from this bus
    /// to the destination.
    pub fn route_gain(&self, gains: &[f32; 3]) -> f32 {
        let mut gain = gains[self.index()];
        let mut route = self.route();
        while let Route::Bus(next) = route {
            gain *= gains[next.index()];
            route = next.route();
        }
        gain
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Bus::Master => 0,
            Bus::Sfx => 1,
            Bus::Music => 2,
        }
    }
}

/// Output clock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Producing audio
    Running,
    /// Halted until resumed (platform auto-suspend)
    Suspended,
}

/// One synthesized note handed to the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    /// Oscillator shape
    pub waveform: Waveform,
    /// Frequency in Hz
    pub frequency: f32,
    /// Gain at the start of the note, before bus gains
    pub gain: f32,
    /// Seconds until the note stops
    pub duration: f32,
    /// Gain the exponential decay ends at
    pub decay_floor: f32,
    /// Bus the note is routed into
    pub bus: Bus,
    /// Service clock time the note starts at
    pub start_at: Duration,
}

/// Handle to a started voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceHandle(pub u64);

/// An audio output capable of playing voices through the bus graph.
pub trait OutputDevice {
    /// Current clock state.
    fn state(&self) -> DeviceState;

    /// Resume a suspended clock.
    fn resume(&mut self) -> AudioResult<()>;

    /// Set the gain of a single bus node.
    fn set_bus_gain(&mut self, bus: Bus, gain: f32);

    /// Start a voice immediately. It stops on its own after its duration.
    fn start_voice(&mut self, voice: Voice) -> AudioResult<VoiceHandle>;
}

/// Gain stage in the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusNode {
    /// Which bus this is
    pub bus: Bus,
    /// Linear gain (0.0 to 1.0)
    pub gain: f32,
}

/// The mixing graph: device plus master, sfx and music nodes.
pub struct AudioGraph {
    device: Box<dyn OutputDevice>,
    nodes: [BusNode; 3],
}

impl AudioGraph {
    /// Build the graph on `device` with initial gains.
    pub fn build(device: Box<dyn OutputDevice>, master: f32, sfx: f32, music: f32) -> Self {
        let mut graph = Self {
            device,
            nodes: [
                BusNode {
                    bus: Bus::Master,
                    gain: master,
                },
                BusNode {
                    bus: Bus::Sfx,
                    gain: sfx,
                },
                BusNode {
                    bus: Bus::Music,
                    gain: music,
                },
            ],
        };
        for bus in Bus::ALL {
            let gain = graph.bus_gain(bus);
            graph.device.set_bus_gain(bus, gain);
        }
        debug!(master, sfx, music, "Audio graph built");
        graph
    }

    /// Gain of a single node.
    pub fn bus_gain(&self, bus: Bus) -> f32 {
        self.nodes[bus.index()].gain
    }

    /// Set a node's gain and push it to the device.
    pub fn set_bus_gain(&mut self, bus: Bus, gain: f32) {
        self.nodes[bus.index()].gain = gain;
        self.device.set_bus_gain(bus, gain);
    }

    /// Product of gains from `bus` to the destination.
    pub fn effective_gain(&self, bus: Bus) -> f32 {
        bus.route_gain(&self.nodes.map(|node| node.gain))
    }

    /// Current device clock state.
    pub fn device_state(&self) -> DeviceState {
        self.device.state()
    }

    /// Resume the device clock if the platform suspended it.
    pub fn ensure_running(&mut self) {
        if self.device.state() == DeviceState::Suspended {
            if let Err(e) = self.device.resume() {
                warn!("Failed to resume audio output: {}", e);
            }
        }
    }

    /// Start a voice on the device.
    pub fn start_voice(&mut self, voice: Voice) -> AudioResult<VoiceHandle> {
        self.device.start_voice(voice)
    }
}
