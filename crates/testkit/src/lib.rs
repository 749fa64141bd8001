#![warn(missing_docs)]
//! Deterministic testing surfaces (tone event streams written as JSONL).

use anyhow::Result;
use chiptone_audio::{Bus, VoiceRecord, Waveform};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// One synthesized tone, flattened for logs and comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneEvent {
    /// Service clock time the tone started, in milliseconds.
    pub at_ms: u64,
    /// Frequency in Hz.
    pub frequency: f32,
    /// Length in seconds.
    pub duration: f32,
    /// Oscillator shape.
    pub waveform: Waveform,
    /// Starting note gain before bus gains.
    pub gain: f32,
    /// Bus the tone was routed into.
    pub bus: Bus,
    /// Gain of the bus route when the tone started.
    pub bus_gain: f32,
}

impl From<&VoiceRecord> for ToneEvent {
    fn from(record: &VoiceRecord) -> Self {
        let voice = &record.voice;
        Self {
            at_ms: voice.start_at.as_millis() as u64,
            frequency: voice.frequency,
            duration: voice.duration,
            waveform: voice.waveform,
            gain: voice.gain,
            bus: voice.bus,
            bus_gain: record.bus_gain,
        }
    }
}

/// Convert recorded voices into tone events, in start order.
pub fn voice_events(records: &[VoiceRecord]) -> Vec<ToneEvent> {
    records.iter().map(ToneEvent::from).collect()
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write<T: Serialize>(&mut self, event: &T) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }

    /// Append every event in order.
    pub fn write_all<T: Serialize>(&mut self, events: &[T]) -> Result<()> {
        for event in events {
            self.write(event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chiptone_audio::{Voice, VoiceHandle};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn record(at_ms: u64, frequency: f32) -> VoiceRecord {
        VoiceRecord {
            handle: VoiceHandle(3),
            voice: Voice {
                waveform: Waveform::Triangle,
                frequency,
                gain: 0.24,
                duration: 0.2,
                decay_floor: 0.001,
                bus: Bus::Sfx,
                start_at: Duration::from_millis(at_ms),
            },
            bus_gain: 0.56,
        }
    }

    #[test]
    fn tone_event_flattens_voice() {
        let event = ToneEvent::from(&record(300, 440.0));
        assert_eq!(event.at_ms, 300);
        assert_eq!(event.frequency, 440.0);
        assert_eq!(event.waveform, Waveform::Triangle);
        assert_eq!(event.bus_gain, 0.56);
    }

    #[test]
    fn jsonl_sink_writes_one_line_per_event() {
        let path = std::env::temp_dir().join(format!(
            "chiptone-events-{}.jsonl",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut sink = JsonlSink::create(&path).expect("sink create");
        let events = voice_events(&[record(0, 300.0), record(100, 1200.0)]);
        sink.write_all(&events).expect("write succeeds");
        let contents = fs::read_to_string(&path).expect("file readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"at_ms\":100"));
        assert!(lines[1].contains("\"bus\":\"sfx\""));
        let _ = fs::remove_file(path);
    }
}
