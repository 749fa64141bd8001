use crate::config::PlayerConfig;
use crate::{Args, BusArg, Command};
use anyhow::{bail, Context, Result};
use chiptone_audio::{AudioService, FileStore, HeadlessDevice, OutputDevice, ToneRegistry};
use chiptone_testkit::{voice_events, JsonlSink};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub fn run(args: &Args, config: PlayerConfig) -> Result<()> {
    if args.event_log.is_some() && !args.headless {
        bail!("--event-log requires --headless");
    }

    if args.command == Command::List {
        let registry = ToneRegistry::with_extra(config.audio.tones.iter().cloned());
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let settings_dir = args
        .settings_dir
        .clone()
        .unwrap_or_else(|| config.settings_dir.clone());
    let frame = Duration::from_millis(config.frame_ms);
    let store = FileStore::new(settings_dir);

    let recorder = args.headless.then(HeadlessDevice::new);
    let mut audio = match &recorder {
        Some(device) => {
            let device = device.clone();
            AudioService::with_device(
                config.audio,
                move || Ok(Box::new(device) as Box<dyn OutputDevice>),
                store,
            )
        }
        None => AudioService::create(config.audio, store),
    };
    if !audio.is_available() {
        warn!("No audio output available; commands will be silent");
    }

    // Host ready signal
    audio.on_ready();

    let keep_playing = execute(&mut audio, &args.command);
    if keep_playing {
        run_frames(
            &mut audio,
            Duration::from_millis(args.duration_ms),
            frame,
            !args.headless,
        );
    }

    if let (Some(path), Some(device)) = (&args.event_log, &recorder) {
        write_event_log(path, device)?;
    }
    audio.dispose();
    Ok(())
}

/// Run one command. Returns whether the frame loop should run afterwards.
pub fn execute(audio: &mut AudioService, command: &Command) -> bool {
    match command {
        Command::List => false,
        Command::Play {
            name,
            volume,
            pitch,
        } => {
            if audio.play_sound(name, *volume, *pitch).is_none() {
                warn!(name = %name, "Nothing played");
            }
            true
        }
        Command::Melody { notes, tempo_ms } => {
            let tempo = tempo_ms.unwrap_or(audio.config().default_tempo_ms);
            audio.play_melody(notes, tempo);
            true
        }
        Command::LineClear { count } => {
            audio.play_line_clear_effect(*count);
            true
        }
        Command::Merge { value } => {
            audio.play_merge_effect(*value);
            true
        }
        Command::Volume { bus, value } => {
            match bus {
                BusArg::Master => audio.set_master_volume(*value),
                BusArg::Sfx => audio.set_sfx_volume(*value),
                BusArg::Music => audio.set_music_volume(*value),
            }
            let settings = audio.settings();
            println!(
                "master {:.2}  sfx {:.2}  music {:.2}",
                settings.master_volume, settings.sfx_volume, settings.music_volume
            );
            false
        }
        Command::Toggle => {
            let enabled = audio.toggle_enabled();
            println!("audio {}", if enabled { "enabled" } else { "disabled" });
            false
        }
    }
}

/// Drive the service clock for `duration` in `frame` steps.
///
/// With `realtime` the loop sleeps so scheduled tones line up with the
/// device's own clock.
pub fn run_frames(audio: &mut AudioService, duration: Duration, frame: Duration, realtime: bool) {
    let start = Instant::now();
    let mut simulated = Duration::ZERO;
    while simulated < duration {
        let step = frame.min(duration - simulated);
        audio.update(step);
        simulated += step;
        if realtime {
            if let Some(wait) = simulated.checked_sub(start.elapsed()) {
                thread::sleep(wait);
            }
        }
    }
    audio.stop_melody();
    info!(elapsed_ms = audio.elapsed().as_millis() as u64, "Frame loop finished");
}

fn write_event_log(path: &Path, device: &HeadlessDevice) -> Result<()> {
    let events = voice_events(&device.voices());
    let mut sink = JsonlSink::create(path)
        .with_context(|| format!("failed to create event log {}", path.display()))?;
    sink.write_all(&events)?;
    info!(events = events.len(), path = %path.display(), "wrote tone event log");
    Ok(())
}
