//! Playback behaviour of the audio service driven through a headless device.

use chiptone_audio::{
    names, AudioConfig, AudioService, Bus, HeadlessDevice, MemoryStore, OutputDevice, Waveform,
};
use std::time::Duration;

fn service() -> (AudioService, HeadlessDevice) {
    let device = HeadlessDevice::new();
    let boxed = device.clone();
    let service = AudioService::with_device(
        AudioConfig::default(),
        move || Ok(Box::new(boxed) as Box<dyn OutputDevice>),
        MemoryStore::new(),
    );
    (service, device)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn unknown_sound_returns_none() {
    let (mut audio, device) = service();
    assert!(audio.play_sound("does-not-exist", 1.0, 1.0).is_none());
    assert_eq!(device.voice_count(), 0);
}

#[test]
fn registered_sound_uses_registry_parameters() {
    let (mut audio, device) = service();
    assert!(audio.play_sound(names::TETRIS_DROP, 0.5, 1.0).is_some());
    let voice = device.voices()[0].voice.clone();
    assert_eq!(voice.frequency, 150.0);
    assert_eq!(voice.duration, 0.15);
    assert_eq!(voice.waveform, Waveform::Square);
    assert!((voice.gain - 0.4).abs() < 1e-6);
}

#[test]
fn quad_line_clear_plays_three_tones() {
    let (mut audio, device) = service();
    audio.play_line_clear_effect(4);
    assert_eq!(device.voice_count(), 1);

    audio.update(ms(99));
    assert_eq!(device.voice_count(), 1);
    audio.update(ms(1));
    assert_eq!(device.voice_count(), 2);
    audio.update(ms(100));
    assert_eq!(device.voice_count(), 3);
    audio.update(ms(1000));
    assert_eq!(device.voice_count(), 3);

    let voices = device.voices();
    assert_eq!(voices[0].voice.frequency, 1000.0);
    assert_eq!(voices[1].voice.frequency, 1200.0);
    assert_eq!(voices[1].voice.start_at, ms(100));
    assert_eq!(voices[2].voice.frequency, 1400.0);
    assert_eq!(voices[2].voice.start_at, ms(200));
    assert!(voices[1..]
        .iter()
        .all(|v| v.voice.waveform == Waveform::Sine && v.voice.duration == 0.2));
}

#[test]
fn regular_line_clear_plays_one_tone() {
    let (mut audio, device) = service();
    audio.play_line_clear_effect(2);
    audio.update(ms(1000));
    assert_eq!(device.voice_count(), 1);
    assert_eq!(device.voices()[0].voice.frequency, 800.0);
}

#[test]
fn merge_effect_adds_rising_companion() {
    let (mut audio, device) = service();
    audio.play_merge_effect(4);
    audio.update(ms(50));

    let voices = device.voices();
    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0].voice.frequency, 600.0);
    let companion = &voices[1].voice;
    assert!((companion.frequency - 960.0).abs() < 1e-3);
    assert_eq!(companion.waveform, Waveform::Triangle);
    assert_eq!(companion.duration, 0.15);
    assert!((companion.gain - 0.6 * 0.8).abs() < 1e-6);
}

#[test]
fn merge_companion_is_capped_at_double() {
    let (mut audio, device) = service();
    audio.play_merge_effect(4096);
    audio.update(ms(50));
    assert!((device.voices()[1].voice.frequency - 1600.0).abs() < 1e-3);
}

#[test]
fn effects_are_silent_when_disabled() {
    let (mut audio, device) = service();
    assert!(!audio.toggle_enabled());
    audio.play_line_clear_effect(4);
    audio.play_merge_effect(8);
    audio.update(ms(500));
    assert_eq!(device.voice_count(), 0);
}

#[test]
fn delayed_tone_respects_disable_in_between() {
    let (mut audio, device) = service();
    audio.play_line_clear_effect(4);
    audio.toggle_enabled();
    audio.update(ms(500));
    assert_eq!(device.voice_count(), 1);
}

#[test]
fn melody_skips_rests_but_advances() {
    let (mut audio, device) = service();
    audio.play_melody(&[440.0, 0.0, 440.0], 100);
    assert!(audio.is_melody_playing());
    assert_eq!(audio.melody_cursor(), Some(1));
    assert_eq!(device.voice_count(), 1);

    audio.update(ms(100));
    assert_eq!(audio.melody_cursor(), Some(2));
    assert_eq!(device.voice_count(), 1);

    audio.update(ms(100));
    assert_eq!(audio.melody_cursor(), Some(0));
    assert_eq!(device.voice_count(), 2);

    // Second cycle: positions 0 and 2 again
    audio.update(ms(300));
    assert_eq!(device.voice_count(), 4);

    let starts: Vec<Duration> = device.voices().iter().map(|v| v.voice.start_at).collect();
    assert_eq!(starts, vec![ms(0), ms(200), ms(300), ms(500)]);
}

#[test]
fn melody_notes_are_quiet_triangles() {
    let (mut audio, device) = service();
    audio.play_melody(&[523.25], 250);
    let voice = device.voices()[0].voice.clone();
    assert_eq!(voice.waveform, Waveform::Triangle);
    assert!((voice.duration - 0.25).abs() < 1e-6);
    assert!((voice.gain - 0.3 * 0.8).abs() < 1e-6);
    assert_eq!(voice.bus, Bus::Sfx);
}

#[test]
fn second_melody_is_ignored_while_playing() {
    let (mut audio, device) = service();
    audio.play_melody(&[440.0], 100);
    audio.play_melody(&[880.0], 100);
    audio.update(ms(100));
    assert!(device
        .voices()
        .iter()
        .all(|v| v.voice.frequency == 440.0));
}

#[test]
fn stop_melody_is_idempotent() {
    let (mut audio, device) = service();
    audio.stop_melody();
    audio.play_melody(&[440.0, 550.0], 100);
    audio.stop_melody();
    audio.stop_melody();
    assert!(!audio.is_melody_playing());
    assert_eq!(audio.pending_tasks(), 0);

    audio.update(ms(1000));
    assert_eq!(device.voice_count(), 1);

    audio.play_melody(&[660.0], 100);
    assert_eq!(device.voice_count(), 2);
}

#[test]
fn disabling_stops_the_melody() {
    let (mut audio, device) = service();
    audio.play_melody(&[440.0, 550.0], 100);
    assert!(!audio.toggle_enabled());
    assert!(!audio.is_melody_playing());
    audio.update(ms(1000));
    assert_eq!(device.voice_count(), 1);

    assert!(audio.toggle_enabled());
    assert!(!audio.is_melody_playing());
}

#[test]
fn volume_changes_reach_the_bus_nodes() {
    let (mut audio, device) = service();
    audio.set_master_volume(0.25);
    audio.set_sfx_volume(2.0);
    audio.set_music_volume(-1.0);
    assert_eq!(device.bus_gain(Bus::Master), 0.25);
    assert_eq!(device.bus_gain(Bus::Sfx), 1.0);
    assert_eq!(device.bus_gain(Bus::Music), 0.0);

    audio.play(names::CLICK);
    assert!((device.voices()[0].bus_gain - 0.25).abs() < 1e-6);
}

#[test]
fn toggle_twice_restores_state() {
    let (mut audio, _) = service();
    let original = audio.is_enabled();
    audio.toggle_enabled();
    let restored = audio.toggle_enabled();
    assert_eq!(restored, original);
}
