use chiptone_audio::{
    names, AudioConfig, AudioService, Bus, HeadlessDevice, MemoryStore, OutputDevice, Waveform,
};
use chiptone_testkit::voice_events;
use std::time::Duration;

#[test]
fn game_session_produces_expected_tone_stream() {
    let device = HeadlessDevice::new();
    let boxed = device.clone();
    let mut audio = AudioService::with_device(
        AudioConfig::default(),
        move || Ok(Box::new(boxed) as Box<dyn OutputDevice>),
        MemoryStore::new(),
    );
    audio.on_ready();

    audio.play(names::TETRIS_ROTATE);
    audio.update(Duration::from_millis(16));
    audio.play_line_clear_effect(4);
    audio.update(Duration::from_millis(16));
    audio.play_merge_effect(2048);
    for _ in 0..20 {
        audio.update(Duration::from_millis(16));
    }

    let events = voice_events(&device.voices());
    let frequencies: Vec<f32> = events.iter().map(|e| e.frequency).collect();
    assert_eq!(frequencies, vec![300.0, 1000.0, 600.0, 1600.0, 1200.0, 1400.0]);
    assert!(events.iter().all(|e| e.bus == Bus::Sfx));
    assert_eq!(events[3].waveform, Waveform::Triangle);
    assert_eq!(events[3].at_ms, 82);
    assert_eq!(events[4].at_ms, 116);
    assert_eq!(events[5].at_ms, 216);

    let serialized = serde_json::to_string(&events[0]).expect("serializable");
    assert!(serialized.contains("\"waveform\":\"sine\""));
    assert!(serialized.contains("\"bus\":\"sfx\""));
}
