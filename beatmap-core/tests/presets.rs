//! Preset file round trips and legacy remapping through the sequencer.

use beatmap_core::config::EngineSettings;
use beatmap_core::persistence::{load_preset, save_preset, PresetError, PresetState};
use beatmap_core::sequencer::{CvInputs, Knobs, Sequencer};
use beatmap_core::{AccentOutputMode, SequencerMode, TriggerOutputMode};
use tempfile::TempDir;

fn sequencer() -> Sequencer {
    Sequencer::new(&EngineSettings::default(), 48_000.0, 1)
}

#[test]
fn test_save_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preset.json");

    let mut seq = sequencer();
    seq.set_mode(SequencerMode::Euclidean);
    seq.set_trigger_output_mode(TriggerOutputMode::Gate);
    seq.set_accent_output_mode(AccentOutputMode::ClockReset);
    seq.set_panel_style(2);
    save_preset(&path, &seq.preset_state()).unwrap();

    let mut restored = sequencer();
    restored.apply_preset(&load_preset(&path).unwrap());
    assert_eq!(restored.preset_state(), seq.preset_state());
}

#[test]
fn test_legacy_file_remaps_modes() {
    let dir = TempDir::new().unwrap();
    for (legacy, expected) in [
        (0, SequencerMode::Henri),
        (1, SequencerMode::Original),
        (2, SequencerMode::Euclidean),
    ] {
        let path = dir.path().join(format!("legacy-{}.json", legacy));
        std::fs::write(
            &path,
            format!(
                r#"{{"sequencerMode": {}, "triggerOutputMode": 0, "panelStyle": 0}}"#,
                legacy
            ),
        )
        .unwrap();
        let mut seq = sequencer();
        seq.apply_preset(&load_preset(&path).unwrap());
        assert_eq!(seq.sequencer_mode(), expected, "legacy {}", legacy);
    }
}

#[test]
fn test_partial_preset_keeps_live_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{"schemaVersion": 2, "triggerOutputMode": 1}"#).unwrap();

    let mut seq = sequencer();
    seq.set_mode(SequencerMode::Henri);
    seq.set_panel_style(4);
    seq.process(&Knobs::default(), &CvInputs::default());
    assert!(!seq.check_bar_regeneration_needed());

    seq.apply_preset(&load_preset(&path).unwrap());
    let state = seq.preset_state();
    assert_eq!(state.sequencer_mode, SequencerMode::Henri);
    assert_eq!(state.trigger_output_mode, TriggerOutputMode::Gate);
    assert_eq!(state.accent_output_mode, AccentOutputMode::Individual);
    assert_eq!(state.panel_style, 4);
    assert!(!seq.check_bar_regeneration_needed());
}

#[test]
fn test_loading_mode_invalidates_bar() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mode.json");
    save_preset(
        &path,
        &PresetState {
            sequencer_mode: SequencerMode::Original,
            ..Default::default()
        },
    )
    .unwrap();

    let mut seq = sequencer();
    seq.process(&Knobs::default(), &CvInputs::default());
    seq.apply_preset(&load_preset(&path).unwrap());
    assert!(seq.check_bar_regeneration_needed());
}

#[test]
fn test_saved_file_uses_current_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("current.json");
    let state = PresetState {
        sequencer_mode: SequencerMode::Henri,
        ..Default::default()
    };
    save_preset(&path, &state).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["schemaVersion"], 2);
    assert_eq!(value["sequencerMode"], 1);
    assert_eq!(value["accOutputMode"], 0);
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(load_preset(&missing), Err(PresetError::Io(_))));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{ not json").unwrap();
    assert!(matches!(load_preset(&garbage), Err(PresetError::Json(_))));

    let array = dir.path().join("array.json");
    std::fs::write(&array, "[0, 1]").unwrap();
    let err = load_preset(&array).unwrap_err();
    assert!(matches!(err, PresetError::NotAnObject));
    assert_eq!(err.to_string(), "preset root is not a JSON object");
}
