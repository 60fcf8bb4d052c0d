//! Preset state persisted as a small JSON object.
//!
//! Loading is partial: every field is decoded on its own, and anything
//! missing or malformed leaves the live value alone. The sequencer mode
//! integer changed meaning between schema versions, so it is always read
//! through the table for the version the file declares.

use std::path::Path;

use serde_json::{json, Map, Value};

use beatmap_types::{AccentOutputMode, SequencerMode, TriggerOutputMode};

/// Version written by [`to_json`]. Files without `schemaVersion` are version 1.
pub const PRESET_SCHEMA_VERSION: i64 = 2;

const LEGACY_SCHEMA_VERSION: i64 = 1;

/// Version 1 encoding of `sequencerMode`.
pub const SEQUENCER_MODE_V1: [SequencerMode; 3] = [
    SequencerMode::Henri,
    SequencerMode::Original,
    SequencerMode::Euclidean,
];

/// Version 2 (current) encoding of `sequencerMode`.
pub const SEQUENCER_MODE_V2: [SequencerMode; 3] = [
    SequencerMode::Original,
    SequencerMode::Henri,
    SequencerMode::Euclidean,
];

const KEY_SCHEMA_VERSION: &str = "schemaVersion";
const KEY_SEQUENCER_MODE: &str = "sequencerMode";
const KEY_TRIGGER_OUTPUT_MODE: &str = "triggerOutputMode";
const KEY_ACC_OUTPUT_MODE: &str = "accOutputMode";
const KEY_PANEL_STYLE: &str = "panelStyle";

/// Error type for preset file I/O.
#[derive(Debug)]
pub enum PresetError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotAnObject,
}

impl From<std::io::Error> for PresetError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PresetError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::fmt::Display for PresetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::NotAnObject => write!(f, "preset root is not a JSON object"),
        }
    }
}

impl std::error::Error for PresetError {}

/// Everything a preset stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresetState {
    pub sequencer_mode: SequencerMode,
    pub trigger_output_mode: TriggerOutputMode,
    pub accent_output_mode: AccentOutputMode,
    /// Cosmetic only.
    pub panel_style: i64,
}

/// Fields recovered from a preset; `None` means keep the live value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresetPatch {
    pub sequencer_mode: Option<SequencerMode>,
    pub trigger_output_mode: Option<TriggerOutputMode>,
    pub accent_output_mode: Option<AccentOutputMode>,
    pub panel_style: Option<i64>,
}

impl PresetPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applying this patch invalidates the cached bar.
    pub fn invalidates_bar(&self) -> bool {
        self.sequencer_mode.is_some() || self.accent_output_mode.is_some()
    }

    pub fn apply_to(&self, state: &mut PresetState) {
        if let Some(mode) = self.sequencer_mode {
            state.sequencer_mode = mode;
        }
        if let Some(mode) = self.trigger_output_mode {
            state.trigger_output_mode = mode;
        }
        if let Some(mode) = self.accent_output_mode {
            state.accent_output_mode = mode;
        }
        if let Some(style) = self.panel_style {
            state.panel_style = style;
        }
    }
}

pub fn to_json(state: &PresetState) -> Value {
    json!({
        KEY_SCHEMA_VERSION: PRESET_SCHEMA_VERSION,
        KEY_SEQUENCER_MODE: state.sequencer_mode.index(),
        KEY_TRIGGER_OUTPUT_MODE: state.trigger_output_mode.index(),
        KEY_ACC_OUTPUT_MODE: state.accent_output_mode.index(),
        KEY_PANEL_STYLE: state.panel_style,
    })
}

/// Decode a preset object. Only a non-object root is an error.
pub fn from_json(value: &Value) -> Result<PresetPatch, PresetError> {
    let obj = value.as_object().ok_or(PresetError::NotAnObject)?;
    let version = schema_version(obj);
    let table = sequencer_mode_table(version);

    let patch = PresetPatch {
        sequencer_mode: int_field(obj, KEY_SEQUENCER_MODE).and_then(|i| {
            let mode = usize::try_from(i).ok().and_then(|i| table.get(i).copied());
            if mode.is_none() {
                warn_out_of_range(KEY_SEQUENCER_MODE, i);
            }
            mode
        }),
        trigger_output_mode: int_field(obj, KEY_TRIGGER_OUTPUT_MODE).and_then(|i| {
            let mode = TriggerOutputMode::from_index(i);
            if mode.is_none() {
                warn_out_of_range(KEY_TRIGGER_OUTPUT_MODE, i);
            }
            mode
        }),
        accent_output_mode: int_field(obj, KEY_ACC_OUTPUT_MODE).and_then(|i| {
            let mode = AccentOutputMode::from_index(i);
            if mode.is_none() {
                warn_out_of_range(KEY_ACC_OUTPUT_MODE, i);
            }
            mode
        }),
        panel_style: int_field(obj, KEY_PANEL_STYLE),
    };
    log::debug!(target: "beatmap::persistence", "decoded preset v{}: {:?}", version, patch);
    Ok(patch)
}

pub fn save_preset(path: &Path, state: &PresetState) -> Result<(), PresetError> {
    let text = serde_json::to_string_pretty(&to_json(state))?;
    std::fs::write(path, text)?;
    log::info!(target: "beatmap::persistence", "saved preset to {}", path.display());
    Ok(())
}

pub fn load_preset(path: &Path) -> Result<PresetPatch, PresetError> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    let patch = from_json(&value)?;
    log::info!(target: "beatmap::persistence", "loaded preset from {}", path.display());
    Ok(patch)
}

fn schema_version(obj: &Map<String, Value>) -> i64 {
    match obj.get(KEY_SCHEMA_VERSION) {
        None => LEGACY_SCHEMA_VERSION,
        Some(v) => match v.as_i64() {
            Some(version) => version,
            None => {
                log::warn!(
                    target: "beatmap::persistence",
                    "{} is not an integer ({}), assuming v{}",
                    KEY_SCHEMA_VERSION, v, PRESET_SCHEMA_VERSION
                );
                PRESET_SCHEMA_VERSION
            }
        },
    }
}

fn sequencer_mode_table(version: i64) -> &'static [SequencerMode; 3] {
    if version <= LEGACY_SCHEMA_VERSION {
        &SEQUENCER_MODE_V1
    } else {
        if version > PRESET_SCHEMA_VERSION {
            log::warn!(
                target: "beatmap::persistence",
                "preset schema v{} is newer than v{}, reading with current encoding",
                version, PRESET_SCHEMA_VERSION
            );
        }
        &SEQUENCER_MODE_V2
    }
}

/// Integer field, or `None` when missing or not an integer.
fn int_field(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = obj.get(key)?;
    let int = value.as_i64();
    if int.is_none() {
        log::warn!(target: "beatmap::persistence", "ignoring {}: not an integer ({})", key, value);
    }
    int
}

fn warn_out_of_range(key: &str, value: i64) {
    log::warn!(target: "beatmap::persistence", "ignoring {}: {} is out of range", key, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_sequencer_mode_remap() {
        for (legacy, expected) in [
            (0, SequencerMode::Henri),
            (1, SequencerMode::Original),
            (2, SequencerMode::Euclidean),
        ] {
            let patch = from_json(&json!({ "sequencerMode": legacy })).unwrap();
            assert_eq!(patch.sequencer_mode, Some(expected), "legacy {}", legacy);
        }
    }

    #[test]
    fn current_sequencer_mode_encoding() {
        for mode in SequencerMode::ALL {
            let patch =
                from_json(&json!({ "schemaVersion": 2, "sequencerMode": mode.index() })).unwrap();
            assert_eq!(patch.sequencer_mode, Some(mode));
        }
    }

    #[test]
    fn newer_schema_uses_current_table() {
        let patch = from_json(&json!({ "schemaVersion": 9, "sequencerMode": 0 })).unwrap();
        assert_eq!(patch.sequencer_mode, Some(SequencerMode::Original));
    }

    #[test]
    fn round_trip() {
        let state = PresetState {
            sequencer_mode: SequencerMode::Henri,
            trigger_output_mode: TriggerOutputMode::Gate,
            accent_output_mode: AccentOutputMode::ClockReset,
            panel_style: 1,
        };
        let value = to_json(&state);
        assert_eq!(value["schemaVersion"], 2);
        assert_eq!(value["sequencerMode"], 1);

        let mut loaded = PresetState::default();
        from_json(&value).unwrap().apply_to(&mut loaded);
        assert_eq!(loaded, state);
    }

    #[test]
    fn missing_fields_keep_prior_values() {
        let mut state = PresetState {
            sequencer_mode: SequencerMode::Euclidean,
            trigger_output_mode: TriggerOutputMode::Gate,
            accent_output_mode: AccentOutputMode::Individual,
            panel_style: 3,
        };
        let patch = from_json(&json!({ "schemaVersion": 2, "accOutputMode": 1 })).unwrap();
        patch.apply_to(&mut state);
        assert_eq!(state.sequencer_mode, SequencerMode::Euclidean);
        assert_eq!(state.trigger_output_mode, TriggerOutputMode::Gate);
        assert_eq!(state.accent_output_mode, AccentOutputMode::ClockReset);
        assert_eq!(state.panel_style, 3);
        assert!(patch.invalidates_bar());
    }

    #[test]
    fn malformed_fields_are_skipped() {
        let patch = from_json(&json!({
            "schemaVersion": 2,
            "sequencerMode": "Henri",
            "triggerOutputMode": 7,
            "accOutputMode": -1,
            "panelStyle": 2,
        }))
        .unwrap();
        assert_eq!(patch.sequencer_mode, None);
        assert_eq!(patch.trigger_output_mode, None);
        assert_eq!(patch.accent_output_mode, None);
        assert_eq!(patch.panel_style, Some(2));
        assert!(!patch.invalidates_bar());
    }

    #[test]
    fn out_of_range_sequencer_mode() {
        assert_eq!(from_json(&json!({ "sequencerMode": 3 })).unwrap().sequencer_mode, None);
        assert_eq!(from_json(&json!({ "sequencerMode": -1 })).unwrap().sequencer_mode, None);
    }

    #[test]
    fn empty_object_is_empty_patch() {
        let patch = from_json(&json!({})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn non_object_rejected() {
        assert!(matches!(from_json(&json!([1, 2])), Err(PresetError::NotAnObject)));
        assert!(matches!(from_json(&json!(3)), Err(PresetError::NotAnObject)));
    }

    #[test]
    fn trigger_mode_alone_does_not_invalidate() {
        let patch = from_json(&json!({ "triggerOutputMode": 1 })).unwrap();
        assert!(!patch.invalidates_bar());
        assert_eq!(patch.trigger_output_mode, Some(TriggerOutputMode::Gate));
    }
}
