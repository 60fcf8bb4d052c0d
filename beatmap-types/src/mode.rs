//! Sequencer and output mode enums.
//!
//! `index()`/`from_index()` use the current persisted encoding. Older preset
//! encodings are remapped by the loader, not here.

use serde::{Deserialize, Serialize};

/// Pattern generation algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequencerMode {
    /// Classic drum-map pattern space.
    #[default]
    Original,
    /// Alternate drum-map arrangement.
    Henri,
    /// Evenly-spread onsets per channel.
    Euclidean,
}

impl SequencerMode {
    pub const ALL: [SequencerMode; 3] = [
        SequencerMode::Original,
        SequencerMode::Henri,
        SequencerMode::Euclidean,
    ];

    pub fn index(self) -> u8 {
        match self {
            Self::Original => 0,
            Self::Henri => 1,
            Self::Euclidean => 2,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Original),
            1 => Some(Self::Henri),
            2 => Some(Self::Euclidean),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Henri => "Henri",
            Self::Euclidean => "Euclidean",
        }
    }
}

/// Shape of the trigger and accent outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerOutputMode {
    /// Fixed-length pulse armed on each step boundary.
    #[default]
    Pulse,
    /// High for the first half of each active step.
    Gate,
}

impl TriggerOutputMode {
    pub fn index(self) -> u8 {
        match self {
            Self::Pulse => 0,
            Self::Gate => 1,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Pulse),
            1 => Some(Self::Gate),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pulse => "Pulse",
            Self::Gate => "Gate",
        }
    }
}

/// Meaning of the three accent outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccentOutputMode {
    /// One accent output per channel.
    #[default]
    Individual,
    /// Global accent, step clock, and bar reset.
    ClockReset,
}

impl AccentOutputMode {
    pub fn index(self) -> u8 {
        match self {
            Self::Individual => 0,
            Self::ClockReset => 1,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Individual),
            1 => Some(Self::ClockReset),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::ClockReset => "Clock+Reset",
        }
    }

    pub fn is_clock_reset(&self) -> bool {
        matches!(self, Self::ClockReset)
    }
}
