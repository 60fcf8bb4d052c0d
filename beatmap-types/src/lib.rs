//! # beatmap-types
//!
//! Shared type definitions for the phasor beat map engine.
//! Plain data: grid cells, grid dimensions, and the mode enums that are
//! persisted in presets and selected from config.

mod mode;
mod step;

pub use mode::{AccentOutputMode, SequencerMode, TriggerOutputMode};
pub use step::{BarSteps, StepData};

/// Steps in one bar (one full phasor cycle).
pub const NUM_STEPS: usize = 32;

/// Drum channels per step.
pub const NUM_CHANNELS: usize = 3;

/// Outputs driven by the sequencer: one trigger and one accent per channel.
pub const NUM_OUTPUTS: usize = NUM_CHANNELS * 2;

/// Clamp a control value into `[0, 1]`. NaN maps to 0.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
