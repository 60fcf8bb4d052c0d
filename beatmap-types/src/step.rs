//! Bar grid cell types.

use serde::{Deserialize, Serialize};

use crate::{NUM_CHANNELS, NUM_STEPS};

/// One step of a generated bar: per-channel trigger and accent flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepData {
    pub trigger: [bool; NUM_CHANNELS],
    pub accent: [bool; NUM_CHANNELS],
}

impl StepData {
    /// True when `channel` fires with an accent. Out-of-range channels never fire.
    pub fn is_accented(&self, channel: usize) -> bool {
        channel < NUM_CHANNELS && self.trigger[channel] && self.accent[channel]
    }

    /// True when any channel fires with an accent on this step.
    pub fn any_accent(&self) -> bool {
        (0..NUM_CHANNELS).any(|c| self.is_accented(c))
    }
}

/// A full bar of steps.
pub type BarSteps = [StepData; NUM_STEPS];
