//! Phasor tracking: step boundaries and cycle wraps.
//!
//! Two independent detectors run on the same normalized phasor. A wrap may
//! land on a sample where the step index did not change (e.g. a phasor that
//! jumps from step 0 straight back to step 0), so neither implies the other.

use beatmap_types::{clamp_unit, NUM_STEPS};

/// Largest fractional position reported within a step.
const MAX_FRACTION: f32 = 1.0 - f32::EPSILON;

/// Converts phase to a step index and reports step boundaries.
#[derive(Debug, Clone, Default)]
pub struct StepDetector {
    last_step: Option<usize>,
}

impl StepDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(step, fractional, changed)` for a phase in `[0, 1]`.
    pub fn process(&mut self, phase: f32) -> (usize, f32, bool) {
        let scaled = clamp_unit(phase) * NUM_STEPS as f32;
        let step = (scaled.floor() as usize).min(NUM_STEPS - 1);
        let fractional = (scaled - step as f32).clamp(0.0, MAX_FRACTION);
        let changed = self.last_step != Some(step);
        self.last_step = Some(step);
        (step, fractional, changed)
    }

    pub fn reset(&mut self) {
        self.last_step = None;
    }
}

/// Detects phasor wraps as jumps larger than a fraction of the cycle.
#[derive(Debug, Clone)]
pub struct ResetDetector {
    threshold: f32,
    last_phase: Option<f32>,
}

impl ResetDetector {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: clamp_unit(threshold),
            last_phase: None,
        }
    }

    /// True when the phase moved by more than the threshold since the last sample.
    /// Both forward and backward jumps count.
    pub fn process(&mut self, phase: f32) -> bool {
        let phase = clamp_unit(phase);
        let wrapped = match self.last_phase {
            Some(last) => (phase - last).abs() > self.threshold,
            None => false,
        };
        self.last_phase = Some(phase);
        wrapped
    }

    pub fn reset(&mut self) {
        self.last_phase = None;
    }
}

/// Result of feeding one phasor sample to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseReading {
    pub current_step: usize,
    pub step_changed: bool,
    /// Position within the current step, in `[0, 1)`.
    pub fractional_step: f32,
    pub wrapped: bool,
}

#[derive(Debug, Clone)]
pub struct PhaseTracker {
    steps: StepDetector,
    wraps: ResetDetector,
}

impl PhaseTracker {
    pub fn new(reset_threshold: f32) -> Self {
        Self {
            steps: StepDetector::new(),
            wraps: ResetDetector::new(reset_threshold),
        }
    }

    pub fn process(&mut self, phase: f32) -> PhaseReading {
        let (current_step, fractional_step, step_changed) = self.steps.process(phase);
        let wrapped = self.wraps.process(phase);
        PhaseReading {
            current_step,
            step_changed,
            fractional_step,
            wrapped,
        }
    }

    /// Forget history; the next sample reports a step change and no wrap.
    pub fn reset(&mut self) {
        self.steps.reset();
        self.wraps.reset();
    }
}
