//! Cached bar grid and the parameter fingerprint that produced it.
//!
//! The grid is only trusted for playback while the stored fingerprint matches
//! the live parameters and no invalidation is pending. It is replaced
//! wholesale by [`BarCache::commit`]; nothing mutates individual steps.

use beatmap_types::{clamp_unit, BarSteps, SequencerMode, StepData, NUM_CHANNELS, NUM_STEPS};

/// Quantize a control value to 8 bits: `floor(clamp(v) * 255)`.
pub fn quantize(value: f32) -> u8 {
    (clamp_unit(value) * 255.0) as u8
}

/// Quantized snapshot of every parameter that shapes a generated bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub map_x: u8,
    pub map_y: u8,
    pub randomness: u8,
    pub density: [u8; NUM_CHANNELS],
    pub mode: SequencerMode,
    pub accent_alt: bool,
    pub euclidean_length: [u8; NUM_CHANNELS],
}

impl Fingerprint {
    /// Equality on the fields shared by every mode.
    pub fn core_matches(&self, other: &Fingerprint) -> bool {
        self.map_x == other.map_x
            && self.map_y == other.map_y
            && self.randomness == other.randomness
            && self.density == other.density
            && self.mode == other.mode
            && self.accent_alt == other.accent_alt
    }

    pub fn euclidean_matches(&self, other: &Fingerprint) -> bool {
        self.euclidean_length == other.euclidean_length
    }
}

#[derive(Debug, Clone)]
pub struct BarCache {
    steps: BarSteps,
    needs_regeneration: bool,
    fingerprint: Fingerprint,
}

impl BarCache {
    /// A fresh cache is empty and flagged for regeneration.
    pub fn new() -> Self {
        Self {
            steps: [StepData::default(); NUM_STEPS],
            needs_regeneration: true,
            fingerprint: Fingerprint::default(),
        }
    }

    pub fn steps(&self) -> &BarSteps {
        &self.steps
    }

    /// Step data for `step`, clamped into the bar.
    pub fn step(&self, step: usize) -> &StepData {
        &self.steps[step.min(NUM_STEPS - 1)]
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn needs_regeneration(&self) -> bool {
        self.needs_regeneration
    }

    /// Mark the grid stale. Sticky until the next commit.
    pub fn invalidate(&mut self) {
        self.needs_regeneration = true;
    }

    /// Replace the whole grid and its fingerprint, clearing any pending invalidation.
    pub fn commit(&mut self, steps: BarSteps, fingerprint: Fingerprint) {
        self.steps = steps;
        self.fingerprint = fingerprint;
        self.needs_regeneration = false;
    }

    /// Number of steps on which `channel` fires.
    pub fn trigger_count(&self, channel: usize) -> usize {
        self.steps
            .iter()
            .filter(|s| channel < NUM_CHANNELS && s.trigger[channel])
            .count()
    }

    /// Number of accented hits on `channel`.
    pub fn accent_count(&self, channel: usize) -> usize {
        self.steps.iter().filter(|s| s.is_accented(channel)).count()
    }
}

impl Default for BarCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_floors() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(1.0), 255);
        assert_eq!(quantize(0.5), 127);
        assert_eq!(quantize(-1.0), 0);
        assert_eq!(quantize(2.0), 255);
        assert_eq!(quantize(f32::NAN), 0);
        assert_eq!(quantize(0.1), 25);
    }

    #[test]
    fn new_cache_needs_regeneration() {
        let cache = BarCache::new();
        assert!(cache.needs_regeneration());
        assert_eq!(cache.trigger_count(0), 0);
    }

    #[test]
    fn commit_clears_flag_and_replaces_grid() {
        let mut cache = BarCache::new();
        let mut steps = [StepData::default(); NUM_STEPS];
        steps[5].trigger[0] = true;
        steps[5].accent[0] = true;
        let fp = Fingerprint {
            map_x: 12,
            ..Default::default()
        };
        cache.commit(steps, fp);
        assert!(!cache.needs_regeneration());
        assert_eq!(cache.fingerprint().map_x, 12);
        assert_eq!(cache.trigger_count(0), 1);
        assert_eq!(cache.accent_count(0), 1);

        cache.invalidate();
        assert!(cache.needs_regeneration());
        // Invalidation does not touch the grid itself.
        assert!(cache.step(5).trigger[0]);
    }

    #[test]
    fn step_lookup_clamps() {
        let mut cache = BarCache::new();
        let mut steps = [StepData::default(); NUM_STEPS];
        steps[NUM_STEPS - 1].trigger[2] = true;
        cache.commit(steps, Fingerprint::default());
        assert!(cache.step(500).trigger[2]);
    }

    #[test]
    fn fingerprint_comparisons() {
        let a = Fingerprint::default();
        let mut b = a;
        b.euclidean_length[1] = 40;
        assert!(a.core_matches(&b));
        assert!(!a.euclidean_matches(&b));

        b = a;
        b.accent_alt = true;
        assert!(!a.core_matches(&b));

        b = a;
        b.mode = SequencerMode::Henri;
        assert!(!a.core_matches(&b));
    }
}
