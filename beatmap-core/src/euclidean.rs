//! Euclidean rhythms over the fixed 32-step bar.

use beatmap_types::{clamp_unit, NUM_STEPS};

/// Onsets on steps that are multiples of this are accented.
pub const ACCENT_SPACING: usize = 8;

/// Number of onsets for a normalized length: `round(length * 32)`.
pub fn onset_count(length: f32) -> usize {
    (clamp_unit(length) * NUM_STEPS as f32).round() as usize
}

/// Whether `step` is an onset when `pulses` onsets are spread over `steps`.
///
/// Bucket formulation: step `s` is an onset iff `floor(s*k/n) != floor((s-1)*k/n)`,
/// which reduces to `(s*k) mod n < k`. Step 0 is always an onset when `k > 0`.
pub fn is_onset(step: usize, pulses: usize, steps: usize) -> bool {
    if steps == 0 || step >= steps {
        return false;
    }
    let pulses = pulses.min(steps);
    pulses > 0 && (step * pulses) % steps < pulses
}

/// Generate a Euclidean rhythm with `pulses` onsets over one bar.
/// Pulses beyond the bar length are clamped.
pub fn euclidean_bar(pulses: usize) -> [bool; NUM_STEPS] {
    let mut bar = [false; NUM_STEPS];
    for (step, slot) in bar.iter_mut().enumerate() {
        *slot = is_onset(step, pulses, NUM_STEPS);
    }
    bar
}
