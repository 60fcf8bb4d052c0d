//! Bar regeneration decision, evaluated once per sample before step lookup.

use beatmap_types::SequencerMode;

use crate::bar_cache::{BarCache, Fingerprint};

/// Why the last bar was regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenReason {
    /// Sticky flag was set (construction, reset, randomize, mode change).
    Invalidated,
    /// A tracked parameter moved by at least one quantization step.
    ParametersChanged,
    /// Euclidean mode only: a channel length moved.
    EuclideanLengthChanged,
    /// Phasor wrapped while chaos was active and playback not frozen.
    ChaosWrap,
}

impl RegenReason {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Invalidated => "invalidated",
            Self::ParametersChanged => "parameters changed",
            Self::EuclideanLengthChanged => "euclidean length changed",
            Self::ChaosWrap => "chaos wrap",
        }
    }
}

/// Check the cache against the live fingerprint.
///
/// Returns the first applicable reason, or `None` when the cached grid is
/// still valid for playback. Euclidean lengths are only compared while the
/// live mode is Euclidean.
pub fn check_regeneration(cache: &BarCache, live: &Fingerprint) -> Option<RegenReason> {
    if cache.needs_regeneration() {
        return Some(RegenReason::Invalidated);
    }
    let stored = cache.fingerprint();
    if !stored.core_matches(live) {
        return Some(RegenReason::ParametersChanged);
    }
    if live.mode == SequencerMode::Euclidean && !stored.euclidean_matches(live) {
        return Some(RegenReason::EuclideanLengthChanged);
    }
    None
}

/// A phasor wrap re-rolls the bar only while chaos is non-zero and playback is not frozen.
pub fn wrap_regeneration(wrapped: bool, randomness: f32, frozen: bool) -> bool {
    wrapped && randomness > 0.0 && !frozen
}
