//! # beatmap-core
//!
//! Phasor-driven drum pattern engine. An incoming phasor (a ramp that sweeps
//! one bar per cycle) is split into 32 steps; each step looks up a cached
//! three-channel bar grid and fires trigger, accent, and light outputs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beatmap_core::config::Config;
//! use beatmap_core::sequencer::{CvInputs, Knobs, Sequencer};
//!
//! let config = Config::load();
//! let settings = config.engine_settings();
//! let mut seq = Sequencer::new(&settings, 48_000.0, settings.resolve_seed());
//! seq.apply_defaults(&config.defaults());
//!
//! // once per audio sample
//! let out = seq.process(&Knobs::default(), &CvInputs { phasor: 2.5, ..Default::default() });
//! ```
//!
//! ## Module Overview
//!
//! - [`generator`]: `PatternGenerator`: drum-map and Euclidean bar synthesis
//! - [`pattern_table`]: drum-map node data and bilinear lookup
//! - [`euclidean`]: evenly spread onsets over the bar
//! - [`bar_cache`]: cached grid plus the quantized fingerprint that produced it
//! - [`regeneration`]: per-sample decision to rebuild the bar
//! - [`phase`]: step and wrap detection on the phasor
//! - [`oneshot`]: fixed-length pulse timers
//! - [`sequencer`]: per-sample playback driver
//! - [`persistence`]: preset JSON with legacy mode remapping
//! - [`config`]: TOML configuration (embedded defaults + user overrides)

pub mod bar_cache;
pub mod config;
pub mod euclidean;
pub mod generator;
pub mod oneshot;
pub mod pattern_table;
pub mod persistence;
pub mod phase;
pub mod regeneration;
pub mod sequencer;

pub use beatmap_types::{
    AccentOutputMode, BarSteps, SequencerMode, StepData, TriggerOutputMode, NUM_CHANNELS,
    NUM_OUTPUTS, NUM_STEPS,
};
