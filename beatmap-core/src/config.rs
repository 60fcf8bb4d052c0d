use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

use beatmap_types::{AccentOutputMode, SequencerMode, TriggerOutputMode};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    render: RenderConfig,
}

#[derive(Deserialize, Default)]
struct EngineConfig {
    full_scale_volts: Option<f32>,
    trigger_pulse_ms: Option<f32>,
    led_pulse_ms: Option<f32>,
    reset_threshold: Option<f32>,
    seed: Option<u64>,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    sequencer_mode: Option<String>,
    trigger_output_mode: Option<String>,
    accent_output_mode: Option<String>,
}

#[derive(Deserialize, Default)]
struct RenderConfig {
    sample_rate: Option<u32>,
    bpm: Option<f32>,
    bars: Option<u32>,
}

/// Engine timing and scaling, resolved from config.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub full_scale_volts: f32,
    pub trigger_pulse_secs: f32,
    pub led_pulse_secs: f32,
    pub reset_threshold: f32,
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            full_scale_volts: 10.0,
            trigger_pulse_secs: 0.001,
            led_pulse_secs: 0.1,
            reset_threshold: 0.5,
            seed: None,
        }
    }
}

impl EngineSettings {
    /// The configured seed, or one process-wide seed taken from the clock on first use.
    pub fn resolve_seed(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None => process_seed(),
        }
    }
}

fn process_seed() -> u64 {
    static SEED: OnceLock<u64> = OnceLock::new();
    *SEED.get_or_init(|| {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        log::debug!(target: "config", "seeding chaos generator from clock: {}", seed);
        seed
    })
}

/// Mode selection applied to a freshly constructed sequencer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequencerDefaults {
    pub sequencer_mode: SequencerMode,
    pub trigger_output_mode: TriggerOutputMode,
    pub accent_output_mode: AccentOutputMode,
}

/// Offline render parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub sample_rate: u32,
    pub bpm: f32,
    pub bars: u32,
}

impl RenderSettings {
    /// Sample rate 8k..192k, bpm 1..999, bars 1..256. A non-finite bpm
    /// falls back to the default tempo.
    pub fn clamped(self) -> Self {
        let bpm = if self.bpm.is_finite() {
            self.bpm.clamp(1.0, 999.0)
        } else {
            Self::default().bpm
        };
        Self {
            sample_rate: self.sample_rate.clamp(8_000, 192_000),
            bpm,
            bars: self.bars.clamp(1, 256),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            bpm: 120.0,
            bars: 4,
        }
    }
}

pub struct Config {
    engine: EngineConfig,
    defaults: DefaultsConfig,
    render: RenderConfig,
}

impl Config {
    /// Embedded defaults merged with the user's config file, if one exists.
    pub fn load() -> Self {
        let mut config = Self::embedded();
        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => config.merge_toml(&contents, &path.display().to_string()),
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }
        config
    }

    /// Only the built-in defaults.
    pub fn embedded() -> Self {
        let base: ConfigFile = match toml::from_str(DEFAULT_CONFIG) {
            Ok(base) => base,
            Err(e) => {
                log::error!(target: "config", "embedded config.toml is invalid: {}", e);
                ConfigFile::default()
            }
        };
        Config {
            engine: base.engine,
            defaults: base.defaults,
            render: base.render,
        }
    }

    /// Merge user TOML over the current values. Malformed input is logged and ignored.
    pub fn merge_toml(&mut self, contents: &str, origin: &str) {
        match toml::from_str::<ConfigFile>(contents) {
            Ok(user) => {
                merge_engine(&mut self.engine, user.engine);
                merge_defaults(&mut self.defaults, user.defaults);
                merge_render(&mut self.render, user.render);
                log::debug!(target: "config", "merged config from {}", origin);
            }
            Err(e) => {
                log::warn!(target: "config", "ignoring malformed config {}: {}", origin, e)
            }
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        let fallback = EngineSettings::default();
        EngineSettings {
            full_scale_volts: self
                .engine
                .full_scale_volts
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(0.1, 100.0))
                .unwrap_or(fallback.full_scale_volts),
            trigger_pulse_secs: self
                .engine
                .trigger_pulse_ms
                .filter(|v| v.is_finite())
                .map(|ms| ms.clamp(0.01, 1_000.0) / 1_000.0)
                .unwrap_or(fallback.trigger_pulse_secs),
            led_pulse_secs: self
                .engine
                .led_pulse_ms
                .filter(|v| v.is_finite())
                .map(|ms| ms.clamp(1.0, 5_000.0) / 1_000.0)
                .unwrap_or(fallback.led_pulse_secs),
            reset_threshold: self
                .engine
                .reset_threshold
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(0.05, 0.95))
                .unwrap_or(fallback.reset_threshold),
            seed: self.engine.seed,
        }
    }

    pub fn defaults(&self) -> SequencerDefaults {
        SequencerDefaults {
            sequencer_mode: self
                .defaults
                .sequencer_mode
                .as_deref()
                .and_then(parse_sequencer_mode)
                .unwrap_or_default(),
            trigger_output_mode: self
                .defaults
                .trigger_output_mode
                .as_deref()
                .and_then(parse_trigger_output_mode)
                .unwrap_or_default(),
            accent_output_mode: self
                .defaults
                .accent_output_mode
                .as_deref()
                .and_then(parse_accent_output_mode)
                .unwrap_or_default(),
        }
    }

    /// Render parameters, clamped by [`RenderSettings::clamped`].
    pub fn render_settings(&self) -> RenderSettings {
        let fallback = RenderSettings::default();
        RenderSettings {
            sample_rate: self.render.sample_rate.unwrap_or(fallback.sample_rate),
            bpm: self.render.bpm.unwrap_or(fallback.bpm),
            bars: self.render.bars.unwrap_or(fallback.bars),
        }
        .clamped()
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("beatmap").join("config.toml"))
}

fn merge_engine(base: &mut EngineConfig, user: EngineConfig) {
    if user.full_scale_volts.is_some() {
        base.full_scale_volts = user.full_scale_volts;
    }
    if user.trigger_pulse_ms.is_some() {
        base.trigger_pulse_ms = user.trigger_pulse_ms;
    }
    if user.led_pulse_ms.is_some() {
        base.led_pulse_ms = user.led_pulse_ms;
    }
    if user.reset_threshold.is_some() {
        base.reset_threshold = user.reset_threshold;
    }
    if user.seed.is_some() {
        base.seed = user.seed;
    }
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.sequencer_mode.is_some() {
        base.sequencer_mode = user.sequencer_mode;
    }
    if user.trigger_output_mode.is_some() {
        base.trigger_output_mode = user.trigger_output_mode;
    }
    if user.accent_output_mode.is_some() {
        base.accent_output_mode = user.accent_output_mode;
    }
}

fn merge_render(base: &mut RenderConfig, user: RenderConfig) {
    if user.sample_rate.is_some() {
        base.sample_rate = user.sample_rate;
    }
    if user.bpm.is_some() {
        base.bpm = user.bpm;
    }
    if user.bars.is_some() {
        base.bars = user.bars;
    }
}

pub fn parse_sequencer_mode(s: &str) -> Option<SequencerMode> {
    match s.to_lowercase().as_str() {
        "original" | "grids" => Some(SequencerMode::Original),
        "henri" | "alt" | "alternate" => Some(SequencerMode::Henri),
        "euclidean" | "euclid" => Some(SequencerMode::Euclidean),
        _ => None,
    }
}

pub fn parse_trigger_output_mode(s: &str) -> Option<TriggerOutputMode> {
    match s.to_lowercase().as_str() {
        "pulse" | "trigger" => Some(TriggerOutputMode::Pulse),
        "gate" => Some(TriggerOutputMode::Gate),
        _ => None,
    }
}

pub fn parse_accent_output_mode(s: &str) -> Option<AccentOutputMode> {
    match s.to_lowercase().as_str() {
        "individual" | "accents" => Some(AccentOutputMode::Individual),
        "clock+reset" | "clock_reset" | "clockreset" | "clk_rst" => {
            Some(AccentOutputMode::ClockReset)
        }
        _ => None,
    }
}
