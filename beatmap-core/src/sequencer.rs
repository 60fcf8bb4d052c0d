//! Per-sample playback driver.
//!
//! Reads knobs and control voltages, keeps the cached bar current, turns the
//! phasor into step boundaries, and drives three trigger outputs, three
//! accent outputs, and three indicator lights.
//!
//! Everything reachable from [`Sequencer::process`] is allocation-free and
//! does not log. Mode changes made through the setters are control-rate and
//! may log.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use beatmap_types::{
    clamp_unit, AccentOutputMode, SequencerMode, StepData, TriggerOutputMode, NUM_CHANNELS,
    NUM_OUTPUTS,
};

use crate::bar_cache::BarCache;
use crate::config::{EngineSettings, SequencerDefaults};
use crate::generator::PatternGenerator;
use crate::oneshot::Oneshot;
use crate::persistence::{PresetPatch, PresetState};
use crate::phase::{PhaseReading, PhaseTracker};
use crate::regeneration::{check_regeneration, wrap_regeneration, RegenReason};

/// Voltage of a high output.
pub const OUTPUT_HIGH_VOLTS: f32 = 10.0;

/// Gates stay open for this fraction of each active step.
pub const GATE_FRACTION: f32 = 0.5;

/// Mode steps per volt of mode CV.
pub const MODE_CV_SCALE: f32 = 0.2;

const RANDOMIZE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Panel knob positions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knobs {
    pub map_x: f32,
    pub map_y: f32,
    pub chaos: f32,
    pub density: [f32; NUM_CHANNELS],
    /// Automatable mode knob (`0.0..=2.0`). `None` leaves mode to the setters.
    /// When `Some`, the knob (plus mode CV) wins: it overrides a mode chosen
    /// by [`Sequencer::set_mode`] or a preset on every sample.
    pub mode: Option<f32>,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            map_x: 0.0,
            map_y: 0.0,
            chaos: 0.0,
            density: [0.5; NUM_CHANNELS],
            mode: None,
        }
    }
}

/// Control voltages, added to the knobs after dividing by full scale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CvInputs {
    pub phasor: f32,
    pub map_x: f32,
    pub map_y: f32,
    pub chaos: f32,
    pub density: [f32; NUM_CHANNELS],
    pub mode: f32,
}

/// One sample of output. Trigger and accent values are 0 or [`OUTPUT_HIGH_VOLTS`];
/// lights are 0 or 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Outputs {
    pub trigger: [f32; NUM_CHANNELS],
    pub accent: [f32; NUM_CHANNELS],
    pub lights: [f32; NUM_CHANNELS],
}

impl Outputs {
    /// Triggers followed by accents.
    pub fn channels(&self) -> [f32; NUM_OUTPUTS] {
        let mut out = [0.0; NUM_OUTPUTS];
        out[..NUM_CHANNELS].copy_from_slice(&self.trigger);
        out[NUM_CHANNELS..].copy_from_slice(&self.accent);
        out
    }
}

/// Mode index from the automatable knob plus its CV, rounded and clamped.
pub fn mode_from_control(knob: f32, cv_volts: f32) -> SequencerMode {
    let value = knob + cv_volts * MODE_CV_SCALE;
    if value.is_nan() {
        return SequencerMode::default();
    }
    let index = value.round().clamp(0.0, 2.0) as i64;
    SequencerMode::from_index(index).unwrap_or_default()
}

/// Which accent outputs fire on `step`, given the accent output mode.
fn accent_lanes(data: &StepData, step: usize, mode: AccentOutputMode) -> [bool; NUM_CHANNELS] {
    match mode {
        AccentOutputMode::Individual => [
            data.is_accented(0),
            data.is_accented(1),
            data.is_accented(2),
        ],
        AccentOutputMode::ClockReset => [data.any_accent(), true, step == 0],
    }
}

fn level(high: bool) -> f32 {
    if high {
        OUTPUT_HIGH_VOLTS
    } else {
        0.0
    }
}

pub struct Sequencer {
    generator: PatternGenerator,
    cache: BarCache,
    tracker: PhaseTracker,
    /// Triggers 0..3, accents 3..6.
    pulses: [Oneshot; NUM_OUTPUTS],
    leds: [Oneshot; NUM_CHANNELS],
    full_scale_volts: f32,
    sequencer_mode: SequencerMode,
    trigger_output_mode: TriggerOutputMode,
    accent_output_mode: AccentOutputMode,
    panel_style: i64,
    frozen: bool,
    regeneration_count: u64,
    last_regen_reason: Option<RegenReason>,
    randomizer: Pcg32,
}

impl Sequencer {
    pub fn new(settings: &EngineSettings, sample_rate: f32, seed: u64) -> Self {
        Self {
            generator: PatternGenerator::new(seed),
            cache: BarCache::new(),
            tracker: PhaseTracker::new(settings.reset_threshold),
            pulses: std::array::from_fn(|_| Oneshot::new(settings.trigger_pulse_secs, sample_rate)),
            leds: std::array::from_fn(|_| Oneshot::new(settings.led_pulse_secs, sample_rate)),
            full_scale_volts: settings.full_scale_volts.max(f32::EPSILON),
            sequencer_mode: SequencerMode::default(),
            trigger_output_mode: TriggerOutputMode::default(),
            accent_output_mode: AccentOutputMode::default(),
            panel_style: 0,
            frozen: false,
            regeneration_count: 0,
            last_regen_reason: None,
            randomizer: Pcg32::seed_from_u64(seed ^ RANDOMIZE_STREAM),
        }
    }

    pub fn apply_defaults(&mut self, defaults: &SequencerDefaults) {
        self.set_mode(defaults.sequencer_mode);
        self.set_trigger_output_mode(defaults.trigger_output_mode);
        self.set_accent_output_mode(defaults.accent_output_mode);
    }

    /// Advance one sample.
    pub fn process(&mut self, knobs: &Knobs, cv: &CvInputs) -> Outputs {
        let scale = self.full_scale_volts;
        let map_x = clamp_unit(knobs.map_x + cv.map_x / scale);
        let map_y = clamp_unit(knobs.map_y + cv.map_y / scale);
        let chaos = clamp_unit(knobs.chaos + cv.chaos / scale);

        // An automated mode knob takes priority over menu and preset selections.
        if let Some(knob) = knobs.mode {
            let mode = mode_from_control(knob, cv.mode);
            if mode != self.sequencer_mode {
                self.switch_mode(mode);
            }
        }

        self.generator.set_map_x(map_x);
        self.generator.set_map_y(map_y);
        self.generator.set_randomness(chaos);
        for channel in 0..NUM_CHANNELS {
            self.generator
                .set_density(channel, knobs.density[channel] + cv.density[channel] / scale);
        }
        // Euclidean lengths ride on the map and chaos controls.
        self.generator.set_euclidean_length(0, map_x);
        self.generator.set_euclidean_length(1, map_y);
        self.generator.set_euclidean_length(2, chaos);

        if let Some(reason) = self.pending_regeneration() {
            self.regenerate(reason);
        }

        let reading = self.tracker.process(clamp_unit(cv.phasor / scale));

        if wrap_regeneration(reading.wrapped, chaos, self.frozen) {
            self.regenerate(RegenReason::ChaosWrap);
        }

        if reading.step_changed {
            self.arm_step(reading.current_step);
        }

        self.emit(&reading)
    }

    /// True when the cached bar must be regenerated before it is read.
    pub fn check_bar_regeneration_needed(&self) -> bool {
        self.pending_regeneration().is_some()
    }

    pub fn pending_regeneration(&self) -> Option<RegenReason> {
        check_regeneration(&self.cache, &self.generator.fingerprint())
    }

    fn regenerate(&mut self, reason: RegenReason) {
        self.generator.generate_bar(&mut self.cache);
        self.regeneration_count += 1;
        self.last_regen_reason = Some(reason);
    }

    fn arm_step(&mut self, step: usize) {
        let data = *self.cache.step(step);
        let pulse_mode = self.trigger_output_mode == TriggerOutputMode::Pulse;
        for channel in 0..NUM_CHANNELS {
            if data.trigger[channel] {
                self.leds[channel].trigger();
                if pulse_mode {
                    self.pulses[channel].trigger();
                }
            }
        }
        if pulse_mode {
            let lanes = accent_lanes(&data, step, self.accent_output_mode);
            for (lane, fire) in lanes.iter().enumerate() {
                if *fire {
                    self.pulses[NUM_CHANNELS + lane].trigger();
                }
            }
        }
    }

    fn emit(&mut self, reading: &PhaseReading) -> Outputs {
        for pulse in self.pulses.iter_mut() {
            pulse.process();
        }
        for led in self.leds.iter_mut() {
            led.process();
        }

        let mut out = Outputs::default();
        match self.trigger_output_mode {
            TriggerOutputMode::Pulse => {
                for channel in 0..NUM_CHANNELS {
                    out.trigger[channel] = level(self.pulses[channel].state());
                    out.accent[channel] = level(self.pulses[NUM_CHANNELS + channel].state());
                }
            }
            TriggerOutputMode::Gate => {
                let open = reading.fractional_step < GATE_FRACTION;
                let step = reading.current_step;
                let data = self.cache.step(step);
                let lanes = accent_lanes(data, step, self.accent_output_mode);
                for channel in 0..NUM_CHANNELS {
                    out.trigger[channel] = level(open && data.trigger[channel]);
                    out.accent[channel] = level(open && lanes[channel]);
                }
            }
        }
        for channel in 0..NUM_CHANNELS {
            out.lights[channel] = if self.leds[channel].state() { 1.0 } else { 0.0 };
        }
        out
    }

    fn switch_mode(&mut self, mode: SequencerMode) {
        self.sequencer_mode = mode;
        self.generator.set_mode(mode);
        self.cache.invalidate();
    }

    pub fn sequencer_mode(&self) -> SequencerMode {
        self.sequencer_mode
    }

    pub fn set_mode(&mut self, mode: SequencerMode) {
        log::debug!(target: "beatmap::sequencer", "sequencer mode -> {}", mode.name());
        self.switch_mode(mode);
    }

    pub fn trigger_output_mode(&self) -> TriggerOutputMode {
        self.trigger_output_mode
    }

    pub fn set_trigger_output_mode(&mut self, mode: TriggerOutputMode) {
        log::debug!(target: "beatmap::sequencer", "trigger output mode -> {}", mode.name());
        self.trigger_output_mode = mode;
    }

    pub fn accent_output_mode(&self) -> AccentOutputMode {
        self.accent_output_mode
    }

    pub fn set_accent_output_mode(&mut self, mode: AccentOutputMode) {
        log::debug!(target: "beatmap::sequencer", "accent output mode -> {}", mode.name());
        self.accent_output_mode = mode;
        self.generator.set_accent_alt_mode(mode.is_clock_reset());
        self.cache.invalidate();
    }

    pub fn frozen(&self) -> bool {
        self.frozen
    }

    /// While frozen, phasor wraps never re-roll a chaotic pattern.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn panel_style(&self) -> i64 {
        self.panel_style
    }

    pub fn set_panel_style(&mut self, style: i64) {
        self.panel_style = style;
    }

    /// Host reset: drop pending pulses, forget phase history, and regenerate on the next sample.
    pub fn on_reset(&mut self) {
        self.cache.invalidate();
        self.tracker.reset();
        for pulse in self.pulses.iter_mut().chain(self.leds.iter_mut()) {
            pulse.reset();
        }
    }

    /// Host randomize: draw new knob positions and regenerate on the next sample.
    pub fn on_randomize(&mut self, knobs: &mut Knobs) {
        knobs.map_x = self.randomizer.random();
        knobs.map_y = self.randomizer.random();
        knobs.chaos = self.randomizer.random();
        for density in knobs.density.iter_mut() {
            *density = self.randomizer.random();
        }
        self.cache.invalidate();
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        for pulse in self.pulses.iter_mut().chain(self.leds.iter_mut()) {
            pulse.set_sample_rate(sample_rate);
        }
    }

    pub fn bar_cache(&self) -> &BarCache {
        &self.cache
    }

    pub fn regeneration_count(&self) -> u64 {
        self.regeneration_count
    }

    pub fn last_regen_reason(&self) -> Option<RegenReason> {
        self.last_regen_reason
    }

    pub fn preset_state(&self) -> PresetState {
        PresetState {
            sequencer_mode: self.sequencer_mode,
            trigger_output_mode: self.trigger_output_mode,
            accent_output_mode: self.accent_output_mode,
            panel_style: self.panel_style,
        }
    }

    /// Apply the fields a preset carried; absent fields keep their live values.
    /// A preset carrying a sequencer or accent mode invalidates the bar even
    /// when the value matches the live one.
    pub fn apply_preset(&mut self, patch: &PresetPatch) {
        if patch.is_empty() {
            log::debug!(target: "beatmap::sequencer", "preset carried no usable fields");
            return;
        }
        let mut state = self.preset_state();
        patch.apply_to(&mut state);

        self.sequencer_mode = state.sequencer_mode;
        self.generator.set_mode(state.sequencer_mode);
        self.trigger_output_mode = state.trigger_output_mode;
        self.accent_output_mode = state.accent_output_mode;
        self.generator
            .set_accent_alt_mode(state.accent_output_mode.is_clock_reset());
        self.panel_style = state.panel_style;
        if patch.invalidates_bar() {
            self.cache.invalidate();
        }
        log::debug!(
            target: "beatmap::sequencer",
            "preset applied: {} / {} / {}",
            state.sequencer_mode.name(),
            state.trigger_output_mode.name(),
            state.accent_output_mode.name()
        );
    }
}
