//! Bar pattern generator.
//!
//! Holds the live control values and synthesizes a full 32-step, 3-channel
//! grid on demand. Generation is bounded (fixed grid size), allocation-free,
//! and safe to call from the audio callback.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use beatmap_types::{clamp_unit, BarSteps, SequencerMode, StepData, NUM_CHANNELS, NUM_STEPS};

use crate::bar_cache::{quantize, BarCache, Fingerprint};
use crate::euclidean::{euclidean_bar, onset_count, ACCENT_SPACING};
use crate::pattern_table::{PatternTable, ACCENT_LEVEL};

#[derive(Debug, Clone)]
pub struct PatternGenerator {
    mode: SequencerMode,
    map_x: f32,
    map_y: f32,
    density: [f32; NUM_CHANNELS],
    randomness: f32,
    accent_alt: bool,
    euclidean_length: [f32; NUM_CHANNELS],
    rng: Pcg32,
}

impl PatternGenerator {
    /// Create a generator whose chaos draws come from a PCG stream seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            mode: SequencerMode::default(),
            map_x: 0.0,
            map_y: 0.0,
            density: [0.5; NUM_CHANNELS],
            randomness: 0.0,
            accent_alt: false,
            euclidean_length: [0.0; NUM_CHANNELS],
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn mode(&self) -> SequencerMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SequencerMode) {
        self.mode = mode;
    }

    pub fn set_map_x(&mut self, value: f32) {
        self.map_x = clamp_unit(value);
    }

    pub fn set_map_y(&mut self, value: f32) {
        self.map_y = clamp_unit(value);
    }

    /// Set one channel's density. Unknown channels are ignored.
    pub fn set_density(&mut self, channel: usize, value: f32) {
        if let Some(d) = self.density.get_mut(channel) {
            *d = clamp_unit(value);
        }
    }

    pub fn randomness(&self) -> f32 {
        self.randomness
    }

    pub fn set_randomness(&mut self, value: f32) {
        self.randomness = clamp_unit(value);
    }

    pub fn accent_alt_mode(&self) -> bool {
        self.accent_alt
    }

    pub fn set_accent_alt_mode(&mut self, enabled: bool) {
        self.accent_alt = enabled;
    }

    /// Set one channel's Euclidean length. Unknown channels are ignored.
    pub fn set_euclidean_length(&mut self, channel: usize, value: f32) {
        if let Some(l) = self.euclidean_length.get_mut(channel) {
            *l = clamp_unit(value);
        }
    }

    /// Quantized snapshot of the current parameters.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            map_x: quantize(self.map_x),
            map_y: quantize(self.map_y),
            randomness: quantize(self.randomness),
            density: self.density.map(quantize),
            mode: self.mode,
            accent_alt: self.accent_alt,
            euclidean_length: self.euclidean_length.map(quantize),
        }
    }

    /// Overwrite `cache` with a freshly generated bar and the fingerprint that produced it.
    pub fn generate_bar(&mut self, cache: &mut BarCache) {
        let fingerprint = self.fingerprint();
        let steps = match PatternTable::for_mode(self.mode) {
            Some(table) => self.density_map_bar(&table, &fingerprint),
            None => self.euclidean_bar(),
        };
        cache.commit(steps, fingerprint);
    }

    fn density_map_bar(&mut self, table: &PatternTable, fp: &Fingerprint) -> BarSteps {
        let mut steps = [StepData::default(); NUM_STEPS];
        for (step, data) in steps.iter_mut().enumerate() {
            for channel in 0..NUM_CHANNELS {
                let mut level = table.level(step, channel, fp.map_x, fp.map_y);
                if fp.randomness > 0 {
                    let roll: u8 = self.rng.random();
                    let offset = (roll as u16 * fp.randomness as u16) >> 8;
                    level = level.saturating_add(offset as u8);
                }
                // Density lowers the bar a level has to clear.
                let threshold = 255 - fp.density[channel];
                if level > threshold {
                    data.trigger[channel] = true;
                    data.accent[channel] = level > ACCENT_LEVEL;
                }
            }
        }
        steps
    }

    fn euclidean_bar(&self) -> BarSteps {
        let mut steps = [StepData::default(); NUM_STEPS];
        for channel in 0..NUM_CHANNELS {
            let onsets = euclidean_bar(onset_count(self.euclidean_length[channel]));
            for (step, (data, onset)) in steps.iter_mut().zip(onsets).enumerate() {
                data.trigger[channel] = onset;
                data.accent[channel] = onset && step % ACCENT_SPACING == 0;
            }
        }
        steps
    }
}
