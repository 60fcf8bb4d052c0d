//! Fixed-duration pulse timer counted in samples.

#[derive(Debug, Clone)]
pub struct Oneshot {
    duration_secs: f32,
    duration_samples: u32,
    remaining: u32,
    high: bool,
}

impl Oneshot {
    pub fn new(duration_secs: f32, sample_rate: f32) -> Self {
        let duration_secs = duration_secs.max(0.0);
        Self {
            duration_secs,
            duration_samples: samples_for(duration_secs, sample_rate),
            remaining: 0,
            high: false,
        }
    }

    /// Retime the pulse. An in-flight pulse keeps its remaining count.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.duration_samples = samples_for(self.duration_secs, sample_rate);
    }

    /// (Re)start the pulse from its full duration.
    pub fn trigger(&mut self) {
        self.remaining = self.duration_samples;
    }

    /// Advance one sample; the output is high while samples remain.
    pub fn process(&mut self) {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.high = true;
        } else {
            self.high = false;
        }
    }

    /// Output state as of the last `process` call.
    pub fn state(&self) -> bool {
        self.high
    }

    pub fn reset(&mut self) {
        self.remaining = 0;
        self.high = false;
    }
}

/// At least one sample, so a pulse is never swallowed at low sample rates.
fn samples_for(duration_secs: f32, sample_rate: f32) -> u32 {
    let samples = (duration_secs * sample_rate.max(0.0)).round();
    if samples.is_finite() {
        (samples as u32).max(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high_samples(pulse: &mut Oneshot, max: usize) -> usize {
        let mut count = 0;
        for _ in 0..max {
            pulse.process();
            if pulse.state() {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn pulse_lasts_duration() {
        let mut pulse = Oneshot::new(0.001, 48_000.0);
        pulse.process();
        assert!(!pulse.state());
        pulse.trigger();
        assert_eq!(high_samples(&mut pulse, 200), 48);
        assert!(!pulse.state());
    }

    #[test]
    fn retrigger_restarts() {
        let mut pulse = Oneshot::new(0.001, 10_000.0);
        pulse.trigger();
        high_samples(&mut pulse, 5);
        pulse.trigger();
        assert_eq!(high_samples(&mut pulse, 100), 10);
    }

    #[test]
    fn minimum_one_sample() {
        let mut pulse = Oneshot::new(0.000_01, 1_000.0);
        pulse.trigger();
        assert_eq!(high_samples(&mut pulse, 10), 1);

        let mut negative = Oneshot::new(-1.0, 48_000.0);
        negative.trigger();
        assert_eq!(high_samples(&mut negative, 10), 1);
    }

    #[test]
    fn sample_rate_change_retimes() {
        let mut pulse = Oneshot::new(0.1, 1_000.0);
        pulse.trigger();
        assert_eq!(high_samples(&mut pulse, 500), 100);
        pulse.set_sample_rate(2_000.0);
        pulse.trigger();
        assert_eq!(high_samples(&mut pulse, 500), 200);
    }

    #[test]
    fn reset_drops_pulse() {
        let mut pulse = Oneshot::new(0.01, 1_000.0);
        pulse.trigger();
        pulse.process();
        assert!(pulse.state());
        pulse.reset();
        assert!(!pulse.state());
        pulse.process();
        assert!(!pulse.state());
    }
}
