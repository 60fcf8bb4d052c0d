//! End-to-end playback tests: a synthetic phasor drives the sequencer sample by sample.

use beatmap_core::config::EngineSettings;
use beatmap_core::regeneration::RegenReason;
use beatmap_core::sequencer::{CvInputs, Knobs, Outputs, Sequencer, OUTPUT_HIGH_VOLTS};
use beatmap_core::{SequencerMode, TriggerOutputMode, NUM_CHANNELS};

const SAMPLES_PER_BAR: usize = 3200;
const SAMPLES_PER_STEP: usize = SAMPLES_PER_BAR / 32;

fn sequencer(seed: u64) -> Sequencer {
    Sequencer::new(&EngineSettings::default(), 48_000.0, seed)
}

fn phasor(sample: usize) -> CvInputs {
    let phase = (sample % SAMPLES_PER_BAR) as f32 / SAMPLES_PER_BAR as f32;
    CvInputs {
        phasor: phase * 10.0,
        ..Default::default()
    }
}

fn run_bars(seq: &mut Sequencer, knobs: &Knobs, bars: usize) -> Vec<Outputs> {
    (0..SAMPLES_PER_BAR * bars)
        .map(|i| seq.process(knobs, &phasor(i)))
        .collect()
}

#[test]
fn test_gate_mode_opens_first_half_of_active_step() {
    let mut seq = sequencer(1);
    seq.set_mode(SequencerMode::Euclidean);
    seq.set_trigger_output_mode(TriggerOutputMode::Gate);
    // Seven onsets on channel 0: step 5 fires, step 4 does not.
    let knobs = Knobs {
        map_x: 7.0 / 32.0,
        ..Default::default()
    };
    let out = run_bars(&mut seq, &knobs, 1);

    assert!(seq.bar_cache().step(5).trigger[0]);
    assert!(!seq.bar_cache().step(4).trigger[0]);
    assert_eq!(seq.bar_cache().trigger_count(0), 7);

    let step5 = 5 * SAMPLES_PER_STEP;
    // Skip the samples that sit exactly on a boundary.
    for sample in step5 + 1..step5 + SAMPLES_PER_STEP / 2 {
        assert_eq!(out[sample].trigger[0], OUTPUT_HIGH_VOLTS, "sample {}", sample);
    }
    for sample in step5 + SAMPLES_PER_STEP / 2 + 1..step5 + SAMPLES_PER_STEP {
        assert_eq!(out[sample].trigger[0], 0.0, "sample {}", sample);
    }
    let step4 = 4 * SAMPLES_PER_STEP;
    for sample in step4 + 1..step4 + SAMPLES_PER_STEP - 1 {
        assert_eq!(out[sample].trigger[0], 0.0, "sample {}", sample);
    }
}

#[test]
fn test_gate_mode_follows_cached_grid() {
    let mut seq = sequencer(2);
    seq.set_trigger_output_mode(TriggerOutputMode::Gate);
    let knobs = Knobs {
        map_x: 0.3,
        map_y: 0.6,
        density: [0.7, 0.5, 0.9],
        ..Default::default()
    };
    let out = run_bars(&mut seq, &knobs, 1);
    let cache = seq.bar_cache();
    for step in 0..32 {
        // A sample safely inside the open half of the step.
        let sample = step * SAMPLES_PER_STEP + SAMPLES_PER_STEP / 4;
        for channel in 0..NUM_CHANNELS {
            let expected = if cache.step(step).trigger[channel] {
                OUTPUT_HIGH_VOLTS
            } else {
                0.0
            };
            assert_eq!(out[sample].trigger[channel], expected, "step {} ch {}", step, channel);
            let accent = if cache.step(step).is_accented(channel) {
                OUTPUT_HIGH_VOLTS
            } else {
                0.0
            };
            assert_eq!(out[sample].accent[channel], accent, "step {} ch {}", step, channel);
        }
    }
}

#[test]
fn test_pulse_mode_counts_match_grid() {
    let mut seq = sequencer(3);
    let knobs = Knobs {
        map_x: 0.8,
        map_y: 0.2,
        density: [0.6, 0.6, 0.6],
        ..Default::default()
    };
    let out = run_bars(&mut seq, &knobs, 1);
    for channel in 0..NUM_CHANNELS {
        let rises = out
            .windows(2)
            .filter(|w| w[0].trigger[channel] == 0.0 && w[1].trigger[channel] > 0.0)
            .count()
            + usize::from(out[0].trigger[channel] > 0.0);
        assert_eq!(rises, seq.bar_cache().trigger_count(channel), "channel {}", channel);
    }
}

#[test]
fn test_wrap_regenerates_under_chaos() {
    let mut seq = sequencer(4);
    let knobs = Knobs {
        chaos: 0.5,
        ..Default::default()
    };
    run_bars(&mut seq, &knobs, 1);
    assert_eq!(seq.regeneration_count(), 1);

    // First sample of the second bar wraps the phasor.
    seq.process(&knobs, &phasor(SAMPLES_PER_BAR));
    assert_eq!(seq.regeneration_count(), 2);
    assert_eq!(seq.last_regen_reason(), Some(RegenReason::ChaosWrap));

    // Restarting at phase 0 is not a jump; only the wrap into bar two counts.
    run_bars(&mut seq, &knobs, 2);
    assert_eq!(seq.regeneration_count(), 3);
}

#[test]
fn test_wrap_without_chaos_keeps_bar() {
    let mut seq = sequencer(5);
    run_bars(&mut seq, &Knobs::default(), 3);
    assert_eq!(seq.regeneration_count(), 1);
}

#[test]
fn test_freeze_blocks_wrap_regeneration() {
    let mut seq = sequencer(6);
    seq.set_frozen(true);
    let mut knobs = Knobs {
        chaos: 0.8,
        ..Default::default()
    };
    run_bars(&mut seq, &knobs, 3);
    assert_eq!(seq.regeneration_count(), 1);

    // Parameter changes still regenerate while frozen.
    knobs.map_y = 0.9;
    seq.process(&knobs, &phasor(0));
    assert_eq!(seq.regeneration_count(), 2);
    assert_eq!(seq.last_regen_reason(), Some(RegenReason::ParametersChanged));
}

#[test]
fn test_fingerprint_roundtrip() {
    let base = Knobs {
        map_x: 0.5,
        map_y: 0.5,
        chaos: 0.0,
        density: [0.5; NUM_CHANNELS],
        mode: None,
    };
    let nudge = 2.0 / 255.0;
    let changes: [fn(&mut Knobs, f32); 6] = [
        |k, d| k.map_x += d,
        |k, d| k.map_y += d,
        |k, d| k.chaos += d,
        |k, d| k.density[0] += d,
        |k, d| k.density[1] += d,
        |k, d| k.density[2] += d,
    ];
    for (i, change) in changes.iter().enumerate() {
        let mut seq = sequencer(7);
        seq.process(&base, &phasor(0));
        assert!(!seq.check_bar_regeneration_needed());
        seq.process(&base, &phasor(1));
        assert_eq!(seq.regeneration_count(), 1);

        let mut knobs = base;
        change(&mut knobs, nudge);
        seq.process(&knobs, &phasor(2));
        assert_eq!(seq.regeneration_count(), 2, "parameter {}", i);
        assert_eq!(seq.last_regen_reason(), Some(RegenReason::ParametersChanged));
        assert!(!seq.check_bar_regeneration_needed());
    }
}

#[test]
fn test_mode_change_regenerates() {
    let mut seq = sequencer(8);
    let knobs = Knobs::default();
    seq.process(&knobs, &phasor(0));
    for mode in [SequencerMode::Henri, SequencerMode::Euclidean, SequencerMode::Original] {
        seq.set_mode(mode);
        assert!(seq.check_bar_regeneration_needed());
        seq.process(&knobs, &phasor(1));
        assert_eq!(seq.bar_cache().fingerprint().mode, mode);
        assert_eq!(seq.last_regen_reason(), Some(RegenReason::Invalidated));
    }
}

#[test]
fn test_same_seed_same_chaotic_performance() {
    let knobs = Knobs {
        chaos: 0.7,
        density: [0.4, 0.5, 0.6],
        ..Default::default()
    };
    let mut a = sequencer(99);
    let mut b = sequencer(99);
    let out_a = run_bars(&mut a, &knobs, 3);
    let out_b = run_bars(&mut b, &knobs, 3);
    assert!(out_a == out_b);
}
