//! Command-line parsing for the render binary.

use std::path::PathBuf;

use beatmap_core::config::{
    parse_accent_output_mode, parse_sequencer_mode, parse_trigger_output_mode, RenderSettings,
};
use beatmap_types::{AccentOutputMode, SequencerMode, TriggerOutputMode, NUM_CHANNELS};

pub const USAGE: &str = "\
usage: beatmap-render [options]

  --bars N              bars to render
  --bpm BPM             tempo (one bar = 32 sixteenths)
  --sample-rate HZ      output sample rate
  --mode NAME           original | henri | euclidean
  --trigger-mode NAME   pulse | gate
  --accent-mode NAME    individual | clock+reset
  --map-x V             pattern map X, 0..1
  --map-y V             pattern map Y, 0..1
  --chaos V             randomness, 0..1
  --density V[,V,V]     channel densities, 0..1
  --freeze              never re-roll chaos on bar wraps
  --seed N              chaos seed
  --preset PATH         load a preset before rendering
  --save-preset PATH    write the resulting preset
  --out PATH            write a 6-channel float WAV (triggers, then accents)
  --grid                print each rendered bar
  --json                print a JSON summary
  -v, --verbose         debug logging
  -h, --help            show this message";

#[derive(Debug, Default, PartialEq)]
pub struct RenderArgs {
    pub bars: Option<u32>,
    pub bpm: Option<f32>,
    pub sample_rate: Option<u32>,
    pub mode: Option<SequencerMode>,
    pub trigger_mode: Option<TriggerOutputMode>,
    pub accent_mode: Option<AccentOutputMode>,
    pub map_x: Option<f32>,
    pub map_y: Option<f32>,
    pub chaos: Option<f32>,
    pub density: Option<[f32; NUM_CHANNELS]>,
    pub freeze: bool,
    pub seed: Option<u64>,
    pub preset: Option<PathBuf>,
    pub save_preset: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub grid: bool,
    pub json: bool,
    pub verbose: bool,
    pub help: bool,
}

/// Parse arguments, excluding the program name.
pub fn parse_args(args: &[String]) -> Result<RenderArgs, String> {
    let mut parsed = RenderArgs::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .map(String::as_str)
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match flag.as_str() {
            "--bars" => parsed.bars = Some(number(flag, value()?)?),
            "--bpm" => parsed.bpm = Some(number(flag, value()?)?),
            "--sample-rate" => parsed.sample_rate = Some(number(flag, value()?)?),
            "--mode" => {
                let name = value()?;
                parsed.mode = Some(
                    parse_sequencer_mode(name).ok_or_else(|| format!("unknown mode {}", name))?,
                );
            }
            "--trigger-mode" => {
                let name = value()?;
                parsed.trigger_mode = Some(
                    parse_trigger_output_mode(name)
                        .ok_or_else(|| format!("unknown trigger mode {}", name))?,
                );
            }
            "--accent-mode" => {
                let name = value()?;
                parsed.accent_mode = Some(
                    parse_accent_output_mode(name)
                        .ok_or_else(|| format!("unknown accent mode {}", name))?,
                );
            }
            "--map-x" => parsed.map_x = Some(number(flag, value()?)?),
            "--map-y" => parsed.map_y = Some(number(flag, value()?)?),
            "--chaos" => parsed.chaos = Some(number(flag, value()?)?),
            "--density" => parsed.density = Some(densities(value()?)?),
            "--freeze" => parsed.freeze = true,
            "--seed" => parsed.seed = Some(number(flag, value()?)?),
            "--preset" => parsed.preset = Some(PathBuf::from(value()?)),
            "--save-preset" => parsed.save_preset = Some(PathBuf::from(value()?)),
            "--out" | "-o" => parsed.out = Some(PathBuf::from(value()?)),
            "--grid" => parsed.grid = true,
            "--json" => parsed.json = true,
            "--verbose" | "-v" => parsed.verbose = true,
            "--help" | "-h" => parsed.help = true,
            other => return Err(format!("unknown argument {}", other)),
        }
    }
    Ok(parsed)
}

/// Command-line overrides over the configured render settings, held to the
/// same ranges as the config file.
pub fn resolve_render_settings(args: &RenderArgs, defaults: &RenderSettings) -> RenderSettings {
    let requested = RenderSettings {
        sample_rate: args.sample_rate.unwrap_or(defaults.sample_rate),
        bpm: args.bpm.unwrap_or(defaults.bpm),
        bars: args.bars.unwrap_or(defaults.bars),
    };
    let settings = requested.clone().clamped();
    if settings != requested {
        log::warn!(
            target: "beatmap::render",
            "render settings {} Hz, {} bpm, {} bars clamped to {} Hz, {} bpm, {} bars",
            requested.sample_rate, requested.bpm, requested.bars,
            settings.sample_rate, settings.bpm, settings.bars
        );
    }
    settings
}

fn number<T: std::str::FromStr>(flag: &str, s: &str) -> Result<T, String> {
    s.parse()
        .map_err(|_| format!("{}: cannot parse {:?}", flag, s))
}

/// One value for all channels, or exactly one per channel.
fn densities(s: &str) -> Result<[f32; NUM_CHANNELS], String> {
    let values: Vec<f32> = s
        .split(',')
        .map(|v| number("--density", v.trim()))
        .collect::<Result<_, _>>()?;
    match values.as_slice() {
        [all] => Ok([*all; NUM_CHANNELS]),
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(format!(
            "--density takes 1 or {} values, got {}",
            NUM_CHANNELS,
            values.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_args() {
        assert_eq!(parse_args(&[]).unwrap(), RenderArgs::default());
    }

    #[test]
    fn test_full_args() {
        let parsed = parse_args(&args(&[
            "--bars", "2", "--bpm", "98.5", "--mode", "euclid", "--trigger-mode", "gate",
            "--accent-mode", "clock+reset", "--map-x", "0.25", "--density", "0.1,0.2,0.3",
            "--seed", "7", "--out", "out.wav", "--grid", "-v", "--freeze",
        ]))
        .unwrap();
        assert_eq!(parsed.bars, Some(2));
        assert_eq!(parsed.bpm, Some(98.5));
        assert_eq!(parsed.mode, Some(SequencerMode::Euclidean));
        assert_eq!(parsed.trigger_mode, Some(TriggerOutputMode::Gate));
        assert_eq!(parsed.accent_mode, Some(AccentOutputMode::ClockReset));
        assert_eq!(parsed.map_x, Some(0.25));
        assert_eq!(parsed.density, Some([0.1, 0.2, 0.3]));
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.out, Some(PathBuf::from("out.wav")));
        assert!(parsed.grid && parsed.verbose && parsed.freeze);
        assert!(!parsed.json);
    }

    #[test]
    fn test_single_density_fills_channels() {
        let parsed = parse_args(&args(&["--density", "0.4"])).unwrap();
        assert_eq!(parsed.density, Some([0.4; NUM_CHANNELS]));
    }

    #[test]
    fn test_overrides_are_clamped() {
        let parsed = parse_args(&args(&["--bpm", "0.001", "--bars", "2", "--sample-rate", "10"]))
            .unwrap();
        let settings = resolve_render_settings(&parsed, &RenderSettings::default());
        assert_eq!(settings.bpm, 1.0);
        assert_eq!(settings.bars, 2);
        assert_eq!(settings.sample_rate, 8_000);

        let parsed = parse_args(&args(&["--bars", "0", "--bpm", "NaN"])).unwrap();
        let settings = resolve_render_settings(&parsed, &RenderSettings::default());
        assert_eq!(settings.bars, 1);
        assert_eq!(settings.bpm, 120.0);
    }

    #[test]
    fn test_missing_overrides_use_defaults() {
        let defaults = RenderSettings {
            sample_rate: 44_100,
            bpm: 98.0,
            bars: 3,
        };
        assert_eq!(resolve_render_settings(&RenderArgs::default(), &defaults), defaults);
    }

    #[test]
    fn test_bad_args() {
        assert!(parse_args(&args(&["--bars"])).is_err());
        assert!(parse_args(&args(&["--bars", "x"])).is_err());
        assert!(parse_args(&args(&["--mode", "polka"])).is_err());
        assert!(parse_args(&args(&["--density", "0.1,0.2"])).is_err());
        assert!(parse_args(&args(&["--what"])).is_err());
    }
}
