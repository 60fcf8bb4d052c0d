mod args;
mod render;

use beatmap_core::config::Config;
use beatmap_core::persistence::{load_preset, save_preset};
use beatmap_core::sequencer::{Knobs, Sequencer};
use beatmap_types::NUM_CHANNELS;

use args::{parse_args, resolve_render_settings, RenderArgs, USAGE};
use render::{format_bar, render, RenderError, RenderPlan, WavOut, CHANNEL_NAMES};

fn init_logging(verbose: bool) {
    use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    if let Err(e) = TermLogger::init(
        log_level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("logger already initialized: {}", e);
    }

    log::info!("beatmap-render starting (log level: {:?})", log_level);
}

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}\n\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };
    if args.help {
        println!("{}", USAGE);
        return;
    }
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &RenderArgs) -> Result<(), RenderError> {
    let config = Config::load();
    let mut engine = config.engine_settings();
    if args.seed.is_some() {
        engine.seed = args.seed;
    }
    let settings = resolve_render_settings(args, &config.render_settings());
    let (sample_rate, bpm, bars) = (settings.sample_rate, settings.bpm, settings.bars);

    let seed = engine.resolve_seed();
    let mut seq = Sequencer::new(&engine, sample_rate as f32, seed);
    seq.apply_defaults(&config.defaults());
    if let Some(path) = &args.preset {
        seq.apply_preset(&load_preset(path)?);
    }
    if let Some(mode) = args.mode {
        seq.set_mode(mode);
    }
    if let Some(mode) = args.trigger_mode {
        seq.set_trigger_output_mode(mode);
    }
    if let Some(mode) = args.accent_mode {
        seq.set_accent_output_mode(mode);
    }
    seq.set_frozen(args.freeze);

    let fallback = Knobs::default();
    let knobs = Knobs {
        map_x: args.map_x.unwrap_or(fallback.map_x),
        map_y: args.map_y.unwrap_or(fallback.map_y),
        chaos: args.chaos.unwrap_or(fallback.chaos),
        density: args.density.unwrap_or(fallback.density),
        mode: None,
    };
    let plan = RenderPlan {
        sample_rate,
        bpm,
        bars,
        full_scale_volts: engine.full_scale_volts,
        knobs,
    };
    let result = match &args.out {
        Some(path) => {
            let mut wav = WavOut::create(path, sample_rate)?;
            let result = render(&mut seq, &plan, Some(&mut wav))?;
            let frames = wav.finalize()?;
            log::info!(target: "beatmap::render", "wrote {} frames to {}", frames, path.display());
            result
        }
        None => render(&mut seq, &plan, None)?,
    };
    let last_reason = result.last_regen_reason.map(|r| r.name());
    if let Some(path) = &args.save_preset {
        save_preset(path, &seq.preset_state())?;
    }

    if args.grid {
        for (i, bar) in result.bars.iter().enumerate() {
            println!("bar {}", i + 1);
            print!("{}", format_bar(bar));
        }
    }
    if args.json {
        let summary = serde_json::json!({
            "seed": seed,
            "sampleRate": sample_rate,
            "bpm": bpm,
            "sequencerMode": seq.sequencer_mode().name(),
            "triggerOutputMode": seq.trigger_output_mode().name(),
            "accOutputMode": seq.accent_output_mode().name(),
            "regenerations": result.regenerations,
            "lastRegenReason": last_reason,
            "edges": result.edges,
            "bars": result.bars,
        });
        println!("{}", summary);
    } else {
        println!(
            "{} bars, {} mode, seed {}, {} regenerations (last: {})",
            bars,
            seq.sequencer_mode().name(),
            seed,
            result.regenerations,
            last_reason.unwrap_or("none")
        );
        for channel in 0..NUM_CHANNELS {
            println!(
                "  {} {:>4} triggers {:>4} accents",
                CHANNEL_NAMES[channel],
                result.edges[channel],
                result.edges[NUM_CHANNELS + channel]
            );
        }
    }
    Ok(())
}
