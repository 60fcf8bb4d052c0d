//! Offline render: a synthetic phasor drives the sequencer for a number of bars.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use beatmap_core::persistence::PresetError;
use beatmap_core::regeneration::RegenReason;
use beatmap_core::sequencer::{CvInputs, Knobs, Outputs, Sequencer, OUTPUT_HIGH_VOLTS};
use beatmap_types::{BarSteps, NUM_CHANNELS, NUM_OUTPUTS, NUM_STEPS};

/// Steps per beat; a bar of 32 steps is eight beats.
const STEPS_PER_BEAT: f64 = 4.0;

pub const CHANNEL_NAMES: [&str; NUM_CHANNELS] = ["BD", "SD", "HH"];

/// Error type for the render binary.
#[derive(Debug)]
pub enum RenderError {
    Io(std::io::Error),
    Wav(hound::Error),
    Preset(PresetError),
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<hound::Error> for RenderError {
    fn from(e: hound::Error) -> Self {
        Self::Wav(e)
    }
}

impl From<PresetError> for RenderError {
    fn from(e: PresetError) -> Self {
        Self::Preset(e)
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Wav(e) => write!(f, "WAV error: {}", e),
            Self::Preset(e) => write!(f, "preset error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub sample_rate: u32,
    pub bpm: f32,
    pub bars: u32,
    pub full_scale_volts: f32,
    pub knobs: Knobs,
}

impl RenderPlan {
    pub fn samples_per_bar(&self) -> usize {
        let seconds_per_step = 60.0 / (self.bpm as f64 * STEPS_PER_BEAT);
        let samples = seconds_per_step * NUM_STEPS as f64 * self.sample_rate as f64;
        (samples.round() as usize).max(NUM_STEPS)
    }
}

#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Grid in effect for each rendered bar.
    pub bars: Vec<BarSteps>,
    /// Rising edges per output.
    pub edges: [usize; NUM_OUTPUTS],
    pub regenerations: u64,
    pub last_regen_reason: Option<RegenReason>,
}

/// Six-channel 32-bit float WAV, written frame by frame as the render runs.
pub struct WavOut {
    writer: hound::WavWriter<BufWriter<File>>,
    frames: u64,
}

impl WavOut {
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self, RenderError> {
        let spec = hound::WavSpec {
            channels: NUM_OUTPUTS as u16,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        Ok(Self {
            writer: hound::WavWriter::create(path, spec)?,
            frames: 0,
        })
    }

    pub fn write_frame(&mut self, frame: &[f32; NUM_OUTPUTS]) -> Result<(), RenderError> {
        for &sample in frame {
            self.writer.write_sample(sample)?;
        }
        self.frames += 1;
        Ok(())
    }

    /// Patch the header and flush. Returns the number of frames written.
    pub fn finalize(self) -> Result<u64, RenderError> {
        self.writer.finalize()?;
        Ok(self.frames)
    }
}

/// Drive `seq` for `plan.bars` bars. Frames go straight to `wav` when one is
/// given; nothing is buffered per sample.
pub fn render(
    seq: &mut Sequencer,
    plan: &RenderPlan,
    mut wav: Option<&mut WavOut>,
) -> Result<RenderResult, RenderError> {
    let per_bar = plan.samples_per_bar();
    let total = per_bar as u64 * plan.bars as u64;
    let mut bars = Vec::with_capacity(plan.bars as usize);
    let mut edges = [0usize; NUM_OUTPUTS];
    let mut previous = [0.0f32; NUM_OUTPUTS];

    for sample in 0..total {
        let offset = (sample % per_bar as u64) as usize;
        let phase = offset as f32 / per_bar as f32;
        let cv = CvInputs {
            phasor: phase * plan.full_scale_volts,
            ..Default::default()
        };
        let out: Outputs = seq.process(&plan.knobs, &cv);
        if offset == 0 {
            bars.push(*seq.bar_cache().steps());
        }

        let channels = out.channels();
        for (i, &v) in channels.iter().enumerate() {
            if v > 0.0 && previous[i] == 0.0 {
                edges[i] += 1;
            }
        }
        previous = channels;
        if let Some(wav) = wav.as_deref_mut() {
            wav.write_frame(&channels.map(|v| v / OUTPUT_HIGH_VOLTS))?;
        }
    }

    log::debug!(
        target: "beatmap::render",
        "rendered {} samples over {} bars, {} regenerations",
        total, plan.bars, seq.regeneration_count()
    );

    Ok(RenderResult {
        bars,
        edges,
        regenerations: seq.regeneration_count(),
        last_regen_reason: seq.last_regen_reason(),
    })
}

/// One line per channel: `X` accented hit, `x` hit, `.` rest.
pub fn format_bar(bar: &BarSteps) -> String {
    let mut text = String::new();
    for (channel, name) in CHANNEL_NAMES.iter().enumerate() {
        text.push_str(name);
        text.push(' ');
        for (step, data) in bar.iter().enumerate() {
            if step > 0 && step % 8 == 0 {
                text.push('|');
            }
            text.push(if data.is_accented(channel) {
                'X'
            } else if data.trigger[channel] {
                'x'
            } else {
                '.'
            });
        }
        text.push('\n');
    }
    text
}
