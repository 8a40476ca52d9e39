//! Command-line front end: write a fractal MIDI file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fractal_midi::{ExportConfig, FileAssembler, PitchPolicy};

#[derive(Parser)]
#[command(name = "fractal_midi")]
#[command(about = "Generate a two-track MIDI file from a recursive fractal melody")]
#[command(version)]
struct Cli {
    /// TOML config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output .mid file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tempo in beats per minute
    #[arg(long)]
    bpm: Option<f64>,

    /// Recursion depth (0-10)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Starting MIDI note (0-127)
    #[arg(short, long, allow_negative_numbers = true)]
    pitch: Option<i32>,

    /// Ticks per quarter note (8-32767)
    #[arg(long)]
    ppqn: Option<u16>,

    /// What to do when the melody drifts outside 0-127
    #[arg(long, value_enum)]
    pitch_policy: Option<PolicyArg>,

    /// Fail if any track body would exceed this many bytes
    #[arg(long)]
    max_track_bytes: Option<usize>,

    /// Omit track-name meta-events
    #[arg(long)]
    no_track_names: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Wrap,
    Clamp,
    Reject,
}

impl From<PolicyArg> for PitchPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Wrap   => PitchPolicy::Wrap,
            PolicyArg::Clamp  => PitchPolicy::Clamp,
            PolicyArg::Reject => PitchPolicy::Reject,
        }
    }
}

impl Cli {
    fn into_config(self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load(path)?,
            None => ExportConfig::default(),
        };
        if let Some(output) = self.output { config.output = output; }
        if let Some(bpm) = self.bpm { config.tempo_bpm = bpm; }
        if let Some(depth) = self.depth { config.depth = depth; }
        if let Some(pitch) = self.pitch { config.base_pitch = pitch; }
        if let Some(ppqn) = self.ppqn { config.ppqn = ppqn; }
        if let Some(policy) = self.pitch_policy { config.pitch_policy = policy.into(); }
        if let Some(limit) = self.max_track_bytes { config.max_track_bytes = Some(limit); }
        if self.no_track_names { config.track_names = false; }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let config = cli.into_config()?;
    tracing::info!(
        "depth {} from note {} at {} BPM, {} tracks, pitch policy {}",
        config.depth,
        config.base_pitch,
        config.tempo_bpm,
        config.tracks.len(),
        config.pitch_policy.name()
    );

    let assembler = FileAssembler::new(config)?;
    let path = assembler
        .export()
        .with_context(|| format!("failed to export {:?}", assembler.config().output))?;
    tracing::info!("Done! {:?}", path);

    Ok(())
}
