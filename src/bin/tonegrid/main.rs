//! tonegrid - terminal step sequencer
//!
//! Run with: cargo run -- [--preset FILE] [--samples DIR]

mod app;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::Tonegrid;
use tonegrid::{session::SessionConfig, synth::SampleBank};

#[derive(Parser, Debug)]
#[command(name = "tonegrid", version, about = "Terminal step sequencer and synthesizer")]
struct Cli {
    /// Preset JSON to load at startup
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Directory of WAV files to offer as sampled sounds
    #[arg(short, long)]
    samples: Option<PathBuf>,

    /// Where to write logs (the terminal belongs to the UI)
    #[arg(long, default_value = "tonegrid.log")]
    log: PathBuf,

    /// Starting tempo in BPM (60-200)
    #[arg(short, long, default_value_t = 120)]
    bpm: i64,

    /// Bars per pattern (1-4)
    #[arg(long, default_value_t = 1)]
    bars: usize,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    let mut bank = SampleBank::new();
    if let Some(dir) = &cli.samples {
        let loaded = bank
            .load_dir(dir)
            .wrap_err_with(|| format!("failed to read samples from {}", dir.display()))?;
        tracing::info!(loaded, dir = %dir.display(), "samples loaded");
    }

    let preset = cli
        .preset
        .as_deref()
        .map(|path| {
            std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read preset {}", path.display()))
        })
        .transpose()?;

    Tonegrid::new(SessionConfig::default().bpm(cli.bpm).bars(cli.bars), bank)
        .preset(preset)
        .run()
}

fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
