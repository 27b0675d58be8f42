use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jersey_track::replay::{self, ReplayStep};
use jersey_track::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "jersey-track", version, about = "Jersey-number tracking tools")]
struct Cli {
    /// Log debug output (overridden by JERSEY_TRACK_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the default pipeline config, or write it to a file.
    DefaultConfig {
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Run recorded per-frame detections through the tracker.
    Replay {
        #[arg(long, value_name = "PATH")]
        input: PathBuf,
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Write tracked players per frame here instead of stdout.
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::DefaultConfig { out } => {
            let cfg = PipelineConfig::default();
            match out {
                Some(path) => {
                    cfg.write_json(&path)?;
                    log::info!("wrote default config to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&cfg)?),
            }
        }
        Command::Replay { input, config, out } => {
            let cfg = match config {
                Some(path) => PipelineConfig::load_json(path)?,
                None => PipelineConfig::default(),
            };
            let frames = replay::load_frames(&input)?;
            log::info!("replaying {} frames from {}", frames.len(), input.display());
            let steps = replay::replay(frames, &cfg.tracker);
            summarize(&steps);
            match out {
                Some(path) => replay::write_steps(&steps, path)?,
                None => println!("{}", serde_json::to_string_pretty(&steps)?),
            }
        }
    }
    Ok(())
}

fn summarize(steps: &[ReplayStep]) {
    let mut ids: Vec<_> = steps
        .iter()
        .flat_map(|s| s.players.iter().map(|p| p.id))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    log::info!("{} distinct players over {} frames", ids.len(), steps.len());
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: bool) {
    use log::LevelFilter;

    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(err) = jersey_track::core::init_from_env(default) {
        eprintln!("logger already installed: {err}");
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: bool) {
    jersey_track::core::init_tracing(false);
}
