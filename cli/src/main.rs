//! chatarchive CLI
//!
//! Turns a directory of WhatsApp-style chat exports into a browseable,
//! incrementally-regenerated static HTML archive.
//!
//! Usage:
//!   chatarchive --input <DIR> --output <DIR>

use anyhow::{Context, Result};
use chatarchive_core::{Config, PipelineError};
use clap::Parser;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// Build a static HTML archive from messenger-style chat exports.
#[derive(Parser)]
#[command(name = "chatarchive")]
#[command(about = "Turn chat exports into a browseable static HTML archive", long_about = None)]
struct Cli {
    /// Directory to scan for chat exports
    #[arg(long)]
    input: PathBuf,

    /// Directory to write the HTML archive and state into
    #[arg(long)]
    output: PathBuf,

    /// Path to a config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv+ trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all logging output, overriding --verbose
    #[arg(short, long)]
    quiet: bool,
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbosity: u8, quiet: bool) {
    let level = if quiet { "error" } else { level_for(verbosity) };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path).context("loading config")?,
        None => Config::load_default().context("loading config")?,
    };

    let verbosity = if cli.verbose > 0 { cli.verbose } else { config.default_verbosity };
    init_logging(verbosity, cli.quiet);

    if !cli.input.is_dir() {
        eprintln!("input directory does not exist or is not a directory: {}", cli.input.display());
        std::process::exit(1);
    }

    let now_timestamp = humantime_now();

    match chatarchive_core::run(&cli.input, &cli.output, &now_timestamp) {
        Ok(()) => Ok(()),
        Err(err @ PipelineError::InputNotFound(_)) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
        Err(err @ PipelineError::OutputUnwritable { .. }) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
        Err(err @ PipelineError::ConfigParse { .. }) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

fn humantime_now() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels_map_as_documented() {
        assert_eq!(level_for(0), "error");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(3), "trace");
        assert_eq!(level_for(9), "trace");
    }
}
