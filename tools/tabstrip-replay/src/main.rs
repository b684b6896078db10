//! Replay harness for the tab strip model.
//!
//! Provides commands for:
//! - Replaying a JSON script against a fresh strip
//! - Checking that a script parses
//! - Printing the effective configuration
//!
//! ## Usage
//!
//! ```bash
//! # Replay a script and print the final strip as JSON
//! tabstrip-replay run scripts/links.json
//!
//! # Use a config file, include every observer event, write to a file
//! tabstrip-replay --config tabstrip.json run scripts/links.json --events --output report.json
//!
//! # Print the configuration a run would use
//! tabstrip-replay --config tabstrip.json config
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tabstrip_core::{init_logging, LogFormat, TabStripConfig};

mod replay;
mod script;

use script::Script;

#[derive(Parser)]
#[command(name = "tabstrip-replay")]
#[command(about = "Replay scripted tab strip sessions")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,

    /// Log at debug level, including every observer event
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script and print a JSON report
    Run {
        /// Script to replay
        script: PathBuf,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include observer events in the report
        #[arg(long)]
        events: bool,
    },

    /// Parse a script without running it
    Check {
        /// Script to check
        script: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TabStripConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TabStripConfig::default(),
    };

    let mut log_config = config.logging.to_log_config()?;
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(format.into());
    }
    if cli.verbose {
        log_config.level = tracing::Level::DEBUG;
    }
    init_logging(log_config);

    match cli.command {
        Commands::Run {
            script,
            output,
            events,
        } => {
            let loaded = Script::load(&script)
                .with_context(|| format!("failed to load script {}", script.display()))?;
            let report = replay::run(&loaded, &config, events)
                .with_context(|| format!("replay of {} failed", script.display()))?;
            let json = serde_json::to_string_pretty(&report)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    tracing::info!("Report written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Check { script } => {
            let loaded = Script::load(&script)
                .with_context(|| format!("failed to load script {}", script.display()))?;
            println!("{}: {} steps", script.display(), loaded.steps.len());
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
