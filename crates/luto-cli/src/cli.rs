use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bundled demo scenario end to end and print a per-year summary
    Run {
        /// Path to a JSON run configuration. Defaults to a small built-in
        /// snapshot config against the demo provider.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides the config's YR_CAL_TARGET when no config file is given
        #[arg(long, default_value_t = 2030)]
        yr_cal_target: u32,
    },
    /// Inspect the local environment and report common setup issues
    Doctor {
        /// Validate this config file in addition to the environment checks
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
