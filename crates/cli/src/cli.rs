//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// loadtel - telemetry aggregation for distributed load tests
#[derive(Parser, Debug)]
#[command(
    name = "loadtel",
    author,
    version,
    about = "Load-test telemetry aggregation pipeline",
    long_about = "Collects one event per request on every worker, batches them locally,\n\
                  relays the batches to a single coordinator and writes them to a CSV log.\n\n\
                  `run` simulates a distributed test in one process."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOADTEL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOADTEL_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate a distributed run in-process
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "LOADTEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of producer processes
    #[arg(short, long, default_value = "4", env = "LOADTEL_WORKERS")]
    pub workers: usize,

    /// Requests issued by each producer
    #[arg(short, long, default_value = "12", env = "LOADTEL_REQUESTS")]
    pub requests: u64,

    /// Requests issued by the coordinator itself
    #[arg(long, default_value = "3")]
    pub coordinator_requests: u64,

    /// Override the sink path from configuration
    #[arg(short, long, env = "LOADTEL_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Every n-th mock request fails with HTTP 500
    #[arg(long)]
    pub failure_every: Option<u64>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOADTEL_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "loadtel.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "loadtel.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
