//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::TelemetryConfig;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Simulation, SimulationConfig};

/// Execute the `run` command
pub async fn run_simulation(args: &RunArgs) -> Result<()> {
    let simulation_config = build_config(args)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!(port = args.metrics_port, "Metrics endpoint available");
    }

    info!(
        workers = simulation_config.workers,
        requests = simulation_config.requests_per_worker,
        threshold = simulation_config.telemetry.batch_threshold,
        wire_format = ?simulation_config.telemetry.wire_format,
        sink = %simulation_config.telemetry.sink.path.display(),
        "Starting simulated run"
    );

    let stats = Simulation::new(simulation_config)
        .run()
        .await
        .context("Simulated run failed")?;

    stats.print_summary();
    info!("loadtel finished");
    Ok(())
}

/// Load configuration and apply CLI overrides
fn build_config(args: &RunArgs) -> Result<SimulationConfig> {
    let mut telemetry = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using defaults");
            TelemetryConfig::default()
        }
    };

    if let Some(ref output) = args.output {
        info!(output = %output.display(), "Overriding sink path from CLI");
        telemetry.sink.path = output.clone();
        config_loader::ConfigLoader::validate(&telemetry)
            .context("Invalid --output override")?;
    }

    if args.failure_every == Some(0) {
        return Err(CliError::invalid_args("--failure-every must be >= 1").into());
    }

    Ok(SimulationConfig {
        workers: args.workers,
        requests_per_worker: args.requests,
        coordinator_requests: args.coordinator_requests,
        failure_every: args.failure_every,
        ..SimulationConfig::new(telemetry)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            workers: 2,
            requests: 7,
            coordinator_requests: 1,
            output: None,
            failure_every: None,
            metrics_port: 0,
        }
    }

    #[test]
    fn test_build_config_defaults() {
        let config = build_config(&args()).unwrap();
        assert_eq!(config.telemetry.batch_threshold, 5);
        assert_eq!(config.workers, 2);
        assert_eq!(config.requests_per_worker, 7);
    }

    #[test]
    fn test_build_config_output_override() {
        let mut run_args = args();
        run_args.output = Some(PathBuf::from("out/run.csv"));
        let config = build_config(&run_args).unwrap();
        assert_eq!(config.telemetry.sink.path, PathBuf::from("out/run.csv"));
    }

    #[test]
    fn test_build_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadtel.toml");
        fs::write(&path, "batch_threshold = 10\nwire_format = \"json\"\n").unwrap();

        let mut run_args = args();
        run_args.config = Some(path);
        let config = build_config(&run_args).unwrap();
        assert_eq!(config.telemetry.batch_threshold, 10);
    }

    #[test]
    fn test_build_config_missing_file() {
        let mut run_args = args();
        run_args.config = Some(PathBuf::from("/nonexistent/loadtel.toml"));
        let err = build_config(&run_args).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_build_config_rejects_zero_failure_every() {
        let mut run_args = args();
        run_args.failure_every = Some(0);
        assert!(build_config(&run_args).is_err());
    }
}
