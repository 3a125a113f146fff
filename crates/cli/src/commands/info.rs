//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{SinkKind, TelemetryConfig};
use tracing::info;

use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        // Fully resolved config, defaults included
        let json = config_loader::ConfigLoader::to_json(&config)
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn print_config_info(config: &TelemetryConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                loadtel Telemetry Configuration               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📦 Batching");
    println!("   ├─ Threshold: {} records", config.batch_threshold);
    println!("   └─ Flush on test stop: always");

    println!("\n📡 Control channel");
    println!("   ├─ Topic: {}", config.topic);
    println!("   └─ Wire format: {:?}", config.wire_format);

    println!("\n📤 Sink (coordinator only)");
    match config.sink.kind {
        SinkKind::Csv => {
            println!("   ├─ Kind: CSV");
            println!("   ├─ Path: {}", config.sink.path.display());
            println!(
                "   └─ fsync per append: {}",
                if config.sink.sync_data { "yes" } else { "no" }
            );
        }
        SinkKind::Log => {
            println!("   └─ Kind: log (nothing persisted)");
        }
    }

    println!();
}
