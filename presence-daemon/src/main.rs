use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use presence_daemon::{
    cli::{Cli, Command},
    config::{Config, ConfigLoad, ConfigLoader},
    runner::{build_engine, build_probe, cancel_on_ctrl_c},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,presence_core=info,presence_daemon=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ConfigLoad { config, warnings } = ConfigLoader::with_options(cli.loader_options())
        .load()
        .context("failed to load configuration")?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(message = %warning.message, hint = %hint, "configuration warning"),
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    match cli.selected_command() {
        Command::CheckConfig => {
            print_config(&config);
            Ok(())
        }
        Command::Scan => {
            let presence = engine(&config)?;
            let cancel = cancel_on_ctrl_c();
            let outcome = presence.scan(&cancel).await;
            info!(
                status = ?outcome.status,
                dispatched = outcome.dispatched,
                present = outcome.present,
                absent = outcome.absent(),
                probe_failures = outcome.probe_failures,
                "scan finished"
            );
            Ok(())
        }
        Command::Watch => {
            let presence = engine(&config)?;
            let cancel = cancel_on_ctrl_c();
            info!(
                devices = config.devices.len(),
                interval = %humantime::format_duration(config.interval),
                "watching for devices"
            );
            let cycles = presence.scan_periodically(&cancel, config.interval).await;
            info!(cycles, "presence daemon stopped");
            Ok(())
        }
    }
}

fn engine(config: &Config) -> anyhow::Result<presence_core::Presence> {
    let probe = build_probe(config).context("failed to initialise hcitool probe")?;
    info!(hcitool = %probe.path().display(), "using hcitool probe");
    Ok(build_engine(config, Arc::new(probe)))
}

fn print_config(config: &Config) {
    println!("interval: {}", humantime::format_duration(config.interval));
    match &config.hcitool {
        Some(path) => println!("hcitool: {}", path.display()),
        None => println!("hcitool: <PATH lookup>"),
    }
    for device in &config.devices {
        let mut hooks = Vec::new();
        if device.log {
            hooks.push("log".to_string());
        }
        if let Some(argv) = &device.on_present {
            hooks.push(format!("on_present={}", argv.join(" ")));
        }
        if let Some(argv) = &device.on_absent {
            hooks.push(format!("on_absent={}", argv.join(" ")));
        }
        println!(
            "device {} ({}): {}",
            device.identifier,
            device.display_name(),
            hooks.join(", ")
        );
    }
}
