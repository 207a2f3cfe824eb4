use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::ConfigLoaderOptions;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "presence-daemon")]
#[command(about = "Watch for nearby Bluetooth devices and react when they come and go")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the TOML configuration file (defaults to ./presence.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to a .env file to load before reading the environment
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Pause between scan cycles, e.g. 30s or 2m (overrides config)
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Path to the hcitool binary (overrides config, defaults to PATH lookup)
    #[arg(long, global = true)]
    pub hcitool: Option<PathBuf>,

    /// Additional device identifier to watch with log output only
    #[arg(long = "device", global = true, value_name = "ID")]
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Copy, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Scan repeatedly until interrupted (default)
    Watch,
    /// Run a single scan cycle and exit
    Scan,
    /// Validate the configuration and print the watched devices
    CheckConfig,
}

impl Cli {
    pub fn selected_command(&self) -> Command {
        self.command.unwrap_or(Command::Watch)
    }

    pub fn loader_options(&self) -> ConfigLoaderOptions {
        ConfigLoaderOptions {
            config_path: self.config.clone(),
            env_file: self.env_file.clone(),
            interval: self.interval,
            hcitool: self.hcitool.clone(),
            devices: self.devices.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_watch() {
        let cli = Cli::try_parse_from(["presence-daemon"]).expect("parse");
        assert_eq!(cli.selected_command(), Command::Watch);
    }

    #[test]
    fn flags_map_to_loader_options() {
        let cli = Cli::try_parse_from([
            "presence-daemon",
            "scan",
            "--interval",
            "1m 30s",
            "--device",
            "AA:BB:CC:DD:EE:FF",
            "--device",
            "11:22:33:44:55:66",
        ])
        .expect("parse");

        assert_eq!(cli.selected_command(), Command::Scan);
        let options = cli.loader_options();
        assert_eq!(options.interval, Some(Duration::from_secs(90)));
        assert_eq!(options.devices.len(), 2);
        assert!(options.config_path.is_none());
    }

    #[test]
    fn malformed_interval_is_rejected() {
        assert!(Cli::try_parse_from(["presence-daemon", "--interval", "soon"]).is_err());
    }
}
