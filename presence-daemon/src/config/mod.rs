//! Daemon configuration: TOML file, environment and CLI overrides.

pub mod loader;
pub mod sources;

use std::path::PathBuf;
use std::time::Duration;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Fully resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub interval: Duration,
    /// Explicit `hcitool` binary; `None` means search `PATH`.
    pub hcitool: Option<PathBuf>,
    pub devices: Vec<DeviceConfig>,
    pub metadata: ConfigMetadata,
}

/// One watched identifier and the reactions attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub identifier: String,
    pub label: Option<String>,
    pub log: bool,
    pub on_present: Option<Vec<String>>,
    pub on_absent: Option<Vec<String>>,
}

impl DeviceConfig {
    /// Device coming from `--device`: logged, no hooks.
    pub fn log_only(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            label: None,
            log: true,
            on_present: None,
            on_absent: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.identifier)
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint(&mut self, message: impl Into<String>, hint: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
