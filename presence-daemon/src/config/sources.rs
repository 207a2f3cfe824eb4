use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_CONFIG_PATH: &str = "PRESENCE_CONFIG";
pub const ENV_INTERVAL: &str = "PRESENCE_INTERVAL";
pub const ENV_HCITOOL: &str = "PRESENCE_HCITOOL";

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    /// Pause between scan cycles, humantime syntax (`30s`, `2m`).
    pub interval: Option<String>,
    pub hcitool: Option<PathBuf>,
    #[serde(default, rename = "device")]
    pub devices: Vec<FileDeviceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDeviceConfig {
    pub identifier: String,
    pub label: Option<String>,
    #[serde(default = "default_log")]
    pub log: bool,
    pub on_present: Option<Vec<String>>,
    pub on_absent: Option<Vec<String>>,
}

fn default_log() -> bool {
    true
}

/// Settings read from the process environment.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub interval: Option<String>,
    pub hcitool: Option<PathBuf>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            config_path: get(ENV_CONFIG_PATH).map(PathBuf::from),
            interval: get(ENV_INTERVAL),
            hcitool: get(ENV_HCITOOL).map(PathBuf::from),
        }
    }
}
