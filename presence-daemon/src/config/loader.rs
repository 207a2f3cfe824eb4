use once_cell::sync::Lazy;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use super::{
    Config, ConfigMetadata, ConfigWarnings, DEFAULT_INTERVAL, DeviceConfig,
    sources::{EnvConfig, FileConfig, FileDeviceConfig},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("presence.toml"),
        PathBuf::from("config/presence.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub interval: Option<Duration>,
    pub hcitool: Option<PathBuf>,
    pub devices: Vec<String>,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("config file {} does not exist", .path.display())]
    MissingConfig { path: PathBuf },
    #[error("invalid interval `{value}`: {source}")]
    InvalidInterval {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("scan interval must be greater than zero")]
    ZeroInterval,
    #[error("failed to load .env file: {0}")]
    Env(#[from] dotenvy::Error),
    #[error("no devices configured; add [[device]] entries or pass --device")]
    NoDevices,
    #[error("device entry has an empty identifier")]
    EmptyIdentifier,
    #[error("device {identifier} has an empty {hook} command")]
    EmptyCommand {
        identifier: String,
        hook: &'static str,
    },
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Load `.env`, then the process environment, then the config file.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Resolve against an already gathered environment. Does not touch
    /// `.env` or the process environment.
    pub fn load_with_env(&self, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        self.compose_config(file_config, env, config_path)
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path.clone(),
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "No presence.toml detected; using command line devices only",
                "Create presence.toml or set PRESENCE_CONFIG to watch devices with hooks",
            );
        }

        let FileConfig {
            interval: file_interval,
            hcitool: file_hcitool,
            devices: file_devices,
        } = file_config.unwrap_or_default();

        let interval = match self.options.interval {
            Some(interval) => interval,
            None => match env.interval.or(file_interval) {
                Some(raw) => parse_interval(&raw)?,
                None => DEFAULT_INTERVAL,
            },
        };
        if interval.is_zero() {
            return Err(ConfigLoadError::ZeroInterval);
        }

        let hcitool = self.options.hcitool.clone().or(env.hcitool).or(file_hcitool);

        let mut devices = file_devices
            .into_iter()
            .map(device_from_file)
            .collect::<Result<Vec<_>, _>>()?;
        for identifier in &self.options.devices {
            let identifier = identifier.trim();
            if identifier.is_empty() {
                return Err(ConfigLoadError::EmptyIdentifier);
            }
            devices.push(DeviceConfig::log_only(identifier));
        }

        if devices.is_empty() {
            return Err(ConfigLoadError::NoDevices);
        }

        let mut seen = HashSet::new();
        for device in &devices {
            if !seen.insert(device.identifier.as_str()) {
                warnings.push(format!(
                    "device {} is listed more than once; its reactions are combined",
                    device.identifier
                ));
            }
        }

        let config = Config {
            interval,
            hcitool,
            devices,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded: false,
            },
        };

        Ok(ConfigLoad { config, warnings })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_interval(raw: &str) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw.trim()).map_err(|source| ConfigLoadError::InvalidInterval {
        value: raw.to_string(),
        source,
    })
}

fn device_from_file(device: FileDeviceConfig) -> Result<DeviceConfig, ConfigLoadError> {
    let identifier = device.identifier.trim().to_string();
    if identifier.is_empty() {
        return Err(ConfigLoadError::EmptyIdentifier);
    }

    for (hook, command) in [("on_present", &device.on_present), ("on_absent", &device.on_absent)] {
        if let Some(argv) = command
            && argv.first().is_none_or(|program| program.trim().is_empty())
        {
            return Err(ConfigLoadError::EmptyCommand {
                identifier: identifier.clone(),
                hook,
            });
        }
    }

    Ok(DeviceConfig {
        identifier,
        label: device.label,
        log: device.log,
        on_present: device.on_present,
        on_absent: device.on_absent,
    })
}
