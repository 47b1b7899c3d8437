use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{common::ConfigError, configs::*};

const CONFIG_PATHS: [&str; 2] = ["config.toml", "config.default.toml"];

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub room: RoomConfig,
    pub logging: Option<LoggingConfig>,
    /// File the configuration was read from, `None` for built-in defaults.
    #[serde(skip)]
    pub source: Option<String>,
}

impl Config {
    /// Reads the first existing file of `config.toml` / `config.default.toml`,
    /// falling back to defaults when neither exists.
    pub fn load() -> Result<Self, ConfigError> {
        match CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        let mut config: Config = toml::from_str(&config_str).map_err(|source| ConfigError::Parse {
            path: display.clone(),
            source,
        })?;
        config.validate()?;
        config.source = Some(display);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let room = &self.room;
        if !(room.skip_ratio > 0.0 && room.skip_ratio <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "room.skip_ratio",
                reason: format!("{} is not within (0, 1]", room.skip_ratio),
            });
        }
        if room.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "room.tick_interval_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if room.default_duration_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "room.default_duration_secs",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
