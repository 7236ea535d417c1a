use crate::parsers::services::ConnectionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub deadlines: DeadlineConfig,
    #[serde(default = "default_arcstat_legacy_path")]
    pub arcstat_legacy_path: String,
    #[serde(default = "default_temperature_filter")]
    pub temperature_filter: String,
    #[serde(default)]
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeadlineConfig {
    /// Budget for every probe not listed under `short`, including the
    /// one-second traffic samplers.
    #[serde(default = "default_long_deadline", with = "duration_text")]
    pub long: Duration,
    /// Budget for the NFS and iSCSI connection listings.
    #[serde(default = "default_short_deadline", with = "duration_text")]
    pub short: Duration,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServicesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfs_policy: Option<ConnectionPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscsi_policy: Option<ConnectionPolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deadlines: DeadlineConfig::default(),
            arcstat_legacy_path: default_arcstat_legacy_path(),
            temperature_filter: default_temperature_filter(),
            services: ServicesConfig::default(),
        }
    }
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            long: default_long_deadline(),
            short: default_short_deadline(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadlines.long.is_zero() {
            return Err(ConfigError::Validation(
                "deadlines.long must be > 0".to_string(),
            ));
        }
        if self.deadlines.short.is_zero() {
            return Err(ConfigError::Validation(
                "deadlines.short must be > 0".to_string(),
            ));
        }
        if self.deadlines.short > self.deadlines.long {
            return Err(ConfigError::Validation(format!(
                "deadlines.short ({}) must not exceed deadlines.long ({})",
                humantime::format_duration(self.deadlines.short),
                humantime::format_duration(self.deadlines.long)
            )));
        }
        if self.arcstat_legacy_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "arcstat_legacy_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn default_arcstat_legacy_path() -> String {
    "/usr/local/bin/arcstat.py".to_string()
}

fn default_temperature_filter() -> String {
    "temperature".to_string()
}

const fn default_long_deadline() -> Duration {
    Duration::from_millis(3000)
}

const fn default_short_deadline() -> Duration {
    Duration::from_millis(1100)
}

/// Durations written the way humans do: `3s`, `1100ms`, `1s 500ms`.
mod duration_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
