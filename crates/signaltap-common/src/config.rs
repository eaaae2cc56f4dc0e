//! ---
//! sigtap_section: "02-shared-runtime"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "TOML configuration for the engine, drivers and logging."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_simulation_seed() -> u64 {
    0x5167_7A90u64
}

fn default_tick_interval() -> Duration {
    Duration::from_millis(1000)
}

fn default_firmware_version() -> String {
    "1.1.0".to_owned()
}

/// Primary configuration object for the SignalTap runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &'static str = "SIGNALTAP_CONFIG";

    /// Load configuration from disk, respecting the `SIGNALTAP_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Parse and validate a single configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

/// Settings consumed when building a simulation engine and its tick driver.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_simulation_seed")]
    pub random_seed: u64,
    #[serde(default = "default_tick_interval", rename = "tick_interval_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub tick_interval: Duration,
    #[serde(default)]
    pub initial_profile: usize,
    /// Optional TOML profile catalog; the built-in demo catalog is used when absent.
    #[serde(default)]
    pub profiles_path: Option<PathBuf>,
    #[serde(default = "default_firmware_version")]
    pub firmware_version: String,
    /// Switch to the next profile after this many completed scenario cycles.
    #[serde(default)]
    pub rotate_after_cycles: Option<u32>,
    #[serde(default)]
    pub start_ota_on_boot: bool,
    #[serde(default)]
    pub exit_after_ticks: Option<u64>,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(anyhow!("simulation tick_interval_ms must be greater than zero"));
        }
        if self.firmware_version.trim().is_empty() {
            return Err(anyhow!("simulation firmware_version must not be empty"));
        }
        if self.rotate_after_cycles == Some(0) {
            return Err(anyhow!("simulation rotate_after_cycles must be at least 1"));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            random_seed: default_simulation_seed(),
            tick_interval: default_tick_interval(),
            initial_profile: 0,
            profiles_path: None,
            firmware_version: default_firmware_version(),
            rotate_after_cycles: None,
            start_ota_on_boot: false,
            exit_after_ticks: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: AppConfig = "".parse().unwrap();
        assert_eq!(config.simulation.tick_interval, Duration::from_secs(1));
        assert_eq!(config.simulation.firmware_version, "1.1.0");
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
        assert!(config.simulation.profiles_path.is_none());
    }

    #[test]
    fn parses_simulation_section() {
        let config: AppConfig = r#"
            [simulation]
            random_seed = 7
            tick_interval_ms = 250
            initial_profile = 2
            rotate_after_cycles = 3
            firmware_version = "2.0.1"

            [logging]
            format = "pretty"
            directory = "logs"
        "#
        .parse()
        .unwrap();
        assert_eq!(config.simulation.random_seed, 7);
        assert_eq!(config.simulation.tick_interval, Duration::from_millis(250));
        assert_eq!(config.simulation.initial_profile, 2);
        assert_eq!(config.simulation.rotate_after_cycles, Some(3));
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.directory, PathBuf::from("logs"));
    }

    #[test]
    fn rejects_zero_tick_interval() {
        let err = "[simulation]\ntick_interval_ms = 0"
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("tick_interval_ms"));
    }

    #[test]
    fn rejects_zero_rotation() {
        assert!("[simulation]\nrotate_after_cycles = 0"
            .parse::<AppConfig>()
            .is_err());
    }
}
