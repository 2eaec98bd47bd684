//! Courier CLI configuration
//!
//! Layered loading with the usual priority: CLI flags > explicit config
//! file > `~/.courier/config.toml` > defaults. Every section and field has a
//! default, so a partial file only overrides what it names. Ports are fixed
//! by the backend deployment (3000 for the delivery API, 3001 for the
//! companion service) but stay configurable for lab setups.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use courier_core::Timings;

use crate::error::{CliError, Result};

// ----------------------------------------------------------------------------
// Configuration Sections
// ----------------------------------------------------------------------------

/// Complete configuration for the Courier CLI application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend and companion service addressing
    pub backend: BackendConfig,

    /// Polling cadences and timeouts
    pub timings: Timings,

    /// CLI-specific settings
    pub cli: CliConfig,
}

/// Service ports; the host itself is supplied at sign-in and persisted with
/// the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Delivery backend port
    pub port: u16,

    /// Companion health service port
    pub companion_port: u16,
}

/// CLI-specific configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Enable verbose logging output
    pub verbose: bool,

    /// Prompt string for the interactive loops
    pub prompt: String,

    /// Width of the weekly-earnings histogram bars
    pub bar_width: usize,
}

// ----------------------------------------------------------------------------
// Default Implementations
// ----------------------------------------------------------------------------

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            companion_port: 3001,
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            prompt: "courier> ".to_string(),
            bar_width: 40,
        }
    }
}

// ----------------------------------------------------------------------------
// Configuration Loading Logic
// ----------------------------------------------------------------------------

impl AppConfig {
    /// Load from the default path (`~/.courier/config.toml`), falling back
    /// to defaults when no file exists.
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".courier").join("config.toml"))
    }

    /// Default data directory for the session file
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".courier"))
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<()> {
        if self.backend.port == 0 {
            return Err(CliError::Config(
                "backend port must be greater than 0".to_string(),
            ));
        }
        if self.backend.companion_port == 0 {
            return Err(CliError::Config(
                "companion port must be greater than 0".to_string(),
            ));
        }
        self.timings.validate().map_err(CliError::Config)?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_deployed_ports() {
        let config = AppConfig::default();
        assert_eq!(config.backend.port, 3000);
        assert_eq!(config.backend.companion_port, 3001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_only_overrides_named_fields() {
        let config: AppConfig = toml::from_str(
            r#"
            [backend]
            port = 8080

            [timings]
            order_poll_interval_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.port, 8080);
        assert_eq!(config.backend.companion_port, 3001);
        assert_eq!(config.timings.order_poll_interval_secs, 10);
        assert_eq!(config.timings.health_sample_interval_secs, 5);
        assert_eq!(config.cli.prompt, "courier> ");
    }

    #[test]
    fn zero_port_fails_validation() {
        let config: AppConfig = toml::from_str("[backend]\nport = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = AppConfig::default();
        let raw = toml::to_string(&config).unwrap();
        let reloaded: AppConfig = toml::from_str(&raw).unwrap();
        assert_eq!(config, reloaded);
    }
}
