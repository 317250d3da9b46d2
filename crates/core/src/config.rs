//! Core configuration handling.

use std::time::Duration;
use std::{fs, path::Path};

use eyre::Result;
use serde::{Deserialize, Serialize};

/// Default wall-clock period between stats polls.
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 30;

/// Configuration for the control-channel core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CoreConfig {
    /// Seconds between flow-stats polls of every known switch.
    #[serde(default = "default_stats_interval")]
    pub stats_poll_interval_seconds: u64,

    /// Re-request switch features after answering an echo probe.
    #[serde(default)]
    pub refresh_features_on_echo: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            stats_poll_interval_seconds: DEFAULT_STATS_INTERVAL_SECS,
            refresh_features_on_echo: false,
        }
    }
}

impl CoreConfig {
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_poll_interval_seconds)
    }

    /// Load the configuration from the given path, or create a default one
    /// if it doesn't exist.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Save the configuration to the given path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }
}

fn default_stats_interval() -> u64 {
    DEFAULT_STATS_INTERVAL_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.stats_poll_interval_seconds, 30);
        assert!(!config.refresh_features_on_echo);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: CoreConfig = toml::from_str("refresh-features-on-echo = true").unwrap();
        assert!(config.refresh_features_on_echo);
        assert_eq!(config.stats_poll_interval_seconds, 30);
    }

    #[test]
    fn test_roundtrip() {
        let config = CoreConfig {
            stats_poll_interval_seconds: 5,
            refresh_features_on_echo: true,
        };
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: CoreConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, config);
    }
}
