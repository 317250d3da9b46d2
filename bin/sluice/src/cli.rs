//! Command-line interface for the sluice daemon.

use std::path::PathBuf;

use clap::{Args, Parser};
use sluice_core::CoreConfig;

/// Sluice - OpenFlow control-channel daemon
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,

    /// Path to the TOML configuration file
    #[arg(long, value_name = "FILE", default_value = "sluice.toml")]
    pub config: PathBuf,

    /// Core configuration overrides
    #[command(flatten)]
    pub core: CoreArgs,
}

/// Logging configuration
#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    /// Silence all output
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Log filter
    #[arg(long, value_name = "DIRECTIVE")]
    pub filter: Option<String>,
}

impl LogArgs {
    /// The env-filter directive selected by the flags.
    pub fn directive(&self) -> String {
        if let Some(filter) = &self.filter {
            return filter.clone();
        }
        if self.quiet {
            return "off".to_string();
        }
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    }
}

/// Core configuration overrides
#[derive(Debug, Args, Clone)]
pub struct CoreArgs {
    /// Seconds between flow-stats polls of every known switch
    #[arg(long, value_name = "SECONDS")]
    pub stats_poll_interval: Option<u64>,

    /// Re-request switch features after answering an echo probe
    #[arg(long)]
    pub refresh_features_on_echo: bool,
}

impl CoreArgs {
    /// Apply command line arguments to override the configuration.
    pub fn apply(&self, config: &mut CoreConfig) {
        if let Some(seconds) = self.stats_poll_interval {
            config.stats_poll_interval_seconds = seconds;
        }
        if self.refresh_features_on_echo {
            config.refresh_features_on_echo = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_directive() {
        let args = LogArgs {
            quiet: false,
            verbosity: 0,
            filter: None,
        };
        assert_eq!(args.directive(), "info");

        let args = LogArgs {
            verbosity: 2,
            ..args
        };
        assert_eq!(args.directive(), "trace");
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = CoreConfig::default();
        let args = CoreArgs {
            stats_poll_interval: Some(5),
            refresh_features_on_echo: true,
        };
        args.apply(&mut config);

        assert_eq!(config.stats_poll_interval_seconds, 5);
        assert!(config.refresh_features_on_echo);
    }

    #[test]
    fn test_cli_keeps_config_when_unset() {
        let mut config = CoreConfig::default();
        let args = CoreArgs {
            stats_poll_interval: None,
            refresh_features_on_echo: false,
        };
        args.apply(&mut config);

        assert_eq!(config, CoreConfig::default());
    }
}
