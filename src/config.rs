//! Configuration management for SMS Gatekeeper.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{GatekeeperError, Result};

/// Main configuration for the SMS Gatekeeper service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Maximum messages per phone number per second
    #[serde(default = "default_max_per_number")]
    pub max_per_number_per_second: u32,

    /// Maximum messages across the whole account per second
    #[serde(default = "default_max_per_account")]
    pub max_per_account_per_second: u32,

    /// Seconds a phone number may sit unused before its record is reclaimed
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_secs: u64,

    /// Seconds between eviction passes
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            max_per_number_per_second: default_max_per_number(),
            max_per_account_per_second: default_max_per_account(),
            inactivity_timeout_secs: default_inactivity_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

fn default_max_per_number() -> u32 {
    3
}

fn default_max_per_account() -> u32 {
    5
}

fn default_inactivity_timeout() -> u64 {
    300
}

fn default_cleanup_interval() -> u64 {
    60
}

impl RateLimitingConfig {
    /// Inactivity timeout as a [`Duration`].
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }

    /// Cleanup interval as a [`Duration`].
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl GatekeeperConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: GatekeeperConfig =
            serde_yaml::from_str(&contents).map_err(|e| GatekeeperError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Validate the tunables before the engine is constructed.
    ///
    /// The rate limiter itself does not re-check its inputs.
    pub fn validate(&self) -> Result<()> {
        let rl = &self.rate_limiting;
        if rl.max_per_number_per_second == 0 {
            return Err(GatekeeperError::Config(
                "max_per_number_per_second must be positive".into(),
            ));
        }
        if rl.max_per_account_per_second == 0 {
            return Err(GatekeeperError::Config(
                "max_per_account_per_second must be positive".into(),
            ));
        }
        if rl.inactivity_timeout_secs == 0 {
            return Err(GatekeeperError::Config(
                "inactivity_timeout_secs must be positive".into(),
            ));
        }
        if rl.cleanup_interval_secs == 0 {
            return Err(GatekeeperError::Config(
                "cleanup_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GatekeeperConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limiting.max_per_number_per_second, 3);
        assert_eq!(config.rate_limiting.max_per_account_per_second, 5);
        assert_eq!(config.rate_limiting.cleanup_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
rate_limiting:
  max_per_number_per_second: 10
"#;
        let config: GatekeeperConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rate_limiting.max_per_number_per_second, 10);
        assert_eq!(config.rate_limiting.max_per_account_per_second, 5);
        assert_eq!(config.server.listen_addr, default_listen_addr());
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let mut config = GatekeeperConfig::default();
        config.rate_limiting.max_per_account_per_second = 0;
        assert!(config.validate().is_err());
    }
}
