//! Registry settings
//!
//! Loaded once at startup (from the `[registry]` section of the service
//! configuration) and never mutated afterwards.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Heartbeat and sweeping configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Whether registered servers must send periodic heartbeats.
    /// When disabled the sweeper never runs.
    #[serde(default = "default_heartbeat_enabled")]
    pub heartbeat_enabled: bool,
    /// Seconds without a heartbeat after which a server is evicted
    #[serde(default = "default_heartbeat_timeout_secs")]
    pub heartbeat_timeout_secs: u64,
    /// Seconds between two sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_heartbeat_enabled() -> bool {
    true
}

fn default_heartbeat_timeout_secs() -> u64 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    10
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            heartbeat_enabled: default_heartbeat_enabled(),
            heartbeat_timeout_secs: default_heartbeat_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl RegistrySettings {
    /// Staleness threshold as a signed time delta
    pub fn heartbeat_timeout(&self) -> TimeDelta {
        i64::try_from(self.heartbeat_timeout_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// Delay between sweeps
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Reject settings the sweeper cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if !self.heartbeat_enabled {
            return Ok(());
        }
        if self.heartbeat_timeout_secs == 0 {
            return Err("heartbeat_timeout_secs must be greater than 0".to_string());
        }
        if self.sweep_interval_secs == 0 {
            return Err("sweep_interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RegistrySettings::default();
        assert!(settings.heartbeat_enabled);
        assert_eq!(settings.heartbeat_timeout(), TimeDelta::seconds(30));
        assert_eq!(settings.sweep_interval(), Duration::from_secs(10));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected_only_when_enabled() {
        let mut settings = RegistrySettings {
            heartbeat_enabled: true,
            heartbeat_timeout_secs: 0,
            sweep_interval_secs: 10,
        };
        assert!(settings.validate().is_err());

        settings.heartbeat_timeout_secs = 60;
        settings.sweep_interval_secs = 0;
        assert!(settings.validate().is_err());

        settings.heartbeat_enabled = false;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let settings = RegistrySettings {
            heartbeat_timeout_secs: u64::MAX,
            ..RegistrySettings::default()
        };
        assert_eq!(settings.heartbeat_timeout(), TimeDelta::MAX);
    }
}
