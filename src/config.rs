use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ConfigResult};

/// Timing and failure-injection knobs for the mock backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Simulated network latency applied to every call
    pub latency_ms: u64,
    /// Probability that a list call on a flaky endpoint fails
    pub failure_rate: f64,
    /// Probability that a connection test fails
    pub connection_failure_rate: f64,
    pub refresh_delay_ms: u64,
    pub pipeline_completion_delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_ms: 300,
            failure_rate: 0.01,
            connection_failure_rate: 0.10,
            refresh_delay_ms: 2000,
            pipeline_completion_delay_ms: 5000,
        }
    }
}

impl MockConfig {
    /// No delays and no injected failures
    pub fn instant() -> Self {
        Self {
            latency_ms: 0,
            failure_rate: 0.0,
            connection_failure_rate: 0.0,
            refresh_delay_ms: 0,
            pipeline_completion_delay_ms: 0,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: MockConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("failure_rate", self.failure_rate),
            ("connection_failure_rate", self.connection_failure_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidRate { field, value });
            }
        }
        Ok(())
    }

    /// Force both rates into `0.0..=1.0`; non-finite rates become 0.0
    pub fn sanitized(mut self) -> Self {
        self.failure_rate = clamp_rate(self.failure_rate);
        self.connection_failure_rate = clamp_rate(self.connection_failure_rate);
        self
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn pipeline_completion_delay(&self) -> Duration {
        Duration::from_millis(self.pipeline_completion_delay_ms)
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
