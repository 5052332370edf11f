/// Tracker tuning: eviction age, purge cadence, queue sizing.
///
/// Validated at construction: the purge period must exceed the max age.
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_MAX_AGE_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PURGE_PERIOD_MS, DEFAULT_QUEUE_CAPACITY,
};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Stations not seen for longer than this are evicted.
    pub max_age_ms: u64,
    /// Interval between purge passes. Must be greater than `max_age_ms`.
    pub purge_period_ms: u64,
    /// Frame queue capacity in events.
    pub queue_capacity: usize,
    /// Processor dequeue timeout; bounds shutdown latency.
    pub poll_interval_ms: u64,
}

impl TrackerConfig {
    pub const fn new() -> Self {
        Self {
            max_age_ms: DEFAULT_MAX_AGE_MS,
            purge_period_ms: DEFAULT_PURGE_PERIOD_MS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_age_ms == 0 {
            return Err(ConfigError::ZeroMaxAge);
        }
        if self.purge_period_ms <= self.max_age_ms {
            return Err(ConfigError::PurgePeriodTooShort {
                purge_period_ms: self.purge_period_ms,
                max_age_ms: self.max_age_ms,
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Parse and validate a JSON config blob. Missing fields take defaults.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let (config, _) =
            serde_json_core::from_slice::<TrackerConfig>(data).map_err(|_| ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }

    pub fn purge_period(&self) -> Duration {
        Duration::from_millis(self.purge_period_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}
