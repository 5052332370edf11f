/// Periodic eviction of stale stations.
///
/// Sleeps for the purge period, evicts every station older than the max age,
/// then hands the survivors to the configured sink. Shutdown interrupts the
/// sleep immediately.
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::error::ConfigError;
use crate::registry::StationRegistry;
use crate::report::RosterSink;
use crate::shutdown::Shutdown;
use crate::tracker::PipelineStats;

/// Outcome of one eviction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgePass {
    pub removed: usize,
    pub remaining: usize,
    /// Clock value the pass evaluated ages against
    pub at: u64,
}

pub struct Purger {
    registry: Arc<StationRegistry>,
    clock: Arc<dyn Clock>,
    stats: Arc<PipelineStats>,
    sink: Option<Arc<dyn RosterSink>>,
    shutdown: Shutdown,
    max_age_ms: u64,
    period: Duration,
}

impl Purger {
    /// Fails if `config.purge_period_ms` does not exceed `config.max_age_ms`.
    pub fn new(
        registry: Arc<StationRegistry>,
        clock: Arc<dyn Clock>,
        stats: Arc<PipelineStats>,
        shutdown: Shutdown,
        config: &TrackerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry,
            clock,
            stats,
            sink: None,
            shutdown,
            max_age_ms: config.max_age_ms,
            period: config.purge_period(),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn RosterSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Evict once against the current clock and report the survivors.
    pub fn purge_once(&self) -> PurgePass {
        let now = self.clock.now_ms();
        let removed = self.registry.evict_older_than(self.max_age_ms, now);
        self.stats.record_evicted(removed);

        let roster = self.registry.snapshot();
        let pass = PurgePass {
            removed,
            remaining: roster.len(),
            at: now,
        };

        log::info!(
            "Purged {} stale stations, {} present",
            pass.removed,
            pass.remaining
        );

        if let Some(sink) = &self.sink {
            sink.report(&pass, &roster);
        }
        pass
    }

    pub fn run(self) {
        log::info!(
            "Purger started (max age {} ms, period {} ms)",
            self.max_age_ms,
            self.period.as_millis()
        );

        while !self.shutdown.wait_timeout(self.period) {
            self.purge_once();
        }

        log::info!("Purger stopped");
    }
}
