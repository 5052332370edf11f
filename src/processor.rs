/// Consumer loop: frame queue → identity filter → station registry.
///
/// Waits in `dequeue`, filters, upserts, and goes back to waiting. The loop
/// ends when the queue is closed and drained, when shutdown is triggered, or
/// when an insert runs out of memory (returned to the caller).
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{DequeueError, TrackerError};
use crate::filter::IdentityFilter;
use crate::queue::FrameQueue;
use crate::registry::{StationRegistry, Upsert};
use crate::shutdown::Shutdown;
use crate::station::FrameEvent;
use crate::tracker::PipelineStats;

/// Minimum spacing between queue-overflow warnings.
const DROP_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// What happened to one dequeued frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processed {
    Inserted,
    Updated,
    Excluded,
}

pub struct FrameProcessor {
    queue: Arc<FrameQueue>,
    filter: Arc<IdentityFilter>,
    registry: Arc<StationRegistry>,
    stats: Arc<PipelineStats>,
    shutdown: Shutdown,
    poll_interval: Duration,
}

impl FrameProcessor {
    pub fn new(
        queue: Arc<FrameQueue>,
        filter: Arc<IdentityFilter>,
        registry: Arc<StationRegistry>,
        stats: Arc<PipelineStats>,
        shutdown: Shutdown,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            filter,
            registry,
            stats,
            shutdown,
            poll_interval,
        }
    }

    /// Apply the filter and update the registry for one event.
    pub fn process(&self, event: &FrameEvent) -> Result<Processed, TrackerError> {
        self.stats.record_processed();

        if self.filter.is_excluded(&event.source) {
            self.stats.record_excluded();
            return Ok(Processed::Excluded);
        }

        let outcome = self
            .registry
            .upsert(event.source, event.channel, event.rssi, event.timestamp)?;

        match outcome {
            Upsert::Inserted => {
                self.stats.record_inserted();
                log::debug!(
                    "New station {} ch={} rssi={}",
                    event.source,
                    event.channel,
                    event.rssi
                );
                Ok(Processed::Inserted)
            }
            Upsert::Updated => {
                self.stats.record_updated();
                Ok(Processed::Updated)
            }
        }
    }

    /// Run until shutdown or queue close.
    ///
    /// Shutdown on an open queue stops after the event in hand. Once the queue
    /// is closed, every event already queued is still processed.
    pub fn run(self) -> Result<(), TrackerError> {
        log::info!("Frame processor started");

        let mut dropped_seen = self.queue.dropped();
        let mut last_drop_log = Instant::now();

        loop {
            match self.queue.dequeue(self.poll_interval) {
                Ok(event) => {
                    if let Err(e) = self.process(&event) {
                        log::error!("Frame processor stopping: {e}");
                        return Err(e);
                    }
                }
                Err(DequeueError::Timeout) => {}
                Err(DequeueError::Closed) => break,
            }

            // A closed queue is finite, so it is drained; an open one is abandoned.
            if self.shutdown.is_triggered() && !self.queue.is_closed() {
                break;
            }

            if last_drop_log.elapsed() >= DROP_LOG_INTERVAL {
                dropped_seen = self.log_drops(dropped_seen);
                last_drop_log = Instant::now();
            }
        }

        self.log_drops(dropped_seen);
        log::info!(
            "Frame processor stopped ({} frames processed)",
            self.stats.snapshot().processed
        );
        Ok(())
    }

    fn log_drops(&self, seen: u64) -> u64 {
        let dropped = self.queue.dropped();
        if dropped != seen {
            log::warn!(
                "Frame queue overflow: {} frames dropped ({} total)",
                dropped - seen,
                dropped
            );
        }
        dropped
    }
}
