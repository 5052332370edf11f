//! Pipeline wiring: one [`StationTracker`] owns the queue, the registry, the
//! filter, the clock and the counters, and spawns the processor and purger
//! threads.
//!
//! ```text
//! capture ──offer──▶ FrameQueue ──▶ FrameProcessor ──upsert──▶ StationRegistry
//!                                                                  ▲
//!                                          Purger ──evict──────────┘──▶ RosterSink
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;

use crate::capture;
use crate::clock::{Clock, MonotonicClock};
use crate::config::TrackerConfig;
use crate::error::{EnqueueError, TrackerError};
use crate::filter::IdentityFilter;
use crate::processor::FrameProcessor;
use crate::purger::Purger;
use crate::queue::FrameQueue;
use crate::registry::StationRegistry;
use crate::report::RosterSink;
use crate::shutdown::Shutdown;
use crate::station::{FrameEvent, MacAddr, StationRecord};

// ── Counters ─────────────────────────────────────────────────────────

/// Pipeline counters, updated lock-free by the processor and purger.
#[derive(Debug, Default)]
pub struct PipelineStats {
    processed: AtomicU64,
    excluded: AtomicU64,
    inserted: AtomicU64,
    updated: AtomicU64,
    evicted: AtomicU64,
}

impl PipelineStats {
    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_excluded(&self) {
        self.excluded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_inserted(&self) {
        self.inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_updated(&self) {
        self.updated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evicted(&self, n: usize) {
        self.evicted.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Counter values; `dropped` is left at zero (owned by the queue).
    /// [`StationTracker::stats`] fills it in.
    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            excluded: self.excluded.load(Ordering::Relaxed),
            inserted: self.inserted.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            dropped: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub processed: u64,
    pub excluded: u64,
    pub inserted: u64,
    pub updated: u64,
    pub evicted: u64,
    /// Frames rejected by a full queue
    pub dropped: u64,
}

// ── Capture ingress ──────────────────────────────────────────────────

/// Producer handle for the capture source. Cheap to clone.
#[derive(Clone)]
pub struct FrameIngress {
    queue: Arc<FrameQueue>,
    clock: Arc<dyn Clock>,
}

impl FrameIngress {
    /// Stamp a sighting with the tracker clock and enqueue it without waiting.
    /// Returns `false` if the frame was dropped.
    ///
    /// Safe to call from the radio driver's receive callback.
    pub fn offer(&self, source: MacAddr, channel: u8, rssi: i8, payload_len: u16) -> bool {
        let event = FrameEvent {
            source,
            channel,
            rssi,
            payload_len,
            timestamp: self.clock.now_ms(),
        };
        self.queue.try_enqueue(event).is_ok()
    }

    /// Parse a raw 802.11 frame and offer it if it is a management frame.
    /// Returns `false` if the frame was ignored or dropped.
    pub fn offer_frame(&self, frame: &[u8], rssi: i8, channel: u8) -> bool {
        match capture::parse_management_frame(frame, rssi, channel, self.clock.now_ms()) {
            Some(event) => self.queue.try_enqueue(event).is_ok(),
            None => false,
        }
    }

    /// Enqueue a pre-stamped event, waiting up to `timeout` for space.
    pub fn send(&self, event: FrameEvent, timeout: Duration) -> Result<(), EnqueueError> {
        self.queue.enqueue(event, timeout)
    }

    /// Current tracker clock, for producers stamping their own events.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

// ── Tracker ──────────────────────────────────────────────────────────

pub struct StationTracker {
    config: TrackerConfig,
    filter: Arc<IdentityFilter>,
    registry: Arc<StationRegistry>,
    queue: Arc<FrameQueue>,
    clock: Arc<dyn Clock>,
    stats: Arc<PipelineStats>,
    shutdown: Shutdown,
}

impl StationTracker {
    /// Tracker on the host monotonic clock.
    pub fn new(config: TrackerConfig, filter: IdentityFilter) -> Result<Self, TrackerError> {
        Self::with_clock(config, filter, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(
        config: TrackerConfig,
        filter: IdentityFilter,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            config,
            filter: Arc::new(filter),
            registry: Arc::new(StationRegistry::new()),
            queue: Arc::new(FrameQueue::with_capacity(config.queue_capacity)),
            clock,
            stats: Arc::new(PipelineStats::default()),
            shutdown: Shutdown::new(),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn ingress(&self) -> FrameIngress {
        FrameIngress {
            queue: Arc::clone(&self.queue),
            clock: Arc::clone(&self.clock),
        }
    }

    pub fn registry(&self) -> &Arc<StationRegistry> {
        &self.registry
    }

    pub fn queue(&self) -> &Arc<FrameQueue> {
        &self.queue
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn snapshot(&self) -> Vec<StationRecord> {
        self.registry.snapshot()
    }

    pub fn count(&self) -> usize {
        self.registry.count()
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            dropped: self.queue.dropped(),
            ..self.stats.snapshot()
        }
    }

    /// A processor bound to this tracker, for callers driving their own thread.
    pub fn processor(&self) -> FrameProcessor {
        FrameProcessor::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.filter),
            Arc::clone(&self.registry),
            Arc::clone(&self.stats),
            self.shutdown.clone(),
            self.config.poll_interval(),
        )
    }

    /// A purger bound to this tracker, optionally reporting to `sink`.
    pub fn purger(&self, sink: Option<Arc<dyn RosterSink>>) -> Result<Purger, TrackerError> {
        let purger = Purger::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.clock),
            Arc::clone(&self.stats),
            self.shutdown.clone(),
            &self.config,
        )?;
        Ok(match sink {
            Some(sink) => purger.with_sink(sink),
            None => purger,
        })
    }

    /// Start the processor and purger on named threads.
    pub fn spawn(&self, sink: Option<Arc<dyn RosterSink>>) -> Result<TrackerHandle, TrackerError> {
        let purger = self.purger(sink)?;
        let processor = self.processor();

        let processor = thread::Builder::new()
            .name("processor".into())
            .spawn(move || processor.run())
            .map_err(|e| TrackerError::Spawn("processor", e))?;

        let purger = match thread::Builder::new()
            .name("purger".into())
            .spawn(move || purger.run())
        {
            Ok(h) => h,
            Err(e) => {
                self.stop();
                match processor.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => log::error!("Processor failed during aborted start: {err}"),
                    Err(_) => log::error!("Processor panicked during aborted start"),
                }
                return Err(TrackerError::Spawn("purger", e));
            }
        };

        log::info!(
            "Station tracker running (queue {} events, max age {} ms, purge every {} ms)",
            self.queue.capacity(),
            self.config.max_age_ms,
            self.config.purge_period_ms
        );

        Ok(TrackerHandle {
            shutdown: self.shutdown.clone(),
            queue: Arc::clone(&self.queue),
            processor,
            purger,
        })
    }

    /// Signal shutdown and close the queue. Threads exit on their own.
    pub fn stop(&self) {
        // Close first so the processor drains instead of abandoning the queue.
        self.queue.close();
        self.shutdown.trigger();
    }
}

/// Join handle for a running tracker.
pub struct TrackerHandle {
    shutdown: Shutdown,
    queue: Arc<FrameQueue>,
    processor: JoinHandle<Result<(), TrackerError>>,
    purger: JoinHandle<()>,
}

impl TrackerHandle {
    /// Whether the processor thread has exited (e.g. out of memory).
    pub fn processor_finished(&self) -> bool {
        self.processor.is_finished()
    }

    /// Stop both threads and wait for them. The processor drains queued
    /// frames first. Returns the processor's error, if it failed.
    pub fn shutdown(self) -> Result<(), TrackerError> {
        self.queue.close();
        self.shutdown.trigger();
        self.join()
    }

    /// Wait for both threads without signalling them.
    pub fn join(self) -> Result<(), TrackerError> {
        let processor = self.processor.join();
        let purger = self.purger.join();
        purger.map_err(|_| TrackerError::TaskPanicked("purger"))?;
        processor.map_err(|_| TrackerError::TaskPanicked("processor"))?
    }
}
