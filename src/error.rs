//! Error types for the station pipeline.
//!
//! Queue conditions stay local to producers and the processor loop. Only
//! configuration and resource-exhaustion failures leave the core.

use thiserror::Error;

use crate::station::FrameEvent;

/// Rejected tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("purge period ({purge_period_ms} ms) must exceed max age ({max_age_ms} ms)")]
    PurgePeriodTooShort {
        purge_period_ms: u64,
        max_age_ms: u64,
    },
    #[error("max age must be non-zero")]
    ZeroMaxAge,
    #[error("queue capacity must be non-zero")]
    ZeroQueueCapacity,
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
    #[error("deny-list prefix length {0} is outside 1..=6")]
    PrefixLength(usize),
    #[error("deny-list entry has {len} bytes, prefix length needs {required}")]
    ShortPrefix { len: usize, required: usize },
    #[error("malformed config JSON")]
    Json,
}

/// Failures that propagate out of the core to the process supervisor.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("out of memory inserting a new station")]
    OutOfMemory,
    #[error("failed to spawn {0} thread")]
    Spawn(&'static str, #[source] std::io::Error),
    #[error("{0} thread panicked")]
    TaskPanicked(&'static str),
}

/// Producer-side enqueue failure. The rejected event is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    #[error("frame queue full")]
    Full(FrameEvent),
    #[error("frame queue closed")]
    Closed(FrameEvent),
}

impl EnqueueError {
    pub fn into_event(self) -> FrameEvent {
        match self {
            EnqueueError::Full(ev) | EnqueueError::Closed(ev) => ev,
        }
    }
}

/// Consumer-side dequeue outcome when no event is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DequeueError {
    /// Nothing arrived within the timeout. Not an error condition for the processor.
    #[error("dequeue timed out")]
    Timeout,
    /// The queue was closed and fully drained.
    #[error("frame queue closed")]
    Closed,
}
