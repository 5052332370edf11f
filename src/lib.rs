//! stationwatch: live roster of nearby WiFi stations.
//!
//! Captured management frames flow through a bounded queue into a processor
//! that drops deny-listed sources and upserts everything else into a shared
//! registry keyed by hardware address. A purger evicts stations not seen for
//! longer than the max age and hands the survivors to a reporter.
//!
//! The crate has no platform dependencies and is testable on any host with
//! `cargo test`. Platform binaries (the ESP-IDF firmware in `firmware-std/`)
//! are thin consumers that provide radio access and a clock:
//!
//! ```no_run
//! use std::sync::Arc;
//! use stationwatch::{IdentityFilter, LogReporter, StationTracker, TrackerConfig};
//!
//! # fn main() -> Result<(), stationwatch::TrackerError> {
//! let tracker = StationTracker::new(TrackerConfig::default(), IdentityFilter::with_defaults())?;
//! let handle = tracker.spawn(Some(Arc::new(LogReporter::new())))?;
//!
//! // Capture callback:
//! let ingress = tracker.ingress();
//! # let (frame, rssi, channel) = (&[0u8; 24][..], -40i8, 6u8);
//! ingress.offer_frame(frame, rssi, channel);
//!
//! handle.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod clock;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod processor;
pub mod protocol;
pub mod purger;
pub mod queue;
pub mod registry;
pub mod report;
pub mod shutdown;
pub mod station;
pub mod tracker;

pub use clock::{Clock, ManualClock, MonotonicClock, TickClock, TickExtender};
pub use config::TrackerConfig;
pub use error::{ConfigError, DequeueError, EnqueueError, TrackerError};
pub use filter::IdentityFilter;
pub use processor::{FrameProcessor, Processed};
pub use purger::{PurgePass, Purger};
pub use queue::FrameQueue;
pub use registry::{StationRegistry, Upsert};
pub use report::{LogReporter, NdjsonReporter, RosterSink};
pub use shutdown::Shutdown;
pub use station::{FrameEvent, MacAddr, StationRecord};
pub use tracker::{FrameIngress, PipelineStats, StationTracker, StatsSnapshot, TrackerHandle};
