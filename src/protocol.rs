/// NDJSON message protocol for roster dumps.
///
/// All messages are newline-delimited JSON (NDJSON), serialized into
/// fixed-size `heapless` buffers so a report never allocates per line.
use heapless::{String, Vec};
use serde::Serialize;

use crate::tracker::StatsSnapshot;

/// Maximum length for MAC address strings ("AA:BB:CC:DD:EE:FF")
pub type MacString = String<18>;

/// Formatted wall-clock time ("2026-10-15 12:00:00.000")
pub type DateString = String<24>;

/// Messages emitted by roster reporters
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum RosterMessage<'a> {
    /// One present station
    #[serde(rename = "station")]
    Station {
        mac: &'a MacString,
        ch: u8,
        rssi: i8,
        /// Raw clock value (ms)
        last_seen: u64,
        /// Wall-clock rendering of `last_seen`, when the epoch is known
        #[serde(skip_serializing_if = "Option::is_none")]
        at: Option<&'a DateString>,
    },
    /// Summary of one purge pass
    #[serde(rename = "purge")]
    Purge {
        removed: u32,
        remaining: u32,
        /// Clock value of the pass (ms)
        ts: u64,
    },
    /// Pipeline counters
    #[serde(rename = "stats")]
    Stats {
        processed: u64,
        excluded: u64,
        inserted: u64,
        updated: u64,
        evicted: u64,
        dropped: u64,
    },
}

impl From<&StatsSnapshot> for RosterMessage<'_> {
    fn from(s: &StatsSnapshot) -> Self {
        RosterMessage::Stats {
            processed: s.processed,
            excluded: s.excluded,
            inserted: s.inserted,
            updated: s.updated,
            evicted: s.evicted,
            dropped: s.dropped,
        }
    }
}

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 256;

/// Buffer type for serialized JSON messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;

/// Serialize a message as one NDJSON line (trailing `\n` included).
/// Returns `None` if it does not fit in a [`MsgBuffer`].
pub fn serialize_message(msg: &RosterMessage) -> Option<MsgBuffer> {
    let mut buf = MsgBuffer::new();
    buf.resize_default(MAX_MSG_LEN).ok()?;
    let len = serde_json_core::to_slice(msg, &mut buf).ok()?;
    if len >= MAX_MSG_LEN {
        return None;
    }
    buf[len] = b'\n';
    buf.truncate(len + 1);
    Some(buf)
}
