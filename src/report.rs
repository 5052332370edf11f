//! Roster egress: human-readable log dumps and NDJSON output.
//!
//! Reporters only ever see a copied snapshot. The purger hands each pass's
//! summary and the surviving roster to a [`RosterSink`].

use core::fmt::Write as _;
use std::io::Write;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::DateTime;

use crate::clock::Clock;
use crate::protocol::{serialize_message, DateString, RosterMessage};
use crate::purger::PurgePass;
use crate::station::StationRecord;

/// Receives the roster after every purge pass.
pub trait RosterSink: Send + Sync {
    fn report(&self, pass: &PurgePass, roster: &[StationRecord]);
}

/// Render `last_seen` as wall-clock time, given the Unix time (ms) at which the
/// tracker clock read zero.
pub fn format_wall_clock(epoch_unix_ms: i64, last_seen: u64) -> Option<DateString> {
    let unix_ms = epoch_unix_ms.checked_add(i64::try_from(last_seen).ok()?)?;
    let at = DateTime::from_timestamp_millis(unix_ms)?;
    let mut s = DateString::new();
    write!(s, "{}", at.format("%Y-%m-%d %H:%M:%S%.3f")).ok()?;
    Some(s)
}

/// One dump line: `AA:BB:CC:11:22:33 ch=6 rssi=-40 lastseen=12345 (2026-10-15 12:00:00.000)`
pub fn format_station(rec: &StationRecord, epoch_unix_ms: Option<i64>) -> String {
    let mut line = format!(
        "{} ch={} rssi={} lastseen={}",
        rec.identity, rec.channel, rec.rssi, rec.last_seen
    );
    if let Some(at) = epoch_unix_ms.and_then(|e| format_wall_clock(e, rec.last_seen)) {
        let _ = write!(line, " ({at})");
    }
    line
}

/// Unix time (ms) at which `clock` read zero.
pub fn epoch_of(clock: &dyn Clock) -> i64 {
    let unix_now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    unix_now - clock.now_ms() as i64
}

/// Dumps the roster through the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter {
    epoch_unix_ms: Option<i64>,
}

impl LogReporter {
    /// Raw clock values only.
    pub const fn new() -> Self {
        Self {
            epoch_unix_ms: None,
        }
    }

    /// Also print wall-clock times, anchored at `epoch_unix_ms`.
    pub const fn with_epoch(epoch_unix_ms: i64) -> Self {
        Self {
            epoch_unix_ms: Some(epoch_unix_ms),
        }
    }
}

impl LogReporter {
    /// The lines one pass logs: a summary, then one line per station.
    pub fn render(&self, pass: &PurgePass, roster: &[StationRecord]) -> Vec<String> {
        let mut lines = Vec::with_capacity(roster.len() + 1);
        lines.push(format!(
            "Roster: {} present, {} purged",
            pass.remaining, pass.removed
        ));
        lines.extend(
            roster
                .iter()
                .map(|rec| format!("  {}", format_station(rec, self.epoch_unix_ms))),
        );
        lines
    }
}

impl RosterSink for LogReporter {
    fn report(&self, pass: &PurgePass, roster: &[StationRecord]) {
        for line in self.render(pass, roster) {
            log::info!("{line}");
        }
    }
}

/// Writes NDJSON to any `io::Write`: a `purge` line, then one `station` line
/// per record.
pub struct NdjsonReporter<W> {
    out: Mutex<W>,
    epoch_unix_ms: Option<i64>,
}

impl<W: Write + Send> NdjsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            epoch_unix_ms: None,
        }
    }

    pub fn with_epoch(mut self, epoch_unix_ms: i64) -> Self {
        self.epoch_unix_ms = Some(epoch_unix_ms);
        self
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, out: &mut W, msg: &RosterMessage) -> std::io::Result<()> {
        match serialize_message(msg) {
            Some(line) => out.write_all(&line),
            None => {
                log::warn!("Roster message exceeded buffer, skipped");
                Ok(())
            }
        }
    }

    fn write_pass(&self, pass: &PurgePass, roster: &[StationRecord]) -> std::io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);

        let summary = RosterMessage::Purge {
            removed: pass.removed as u32,
            remaining: pass.remaining as u32,
            ts: pass.at,
        };
        self.emit(&mut out, &summary)?;

        for rec in roster {
            let mac = rec.identity.to_mac_string();
            let at = self
                .epoch_unix_ms
                .and_then(|e| format_wall_clock(e, rec.last_seen));
            let msg = RosterMessage::Station {
                mac: &mac,
                ch: rec.channel,
                rssi: rec.rssi,
                last_seen: rec.last_seen,
                at: at.as_ref(),
            };
            self.emit(&mut out, &msg)?;
        }
        out.flush()
    }
}

impl<W: Write + Send> RosterSink for NdjsonReporter<W> {
    fn report(&self, pass: &PurgePass, roster: &[StationRecord]) {
        if let Err(e) = self.write_pass(pass, roster) {
            log::warn!("Roster NDJSON write failed: {e}");
        }
    }
}
