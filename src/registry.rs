//! The shared roster of currently present stations.
//!
//! One `Mutex` guards the whole roster and is held for the full duration of
//! every public operation. Records live in a `Vec` in insertion order with a
//! hash index beside it, so lookups are O(1) and iteration order is stable.
//! Records are only ever handed out as copies or as a borrow scoped to a
//! closure running under the lock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::TrackerError;
use crate::station::{MacAddr, StationRecord};

/// Result of an [`StationRegistry::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

#[derive(Default)]
struct Roster {
    records: Vec<StationRecord>,
    index: HashMap<MacAddr, usize>,
}

impl Roster {
    fn reindex(&mut self) {
        self.index.clear();
        for (pos, rec) in self.records.iter().enumerate() {
            self.index.insert(rec.identity, pos);
        }
    }
}

pub struct StationRegistry {
    roster: Mutex<Roster>,
    limit: usize,
}

impl Default for StationRegistry {
    fn default() -> Self {
        Self::with_limit(usize::MAX)
    }
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding at most `limit` stations, for a fixed memory budget.
    /// Inserting past the limit fails with [`TrackerError::OutOfMemory`], like
    /// a failed allocation.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            roster: Mutex::new(Roster::default()),
            limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Roster> {
        self.roster.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a new record or refresh an existing one in place.
    ///
    /// A refresh keeps the record's position and never moves `last_seen`
    /// backwards. An insert reserves space in both the record list and the
    /// index before touching either, so running out of memory leaves the
    /// roster unchanged.
    pub fn upsert(
        &self,
        identity: MacAddr,
        channel: u8,
        rssi: i8,
        now: u64,
    ) -> Result<Upsert, TrackerError> {
        let mut roster = self.lock();

        if let Some(pos) = roster.index.get(&identity).copied() {
            let rec = &mut roster.records[pos];
            rec.channel = channel;
            rec.rssi = rssi;
            rec.last_seen = rec.last_seen.max(now);
            return Ok(Upsert::Updated);
        }

        if roster.records.len() >= self.limit {
            return Err(TrackerError::OutOfMemory);
        }
        roster
            .records
            .try_reserve(1)
            .map_err(|_| TrackerError::OutOfMemory)?;
        roster
            .index
            .try_reserve(1)
            .map_err(|_| TrackerError::OutOfMemory)?;

        let pos = roster.records.len();
        roster.records.push(StationRecord {
            identity,
            channel,
            rssi,
            last_seen: now,
        });
        roster.index.insert(identity, pos);
        Ok(Upsert::Inserted)
    }

    /// Remove every record with `now - last_seen > max_age`. Returns how many
    /// were removed. Survivors keep their relative order.
    pub fn evict_older_than(&self, max_age: u64, now: u64) -> usize {
        let mut roster = self.lock();
        let before = roster.records.len();
        roster.records.retain(|rec| rec.age(now) <= max_age);
        let removed = before - roster.records.len();
        if removed > 0 {
            roster.reindex();
        }
        removed
    }

    /// Copy of every live record in insertion order.
    pub fn snapshot(&self) -> Vec<StationRecord> {
        self.lock().records.clone()
    }

    /// Run `f` over the live records while holding the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&[StationRecord]) -> R) -> R {
        let roster = self.lock();
        f(&roster.records)
    }

    pub fn get(&self, identity: &MacAddr) -> Option<StationRecord> {
        let roster = self.lock();
        roster.index.get(identity).map(|&pos| roster.records[pos])
    }

    pub fn count(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}
