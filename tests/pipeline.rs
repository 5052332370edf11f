//! End-to-end pipeline scenarios: capture → queue → processor → registry ⇄ purger.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use stationwatch::{
    EnqueueError, FrameEvent, FrameQueue, IdentityFilter, MacAddr, ManualClock, PurgePass,
    RosterSink, StationRecord, StationRegistry, StationTracker, TrackerConfig,
};

const STATION: MacAddr = MacAddr::new([0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x33]);

fn config() -> TrackerConfig {
    TrackerConfig {
        max_age_ms: 10_000,
        purge_period_ms: 60_000,
        queue_capacity: 32,
        poll_interval_ms: 5,
    }
}

fn frame(source: MacAddr, channel: u8, rssi: i8, timestamp: u64) -> FrameEvent {
    FrameEvent {
        source,
        channel,
        rssi,
        payload_len: 64,
        timestamp,
    }
}

/// Poll until `cond` holds or a generous deadline passes.
fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

// ── Sighting and refresh ─────────────────────────────────────────────

#[test]
fn first_sighting_then_refresh() {
    let clock = Arc::new(ManualClock::new(0));
    let tracker =
        StationTracker::with_clock(config(), IdentityFilter::with_defaults(), clock).unwrap();
    let handle = tracker.spawn(None).unwrap();
    let ingress = tracker.ingress();

    ingress
        .send(frame(STATION, 6, -40, 1_000), Duration::from_secs(1))
        .unwrap();
    assert!(wait_for(|| tracker.stats().processed == 1));

    let snap = tracker.snapshot();
    assert_eq!(
        snap,
        vec![StationRecord {
            identity: STATION,
            channel: 6,
            rssi: -40,
            last_seen: 1_000
        }]
    );

    ingress
        .send(frame(STATION, 11, -55, 2_000), Duration::from_secs(1))
        .unwrap();
    assert!(wait_for(|| tracker.stats().processed == 2));

    assert_eq!(tracker.count(), 1);
    let rec = tracker.snapshot()[0];
    assert_eq!((rec.channel, rec.rssi, rec.last_seen), (11, -55, 2_000));

    handle.shutdown().unwrap();
}

#[test]
fn deny_listed_source_never_recorded() {
    let tracker = StationTracker::new(config(), IdentityFilter::with_defaults()).unwrap();
    let handle = tracker.spawn(None).unwrap();
    let ingress = tracker.ingress();

    // Cisco Aironet OUI
    let ap = MacAddr::new([0x00, 0x40, 0x96, 0x10, 0x20, 0x30]);
    assert!(ingress.offer(ap, 1, -30, 200));
    assert!(wait_for(|| tracker.stats().processed == 1));

    assert_eq!(tracker.count(), 0);
    assert_eq!(tracker.stats().excluded, 1);
    handle.shutdown().unwrap();
}

#[test]
fn raw_management_frame_reaches_roster() {
    let tracker = StationTracker::new(config(), IdentityFilter::with_defaults()).unwrap();
    let ingress = tracker.ingress();

    // Probe request from STATION
    let mut raw = vec![0x40, 0x00, 0x00, 0x00];
    raw.extend_from_slice(&[0xFF; 6]);
    raw.extend_from_slice(STATION.octets());
    raw.extend_from_slice(&[0xFF; 6]);
    raw.extend_from_slice(&[0x00, 0x00]);
    raw.extend_from_slice(&[0x00, 0x00, 0x01, 0x04, 0x02, 0x04, 0x0B, 0x16]);
    assert!(ingress.offer_frame(&raw, -62, 3));

    // A data frame is not a sighting
    let mut data = raw.clone();
    data[0] = 0x08;
    assert!(!ingress.offer_frame(&data, -62, 3));

    let handle = tracker.spawn(None).unwrap();
    handle.shutdown().unwrap();

    let snap = tracker.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].identity, STATION);
    assert_eq!(snap[0].channel, 3);
    assert_eq!(snap[0].rssi, -62);
}

// ── Eviction ─────────────────────────────────────────────────────────

#[test]
fn eviction_by_age_threshold() {
    let reg = StationRegistry::new();
    for n in 1..=3u8 {
        reg.upsert(MacAddr::new([0x02, 0, 0, 0, 0, n]), 1, -50, 0)
            .unwrap();
    }
    assert_eq!(reg.evict_older_than(10, 5), 0);
    assert_eq!(reg.evict_older_than(10, 15), 3);
    assert_eq!(reg.count(), 0);
}

#[derive(Default)]
struct Recorder {
    passes: Mutex<Vec<(PurgePass, Vec<StationRecord>)>>,
}

impl RosterSink for Recorder {
    fn report(&self, pass: &PurgePass, roster: &[StationRecord]) {
        self.passes.lock().unwrap().push((*pass, roster.to_vec()));
    }
}

#[test]
fn purger_thread_evicts_stale_and_reports() {
    let clock = Arc::new(ManualClock::new(0));
    let config = TrackerConfig {
        max_age_ms: 10,
        purge_period_ms: 20,
        ..config()
    };
    let tracker =
        StationTracker::with_clock(config, IdentityFilter::allow_all(), clock.clone()).unwrap();
    let stale = MacAddr::new([0x02, 0, 0, 0, 0, 1]);
    let fresh = MacAddr::new([0x02, 0, 0, 0, 0, 2]);
    tracker.registry().upsert(stale, 1, -50, 0).unwrap();
    tracker.registry().upsert(fresh, 1, -50, 95).unwrap();
    clock.set(100);

    let recorder = Arc::new(Recorder::default());
    let handle = tracker.spawn(Some(recorder.clone())).unwrap();
    assert!(wait_for(|| !recorder.passes.lock().unwrap().is_empty()));
    handle.shutdown().unwrap();

    assert_eq!(tracker.snapshot().iter().map(|r| r.identity).collect::<Vec<_>>(), vec![fresh]);
    let passes = recorder.passes.lock().unwrap();
    let (first, roster) = &passes[0];
    assert_eq!(first.removed, 1);
    assert_eq!(first.remaining, 1);
    assert_eq!(first.at, 100);
    assert_eq!(roster[0].identity, fresh);
    assert!(passes
        .iter()
        .all(|(_, r)| r.iter().all(|rec| 100 - rec.last_seen <= 10)));
}

// ── Queue behaviour ──────────────────────────────────────────────────

#[test]
fn full_queue_rejects_without_blocking_or_corruption() {
    let q = FrameQueue::with_capacity(4);
    let events: Vec<_> = (0..4u8)
        .map(|n| frame(MacAddr::new([0x02, 0, 0, 0, 0, n]), 1, -50, n as u64))
        .collect();
    for ev in &events {
        q.enqueue(*ev, Duration::ZERO).unwrap();
    }

    let extra = frame(STATION, 6, -40, 99);
    let start = Instant::now();
    assert_eq!(q.enqueue(extra, Duration::ZERO), Err(EnqueueError::Full(extra)));
    assert!(start.elapsed() < Duration::from_millis(500));

    for ev in &events {
        assert_eq!(q.dequeue(Duration::ZERO).unwrap(), *ev);
    }
}

#[test]
fn burst_beyond_capacity_is_counted_not_fatal() {
    let tracker = StationTracker::new(
        TrackerConfig {
            queue_capacity: 4,
            ..config()
        },
        IdentityFilter::allow_all(),
    )
    .unwrap();
    let ingress = tracker.ingress();

    let accepted = (0..10u8)
        .filter(|&n| ingress.offer(MacAddr::new([0x02, 0, 0, 0, 0, n]), 1, -50, 0))
        .count();
    assert_eq!(accepted, 4);
    assert_eq!(tracker.stats().dropped, 6);

    let handle = tracker.spawn(None).unwrap();
    handle.shutdown().unwrap();
    assert_eq!(tracker.count(), 4);
}

// ── Concurrency ──────────────────────────────────────────────────────

#[test]
fn concurrent_producers_lose_no_stations() {
    let tracker = StationTracker::new(
        TrackerConfig {
            queue_capacity: 16,
            ..config()
        },
        IdentityFilter::allow_all(),
    )
    .unwrap();
    let handle = tracker.spawn(None).unwrap();

    let producers: Vec<_> = (0..4u8)
        .map(|p| {
            let ingress = tracker.ingress();
            thread::spawn(move || {
                for i in 0..50u8 {
                    let ev = frame(MacAddr::new([0x02, 0, 0, 0, p, i]), 1, -50, ingress.now_ms());
                    ingress.send(ev, Duration::from_secs(5)).unwrap();
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }
    handle.shutdown().unwrap();

    let snap = tracker.snapshot();
    assert_eq!(snap.len(), 200);
    let unique: HashSet<_> = snap.iter().map(|r| r.identity).collect();
    assert_eq!(unique.len(), 200);
}

#[test]
fn shutdown_closes_ingress() {
    let tracker = StationTracker::new(config(), IdentityFilter::allow_all()).unwrap();
    let ingress = tracker.ingress();
    let handle = tracker.spawn(None).unwrap();
    handle.shutdown().unwrap();

    assert!(matches!(
        ingress.send(frame(STATION, 1, -50, 0), Duration::from_millis(10)),
        Err(EnqueueError::Closed(_))
    ));
    assert!(!ingress.offer(STATION, 1, -50, 0));
}
