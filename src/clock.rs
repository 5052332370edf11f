//! Monotonic millisecond time sources.
//!
//! The pipeline only ever sees 64-bit milliseconds. Producers sitting on a
//! 32-bit hardware tick counter widen it with [`TickExtender`] or wrap the
//! counter in a [`TickClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// A monotonic millisecond clock with an arbitrary epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Host clock: milliseconds since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Externally driven clock for simulations and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub const fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Widens a wrapping 32-bit counter into a 64-bit one.
///
/// Must be fed at least once per wrap period; a reading lower than the previous
/// one is taken to mean exactly one wrap.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickExtender {
    last_low: u32,
    high: u32,
}

impl TickExtender {
    pub const fn new() -> Self {
        Self {
            last_low: 0,
            high: 0,
        }
    }

    pub fn extend(&mut self, low: u32) -> u64 {
        if low < self.last_low {
            self.high = self.high.wrapping_add(1);
        }
        self.last_low = low;
        ((self.high as u64) << 32) | low as u64
    }
}

/// A [`Clock`] over a 32-bit tick source, e.g. an RTOS tick count.
pub struct TickClock<F> {
    read_ticks: F,
    tick_rate_hz: u64,
    extender: Mutex<TickExtender>,
}

impl<F> TickClock<F>
where
    F: Fn() -> u32 + Send + Sync,
{
    /// `tick_rate_hz` is clamped to at least 1.
    pub fn new(read_ticks: F, tick_rate_hz: u32) -> Self {
        Self {
            read_ticks,
            tick_rate_hz: u64::from(tick_rate_hz.max(1)),
            extender: Mutex::new(TickExtender::new()),
        }
    }

    /// Milliseconds for a widened tick count. Exact for any tick rate.
    pub fn ticks_to_ms(&self, ticks: u64) -> u64 {
        (u128::from(ticks) * 1000 / u128::from(self.tick_rate_hz)) as u64
    }
}

impl<F> Clock for TickClock<F>
where
    F: Fn() -> u32 + Send + Sync,
{
    fn now_ms(&self) -> u64 {
        // Read under the lock so concurrent callers feed the extender in order.
        let mut ext = self.extender.lock().unwrap_or_else(PoisonError::into_inner);
        let ticks = ext.extend((self.read_ticks)());
        self.ticks_to_ms(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn extender_passes_through_before_wrap() {
        let mut ext = TickExtender::new();
        assert_eq!(ext.extend(5), 5);
        assert_eq!(ext.extend(1_000), 1_000);
        assert_eq!(ext.extend(u32::MAX), u32::MAX as u64);
    }

    #[test]
    fn extender_carries_on_wrap() {
        let mut ext = TickExtender::new();
        ext.extend(u32::MAX - 1);
        assert_eq!(ext.extend(3), (1u64 << 32) | 3);
        ext.extend(u32::MAX);
        assert_eq!(ext.extend(0), 2u64 << 32);
    }

    #[test]
    fn extender_equal_reading_is_not_a_wrap() {
        let mut ext = TickExtender::new();
        ext.extend(42);
        assert_eq!(ext.extend(42), 42);
    }

    #[test]
    fn tick_clock_is_monotonic_across_wrap() {
        let ticks = AtomicU32::new(u32::MAX - 2);
        let clock = TickClock::new(|| ticks.load(Ordering::SeqCst), 100);
        let before = clock.now_ms();
        ticks.store(7, Ordering::SeqCst);
        let after = clock.now_ms();
        assert!(after > before);
        assert_eq!(after, ((1u64 << 32) | 7) * 10);
    }

    #[test]
    fn tick_clock_converts_uneven_rates_exactly() {
        let ticks = AtomicU32::new(300);
        let clock = TickClock::new(|| ticks.load(Ordering::SeqCst), 300);
        assert_eq!(clock.now_ms(), 1_000);
        ticks.store(3_000, Ordering::SeqCst);
        assert_eq!(clock.now_ms(), 10_000);

        let fast = TickClock::new(|| 0, 2_000);
        assert_eq!(fast.ticks_to_ms(2_000), 1_000);
        assert_eq!(fast.ticks_to_ms(1), 0);
        assert_eq!(fast.ticks_to_ms(u64::MAX), u64::MAX / 2);
    }

    #[test]
    fn tick_clock_zero_rate_is_clamped() {
        let clock = TickClock::new(|| 5, 0);
        assert_eq!(clock.now_ms(), 5_000);
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_ms(), 100);
        clock.advance(50);
        assert_eq!(clock.now_ms(), 150);
        clock.set(10);
        assert_eq!(clock.now_ms(), 10);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
