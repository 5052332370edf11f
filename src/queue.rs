/// Bounded FIFO mailbox between the capture source and the frame processor.
///
/// Storage is preallocated at construction and never grows, so enqueueing
/// never allocates. Producers in latency-critical contexts use
/// [`FrameQueue::try_enqueue`], which never waits for space; a full queue
/// rejects the event and counts it as dropped. The consumer never loses data:
/// after [`FrameQueue::close`] it still drains every queued event before
/// seeing [`DequeueError::Closed`].
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{DequeueError, EnqueueError};
use crate::station::FrameEvent;

struct QueueState {
    items: VecDeque<FrameEvent>,
    closed: bool,
}

pub struct FrameQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    dropped: AtomicU64,
}

impl FrameQueue {
    /// Create a queue holding at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `event`, waiting up to `timeout` for space.
    ///
    /// A zero timeout behaves like [`try_enqueue`](Self::try_enqueue).
    pub fn enqueue(&self, event: FrameEvent, timeout: Duration) -> Result<(), EnqueueError> {
        if timeout.is_zero() {
            return self.try_enqueue(event);
        }

        let guard = self.lock();
        let (mut state, _) = self
            .not_full
            .wait_timeout_while(guard, timeout, |s| {
                !s.closed && s.items.len() >= self.capacity
            })
            .unwrap_or_else(PoisonError::into_inner);

        self.push_locked(&mut state, event)
    }

    /// Append `event` only if there is room right now. Never waits for space.
    pub fn try_enqueue(&self, event: FrameEvent) -> Result<(), EnqueueError> {
        let mut state = self.lock();
        self.push_locked(&mut state, event)
    }

    fn push_locked(&self, state: &mut QueueState, event: FrameEvent) -> Result<(), EnqueueError> {
        if state.closed {
            return Err(EnqueueError::Closed(event));
        }
        if state.items.len() >= self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(EnqueueError::Full(event));
        }
        state.items.push_back(event);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Take the oldest event, waiting up to `timeout` for one to arrive.
    pub fn dequeue(&self, timeout: Duration) -> Result<FrameEvent, DequeueError> {
        let guard = self.lock();
        let (mut state, _) = self
            .not_empty
            .wait_timeout_while(guard, timeout, |s| !s.closed && s.items.is_empty())
            .unwrap_or_else(PoisonError::into_inner);

        match state.items.pop_front() {
            Some(event) => {
                self.not_full.notify_one();
                Ok(event)
            }
            None if state.closed => Err(DequeueError::Closed),
            None => Err(DequeueError::Timeout),
        }
    }

    /// Reject further enqueues and wake every waiter. Queued events remain
    /// available to `dequeue`.
    pub fn close(&self) {
        self.lock().closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events rejected because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
