//! Debounced batching of initial loads under single-request mode.
//!
//! Every initial load arriving while a batch is pending is appended to it
//! (deduplicated by [`SlotKey`]) and restarts the flush window. The batch is
//! flushed once the window elapses without new arrivals, as one network request.
use std::time::Duration;

use slotline_model::{SlotHandle, SlotKey};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::registry::TimerHandle;

/// Default debounce window, in milliseconds.
pub const DEFAULT_BATCH_WINDOW_MS: u64 = 100;

/// Completion side of a scheduling call waiting for the flush.
pub(crate) type Waiter = oneshot::Sender<SlotHandle>;

/// Pending initial loads plus the single outstanding flush timer.
#[derive(Debug)]
pub struct SingleRequestBatcher {
    window: Duration,
    /// Deduplicated slots in first-seen order.
    pending: Vec<SlotHandle>,
    /// One entry per scheduling call, resolved on flush.
    waiters: Vec<(SlotHandle, Waiter)>,
    flush: Option<TimerHandle>,
}

/// Slots taken out of the batcher for one flush.
#[derive(Debug)]
pub struct Batch {
    slots: Vec<SlotHandle>,
    waiters: Vec<(SlotHandle, Waiter)>,
}

impl Batch {
    /// Slots to dispatch, in first-seen order.
    pub fn slots(&self) -> &[SlotHandle] {
        &self.slots
    }

    /// Resolve every waiting scheduling call and hand the slots back.
    pub(crate) fn resolve(self) -> Vec<SlotHandle> {
        for (slot, waiter) in self.waiters {
            // Receiver dropped: caller no longer interested.
            let _ = waiter.send(slot);
        }
        self.slots
    }
}

impl SingleRequestBatcher {
    /// Create an empty batcher with the given debounce window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Vec::new(),
            waiters: Vec::new(),
            flush: None,
        }
    }

    /// Debounce window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Add `slot` to the pending set.
    ///
    /// A slot already pending (same key) is not added twice; its waiter is still recorded.
    /// Returns `true` if the slot was newly added.
    pub(crate) fn enqueue_initial(&mut self, slot: SlotHandle, waiter: Option<Waiter>) -> bool {
        let key = slot.key();
        let added = !self.contains(&key);
        if added {
            self.pending.push(SlotHandle::clone(&slot));
        }
        if let Some(waiter) = waiter {
            self.waiters.push((slot, waiter));
        }
        added
    }

    /// Restart the flush timer.
    ///
    /// The previous timer (if any) is stopped; the returned token belongs to the new one.
    pub fn rearm(&mut self) -> CancellationToken {
        let timer = TimerHandle::new();
        let token = timer.token();
        if let Some(prev) = self.flush.replace(timer) {
            prev.stop();
        }
        token
    }

    /// Take the pending batch for the timer owning `token`.
    ///
    /// Returns `None` when that timer has been superseded or the batch is empty.
    pub fn take(&mut self, token: &CancellationToken) -> Option<Batch> {
        if token.is_cancelled() {
            return None;
        }
        self.flush = None;
        if self.pending.is_empty() {
            return None;
        }
        Some(Batch {
            slots: std::mem::take(&mut self.pending),
            waiters: std::mem::take(&mut self.waiters),
        })
    }

    /// Drop `key` from the pending set. Its waiters resolve with [`crate::SchedulerError::Closed`].
    ///
    /// Stops the flush timer when nothing is left to flush.
    pub fn remove(&mut self, key: &SlotKey) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| &s.key() != key);
        self.waiters.retain(|(s, _)| &s.key() != key);
        if self.pending.is_empty() {
            self.stop();
        }
        self.pending.len() != before
    }

    /// Discard the pending batch and stop the flush timer.
    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        self.waiters.clear();
        self.stop();
        n
    }

    /// Returns `true` if `key` is pending.
    pub fn contains(&self, key: &SlotKey) -> bool {
        self.pending.iter().any(|s| &s.key() == key)
    }

    /// Number of distinct pending slots.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns `true` while a flush timer is outstanding.
    pub fn is_armed(&self) -> bool {
        self.flush.as_ref().is_some_and(|t| !t.is_stopped())
    }

    fn stop(&mut self) {
        if let Some(timer) = self.flush.take() {
            timer.stop();
        }
    }
}

impl Default for SingleRequestBatcher {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_BATCH_WINDOW_MS))
    }
}
