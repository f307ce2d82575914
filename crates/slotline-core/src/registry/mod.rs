//! Per-slot periodic timer table.
//!
//! Holds at most one live timer per [`SlotKey`]: installing a timer for a key
//! that already has one stops the previous timer in the same call.
mod timer;
pub use timer::TimerHandle;

use std::{collections::HashMap, time::Duration};

use slotline_model::SlotKey;
use tracing::trace;

use crate::error::SchedulerError;

/// Live periodic timer of one slot.
#[derive(Debug)]
pub struct IntervalEntry {
    timer: TimerHandle,
    period: Duration,
}

impl IntervalEntry {
    /// Refresh period of this timer.
    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Mapping from slot identity to its periodic refresh timer.
#[derive(Debug, Default)]
pub struct IntervalRegistry {
    entries: HashMap<SlotKey, IntervalEntry>,
}

impl IntervalRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a timer is registered for `key`.
    pub fn has(&self, key: &SlotKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Period of the timer registered for `key`, if any.
    pub fn period(&self, key: &SlotKey) -> Option<Duration> {
        self.entries.get(key).map(IntervalEntry::period)
    }

    /// Install `timer` for `key`.
    ///
    /// A previously registered timer for the same key is stopped before this returns.
    /// Returns `true` if a timer was replaced.
    pub fn set(&mut self, key: SlotKey, timer: TimerHandle, period: Duration) -> bool {
        trace!(slot = %key, period_ms = period.as_millis() as u64, "interval registered");
        match self.entries.insert(key, IntervalEntry { timer, period }) {
            Some(prev) => {
                prev.timer.stop();
                true
            }
            None => false,
        }
    }

    /// Stop and remove the timer registered for `key`.
    ///
    /// Fails with [`SchedulerError::NoInterval`] when nothing is registered:
    /// cancelling a timer that does not exist is a caller bug, not a no-op.
    pub fn cancel(&mut self, key: &SlotKey) -> Result<(), SchedulerError> {
        let entry = self
            .entries
            .remove(key)
            .ok_or_else(|| SchedulerError::NoInterval(key.clone()))?;
        entry.timer.stop();
        trace!(slot = %key, "interval cancelled");
        Ok(())
    }

    /// Stop and remove the timer for `key` if present.
    ///
    /// Teardown path: never fails, returns whether something was removed.
    pub fn release(&mut self, key: &SlotKey) -> bool {
        self.entries
            .remove(key)
            .map(|entry| entry.timer.stop())
            .is_some()
    }

    /// Stop every timer. Returns how many were stopped.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        for (_, entry) in self.entries.drain() {
            entry.timer.stop();
        }
        n
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no timer is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> SlotKey {
        SlotKey::from(s)
    }

    #[test]
    fn set_then_has() {
        let mut reg = IntervalRegistry::new();
        assert!(!reg.has(&key("a")));

        let replaced = reg.set(key("a"), TimerHandle::new(), Duration::from_secs(10));
        assert!(!replaced);
        assert!(reg.has(&key("a")));
        assert_eq!(reg.period(&key("a")), Some(Duration::from_secs(10)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn set_stops_previous_timer() {
        let mut reg = IntervalRegistry::new();

        let first = TimerHandle::new();
        let first_token = first.token();
        reg.set(key("a"), first, Duration::from_secs(10));

        let second = TimerHandle::new();
        let second_token = second.token();
        let replaced = reg.set(key("a"), second, Duration::from_secs(60));

        assert!(replaced);
        assert!(first_token.is_cancelled(), "old timer must be stopped");
        assert!(!second_token.is_cancelled());
        assert_eq!(reg.period(&key("a")), Some(Duration::from_secs(60)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn cancel_missing_is_an_error() {
        let mut reg = IntervalRegistry::new();
        match reg.cancel(&key("ghost")) {
            Err(SchedulerError::NoInterval(k)) => assert_eq!(k, key("ghost")),
            other => panic!("expected NoInterval, got {other:?}"),
        }
    }

    #[test]
    fn cancel_stops_and_removes() {
        let mut reg = IntervalRegistry::new();
        let timer = TimerHandle::new();
        let token = timer.token();
        reg.set(key("a"), timer, Duration::from_secs(5));

        reg.cancel(&key("a")).unwrap();
        assert!(token.is_cancelled());
        assert!(!reg.has(&key("a")));

        assert!(matches!(
            reg.cancel(&key("a")),
            Err(SchedulerError::NoInterval(_))
        ));
    }

    #[test]
    fn release_is_silent() {
        let mut reg = IntervalRegistry::new();
        assert!(!reg.release(&key("a")));

        reg.set(key("a"), TimerHandle::new(), Duration::from_secs(5));
        assert!(reg.release(&key("a")));
        assert!(reg.is_empty());
    }

    #[test]
    fn clear_stops_everything() {
        let mut reg = IntervalRegistry::new();
        let tokens: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|k| {
                let t = TimerHandle::new();
                let token = t.token();
                reg.set(key(k), t, Duration::from_secs(1));
                token
            })
            .collect();

        assert_eq!(reg.clear(), 3);
        assert!(reg.is_empty());
        assert!(tokens.iter().all(|t| t.is_cancelled()));
    }

    #[test]
    fn dropping_handle_stops_timer() {
        let timer = TimerHandle::new();
        let token = timer.token();
        drop(timer);
        assert!(token.is_cancelled());
    }
}
