//! Notification stream of completed dispatches.
//!
//! Scheduling calls get their own [`crate::Completion`]; this stream is the
//! separate, multi-consumer channel for everything the scheduler dispatches,
//! periodic refreshes included.
mod observer;
pub use observer::{Observe, spawn_observer};

use std::fmt;

use slotline_model::{SlotHandle, SlotKey};

/// What kind of dispatch produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshKind {
    /// Initial load of a slot was enqueued (directly or through a batch flush).
    Init,
    /// A refresh of an already loaded slot was enqueued.
    Refresh,
}

impl RefreshKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshKind::Init => "init",
            RefreshKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for RefreshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch notification carrying the slot it concerns.
#[derive(Debug, Clone)]
pub struct RefreshEvent {
    pub kind: RefreshKind,
    pub slot: SlotHandle,
}

impl RefreshEvent {
    pub(crate) fn init(slot: SlotHandle) -> Self {
        Self {
            kind: RefreshKind::Init,
            slot,
        }
    }

    pub(crate) fn refresh(slot: SlotHandle) -> Self {
        Self {
            kind: RefreshKind::Refresh,
            slot,
        }
    }

    /// Identity of the slot this event is about.
    pub fn key(&self) -> SlotKey {
        self.slot.key()
    }
}
