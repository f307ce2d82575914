use slotline_model::{RefreshInterval, SlotHandle};

/// One scheduling call: which slot, whether this is its first load, and an optional period.
#[derive(Debug, Clone)]
pub struct RefreshRequest {
    pub slot: SlotHandle,
    /// Periodic refresh interval; `None` leaves the slot without a timer.
    pub interval: Option<RefreshInterval>,
    /// First load of the slot. Only initial loads are batched in single-request mode.
    pub initial: bool,
}

impl RefreshRequest {
    /// First load of `slot`.
    pub fn initial(slot: SlotHandle) -> Self {
        Self {
            slot,
            interval: None,
            initial: true,
        }
    }

    /// Refresh of an already loaded `slot`.
    pub fn refresh(slot: SlotHandle) -> Self {
        Self {
            slot,
            interval: None,
            initial: false,
        }
    }

    /// Keep refreshing the slot every `interval`.
    pub fn every(mut self, interval: impl Into<RefreshInterval>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    /// Replace the interval.
    pub fn with_interval(mut self, interval: Option<RefreshInterval>) -> Self {
        self.interval = interval;
        self
    }
}
