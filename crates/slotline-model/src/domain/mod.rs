mod constants;
pub use constants::{DEFAULT_ELEMENT_TAG, LOW_INTERVAL_WARN_MS};

mod key;
pub use key::SlotKey;

mod slot;
pub use slot::{AdSlot, DefinedSlot, SlotHandle};

/// Duration value in milliseconds.
///
/// Used for refresh intervals and debounce windows where config carries plain integers.
pub type DurationMs = u64;
