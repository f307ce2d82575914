mod domain;
pub use domain::{AdSlot, DefinedSlot, DurationMs, SlotHandle, SlotKey};
pub use domain::{DEFAULT_ELEMENT_TAG, LOW_INTERVAL_WARN_MS};

mod error;
pub use error::{ModelError, ModelResult};

mod interval;
pub use interval::{DurationUnit, RefreshInterval, parse_duration};
