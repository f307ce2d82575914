//! Refresh interval input and its normalization into a millisecond [`Duration`](std::time::Duration).
mod parse;
pub use parse::parse_duration;

mod unit;
pub use unit::DurationUnit;

mod value;
pub use value::RefreshInterval;
