//! Common model-level constants.

/// Intervals below this threshold (in milliseconds) are accepted but logged as a warning.
///
/// Refreshing a slot more often than once per second is almost always a configuration mistake.
pub const LOW_INTERVAL_WARN_MS: u64 = 1_000;

/// Tag used as the prefix of generated element ids when the caller provides none.
pub const DEFAULT_ELEMENT_TAG: &str = "gpt-ad";
