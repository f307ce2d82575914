use std::time::Duration;

use serde::{Deserialize, Serialize};
use slotline_model::DurationMs;

use crate::batcher::DEFAULT_BATCH_WINDOW_MS;

/// Default buffer of the notification channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Refresh scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Batch initial loads into one network request.
    pub single_request_mode: bool,
    /// Quiet period after the last initial load before a batch is flushed.
    pub batch_window_ms: DurationMs,
    /// Notification channel buffer; slow observers beyond it lose the oldest events.
    pub event_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            single_request_mode: false,
            batch_window_ms: DEFAULT_BATCH_WINDOW_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    /// Config with single-request mode enabled and default timings.
    pub fn single_request() -> Self {
        Self {
            single_request_mode: true,
            ..Self::default()
        }
    }

    /// Batch debounce window.
    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = SchedulerConfig::default();
        assert!(!cfg.single_request_mode);
        assert_eq!(cfg.batch_window(), Duration::from_millis(100));
        assert_eq!(cfg.event_capacity, 256);
    }

    #[test]
    fn serde_uses_defaults_for_missing_fields() {
        let cfg: SchedulerConfig = serde_json::from_str(r#"{"singleRequestMode": true}"#).unwrap();
        assert!(cfg.single_request_mode);
        assert_eq!(cfg.batch_window_ms, 100);
        assert_eq!(cfg.event_capacity, 256);
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = SchedulerConfig {
            single_request_mode: true,
            batch_window_ms: 250,
            event_capacity: 16,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"batchWindowMs\":250"));

        let back: SchedulerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
