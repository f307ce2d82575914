use std::{env, fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use slotline_core::SchedulerConfig;
use slotline_model::RefreshInterval;
use slotline_observe::LoggerConfig;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV: &str = "SLOTLINE_CONFIG";

const DEMO_AD_UNIT: &str = "/slotline/demo";

/// Daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub logger: LoggerConfig,
    pub scheduler: SchedulerConfig,
    pub slots: Vec<SlotDecl>,
}

/// One slot to define at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotDecl {
    /// Container element id; generated when absent.
    pub id: Option<String>,
    pub ad_unit: String,
    /// Periodic refresh, number of ms or a duration string.
    pub refresh: Option<RefreshInterval>,
    /// Start with the container hidden.
    pub hidden: bool,
}

impl Default for SlotDecl {
    fn default() -> Self {
        Self {
            id: None,
            ad_unit: DEMO_AD_UNIT.to_string(),
            refresh: None,
            hidden: false,
        }
    }
}

impl AgentConfig {
    /// Load from the file named by [`CONFIG_ENV`], or the built-in demo when unset.
    pub fn load() -> anyhow::Result<Self> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::demo()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Three slots: a batched leaderboard, a 30 s sidebar, and a hidden footer on a 10 s timer.
    pub fn demo() -> Self {
        Self {
            logger: LoggerConfig::default(),
            scheduler: SchedulerConfig::single_request(),
            slots: vec![
                SlotDecl {
                    id: Some("leaderboard".into()),
                    ..Default::default()
                },
                SlotDecl {
                    id: Some("sidebar".into()),
                    refresh: Some(RefreshInterval::text("30s")),
                    ..Default::default()
                },
                SlotDecl {
                    refresh: Some(RefreshInterval::millis(10_000)),
                    hidden: true,
                    ..Default::default()
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_mixed_interval_forms() {
        let json = r#"{
            "scheduler": {"singleRequestMode": true, "batchWindowMs": 50},
            "slots": [
                {"id": "top", "refresh": "1.5min"},
                {"refresh": 45000, "hidden": true},
                {"adUnit": "/1/side"}
            ]
        }"#;
        let cfg: AgentConfig = serde_json::from_str(json).unwrap();

        assert!(cfg.scheduler.single_request_mode);
        assert_eq!(cfg.scheduler.batch_window_ms, 50);
        assert_eq!(cfg.slots.len(), 3);
        assert_eq!(
            cfg.slots[0].refresh.as_ref().unwrap().to_duration().unwrap().as_millis(),
            90_000
        );
        assert_eq!(cfg.slots[1].refresh, Some(RefreshInterval::millis(45_000)));
        assert!(cfg.slots[1].hidden);
        assert_eq!(cfg.slots[2].ad_unit, "/1/side");
        assert!(cfg.slots[2].id.is_none());
    }

    #[test]
    fn interval_type_is_checked_at_parse_time() {
        let json = r#"{"slots": [{"refresh": true}]}"#;
        assert!(serde_json::from_str::<AgentConfig>(json).is_err());

        // Text is resolved when the slot is scheduled.
        let json = r#"{"slots": [{"refresh": "soon"}]}"#;
        let cfg: AgentConfig = serde_json::from_str(json).unwrap();
        assert!(cfg.slots[0].refresh.as_ref().unwrap().to_duration().is_err());
    }

    #[test]
    fn demo_is_valid() {
        let cfg = AgentConfig::demo();
        assert_eq!(cfg.slots.len(), 3);
        for slot in &cfg.slots {
            if let Some(interval) = &slot.refresh {
                interval.to_duration().unwrap();
            }
        }
    }

    #[test]
    fn missing_file_is_reported() {
        let err = AgentConfig::from_file(Path::new("/nonexistent/slotline.json")).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }
}
