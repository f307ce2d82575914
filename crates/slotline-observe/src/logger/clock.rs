use std::{
    fmt,
    str::FromStr,
    sync::{OnceLock, RwLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use super::LoggerError;

/// Cached local offset; UTC until detected.
static LOCAL_OFFSET: RwLock<UtcOffset> = RwLock::new(UtcOffset::UTC);
static DETECTED: OnceLock<()> = OnceLock::new();

/// Time zone of log timestamps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoggerTimeZone {
    #[default]
    Utc,
    /// System time zone, detected once.
    Local,
}

impl LoggerTimeZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerTimeZone::Utc => "utc",
            LoggerTimeZone::Local => "local",
        }
    }

    fn offset(&self) -> UtcOffset {
        match self {
            LoggerTimeZone::Utc => UtcOffset::UTC,
            LoggerTimeZone::Local => local_offset(),
        }
    }
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LoggerTimeZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LoggerTimeZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Detect the local UTC offset.
///
/// Call in `main()` before any thread is spawned (before the Tokio runtime):
/// most Unix platforms refuse detection in multi-threaded processes.
/// Falls back to UTC silently.
///
/// ```no_run
/// use slotline_observe::init_local_offset;
///
/// fn main() {
///     init_local_offset();
///     // build the runtime afterwards
/// }
/// ```
pub fn init_local_offset() {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    store_offset(offset);
    let _ = DETECTED.set(());
}

fn store_offset(offset: UtcOffset) {
    if let Ok(mut guard) = LOCAL_OFFSET.write() {
        *guard = offset;
    }
}

fn local_offset() -> UtcOffset {
    DETECTED.get_or_init(|| match UtcOffset::current_local_offset() {
        Ok(offset) => store_offset(offset),
        Err(_) => eprintln!(
            "slotline-observe: local offset unavailable, timestamps fall back to UTC \
             (call init_local_offset() before starting the runtime)"
        ),
    });
    LOCAL_OFFSET.read().map(|g| *g).unwrap_or(UtcOffset::UTC)
}

/// RFC 3339 timestamps in the configured time zone.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rfc3339Timer {
    pub(crate) tz: LoggerTimeZone,
}

impl Rfc3339Timer {
    fn render(&self, at: OffsetDateTime) -> String {
        at.to_offset(self.tz.offset())
            .format(&Rfc3339)
            .unwrap_or_else(|_| "<invalid-time>".to_string())
    }
}

impl FormatTime for Rfc3339Timer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{} ", self.render(OffsetDateTime::now_utc()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitive() {
        assert_eq!("UTC".parse::<LoggerTimeZone>().unwrap(), LoggerTimeZone::Utc);
        assert_eq!("Local".parse::<LoggerTimeZone>().unwrap(), LoggerTimeZone::Local);
        assert!("pst".parse::<LoggerTimeZone>().is_err());
        assert!("".parse::<LoggerTimeZone>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&LoggerTimeZone::Local).unwrap(), r#""local""#);
        let tz: LoggerTimeZone = serde_json::from_str(r#""UTC""#).unwrap();
        assert_eq!(tz, LoggerTimeZone::Utc);
    }

    #[test]
    fn utc_timer_renders_zulu() {
        let timer = Rfc3339Timer { tz: LoggerTimeZone::Utc };
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(timer.render(at), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn local_offset_is_sane_after_init() {
        init_local_offset();
        assert!(local_offset().whole_hours().abs() <= 14);
    }
}
