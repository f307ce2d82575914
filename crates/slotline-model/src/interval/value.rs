use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::{
    DurationMs,
    error::{ModelError, ModelResult},
    interval::parse::{checked, millis_from_number, millis_from_text},
};

/// Refresh interval as supplied by the caller.
///
/// Kept in its raw form until the scheduler needs it, so a malformed string
/// surfaces as an error from the scheduling call that uses it.
///
/// Deserializes from a JSON number (milliseconds) or a string with an optional unit (`"30s"`).
/// Any other JSON type is rejected with [`ModelError::TypeMismatch`], `null` with [`ModelError::InvalidDuration`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum RefreshInterval {
    /// Plain millisecond count.
    Millis(DurationMs),
    /// Decimal number with an optional unit suffix (`ms`, `s`, `min`, `h`).
    Text(String),
}

impl RefreshInterval {
    /// Interval from a millisecond count.
    pub const fn millis(ms: DurationMs) -> Self {
        Self::Millis(ms)
    }

    /// Interval from a string such as `"30s"`; validated on [`RefreshInterval::to_duration`].
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Resolve into a [`Duration`].
    ///
    /// Warns (does not fail) when the result is below one second.
    pub fn to_duration(&self) -> ModelResult<Duration> {
        let ms = match self {
            RefreshInterval::Millis(ms) => *ms,
            RefreshInterval::Text(s) => millis_from_text(s)?,
        };
        Ok(checked(self, ms))
    }
}

impl From<DurationMs> for RefreshInterval {
    fn from(ms: DurationMs) -> Self {
        Self::Millis(ms)
    }
}

impl From<Duration> for RefreshInterval {
    fn from(d: Duration) -> Self {
        Self::Millis(d.as_millis() as DurationMs)
    }
}

impl From<&str> for RefreshInterval {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RefreshInterval {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl FromStr for RefreshInterval {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        millis_from_text(s)?;
        Ok(Self::Text(s.trim().to_string()))
    }
}

impl TryFrom<Value> for RefreshInterval {
    type Error = ModelError;
    fn try_from(v: Value) -> ModelResult<Self> {
        match v {
            Value::Null => Err(ModelError::InvalidDuration("null".into())),
            Value::Number(n) => millis_from_number(&n).map(Self::Millis),
            Value::String(s) => Ok(Self::Text(s)),
            other => Err(ModelError::TypeMismatch(other.to_string())),
        }
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshInterval::Millis(ms) => write!(f, "{ms}"),
            RefreshInterval::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for RefreshInterval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RefreshInterval::Millis(ms) => serializer.serialize_u64(*ms),
            RefreshInterval::Text(s) => serializer.serialize_str(s),
        }
    }
}
