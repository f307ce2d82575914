use std::{fmt, str::FromStr};

use crate::error::{ModelError, ModelResult};

/// Unit suffix accepted in interval strings.
///
/// A string without a suffix is read as milliseconds.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DurationUnit {
    /// `ms`
    #[default]
    Millis,
    /// `s`
    Seconds,
    /// `min`
    Minutes,
    /// `h`
    Hours,
}

impl DurationUnit {
    /// Number of milliseconds in one unit.
    pub const fn factor_ms(&self) -> u64 {
        match self {
            DurationUnit::Millis => 1,
            DurationUnit::Seconds => 1_000,
            DurationUnit::Minutes => 60_000,
            DurationUnit::Hours => 3_600_000,
        }
    }
}

impl FromStr for DurationUnit {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "ms" => Ok(DurationUnit::Millis),
            "s" => Ok(DurationUnit::Seconds),
            "min" => Ok(DurationUnit::Minutes),
            "h" => Ok(DurationUnit::Hours),
            other => Err(ModelError::InvalidDuration(other.to_string())),
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DurationUnit::Millis => "ms",
            DurationUnit::Seconds => "s",
            DurationUnit::Minutes => "min",
            DurationUnit::Hours => "h",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors() {
        assert_eq!(DurationUnit::Millis.factor_ms(), 1);
        assert_eq!(DurationUnit::Seconds.factor_ms(), 1_000);
        assert_eq!(DurationUnit::Minutes.factor_ms(), 60_000);
        assert_eq!(DurationUnit::Hours.factor_ms(), 3_600_000);
    }

    #[test]
    fn parses_case_insensitive() {
        assert_eq!("MIN".parse::<DurationUnit>().unwrap(), DurationUnit::Minutes);
        assert_eq!("H".parse::<DurationUnit>().unwrap(), DurationUnit::Hours);
        assert_eq!("".parse::<DurationUnit>().unwrap(), DurationUnit::Millis);
    }

    #[test]
    fn rejects_unknown_unit() {
        for bad in ["m", "sec", "d", "hours"] {
            assert!(bad.parse::<DurationUnit>().is_err(), "{bad} must be rejected");
        }
    }
}
