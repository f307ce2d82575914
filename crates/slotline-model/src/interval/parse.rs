use std::{fmt, sync::LazyLock, time::Duration};

use regex::Regex;
use serde_json::{Number, Value};
use tracing::warn;

use crate::{
    LOW_INTERVAL_WARN_MS,
    error::{ModelError, ModelResult},
    interval::DurationUnit,
};

/// Decimal number followed by an optional unit suffix, e.g. `30s`, `1.5min`, `250`.
static INTERVAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d*\.?\d+)\s*(ms|s|min|h)?\s*$").expect("interval pattern must compile")
});

/// Parse a loosely typed interval value into a [`Duration`].
///
/// Accepted inputs:
/// - a JSON number: already milliseconds (negative or fractional-negative values are rejected);
/// - a JSON string: decimal number with an optional `ms | s | min | h` suffix, milliseconds when omitted.
///
/// Errors:
/// - [`ModelError::InvalidDuration`] for `null` or strings without a numeric component;
/// - [`ModelError::TypeMismatch`] for anything that is neither a number nor a string.
///
/// Values below [`LOW_INTERVAL_WARN_MS`] are accepted but logged at `warn`.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use slotline_model::parse_duration;
///
/// assert_eq!(parse_duration(&json!("2min")).unwrap().as_millis(), 120_000);
/// assert_eq!(parse_duration(&json!(500)).unwrap().as_millis(), 500);
/// assert!(parse_duration(&json!(null)).is_err());
/// ```
pub fn parse_duration(input: &Value) -> ModelResult<Duration> {
    let ms = match input {
        Value::Null => return Err(ModelError::InvalidDuration("null".into())),
        Value::Number(n) => millis_from_number(n)?,
        Value::String(s) => millis_from_text(s)?,
        other => return Err(ModelError::TypeMismatch(other.to_string())),
    };
    Ok(checked(input, ms))
}

pub(crate) fn millis_from_number(n: &Number) -> ModelResult<u64> {
    if let Some(ms) = n.as_u64() {
        return Ok(ms);
    }
    match n.as_f64() {
        Some(ms) if ms.is_finite() && ms >= 0.0 => Ok(ms as u64),
        _ => Err(ModelError::InvalidDuration(n.to_string())),
    }
}

pub(crate) fn millis_from_text(s: &str) -> ModelResult<u64> {
    let caps = INTERVAL_PATTERN
        .captures(s)
        .ok_or_else(|| ModelError::InvalidDuration(s.to_string()))?;

    let value: f64 = caps[1]
        .parse()
        .map_err(|_| ModelError::InvalidDuration(s.to_string()))?;
    let unit = match caps.get(2) {
        Some(m) => m.as_str().parse::<DurationUnit>()?,
        None => DurationUnit::Millis,
    };

    Ok((value * unit.factor_ms() as f64) as u64)
}

/// Turn the resolved millisecond count into a [`Duration`], warning on suspiciously low values.
pub(crate) fn checked(raw: &dyn fmt::Display, ms: u64) -> Duration {
    if ms < LOW_INTERVAL_WARN_MS {
        warn!(interval = %raw, ms, "careful: interval is quite low");
    }
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use serde_json::json;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::{
        Layer,
        layer::{Context, SubscriberExt},
    };

    use super::*;
    use crate::RefreshInterval;

    /// Counts `warn` events emitted while installed.
    #[derive(Clone, Default)]
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn warnings_during(f: impl FnOnce()) -> usize {
        let counter = WarnCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        tracing::subscriber::with_default(subscriber, f);
        counter.0.load(Ordering::SeqCst)
    }

    fn ms(v: Value) -> u128 {
        parse_duration(&v).unwrap().as_millis()
    }

    #[test]
    fn units_are_converted() {
        assert_eq!(ms(json!("30s")), 30_000);
        assert_eq!(ms(json!("2min")), 120_000);
        assert_eq!(ms(json!("1h")), 3_600_000);
        assert_eq!(ms(json!("750ms")), 750);
        assert_eq!(ms(json!("1500")), 1_500);
    }

    #[test]
    fn numbers_are_milliseconds() {
        assert_eq!(ms(json!(500)), 500);
        assert_eq!(ms(json!(0)), 0);
        assert_eq!(ms(json!(1500.9)), 1_500);
    }

    #[test]
    fn fractions_and_whitespace() {
        assert_eq!(ms(json!("1.5s")), 1_500);
        assert_eq!(ms(json!(".5min")), 30_000);
        assert_eq!(ms(json!("  45 s ")), 45_000);
        assert_eq!(ms(json!("10S")), 10_000);
    }

    #[test]
    fn empty_and_null_are_invalid() {
        for v in [json!(""), json!(null), json!("   ")] {
            let err = parse_duration(&v).unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidDuration(_)),
                "expected InvalidDuration for {v}, got {err:?}"
            );
        }
    }

    #[test]
    fn malformed_strings_are_invalid() {
        for s in ["abc", "s", "10 days", "1.2.3s", "-5s", "5.", "ten seconds"] {
            let err = parse_duration(&json!(s)).unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidDuration(_)),
                "expected InvalidDuration for {s:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn negative_numbers_are_invalid() {
        assert!(matches!(
            parse_duration(&json!(-1)),
            Err(ModelError::InvalidDuration(_))
        ));
        assert!(matches!(
            parse_duration(&json!(-0.5)),
            Err(ModelError::InvalidDuration(_))
        ));
    }

    #[test]
    fn other_types_are_type_mismatch() {
        for v in [json!(true), json!([1000]), json!({"ms": 1000})] {
            let err = parse_duration(&v).unwrap_err();
            assert!(
                matches!(err, ModelError::TypeMismatch(_)),
                "expected TypeMismatch for {v}, got {err:?}"
            );
        }
    }

    #[test]
    fn low_values_are_accepted() {
        assert_eq!(ms(json!("100ms")), 100);
        assert_eq!(ms(json!(999)), 999);
    }

    #[test]
    fn sub_second_values_warn_once() {
        for v in [json!("100ms"), json!(999), json!(0)] {
            let n = warnings_during(|| {
                parse_duration(&v).unwrap();
            });
            assert_eq!(n, 1, "expected one warning for {v}");
        }
        for v in [json!("1s"), json!(1000), json!("2min")] {
            let n = warnings_during(|| {
                parse_duration(&v).unwrap();
            });
            assert_eq!(n, 0, "expected no warning for {v}");
        }
    }

    #[test]
    fn interval_values_warn_when_resolved() {
        let low = RefreshInterval::text("100ms");
        let n = warnings_during(|| {
            low.to_duration().unwrap();
        });
        assert_eq!(n, 1);

        let fine = RefreshInterval::millis(1_000);
        let n = warnings_during(|| {
            fine.to_duration().unwrap();
        });
        assert_eq!(n, 0);
    }
}
