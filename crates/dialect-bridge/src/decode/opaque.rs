//! Bridging of driver-native objects into host values.

use std::fmt::Write as _;

use crate::core::cursor::{DriverObject, Interval};
use crate::core::value::Value;

/// Generic object bridge used by every dialect.
pub fn bridge_object(obj: DriverObject) -> Value {
    match obj {
        DriverObject::Scalar(value) => value,
        DriverObject::Uuid(u) => Value::Uuid(u),
        DriverObject::KeyValue(pairs) => Value::Map(pairs),
        DriverObject::Generic { value: None, .. } => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

/// Bridge for dialects with composite column types.
///
/// Intervals get a compact rendering; geometric values keep the driver's
/// text form; key-value stores become maps.
pub fn bridge_dialect_object(obj: DriverObject) -> Value {
    match obj {
        DriverObject::Interval(interval) => Value::Text(format_interval(&interval)),
        other => bridge_object(other),
    }
}

/// Render an interval as `"<n> years <n> months <n> days [-]HH:MM:SS[.ffffff]"`.
///
/// Zero fields are omitted. An all-zero interval renders as an empty string.
pub fn format_interval(interval: &Interval) -> String {
    let mut out = String::with_capacity(32);
    if interval.years != 0 {
        let _ = write!(out, "{} years ", interval.years);
    }
    if interval.months != 0 {
        let _ = write!(out, "{} months ", interval.months);
    }
    if interval.days != 0 {
        let _ = write!(out, "{} days ", interval.days);
    }
    out.push_str(&format_time_part(interval));
    out.trim_end().to_string()
}

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Render hours, minutes and seconds as one signed `HH:MM:SS[.ffffff]` group.
///
/// Seconds are rounded to whole microseconds before carrying into minutes
/// and hours. Empty when the rounded total is zero.
fn format_time_part(interval: &Interval) -> String {
    let whole = (i64::from(interval.hours) * 3600 + i64::from(interval.minutes) * 60)
        * MICROS_PER_SECOND;
    let total = whole.saturating_add((interval.seconds * 1e6).round() as i64);
    if total == 0 {
        return String::new();
    }

    let sign = if total < 0 { "-" } else { "" };
    let abs = total.unsigned_abs();
    let micros = MICROS_PER_SECOND as u64;
    let hours = abs / (3600 * micros);
    let minutes = (abs / (60 * micros)) % 60;
    let seconds = (abs / micros) % 60;
    let frac = abs % micros;

    let mut out = format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds);
    if frac != 0 {
        let digits = format!("{:06}", frac);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cursor::Point;
    use std::collections::BTreeMap;

    #[test]
    fn test_interval_days_only() {
        let i = Interval {
            days: 2,
            ..Default::default()
        };
        assert_eq!(format_interval(&i), "2 days");
    }

    #[test]
    fn test_interval_full() {
        let i = Interval {
            years: 1,
            months: 2,
            days: 3,
            hours: 4,
            minutes: 5,
            seconds: 6.0,
        };
        assert_eq!(format_interval(&i), "1 years 2 months 3 days 04:05:06");
    }

    #[test]
    fn test_interval_fractional_seconds() {
        let i = Interval {
            minutes: 1,
            seconds: 5.5,
            ..Default::default()
        };
        assert_eq!(format_interval(&i), "00:01:05.5");
    }

    #[test]
    fn test_interval_seconds_round_up_carries_into_minutes() {
        let i = Interval {
            minutes: 1,
            seconds: 59.999_999_9,
            ..Default::default()
        };
        assert_eq!(format_interval(&i), "00:02:00");

        let i = Interval {
            hours: 1,
            minutes: 59,
            seconds: 59.999_999_9,
            ..Default::default()
        };
        assert_eq!(format_interval(&i), "02:00:00");
    }

    #[test]
    fn test_interval_sub_microsecond_time_is_omitted() {
        let i = Interval {
            days: 1,
            seconds: 1e-7,
            ..Default::default()
        };
        assert_eq!(format_interval(&i), "1 days");
    }

    #[test]
    fn test_interval_fraction_trims_zeros_without_bare_dot() {
        let i = Interval {
            seconds: 7.25,
            ..Default::default()
        };
        assert_eq!(format_interval(&i), "00:00:07.25");

        let i = Interval {
            seconds: 0.000_001,
            ..Default::default()
        };
        assert_eq!(format_interval(&i), "00:00:00.000001");
    }

    #[test]
    fn test_interval_negative_time_has_single_sign() {
        let i = Interval {
            hours: -3,
            minutes: -4,
            seconds: -5.0,
            ..Default::default()
        };
        assert_eq!(format_interval(&i), "-03:04:05");

        let i = Interval {
            days: 2,
            minutes: -1,
            seconds: -0.5,
            ..Default::default()
        };
        assert_eq!(format_interval(&i), "2 days -00:01:00.5");
    }

    #[test]
    fn test_interval_all_zero() {
        assert_eq!(format_interval(&Interval::default()), "");
    }

    #[test]
    fn test_dialect_object_bridge() {
        let v = bridge_dialect_object(DriverObject::Point(Point::new(1.0, 2.0)));
        assert_eq!(v, Value::Text("(1,2)".to_string()));

        let mut pairs = BTreeMap::new();
        pairs.insert("k".to_string(), Some("v".to_string()));
        assert_eq!(
            bridge_dialect_object(DriverObject::KeyValue(pairs.clone())),
            Value::Map(pairs)
        );

        let generic = DriverObject::Generic {
            type_name: "inet".to_string(),
            value: Some("10.0.0.1".to_string()),
        };
        assert_eq!(bridge_dialect_object(generic), Value::Text("10.0.0.1".to_string()));
    }

    #[test]
    fn test_generic_bridge_keeps_driver_interval_text() {
        let i = Interval {
            days: 2,
            ..Default::default()
        };
        let v = bridge_object(DriverObject::Interval(i));
        assert_eq!(v, Value::Text("0 years 0 mons 2 days 0 hours 0 mins 0 secs".to_string()));
    }

    #[test]
    fn test_scalar_passthrough() {
        assert_eq!(bridge_object(DriverObject::Scalar(Value::Integer(3))), Value::Integer(3));
    }
}
