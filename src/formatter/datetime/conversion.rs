use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{FormatError, Result};

/// Largest epoch offset accepted, in milliseconds (±100 million days)
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// A value accepted by the date/time formatter
#[derive(Debug, Clone, PartialEq)]
pub enum DateTimeValue {
    /// Milliseconds since the Unix epoch
    EpochMillis(f64),
    /// Seconds since the Unix epoch
    EpochSeconds(f64),
    /// ISO 8601 / RFC 3339 text, or numeric text in epoch milliseconds
    Text(String),
    Instant(DateTime<Utc>),
    /// Wall-clock time in the target zone
    Wall(NaiveDateTime),
}

macro_rules! impl_from_millis {
    ($($t:ty),*) => {
        $(impl From<$t> for DateTimeValue {
            fn from(value: $t) -> Self {
                DateTimeValue::EpochMillis(value as f64)
            }
        })*
    };
}

impl_from_millis!(i32, i64, u32, u64, f32, f64);

impl From<&str> for DateTimeValue {
    fn from(value: &str) -> Self {
        DateTimeValue::Text(value.to_string())
    }
}

impl From<String> for DateTimeValue {
    fn from(value: String) -> Self {
        DateTimeValue::Text(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateTimeValue {
    fn from(value: DateTime<Tz>) -> Self {
        DateTimeValue::Instant(value.with_timezone(&Utc))
    }
}

impl From<NaiveDateTime> for DateTimeValue {
    fn from(value: NaiveDateTime) -> Self {
        DateTimeValue::Wall(value)
    }
}

impl From<NaiveDate> for DateTimeValue {
    fn from(value: NaiveDate) -> Self {
        DateTimeValue::Wall(value.and_time(NaiveTime::MIN))
    }
}

/// A value after interpretation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Moment {
    Instant(DateTime<Utc>),
    Wall(NaiveDateTime),
    /// Not a point in time; rendered as this text unchanged
    Passthrough(String),
}

fn number_text(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string()
    } else {
        value.to_string()
    }
}

fn from_millis(millis: f64) -> Moment {
    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
        return Moment::Passthrough(number_text(millis));
    }
    let seconds = (millis / 1000.0).floor();
    let nanos = ((millis - seconds * 1000.0) * 1_000_000.0).round().clamp(0.0, 999_999_999.0);
    match DateTime::from_timestamp(seconds as i64, nanos as u32) {
        Some(instant) => Moment::Instant(instant),
        None => Moment::Passthrough(number_text(millis)),
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn parse_text(text: &str) -> Result<Moment> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Moment::Passthrough(text.to_string()));
    }
    if let Ok(millis) = trimmed.parse::<f64>() {
        return Ok(from_millis(millis));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Moment::Instant(instant.with_timezone(&Utc)));
    }
    if let Ok(instant) = trimmed.parse::<DateTime<FixedOffset>>() {
        return Ok(Moment::Instant(instant.with_timezone(&Utc)));
    }
    if let Ok(instant) = trimmed.parse::<DateTime<Utc>>() {
        return Ok(Moment::Instant(instant));
    }
    if let Ok(wall) = trimmed.parse::<NaiveDateTime>() {
        return Ok(Moment::Wall(wall));
    }
    for format in NAIVE_FORMATS {
        if let Ok(wall) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Moment::Wall(wall));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Moment::Wall(date.and_time(NaiveTime::MIN)));
    }
    Err(FormatError::InvalidValue(format!(
        "`{text}` is neither a number nor an ISO 8601 date"
    )))
}

impl DateTimeValue {
    pub(crate) fn interpret(&self) -> Result<Moment> {
        match self {
            DateTimeValue::EpochMillis(millis) => Ok(from_millis(*millis)),
            DateTimeValue::EpochSeconds(seconds) => Ok(from_millis(seconds * 1000.0)),
            DateTimeValue::Text(text) => parse_text(text),
            DateTimeValue::Instant(instant) => Ok(Moment::Instant(*instant)),
            DateTimeValue::Wall(wall) => Ok(Moment::Wall(*wall)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_millis() {
        let moment = DateTimeValue::from(86_400_000i64).interpret().unwrap();
        assert_eq!(
            moment,
            Moment::Instant(Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn offset_strings_are_instants() {
        let moment = DateTimeValue::from("2024-01-15T10:30:00+02:00").interpret().unwrap();
        assert_eq!(
            moment,
            Moment::Instant(Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn naive_strings_are_wall_times() {
        let moment = DateTimeValue::from("2024-01-15T10:30:00").interpret().unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(moment, Moment::Wall(expected));
        let date_only = DateTimeValue::from("2024-01-15").interpret().unwrap();
        assert!(matches!(date_only, Moment::Wall(_)));
    }

    #[test]
    fn unusable_values_pass_through() {
        assert_eq!(
            DateTimeValue::from(f64::NAN).interpret().unwrap(),
            Moment::Passthrough("NaN".into())
        );
        assert_eq!(
            DateTimeValue::from("").interpret().unwrap(),
            Moment::Passthrough(String::new())
        );
        assert_eq!(
            DateTimeValue::from(1e20).interpret().unwrap(),
            Moment::Passthrough("100000000000000000000".into())
        );
    }

    #[test]
    fn garbage_text_is_rejected() {
        assert!(matches!(
            DateTimeValue::from("next tuesday").interpret(),
            Err(FormatError::InvalidValue(_))
        ));
    }
}
