//! Value transforms applied while shaping request bodies.
//!
//! None of these raise: callers decide whether an unusable value is dropped
//! or rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

const CALENDAR_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const LOCAL_DATE_TIMES: [&[BorrowedFormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

/// Normalizes a date or date-time to its UTC calendar date, `YYYY-MM-DD`.
///
/// Date-times without an offset are read as UTC.
pub fn normalize_date(input: &str) -> Option<String> {
    let input = input.trim();

    let date = Date::parse(input, CALENDAR_DATE)
        .ok()
        .or_else(|| {
            OffsetDateTime::parse(input, &Rfc3339)
                .ok()
                .map(|value| value.to_offset(UtcOffset::UTC).date())
        })
        .or_else(|| {
            LOCAL_DATE_TIMES.iter().find_map(|format| {
                PrimitiveDateTime::parse(input, format)
                    .ok()
                    .map(|value| value.assume_utc().date())
            })
        })?;

    date.format(CALENDAR_DATE).ok()
}

/// Delivery window, both ends in `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub start: String,
    pub end: String,
}

impl TimeFrame {
    /// Accepts the window only when both ends are present and well formed.
    pub fn new(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = start?.trim();
        let end = end?.trim();
        if !is_clock_time(start) || !is_clock_time(end) {
            return None;
        }

        Some(Self {
            start: start.to_owned(),
            end: end.to_owned(),
        })
    }

    pub fn is_valid(&self) -> bool {
        is_clock_time(&self.start) && is_clock_time(&self.end)
    }
}

/// `H:MM` or `HH:MM` with hour in 0..=23 and minute in 0..=59.
pub fn is_clock_time(value: &str) -> bool {
    let Some((hour, minute)) = value.split_once(':') else {
        return false;
    };

    let digits = |part: &str| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());
    if !digits(hour) || hour.len() > 2 || !digits(minute) || minute.len() != 2 {
        return false;
    }

    matches!(hour.parse::<u8>(), Ok(h) if h <= 23) && matches!(minute.parse::<u8>(), Ok(m) if m <= 59)
}

/// Latitude/longitude pair, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates(pub f64, pub f64);

impl Coordinates {
    pub const fn latitude(self) -> f64 {
        self.0
    }

    pub const fn longitude(self) -> f64 {
        self.1
    }
}

/// Parses `"lat,lng"` or `"[lat,lng]"`.
pub fn parse_coordinates(input: &str) -> Option<Coordinates> {
    let cleaned: String = input.chars().filter(|ch| !matches!(ch, '[' | ']')).collect();
    let parts: Vec<&str> = cleaned.trim().split(',').collect();
    let [lat, lng] = parts.as_slice() else {
        return None;
    };

    let lat = parse_finite(lat)?;
    let lng = parse_finite(lng)?;
    Some(Coordinates(lat, lng))
}

/// Accepts the text forms of [`parse_coordinates`] or a two-number array.
pub fn coordinates_from_value(value: &Value) -> Option<Coordinates> {
    match value {
        Value::String(raw) => parse_coordinates(raw),
        Value::Array(pair) => match pair.as_slice() {
            [lat, lng] => {
                let part = |value: &Value| match value {
                    Value::String(raw) => parse_finite(raw),
                    other => other.as_f64().filter(|value| value.is_finite()),
                };
                Some(Coordinates(part(lat)?, part(lng)?))
            }
            _ => None,
        },
        _ => None,
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Splits a comma-separated list, trimming entries and keeping empty ones.
pub fn split_list(input: &str) -> Vec<String> {
    input.split(',').map(|entry| entry.trim().to_owned()).collect()
}

/// Parses JSON text embedded in a field value.
pub fn parse_embedded_json(input: &str) -> Option<Value> {
    serde_json::from_str(input).ok()
}
