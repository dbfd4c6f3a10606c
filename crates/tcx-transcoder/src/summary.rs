use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::model::SummaryRecord;
use crate::schema::{self, Namespaces};
use crate::tree::Element;

const ACTIVITY_DATETIME_FORMAT: &str = "%d %b @ %H:%M UTC";

/// Builds the summary from the first `Activity` found under `root`.
///
/// Totals come from the first matching descendant of the activity, so a
/// multi-lap document reports the first lap's values rather than a sum.
pub fn extract_summary(root: &Element, namespaces: &Namespaces) -> SummaryRecord {
    let Some(activity) = root.find(namespaces.core, schema::ACTIVITY) else {
        return SummaryRecord::default();
    };

    let activity_datetime = activity
        .find_text(namespaces.core, schema::ACTIVITY_ID)
        .and_then(parse_activity_timestamp)
        .map(|timestamp| timestamp.format(ACTIVITY_DATETIME_FORMAT).to_string());

    let total_time = activity
        .find_text(namespaces.core, schema::TOTAL_TIME_SECONDS)
        .and_then(parse_optional_f64)
        .and_then(format_duration);

    let total_distance_km = activity
        .find_text(namespaces.core, schema::DISTANCE_METERS)
        .and_then(parse_optional_f64)
        .and_then(format_distance_km);

    SummaryRecord {
        activity_datetime,
        total_time,
        total_distance_km,
    }
}

/// Parses the ISO-8601 shapes seen in activity ids and keeps the wall-clock
/// fields as written; any offset is validated but not applied.
pub fn parse_activity_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    parse_timestamp(trimmed)
        .or_else(|| with_zero_minutes(trimmed).and_then(|expanded| parse_timestamp(&expanded)))
}

fn parse_timestamp(trimmed: &str) -> Option<NaiveDateTime> {
    static OFFSET_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%dT%H%M%S%.f%z",
        "%Y-%m-%dT%H%M%z",
        "%Y%m%dT%H%M%S%.f%z",
    ];
    static NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H%M%S%.f",
        "%Y-%m-%dT%H%M",
        "%Y%m%dT%H%M%S%.f",
    ];
    static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

    let normalized = match trimmed.strip_suffix(['Z', 'z']) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(parsed.naive_local());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// `2024-03-07T14` (optionally with an offset) -> `2024-03-07T14:00`; chrono
/// cannot build a time from an hour alone.
fn with_zero_minutes(value: &str) -> Option<String> {
    let (date, time) = value.split_once('T')?;
    let hour_len = time
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(time.len());
    let rest = &time[hour_len..];
    (hour_len == 2 && !rest.starts_with(':'))
        .then(|| format!("{date}T{}:00{rest}", &time[..hour_len]))
}

fn parse_optional_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Rounds half to even and renders `H:MM:SS` with unbounded hours.
pub fn format_duration(seconds: f64) -> Option<String> {
    if !seconds.is_finite() {
        return None;
    }
    let rounded = seconds.round_ties_even();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let total = rounded.abs() as u64;
    Some(format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    ))
}

pub fn format_distance_km(meters: f64) -> Option<String> {
    meters
        .is_finite()
        .then(|| format!("{:.2}", meters / 1000.0))
}
