//! Strict date and datetime parsing for command arguments
//!
//! Accepts ISO-like input only. Naive datetimes are interpreted in the
//! configured timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use domain::{DomainError, Timezone};
use tracing::debug;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%:z", "%Y-%m-%dT%H:%M%:z"];

/// Parse a user datetime (`YYYY-MM-DDTHH:MM[:SS]`, optional `Z` or `±HH:MM`)
///
/// A space may replace the `T`. Values without an offset are localized in
/// `timezone`: a wall time skipped by a DST gap takes the offset in effect
/// before the transition, an ambiguous one the earlier instant.
///
/// # Examples
///
/// ```
/// use application::parse_user_datetime;
/// use domain::Timezone;
///
/// let tz = Timezone::parse("Europe/Berlin").unwrap();
/// let parsed = parse_user_datetime("2026-03-02 14:30", tz).unwrap();
/// assert_eq!(parsed.to_rfc3339(), "2026-03-02T14:30:00+01:00");
/// ```
pub fn parse_user_datetime(input: &str, timezone: Timezone) -> Result<DateTime<Tz>, DomainError> {
    let trimmed = input.trim();
    let normalized = normalize_separator(trimmed);

    if let Some(naive) = normalized
        .strip_suffix(['Z', 'z'])
        .and_then(parse_naive)
    {
        debug!(input = trimmed, "Parsed UTC datetime");
        return Ok(timezone.convert(&naive.and_utc()));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&normalized, format) {
            debug!(input = trimmed, "Parsed datetime with offset");
            return Ok(timezone.convert(&parsed));
        }
    }

    parse_naive(&normalized)
        .map(|naive| timezone.localize(naive))
        .ok_or_else(|| DomainError::InvalidDateTime(trimmed.to_string()))
}

/// Parse a user date (`YYYY-MM-DD`)
pub fn parse_user_date(input: &str) -> Result<NaiveDate, DomainError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(trimmed.to_string()))
}

/// The local calendar date of `instant` in `timezone`
#[must_use]
pub fn local_date(instant: DateTime<Utc>, timezone: Timezone) -> NaiveDate {
    timezone.convert(&instant).date_naive()
}

fn normalize_separator(input: &str) -> String {
    match input.as_bytes().get(10) {
        Some(b' ') => format!("{}T{}", &input[..10], input[11..].trim_start()),
        _ => input.to_string(),
    }
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}
