//! iCalendar writer
//!
//! Serializes events to RFC 5545 text: TEXT escaping, octet-based line
//! folding and CRLF line endings.

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use domain::{CalendarEvent, DomainError, Frequency, RecurrenceRule, Timezone};

/// Maximum octets per physical line
pub const MAX_LINE_OCTETS: usize = 75;

pub(crate) const PRODID: &str = "-//CalendarSkill//CalDAV Client//EN";

/// Escape a TEXT value (backslash, semicolon, comma and newlines)
///
/// # Examples
///
/// ```
/// use integration_caldav::ics::escape_text;
///
/// assert_eq!(escape_text("a;b,c\\d\ne"), "a\\;b\\,c\\\\d\\ne");
/// ```
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            },
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Fold a content line so no physical line exceeds `max_octets` UTF-8 bytes
///
/// Continuation lines start with a single space, which counts toward the
/// limit. Multi-byte characters are never split. The result has no trailing
/// line break.
#[must_use]
pub fn fold_line(line: &str, max_octets: usize) -> String {
    if line.len() <= max_octets {
        return line.to_string();
    }

    let first_limit = max_octets.max(4);
    let continuation_limit = max_octets.saturating_sub(1).max(4);

    let mut out = String::with_capacity(line.len() + 3 * (line.len() / continuation_limit + 1));
    let mut current = 0usize;
    let mut limit = first_limit;

    for ch in line.chars() {
        let width = ch.len_utf8();
        if current + width > limit {
            out.push_str("\r\n ");
            current = 0;
            limit = continuation_limit;
        }
        out.push(ch);
        current += width;
    }

    out
}

/// Build an RRULE value from command inputs
///
/// `until` is the last local day on which an occurrence may start; it is
/// written as the UTC instant of 23:59:59 that day in `timezone`.
///
/// # Examples
///
/// ```
/// use domain::{Frequency, Timezone};
/// use integration_caldav::ics::build_rrule;
///
/// let rule = build_rrule(Frequency::Weekly, Some(5), None, Timezone::utc()).unwrap();
/// assert_eq!(rule, "FREQ=WEEKLY;COUNT=5");
/// ```
pub fn build_rrule(
    frequency: Frequency,
    count: Option<u32>,
    until: Option<NaiveDate>,
    timezone: Timezone,
) -> Result<String, DomainError> {
    RecurrenceRule::new(frequency, count, until).map(|rule| rule.to_rrule(timezone))
}

/// Format an instant as an iCalendar UTC date-time (`YYYYMMDDTHHMMSSZ`)
#[must_use]
pub fn format_utc<Z: TimeZone>(instant: &DateTime<Z>) -> String {
    instant
        .with_timezone(&Utc)
        .format("%Y%m%dT%H%M%SZ")
        .to_string()
}

pub(crate) fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line, MAX_LINE_OCTETS));
    out.push_str("\r\n");
}

/// Serialize a single-event VCALENDAR document
///
/// Timed events are written in UTC, all-day events as `VALUE=DATE`.
#[must_use]
pub fn build_event_body(
    event: &CalendarEvent,
    rrule: Option<&str>,
    stamp: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{PRODID}"));
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_line(&mut out, "BEGIN:VEVENT");
    push_line(&mut out, &format!("UID:{}", event.uid));
    push_line(&mut out, &format!("DTSTAMP:{}", format_utc(&stamp)));

    if event.all_day {
        let start = event.start.date_naive();
        let end = event.end.date_naive().max(start + TimeDelta::days(1));
        push_line(&mut out, &format!("DTSTART;VALUE=DATE:{}", start.format("%Y%m%d")));
        push_line(&mut out, &format!("DTEND;VALUE=DATE:{}", end.format("%Y%m%d")));
    } else {
        push_line(&mut out, &format!("DTSTART:{}", format_utc(&event.start)));
        push_line(&mut out, &format!("DTEND:{}", format_utc(&event.end)));
    }

    push_line(&mut out, &format!("SUMMARY:{}", escape_text(&event.summary)));
    if let Some(location) = &event.location {
        push_line(&mut out, &format!("LOCATION:{}", escape_text(location)));
    }
    if let Some(rule) = rrule.filter(|rule| !rule.is_empty()) {
        push_line(&mut out, &format!("RRULE:{rule}"));
    }

    push_line(&mut out, "END:VEVENT");
    push_line(&mut out, "END:VCALENDAR");
    out
}
