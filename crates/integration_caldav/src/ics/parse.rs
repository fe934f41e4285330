//! iCalendar reader
//!
//! Extracts VEVENT data from RFC 5545 text using the `icalendar` parser.
//! Only the properties the skill needs are interpreted; malformed events are
//! skipped rather than failing the whole document.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use domain::{
    CalendarEvent, CalendarId, MIN_EVENT_DURATION, SkillSettings, Timezone, sanitize_text,
};
use icalendar::parser::{self, Component, Property};
use tracing::{debug, warn};

/// Title used when an event carries no SUMMARY
pub const UNTITLED: &str = "(no title)";

/// Interpretation settings for parsed events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcsOptions {
    /// Zone events are expressed in, and the fallback for unknown TZIDs
    pub timezone: Timezone,
    /// Length of events that have neither DTEND nor DURATION
    pub fallback_duration_minutes: u32,
    pub title_max_chars: usize,
    pub location_max_chars: usize,
}

impl From<&SkillSettings> for IcsOptions {
    fn from(settings: &SkillSettings) -> Self {
        Self {
            timezone: settings.timezone,
            fallback_duration_minutes: settings.default_duration_minutes,
            title_max_chars: settings.title_max_chars,
            location_max_chars: settings.location_max_chars,
        }
    }
}

/// Where parsed events came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSource {
    pub calendar_id: CalendarId,
    pub calendar_name: String,
    pub href: Option<String>,
    pub etag: Option<String>,
}

/// A DTSTART/DTEND value together with the parameters that shape its reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateProperty<'a> {
    pub value: &'a str,
    /// `VALUE` parameter (`DATE` or `DATE-TIME`)
    pub value_type: Option<&'a str>,
    /// `TZID` parameter
    pub tzid: Option<&'a str>,
}

impl<'a> DateProperty<'a> {
    /// A value without parameters
    #[must_use]
    pub const fn new(value: &'a str) -> Self {
        Self {
            value,
            value_type: None,
            tzid: None,
        }
    }

    fn from_property(property: &'a Property<'_>) -> Self {
        Self {
            value: property.val.as_str(),
            value_type: param(property, "VALUE"),
            tzid: param(property, "TZID"),
        }
    }
}

/// Unfold continuation lines and drop blank ones
///
/// The result is CRLF-terminated and ready for [`parser::read_calendar`].
#[must_use]
pub fn unfold_document(data: &str) -> String {
    let unfolded = parser::unfold(data);
    let mut out = String::with_capacity(unfolded.len() + 2);
    for line in unfolded.lines().filter(|line| !line.trim().is_empty()) {
        out.push_str(line);
        out.push_str("\r\n");
    }
    out
}

pub(crate) fn is_named(component: &Component<'_>, name: &str) -> bool {
    component.name.as_str().eq_ignore_ascii_case(name)
}

/// Top-level VEVENTs, looking through a VCALENDAR wrapper
pub(crate) fn collect_vevents<'c, 'a>(
    components: &'c [Component<'a>],
    out: &mut Vec<&'c Component<'a>>,
) {
    for component in components {
        if is_named(component, "VCALENDAR") {
            collect_vevents(&component.components, out);
        } else if is_named(component, "VEVENT") {
            out.push(component);
        }
    }
}

/// The VEVENT without RECURRENCE-ID, or the first one
pub(crate) fn master_event<'c, 'a>(vevents: &[&'c Component<'a>]) -> Option<&'c Component<'a>> {
    vevents
        .iter()
        .find(|component| find_property(component, "RECURRENCE-ID").is_none())
        .or_else(|| vevents.first())
        .copied()
}

/// First property named `name`; nested components are not searched
fn find_property<'c, 'a>(component: &'c Component<'a>, name: &str) -> Option<&'c Property<'a>> {
    component
        .properties
        .iter()
        .find(|property| property.name.as_str().eq_ignore_ascii_case(name))
}

fn param<'p>(property: &'p Property<'_>, key: &str) -> Option<&'p str> {
    property
        .params
        .iter()
        .find(|param| param.key.as_str().eq_ignore_ascii_case(key))
        .and_then(|param| param.val.as_ref())
        .map(|raw| raw.as_str().trim_matches('"'))
}

fn value<'c>(component: &'c Component<'_>, name: &str) -> Option<&'c str> {
    find_property(component, name).map(|property| property.val.as_str().trim())
}

fn date_value<'c>(component: &'c Component<'_>, name: &str) -> Option<DateProperty<'c>> {
    find_property(component, name).map(DateProperty::from_property)
}

fn text_value(component: &Component<'_>, name: &str, max_chars: usize) -> Option<String> {
    find_property(component, name)
        .map(|property| sanitize_text(&unescape_text(property.val.as_str()), max_chars))
        .filter(|text| !text.is_empty())
}

fn vevents_of<'c, 'a>(
    calendar: &'c parser::Calendar<'a>,
    source: &EventSource,
) -> Vec<&'c Component<'a>> {
    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);
    if vevents.is_empty() {
        debug!(calendar = %source.calendar_id, "Calendar data holds no VEVENT");
    }
    vevents
}

/// Extract every VEVENT in `data` as a calendar event
///
/// Events without a usable DTSTART are skipped; so is calendar data the
/// parser cannot read.
#[must_use]
pub fn extract_events(
    data: &str,
    source: &EventSource,
    options: &IcsOptions,
) -> Vec<CalendarEvent> {
    let text = unfold_document(data);
    let calendar = match parser::read_calendar(&text) {
        Ok(calendar) => calendar,
        Err(e) => {
            warn!(
                calendar = %source.calendar_id,
                error = %e,
                "Skipped unreadable calendar data"
            );
            return Vec::new();
        },
    };

    let vevents = vevents_of(&calendar, source);
    let events: Vec<_> = vevents
        .iter()
        .filter_map(|component| build_event(component, source, options))
        .collect();
    if events.len() < vevents.len() {
        debug!(
            calendar = %source.calendar_id,
            skipped = vevents.len() - events.len(),
            "Skipped VEVENTs without a usable DTSTART"
        );
    }
    events
}

/// Extract the master VEVENT (the one without RECURRENCE-ID) of a resource
#[must_use]
pub fn extract_master_event(
    data: &str,
    source: &EventSource,
    options: &IcsOptions,
) -> Option<CalendarEvent> {
    let text = unfold_document(data);
    let calendar = parser::read_calendar(&text).ok()?;
    let vevents = vevents_of(&calendar, source);
    master_event(&vevents).and_then(|component| build_event(component, source, options))
}

fn build_event(
    component: &Component<'_>,
    source: &EventSource,
    options: &IcsOptions,
) -> Option<CalendarEvent> {
    let tz = options.timezone;
    let (start, all_day) =
        date_value(component, "DTSTART").and_then(|date| parse_ical_datetime(&date, tz))?;
    let end = resolve_end(component, start, options);

    Some(CalendarEvent {
        uid: value(component, "UID").unwrap_or_default().to_string(),
        summary: text_value(component, "SUMMARY", options.title_max_chars)
            .unwrap_or_else(|| UNTITLED.to_string()),
        location: text_value(component, "LOCATION", options.location_max_chars),
        start,
        end,
        all_day,
        calendar_id: source.calendar_id.clone(),
        calendar_name: source.calendar_name.clone(),
        href: source.href.clone(),
        etag: source.etag.clone(),
        rrule: value(component, "RRULE")
            .filter(|rule| !rule.is_empty())
            .map(ToString::to_string),
    })
}

/// DTEND, else DTSTART + DURATION, else DTSTART + the fallback length
///
/// The span is clamped to at least one minute.
fn resolve_end(
    component: &Component<'_>,
    start: DateTime<Tz>,
    options: &IcsOptions,
) -> DateTime<Tz> {
    let fallback = TimeDelta::minutes(i64::from(options.fallback_duration_minutes));
    let end = date_value(component, "DTEND")
        .and_then(|date| parse_ical_datetime(&date, options.timezone))
        .map(|(end, _)| end)
        .or_else(|| {
            value(component, "DURATION")
                .and_then(parse_duration)
                .and_then(|duration| start.checked_add_signed(duration))
        })
        .unwrap_or(start + fallback);

    if end - start < MIN_EVENT_DURATION {
        start + MIN_EVENT_DURATION
    } else {
        end
    }
}

/// Parse a DTSTART/DTEND value into an instant in `tz` plus an all-day flag
///
/// Precedence: `VALUE=DATE` (or a bare 8-digit value), then a trailing `Z`,
/// then `TZID` (unknown zones fall back to `tz`). Floating values are read
/// in `tz`.
#[must_use]
pub fn parse_ical_datetime(date: &DateProperty<'_>, tz: Timezone) -> Option<(DateTime<Tz>, bool)> {
    let value = date.value.trim();
    let date_only = date
        .value_type
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()));

    if date_only {
        let date = NaiveDate::parse_from_str(value.get(..8)?, "%Y%m%d").ok()?;
        return Some((tz.start_of_day(date), true));
    }

    if let Some(utc) = value.strip_suffix(['Z', 'z']) {
        let naive = parse_naive_datetime(utc)?;
        return Some((tz.convert(&Utc.from_utc_datetime(&naive)), false));
    }

    let naive = parse_naive_datetime(value)?;
    let zone = date
        .tzid
        .map_or(tz, |tzid| Timezone::resolve_or(tzid.trim_start_matches('/'), tz));
    Some((tz.convert(&zone.localize(naive)), false))
}

fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M"))
        .ok()
}

/// Parse the duration subset `P[nD][T[nH][nM]]`
///
/// Negative or unrecognized durations yield `None`.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use integration_caldav::ics::parse_duration;
///
/// assert_eq!(parse_duration("PT90M"), Some(TimeDelta::minutes(90)));
/// assert_eq!(parse_duration("-PT15M"), None);
/// ```
#[must_use]
pub fn parse_duration(value: &str) -> Option<TimeDelta> {
    let value = value.trim().to_ascii_uppercase();
    let rest = value.strip_prefix('+').unwrap_or(&value);
    let rest = rest.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut total = TimeDelta::zero();
    let mut matched = false;

    if !date_part.is_empty() {
        let days = date_part.strip_suffix('D')?.parse::<i64>().ok()?;
        total = total.checked_add(&TimeDelta::try_days(days)?)?;
        matched = true;
    }

    if let Some(time) = time_part {
        if time.is_empty() {
            return None;
        }
        let mut digits = String::new();
        let mut last_unit = None;
        for ch in time.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            if digits.is_empty() {
                return None;
            }
            let amount = digits.parse::<i64>().ok()?;
            let (rank, delta) = match ch {
                'H' => (0, TimeDelta::try_hours(amount)?),
                'M' => (1, TimeDelta::try_minutes(amount)?),
                _ => return None,
            };
            if last_unit.is_some_and(|previous| previous >= rank) {
                return None;
            }
            last_unit = Some(rank);
            total = total.checked_add(&delta)?;
            digits.clear();
        }
        if !digits.is_empty() || last_unit.is_none() {
            return None;
        }
        matched = true;
    }

    matched.then_some(total)
}

/// Reverse RFC 5545 TEXT escaping
#[must_use]
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
