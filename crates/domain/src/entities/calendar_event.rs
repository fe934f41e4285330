//! Calendar event entity

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

use crate::errors::DomainError;
use crate::value_objects::{CalendarId, EventId};

/// Shortest duration an event may have
pub const MIN_EVENT_DURATION: TimeDelta = TimeDelta::minutes(1);

/// A single (possibly expanded) event occurrence read from or written to a calendar
///
/// Events are values: edits produce a new event via [`CalendarEvent::with_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// iCalendar UID (may be empty for malformed server data)
    pub uid: String,
    /// Event title
    pub summary: String,
    /// Optional location
    pub location: Option<String>,
    /// Start instant in the configured zone
    pub start: DateTime<Tz>,
    /// End instant, never earlier than `start + 1 minute`
    pub end: DateTime<Tz>,
    /// Date-only event
    pub all_day: bool,
    /// Owning calendar
    pub calendar_id: CalendarId,
    /// Display name of the owning calendar
    pub calendar_name: String,
    /// Resource href on the server, when known
    pub href: Option<String>,
    /// Entity tag of the stored resource, when known
    pub etag: Option<String>,
    /// Raw `RRULE` value of the stored master event
    pub rrule: Option<String>,
}

impl CalendarEvent {
    /// Length of the event
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Number of days covered by an all-day event
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end.date_naive() - self.start.date_naive()).num_days()
    }

    /// Whether the event overlaps the half-open window `[start, end)`
    #[must_use]
    pub fn overlaps(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> bool {
        intervals_overlap(&self.start, &self.end, start, end)
    }

    /// Opaque id of this event, when its href is known
    pub fn event_id(&self) -> Option<Result<EventId, DomainError>> {
        self.href
            .as_deref()
            .map(|href| EventId::new(self.calendar_id.clone(), href))
    }

    /// Produce the edited event
    ///
    /// A new start keeps the previous duration unless a duration is also
    /// given; a new duration keeps the previous start. Changing either turns
    /// an all-day event into a timed one.
    #[must_use]
    pub fn with_changes(&self, changes: &EventChanges) -> Self {
        let duration = changes
            .duration
            .unwrap_or_else(|| self.duration())
            .max(MIN_EVENT_DURATION);
        let start = changes.start.unwrap_or(self.start);
        let retimed = changes.retimes();

        Self {
            summary: changes
                .title
                .clone()
                .unwrap_or_else(|| self.summary.clone()),
            start,
            end: start + duration,
            all_day: self.all_day && !retimed,
            ..self.clone()
        }
    }
}

/// Fields an edit may replace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub start: Option<DateTime<Tz>>,
    pub duration: Option<TimeDelta>,
}

impl EventChanges {
    /// Nothing to change
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.start.is_none() && self.duration.is_none()
    }

    /// Whether the event's window moves
    #[must_use]
    pub const fn retimes(&self) -> bool {
        self.start.is_some() || self.duration.is_some()
    }

    /// Property overwrites that turn the stored resource into `edited`
    ///
    /// `edited` is the result of [`CalendarEvent::with_changes`] with these
    /// changes. Only the fields named here are carried over.
    #[must_use]
    pub fn patch(&self, edited: &CalendarEvent) -> EventPatch {
        EventPatch {
            summary: self.title.clone(),
            window: self.retimes().then_some((edited.start, edited.end)),
        }
    }
}

/// Overwrites applied to a stored iCalendar resource on edit
///
/// Everything not named here stays as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    /// New SUMMARY
    pub summary: Option<String>,
    /// New DTSTART and DTEND
    pub window: Option<(DateTime<Tz>, DateTime<Tz>)>,
}

/// A fetched event together with the iCalendar resource it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    /// Display model of the master VEVENT
    pub event: CalendarEvent,
    /// Resource body exactly as the server returned it
    pub resource: String,
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)` share an instant
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use domain::intervals_overlap;
///
/// let at = |h| Utc.with_ymd_and_hms(2026, 3, 2, h, 0, 0).unwrap();
/// assert!(intervals_overlap(&at(9), &at(11), &at(10), &at(12)));
/// assert!(!intervals_overlap(&at(9), &at(10), &at(10), &at(11)));
/// ```
#[must_use]
pub fn intervals_overlap<T: PartialOrd>(a_start: &T, a_end: &T, b_start: &T, b_end: &T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Collapse whitespace and truncate to `max_chars`, marking truncation with `...`
///
/// # Examples
///
/// ```
/// use domain::sanitize_text;
///
/// assert_eq!(sanitize_text("  hello   world  ", 20), "hello world");
/// assert_eq!(sanitize_text("abcdefghijkl", 8), "abcde...");
/// ```
#[must_use]
pub fn sanitize_text(value: &str, max_chars: usize) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    if max_chars <= 3 {
        return collapsed.chars().take(max_chars).collect();
    }
    let mut truncated: String = collapsed.chars().take(max_chars - 3).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push_str("...");
    truncated
}
