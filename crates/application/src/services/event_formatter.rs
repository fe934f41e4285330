//! Plain-text rendering of command results
//!
//! Pure functions; the output is what the assistant reads back to the user.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use domain::{CalendarEvent, CalendarProfile, EventId, Timezone};

// ── Listings ────────────────────────────────────────────────────

/// Heading for a single-day listing
#[must_use]
pub fn day_heading(date: NaiveDate, timezone: Timezone) -> String {
    format!("Calendar for {date} ({timezone})")
}

/// Heading for a seven-day listing (both dates inclusive)
#[must_use]
pub fn week_heading(first: NaiveDate, last: NaiveDate, timezone: Timezone) -> String {
    format!("Calendar week {first} -> {last} ({timezone})")
}

/// Render a listing: heading, up to `limit` events, overflow note, warnings
///
/// Events are expected in display order. Week listings pass `with_dates` so
/// every line carries its day.
#[must_use]
pub fn format_listing(
    heading: &str,
    events: &[CalendarEvent],
    warnings: &[String],
    limit: usize,
    with_dates: bool,
) -> String {
    let mut out = String::from(heading);

    if events.is_empty() {
        out.push_str("\nNo events.");
    }
    for event in events.iter().take(limit) {
        out.push('\n');
        out.push_str(&format_event_line(event, with_dates));
    }
    if events.len() > limit {
        let _ = write!(out, "\n... and {} more", events.len() - limit);
    }

    push_warnings(&mut out, warnings);
    out
}

/// One listing entry plus its event id on a second line
#[must_use]
pub fn format_event_line(event: &CalendarEvent, with_date: bool) -> String {
    let mut line = String::from("- ");
    if with_date {
        let _ = write!(line, "{} ", event.start.format("%a %Y-%m-%d"));
    }

    if event.all_day {
        let days = event.days();
        if days > 1 {
            let _ = write!(line, "all day ({days} days)");
        } else {
            line.push_str("all day");
        }
    } else {
        let _ = write!(
            line,
            "{}-{}",
            event.start.format("%H:%M"),
            event.end.format("%H:%M")
        );
    }

    let _ = write!(line, " {} [{}]", event.summary, event.calendar_name);
    if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
        let _ = write!(line, " @ {location}");
    }
    if let Some(Ok(id)) = event.event_id() {
        let _ = write!(line, "\n  ID: {id}");
    }
    line
}

fn push_warnings(out: &mut String, warnings: &[String]) {
    for warning in warnings {
        let _ = write!(out, "\nWarning: {warning}");
    }
}

// ── Availability ────────────────────────────────────────────────

/// Render the result of a free/busy check
#[must_use]
pub fn format_availability(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    conflicts: &[CalendarEvent],
    warnings: &[String],
) -> String {
    let status = if conflicts.is_empty() { "free" } else { "busy" };
    let mut out = format!(
        "Slot: {} -> {}\nStatus: {status}\nConflicts: {}",
        format_instant(start),
        format_instant(end),
        conflicts.len()
    );
    for event in conflicts {
        out.push('\n');
        out.push_str(&format_event_line(event, true));
    }
    push_warnings(&mut out, warnings);
    out
}

// ── Mutations ───────────────────────────────────────────────────

/// Render a created event
#[must_use]
pub fn format_created(profile: &CalendarProfile, event: &CalendarEvent, id: &EventId) -> String {
    let mut out = format!("Status: created\nCalendar: {}", profile.label());
    push_event_fields(&mut out, event);
    if let Some(location) = &event.location {
        let _ = write!(out, "\nLocation: {location}");
    }
    if let Some(rule) = &event.rrule {
        let _ = write!(out, "\nRecurrence: {rule}");
    }
    let _ = write!(out, "\nEvent ID: {id}");
    out
}

/// Render an edited event
#[must_use]
pub fn format_updated(profile: &CalendarProfile, event: &CalendarEvent, id: &EventId) -> String {
    let mut out = format!("Status: updated\nCalendar: {}", profile.label());
    push_event_fields(&mut out, event);
    let _ = write!(out, "\nEvent ID: {id}");
    out
}

/// Render a deletion
#[must_use]
pub fn format_deleted(profile: &CalendarProfile, id: &EventId) -> String {
    format!(
        "Status: deleted\nCalendar: {}\nEvent ID: {id}",
        profile.label()
    )
}

fn push_event_fields(out: &mut String, event: &CalendarEvent) {
    let (start, end) = if event.all_day {
        (
            event.start.format("%Y-%m-%d").to_string(),
            event.end.format("%Y-%m-%d").to_string(),
        )
    } else {
        (format_instant(&event.start), format_instant(&event.end))
    };
    let _ = write!(
        out,
        "\nTitle: {}\nStart: {start}\nEnd: {end}",
        event.summary
    );
}

fn format_instant(instant: &DateTime<Tz>) -> String {
    instant.format("%Y-%m-%d %H:%M %Z").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use domain::{CalendarCredentials, CalendarId, CalendarUrl};
    use secrecy::SecretString;

    use super::*;

    fn event(summary: &str, hour: u32) -> CalendarEvent {
        let start = chrono_tz::Europe::Berlin
            .with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
            .unwrap();
        CalendarEvent {
            uid: format!("{summary}-uid"),
            summary: summary.to_string(),
            location: None,
            start,
            end: start + TimeDelta::hours(1),
            all_day: false,
            calendar_id: CalendarId::new("family").unwrap(),
            calendar_name: "Family".to_string(),
            href: Some(format!("/dav/family/{summary}.ics")),
            etag: None,
            rrule: None,
        }
    }

    fn profile() -> CalendarProfile {
        CalendarProfile {
            id: CalendarId::new("family").unwrap(),
            display_name: "Family".to_string(),
            url: CalendarUrl::parse("https://caldav.example.test/dav/family").unwrap(),
            credentials: CalendarCredentials::new("alice", SecretString::from("secret")),
            read: true,
            write: true,
        }
    }

    fn berlin() -> Timezone {
        Timezone::parse("Europe/Berlin").unwrap()
    }

    // === Listing Tests ===

    #[test]
    fn listing_shows_heading_events_and_ids() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut dentist = event("dentist", 14);
        dentist.location = Some("Main St 1".to_string());
        let out = format_listing(&day_heading(date, berlin()), &[dentist], &[], 10, false);

        assert!(out.starts_with("Calendar for 2026-03-02 (Europe/Berlin)"));
        assert!(out.contains("- 14:00-15:00 dentist [Family] @ Main St 1"));
        assert!(out.contains("  ID: family:"));
    }

    #[test]
    fn empty_listing_says_so() {
        let out = format_listing("Calendar for 2026-03-02", &[], &[], 10, false);
        assert!(out.contains("No events."));
    }

    #[test]
    fn listing_truncates_to_limit() {
        let events: Vec<_> = (8..13).map(|h| event(&format!("e{h}"), h)).collect();
        let out = format_listing("Calendar", &events, &[], 2, false);
        assert!(out.contains("e8"));
        assert!(out.contains("e9"));
        assert!(!out.contains("e10"));
        assert!(out.contains("... and 3 more"));
    }

    #[test]
    fn warnings_are_appended() {
        let out = format_listing(
            "Calendar",
            &[event("a", 9)],
            &["Calendar 'Work' unavailable: Request timed out".to_string()],
            10,
            false,
        );
        assert!(out.ends_with("Warning: Calendar 'Work' unavailable: Request timed out"));
    }

    #[test]
    fn week_lines_carry_dates() {
        let first = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let last = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let heading = week_heading(first, last, berlin());
        let out = format_listing(&heading, &[event("standup", 9)], &[], 10, true);
        assert!(out.starts_with("Calendar week 2026-03-02 -> 2026-03-08"));
        assert!(out.contains("- Mon 2026-03-02 09:00-10:00 standup"));
    }

    #[test]
    fn all_day_events_show_span() {
        let mut holiday = event("holiday", 0);
        holiday.all_day = true;
        holiday.end = holiday.start + TimeDelta::days(2);
        let line = format_event_line(&holiday, false);
        assert!(line.starts_with("- all day (2 days) holiday"));
    }

    // === Availability Tests ===

    #[test]
    fn availability_free_and_busy() {
        let start = chrono_tz::Europe::Berlin
            .with_ymd_and_hms(2026, 3, 2, 14, 0, 0)
            .unwrap();
        let end = start + TimeDelta::hours(1);

        let free = format_availability(&start, &end, &[], &[]);
        assert!(free.contains("Status: free"));
        assert!(free.contains("Conflicts: 0"));

        let busy = format_availability(&start, &end, &[event("dentist", 14)], &[]);
        assert!(busy.contains("Status: busy"));
        assert!(busy.contains("Conflicts: 1"));
        assert!(busy.contains("dentist"));
    }

    // === Mutation Tests ===

    #[test]
    fn created_output_lists_all_fields() {
        let mut created = event("planning", 16);
        created.rrule = Some("FREQ=MONTHLY;COUNT=3".to_string());
        let id = created.event_id().unwrap().unwrap();
        let out = format_created(&profile(), &created, &id);

        assert!(out.starts_with("Status: created"));
        assert!(out.contains("Calendar: Family (family)"));
        assert!(out.contains("Title: planning"));
        assert!(out.contains("Start: 2026-03-02 16:00 CET"));
        assert!(out.contains("End: 2026-03-02 17:00 CET"));
        assert!(out.contains("Recurrence: FREQ=MONTHLY;COUNT=3"));
        assert!(out.contains("Event ID: family:"));
    }

    #[test]
    fn updated_and_deleted_outputs() {
        let edited = event("moved", 18);
        let id = edited.event_id().unwrap().unwrap();

        let updated = format_updated(&profile(), &edited, &id);
        assert!(updated.starts_with("Status: updated"));
        assert!(updated.contains("Title: moved"));

        let deleted = format_deleted(&profile(), &id);
        assert!(deleted.starts_with("Status: deleted"));
        assert!(deleted.contains(&format!("Event ID: {id}")));
    }
}
