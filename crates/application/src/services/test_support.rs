//! Recording calendar fake and fixtures shared by service tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use domain::{
    CalendarCredentials, CalendarEvent, CalendarId, CalendarProfile, CalendarUrl, EventPatch,
    SkillConfig, SkillSettings, StoredEvent, Timezone,
};
use secrecy::SecretString;
use url::Url;

use crate::ports::{CalendarError, CalendarPort, WritePrecondition};

/// Resource body the fake hands out with a stored event
pub const STORED_RESOURCE: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\n\
    UID:stored\r\nDESCRIPTION:kept as stored\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

/// A call the fake received
#[derive(Debug, Clone)]
pub enum RecordedCall {
    Query { calendar: String },
    Fetch { url: Url },
    Put { url: Url, event: CalendarEvent, precondition: WritePrecondition },
    Update { url: Url, resource: String, patch: EventPatch, precondition: WritePrecondition },
    Delete { url: Url },
}

/// In-memory calendar port that records every call
#[derive(Default)]
pub struct FakeCalendarPort {
    events: HashMap<String, Vec<CalendarEvent>>,
    failing: HashSet<String>,
    stored: Option<StoredEvent>,
    missing: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeCalendarPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, calendar: &str, events: Vec<CalendarEvent>) -> Self {
        self.events.insert(calendar.to_string(), events);
        self
    }

    pub fn failing(mut self, calendar: &str) -> Self {
        self.failing.insert(calendar.to_string());
        self
    }

    /// Event returned by `fetch_event`, backed by [`STORED_RESOURCE`]
    pub fn with_stored(mut self, event: CalendarEvent) -> Self {
        self.stored = Some(StoredEvent {
            event,
            resource: STORED_RESOURCE.to_string(),
        });
        self
    }

    /// Make fetch and delete answer "not found"
    pub fn missing(mut self) -> Self {
        self.missing = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queried_calendars(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Query { calendar } => Some(calendar),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CalendarPort for FakeCalendarPort {
    async fn query_events(
        &self,
        profile: &CalendarProfile,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let calendar = profile.id.as_str().to_string();
        self.record(RecordedCall::Query {
            calendar: calendar.clone(),
        });
        if self.failing.contains(&calendar) {
            return Err(CalendarError::Unavailable("Request timed out".to_string()));
        }
        Ok(self.events.get(&calendar).cloned().unwrap_or_default())
    }

    async fn fetch_event(
        &self,
        _profile: &CalendarProfile,
        url: &Url,
    ) -> Result<StoredEvent, CalendarError> {
        self.record(RecordedCall::Fetch { url: url.clone() });
        if self.missing {
            return Err(CalendarError::NotFound(
                "Calendar endpoint not found for fetch.".to_string(),
            ));
        }
        self.stored
            .clone()
            .ok_or_else(|| CalendarError::InvalidEvent("no VEVENT".to_string()))
    }

    async fn put_event(
        &self,
        _profile: &CalendarProfile,
        url: &Url,
        event: &CalendarEvent,
        precondition: WritePrecondition,
        _stamp: DateTime<Utc>,
    ) -> Result<Option<String>, CalendarError> {
        self.record(RecordedCall::Put {
            url: url.clone(),
            event: event.clone(),
            precondition,
        });
        Ok(Some("\"new\"".to_string()))
    }

    async fn update_event(
        &self,
        _profile: &CalendarProfile,
        url: &Url,
        stored: &StoredEvent,
        patch: &EventPatch,
        precondition: WritePrecondition,
        _stamp: DateTime<Utc>,
    ) -> Result<Option<String>, CalendarError> {
        self.record(RecordedCall::Update {
            url: url.clone(),
            resource: stored.resource.clone(),
            patch: patch.clone(),
            precondition,
        });
        Ok(Some("\"new\"".to_string()))
    }

    async fn delete_event(
        &self,
        _profile: &CalendarProfile,
        url: &Url,
    ) -> Result<(), CalendarError> {
        self.record(RecordedCall::Delete { url: url.clone() });
        if self.missing {
            return Err(CalendarError::NotFound(
                "Calendar endpoint not found for delete.".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn berlin() -> Timezone {
    Timezone::parse("Europe/Berlin").unwrap()
}

pub fn profile(id: &str, name: &str, read: bool, write: bool) -> CalendarProfile {
    CalendarProfile {
        id: CalendarId::new(id).unwrap(),
        display_name: name.to_string(),
        url: CalendarUrl::parse(&format!("https://caldav.example.test/dav/{id}/")).unwrap(),
        credentials: CalendarCredentials::new("alice", SecretString::from("secret")),
        read,
        write,
    }
}

pub fn config_with(profiles: Vec<CalendarProfile>) -> SkillConfig {
    SkillConfig {
        settings: SkillSettings {
            timezone: berlin(),
            ..SkillSettings::default()
        },
        calendars: profiles
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// A timed event on 2026-03-02 (Berlin) starting at `hour`
pub fn timed_event(calendar: &str, summary: &str, hour: u32, minutes: i64) -> CalendarEvent {
    let start = berlin().tz().with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap();
    CalendarEvent {
        uid: format!("{calendar}-{hour}"),
        summary: summary.to_string(),
        location: None,
        start,
        end: start + TimeDelta::minutes(minutes),
        all_day: false,
        calendar_id: CalendarId::new(calendar).unwrap(),
        calendar_name: calendar.to_string(),
        href: Some(format!("/dav/{calendar}/{calendar}-{hour}.ics")),
        etag: None,
        rrule: None,
    }
}
