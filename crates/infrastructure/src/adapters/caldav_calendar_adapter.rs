//! CalDAV calendar adapter - Implements `CalendarPort` using `integration_caldav`

use std::sync::Arc;

use application::ports::{CalendarError, CalendarPort, WritePrecondition};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{CalendarEvent, CalendarProfile, EventPatch, SkillSettings, StoredEvent};
use integration_caldav::{
    CalDavClient, CalDavError, CalDavTransport, IcsOptions, ReqwestTransport, WriteCondition,
    ics::{build_event_body, patch_event_body},
};
use tracing::{debug, instrument};
use url::Url;

/// Adapter for CalDAV servers (Baïkal, Radicale, Nextcloud)
///
/// Wraps a [`CalDavClient`] and translates between integration-level and
/// port-level types. Parsing options come from the skill settings so that
/// every event is expressed in the configured timezone.
pub struct CalDavCalendarAdapter {
    client: CalDavClient,
    options: IcsOptions,
}

impl std::fmt::Debug for CalDavCalendarAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalDavCalendarAdapter")
            .field("client", &self.client)
            .field("options", &self.options)
            .finish()
    }
}

impl CalDavCalendarAdapter {
    /// Create an adapter backed by the reqwest transport
    pub fn new(settings: &SkillSettings) -> Result<Self, CalendarError> {
        let transport = ReqwestTransport::new().map_err(Self::map_error)?;
        Ok(Self::with_transport(Arc::new(transport), settings))
    }

    /// Create an adapter over an arbitrary transport
    #[must_use]
    pub fn with_transport(transport: Arc<dyn CalDavTransport>, settings: &SkillSettings) -> Self {
        Self {
            client: CalDavClient::new(transport, settings.request_timeout()),
            options: IcsOptions::from(settings),
        }
    }

    /// Map [`CalDavError`] to [`CalendarError`]
    fn map_error(error: CalDavError) -> CalendarError {
        let message = error.to_string();
        match error {
            CalDavError::NotFound(_) => CalendarError::NotFound(message),
            CalDavError::AuthenticationFailed(_) => CalendarError::AuthenticationFailed(message),
            CalDavError::PreconditionFailed(_) => CalendarError::Conflict(message),
            CalDavError::ParseError(_) => CalendarError::InvalidResponse(message),
            CalDavError::InvalidData(_) => CalendarError::InvalidEvent(message),
            CalDavError::ConnectionFailed(_)
            | CalDavError::RequestFailed(_)
            | CalDavError::Timeout => CalendarError::Unavailable(message),
        }
    }

    fn condition(precondition: WritePrecondition) -> WriteCondition {
        match precondition {
            WritePrecondition::CreateOnly => WriteCondition::CreateOnly,
            WritePrecondition::IfMatch(etag) => WriteCondition::IfMatch(etag),
            WritePrecondition::Unconditional => WriteCondition::Unconditional,
        }
    }
}

#[async_trait]
impl CalendarPort for CalDavCalendarAdapter {
    #[instrument(skip(self, profile), fields(calendar = %profile.id))]
    async fn query_events(
        &self,
        profile: &CalendarProfile,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        self.client
            .query_events(profile, start, end, &self.options)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, profile, url), fields(calendar = %profile.id, url = %url))]
    async fn fetch_event(
        &self,
        profile: &CalendarProfile,
        url: &Url,
    ) -> Result<StoredEvent, CalendarError> {
        self.client
            .fetch_event(profile, url, &self.options)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, profile, url, event), fields(calendar = %profile.id, uid = %event.uid))]
    async fn put_event(
        &self,
        profile: &CalendarProfile,
        url: &Url,
        event: &CalendarEvent,
        precondition: WritePrecondition,
        stamp: DateTime<Utc>,
    ) -> Result<Option<String>, CalendarError> {
        let body = build_event_body(event, event.rrule.as_deref(), stamp);
        debug!(body_length = body.len(), "iCalendar body built");

        self.client
            .put_event(profile, url, body, Self::condition(precondition))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(
        skip(self, profile, url, stored, patch),
        fields(calendar = %profile.id, uid = %stored.event.uid)
    )]
    async fn update_event(
        &self,
        profile: &CalendarProfile,
        url: &Url,
        stored: &StoredEvent,
        patch: &EventPatch,
        precondition: WritePrecondition,
        stamp: DateTime<Utc>,
    ) -> Result<Option<String>, CalendarError> {
        let body = patch_event_body(&stored.resource, patch, stamp).map_err(Self::map_error)?;
        debug!(body_length = body.len(), "Stored resource patched");

        self.client
            .put_event(profile, url, body, Self::condition(precondition))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, profile, url), fields(calendar = %profile.id, url = %url))]
    async fn delete_event(
        &self,
        profile: &CalendarProfile,
        url: &Url,
    ) -> Result<(), CalendarError> {
        self.client
            .delete_event(profile, url)
            .await
            .map_err(Self::map_error)
    }
}
