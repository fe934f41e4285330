//! CalDAV client
//!
//! Issues REPORT/GET/PUT/DELETE requests against a calendar collection and
//! maps HTTP statuses onto [`CalDavError`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use domain::{CalendarEvent, CalendarProfile, StoredEvent, normalize_event_href};
use reqwest::{Method, StatusCode};
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::CalDavError;
use crate::ics::{EventSource, IcsOptions, extract_events, extract_master_event};
use crate::query::{build_calendar_query_xml, parse_multistatus};
use crate::transport::{CalDavTransport, DavRequest, HttpResult};

/// Concurrency guard for a PUT
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCondition {
    /// Only create; fail if the resource exists (`If-None-Match: *`)
    CreateOnly,
    /// Only replace the given version (`If-Match`)
    IfMatch(String),
    /// No conditional header
    Unconditional,
}

/// CalDAV client bound to a transport and a per-request timeout
#[derive(Clone)]
pub struct CalDavClient {
    transport: Arc<dyn CalDavTransport>,
    timeout: Duration,
}

impl std::fmt::Debug for CalDavClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalDavClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn report_method() -> Result<Method, CalDavError> {
    Method::from_bytes(b"REPORT")
        .map_err(|e| CalDavError::RequestFailed(format!("invalid REPORT method: {e}")))
}

impl CalDavClient {
    /// Create a new client
    #[must_use]
    pub fn new(transport: Arc<dyn CalDavTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    fn dav_request(
        &self,
        method: Method,
        url: Url,
        profile: &CalendarProfile,
        operation: &'static str,
    ) -> DavRequest {
        DavRequest::new(
            method,
            url,
            profile.credentials.clone(),
            self.timeout,
            operation,
        )
    }

    /// Send a request and map error statuses
    ///
    /// 401/403 → authentication, 404 → not found, 412 → precondition failed,
    /// any other non-2xx → request failed. Headers are kept on success.
    pub async fn request(&self, request: DavRequest) -> Result<HttpResult, CalDavError> {
        let operation = request.operation;
        let result = self.transport.execute(request).await?;

        match result.status {
            status if status.is_success() => Ok(result),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(CalDavError::AuthenticationFailed(operation.to_string()))
            },
            StatusCode::NOT_FOUND => Err(CalDavError::NotFound(operation.to_string())),
            StatusCode::PRECONDITION_FAILED => {
                Err(CalDavError::PreconditionFailed(operation.to_string()))
            },
            status => Err(CalDavError::RequestFailed(format!(
                "{operation} returned HTTP {status}"
            ))),
        }
    }

    /// Query a calendar for events in `[start, end)`, recurrences expanded
    #[instrument(skip(self, profile, options), fields(calendar = %profile.id))]
    pub async fn query_events(
        &self,
        profile: &CalendarProfile,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        options: &IcsOptions,
    ) -> Result<Vec<CalendarEvent>, CalDavError> {
        let request = self
            .dav_request(report_method()?, profile.url.as_url().clone(), profile, "query")
            .header("Depth", "1")
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(build_calendar_query_xml(&start, &end));

        let response = self.request(request).await?;
        let body = response.text();
        debug!(body_length = body.len(), "REPORT response received");

        let resources = parse_multistatus(&body)?;
        let mut events = Vec::new();
        for resource in resources {
            let Some(data) = resource.calendar_data else {
                continue;
            };
            let source = EventSource {
                calendar_id: profile.id.clone(),
                calendar_name: profile.display_name.clone(),
                href: Some(normalize_event_href(&resource.href)),
                etag: resource.etag,
            };
            events.extend(extract_events(&data, &source, options));
        }

        debug!(events = events.len(), "Events extracted");
        Ok(events)
    }

    /// Fetch a stored resource, its master event and its ETag
    #[instrument(skip(self, profile, url, options), fields(calendar = %profile.id, url = %url))]
    pub async fn fetch_event(
        &self,
        profile: &CalendarProfile,
        url: &Url,
        options: &IcsOptions,
    ) -> Result<StoredEvent, CalDavError> {
        let request = self.dav_request(Method::GET, url.clone(), profile, "fetch");
        let response = self.request(request).await?;

        let source = EventSource {
            calendar_id: profile.id.clone(),
            calendar_name: profile.display_name.clone(),
            href: Some(url.path().to_string()),
            etag: response.etag(),
        };
        let resource = response.text();
        debug!(body_length = resource.len(), "Resource fetched");
        let event = extract_master_event(&resource, &source, options).ok_or_else(|| {
            CalDavError::InvalidData("resource does not contain a usable VEVENT".to_string())
        })?;
        Ok(StoredEvent { event, resource })
    }

    /// Store an iCalendar body, returning the new ETag if the server sent one
    #[instrument(skip(self, profile, url, body), fields(calendar = %profile.id, url = %url))]
    pub async fn put_event(
        &self,
        profile: &CalendarProfile,
        url: &Url,
        body: String,
        condition: WriteCondition,
    ) -> Result<Option<String>, CalDavError> {
        let operation = if condition == WriteCondition::CreateOnly {
            "create"
        } else {
            "update"
        };
        let mut request = self
            .dav_request(Method::PUT, url.clone(), profile, operation)
            .header("Content-Type", "text/calendar; charset=utf-8")
            .body(body);
        request = match condition {
            WriteCondition::CreateOnly => request.header("If-None-Match", "*"),
            WriteCondition::IfMatch(etag) => request.header("If-Match", etag),
            WriteCondition::Unconditional => request,
        };

        let response = self.request(request).await?;
        info!(status = %response.status, operation, "Event stored");
        Ok(response.etag())
    }

    /// Delete a stored event
    #[instrument(skip(self, profile, url), fields(calendar = %profile.id, url = %url))]
    pub async fn delete_event(&self, profile: &CalendarProfile, url: &Url) -> Result<(), CalDavError> {
        let request = self.dav_request(Method::DELETE, url.clone(), profile, "delete");
        let response = self.request(request).await?;
        info!(status = %response.status, "Event deleted");
        Ok(())
    }
}
