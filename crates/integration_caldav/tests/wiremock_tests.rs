//! Integration tests for the CalDAV client using WireMock
//!
//! These tests mock CalDAV server responses (REPORT, GET, PUT, DELETE) to
//! verify the reqwest transport and status handling without a real server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use domain::{CalendarCredentials, CalendarId, CalendarProfile, CalendarUrl, Timezone};
use integration_caldav::{CalDavClient, CalDavError, IcsOptions, ReqwestTransport, WriteCondition};
use secrecy::SecretString;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn profile(server: &MockServer) -> CalendarProfile {
    CalendarProfile {
        id: CalendarId::new("family").unwrap(),
        display_name: "Family".to_string(),
        url: CalendarUrl::parse(&format!("{}/dav/family", server.uri())).unwrap(),
        credentials: CalendarCredentials::new("alice", SecretString::from("secret")),
        read: true,
        write: true,
    }
}

fn client(timeout: Duration) -> CalDavClient {
    let transport = ReqwestTransport::new().expect("transport");
    CalDavClient::new(Arc::new(transport), timeout)
}

fn options() -> IcsOptions {
    IcsOptions {
        timezone: Timezone::parse("Europe/Berlin").unwrap(),
        fallback_duration_minutes: 60,
        title_max_chars: 180,
        location_max_chars: 140,
    }
}

fn event_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/dav/family/event-1.ics", server.uri())).unwrap()
}

const EVENT_ICS: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:event-1\r\nSUMMARY:Dentist\r\nDTSTART:20260302T130000Z\r\nDTEND:20260302T140000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

fn report_response() -> String {
    r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/dav/family/event-1.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>"v1"</D:getetag>
        <C:calendar-data>BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:event-1
SUMMARY:Dentist
DTSTART:20260302T130000Z
DTEND:20260302T140000Z
END:VEVENT
END:VCALENDAR</C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#
        .to_string()
}

// =============================================================================
// REPORT Tests
// =============================================================================

#[tokio::test]
async fn query_events_sends_authenticated_report() {
    let server = MockServer::start().await;

    Mock::given(method("REPORT"))
        .and(path("/dav/family"))
        .and(header("Depth", "1"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .and(body_string_contains("<c:expand "))
        .and(body_string_contains("time-range"))
        .respond_with(ResponseTemplate::new(207).set_body_string(report_response()))
        .expect(1)
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 3, 2, 23, 0, 0).unwrap();
    let events = client(Duration::from_secs(5))
        .query_events(&profile(&server), start, end, &options())
        .await
        .expect("query should succeed");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "Dentist");
    assert_eq!(events[0].etag.as_deref(), Some("\"v1\""));
    assert_eq!(events[0].href.as_deref(), Some("/dav/family/event-1.ics"));
}

#[tokio::test]
async fn query_events_rejects_broken_xml() {
    let server = MockServer::start().await;

    Mock::given(method("REPORT"))
        .respond_with(ResponseTemplate::new(207).set_body_string("<d:multistatus>broken"))
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let err = client(Duration::from_secs(5))
        .query_events(&profile(&server), start, start, &options())
        .await
        .unwrap_err();

    assert!(matches!(err, CalDavError::ParseError(_)));
}

#[tokio::test]
async fn query_events_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("REPORT"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let err = client(Duration::from_secs(5))
        .query_events(&profile(&server), start, start, &options())
        .await
        .unwrap_err();

    assert!(matches!(err, CalDavError::AuthenticationFailed(_)));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("REPORT"))
        .respond_with(
            ResponseTemplate::new(207)
                .set_body_string(report_response())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let err = client(Duration::from_millis(100))
        .query_events(&profile(&server), start, start, &options())
        .await
        .unwrap_err();

    assert!(matches!(err, CalDavError::Timeout));
}

// =============================================================================
// GET / PUT / DELETE Tests
// =============================================================================

#[tokio::test]
async fn fetch_event_reads_etag_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dav/family/event-1.ics"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_string(EVENT_ICS),
        )
        .mount(&server)
        .await;

    let stored = client(Duration::from_secs(5))
        .fetch_event(&profile(&server), &event_url(&server), &options())
        .await
        .expect("fetch should succeed");

    assert_eq!(stored.event.uid, "event-1");
    assert_eq!(stored.event.etag.as_deref(), Some("\"v1\""));
    assert_eq!(stored.resource, EVENT_ICS);
}

#[tokio::test]
async fn fetch_missing_event_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(Duration::from_secs(5))
        .fetch_event(&profile(&server), &event_url(&server), &options())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn put_with_etag_sends_if_match() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/dav/family/event-1.ics"))
        .and(header("If-Match", "\"v1\""))
        .and(header("Content-Type", "text/calendar; charset=utf-8"))
        .respond_with(ResponseTemplate::new(204).insert_header("ETag", "\"v2\""))
        .expect(1)
        .mount(&server)
        .await;

    let etag = client(Duration::from_secs(5))
        .put_event(
            &profile(&server),
            &event_url(&server),
            EVENT_ICS.to_string(),
            WriteCondition::IfMatch("\"v1\"".to_string()),
        )
        .await
        .expect("put should succeed");

    assert_eq!(etag.as_deref(), Some("\"v2\""));
}

#[tokio::test]
async fn put_without_etag_omits_if_match() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client(Duration::from_secs(5))
        .put_event(
            &profile(&server),
            &event_url(&server),
            EVENT_ICS.to_string(),
            WriteCondition::Unconditional,
        )
        .await
        .expect("put should succeed");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("if-match").is_none());
    assert!(requests[0].headers.get("if-none-match").is_none());
}

#[tokio::test]
async fn create_sends_if_none_match() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(header("If-None-Match", "*"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client(Duration::from_secs(5))
        .put_event(
            &profile(&server),
            &event_url(&server),
            EVENT_ICS.to_string(),
            WriteCondition::CreateOnly,
        )
        .await
        .expect("create should succeed");
}

#[tokio::test]
async fn stale_etag_is_precondition_failed() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(412))
        .mount(&server)
        .await;

    let err = client(Duration::from_secs(5))
        .put_event(
            &profile(&server),
            &event_url(&server),
            EVENT_ICS.to_string(),
            WriteCondition::IfMatch("\"old\"".to_string()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CalDavError::PreconditionFailed(_)));
}

#[tokio::test]
async fn delete_event_success() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/dav/family/event-1.ics"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(Duration::from_secs(5))
        .delete_event(&profile(&server), &event_url(&server))
        .await
        .expect("delete should succeed");
}

#[tokio::test]
async fn delete_missing_event_reports_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(Duration::from_secs(5))
        .delete_event(&profile(&server), &event_url(&server))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Calendar endpoint not found for delete.");
}
