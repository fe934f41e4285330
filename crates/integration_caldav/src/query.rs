//! CalDAV calendar-query bodies and multistatus responses

use chrono::{DateTime, Utc};
use quick_xml::{Reader, events::Event};
use tracing::debug;

use crate::error::CalDavError;
use crate::ics::format_utc;

/// One `<response>` of a multistatus document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DavResource {
    pub href: String,
    pub etag: Option<String>,
    pub calendar_data: Option<String>,
}

/// Build a `calendar-query` REPORT body for VEVENTs in `[start, end)`
///
/// Recurring events are expanded server-side over the same window.
#[must_use]
pub fn build_calendar_query_xml(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    let start = format_utc(start);
    let end = format_utc(end);
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<c:calendar-query xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop>
    <d:getetag/>
    <c:calendar-data><c:expand start="{start}" end="{end}"/></c:calendar-data>
  </d:prop>
  <c:filter>
    <c:comp-filter name="VCALENDAR">
      <c:comp-filter name="VEVENT">
        <c:time-range start="{start}" end="{end}"/>
      </c:comp-filter>
    </c:comp-filter>
  </c:filter>
</c:calendar-query>"#
    )
}

fn invalid(detail: impl std::fmt::Display) -> CalDavError {
    CalDavError::ParseError(format!("CalDAV response is not valid XML: {detail}"))
}

/// Parse a multistatus document into its resources
///
/// Element names are matched by local name, so any namespace prefix works.
/// Malformed documents fail instead of yielding a partial result.
pub fn parse_multistatus(xml: &str) -> Result<Vec<DavResource>, CalDavError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut resources = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<DavResource> = None;
    let mut saw_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                saw_root = true;
                let name = e.local_name().as_ref().to_vec();
                if name == b"response" {
                    current = Some(DavResource::default());
                }
                stack.push(name);
            },
            Ok(Event::Empty(_)) => saw_root = true,
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(invalid)?;
                collect_text(stack.last(), current.as_mut(), &text);
            },
            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(e.as_ref()).map_err(invalid)?;
                collect_text(stack.last(), current.as_mut(), text);
            },
            Ok(Event::End(e)) => {
                let closed = stack.pop().ok_or_else(|| invalid("unexpected closing tag"))?;
                if closed.as_slice() != e.local_name().as_ref() {
                    return Err(invalid("mismatched closing tag"));
                }
                if closed == b"response" {
                    if let Some(resource) = current.take().filter(|r| !r.href.is_empty()) {
                        resources.push(resource);
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(invalid(e)),
            _ => {},
        }
        buf.clear();
    }

    if !saw_root {
        return Err(invalid("document has no root element"));
    }
    if !stack.is_empty() {
        return Err(invalid("document ended inside an element"));
    }

    debug!(resources = resources.len(), "Parsed multistatus response");
    Ok(resources)
}

fn collect_text(element: Option<&Vec<u8>>, resource: Option<&mut DavResource>, text: &str) {
    let (Some(element), Some(resource)) = (element, resource) else {
        return;
    };
    match element.as_slice() {
        b"href" if resource.href.is_empty() => resource.href = text.trim().to_string(),
        b"getetag" => resource.etag = Some(text.trim().to_string()),
        b"calendar-data" => resource
            .calendar_data
            .get_or_insert_with(String::new)
            .push_str(text),
        _ => {},
    }
}
