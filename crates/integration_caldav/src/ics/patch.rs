//! In-place edits of stored iCalendar resources
//!
//! An edit rewrites only the master VEVENT's SUMMARY, DTSTART, DTEND and
//! DTSTAMP. All other properties, parameters and components (descriptions,
//! exception dates, alarms, time zones, overridden occurrences) are written
//! back as they were read.

use chrono::{DateTime, Utc};
use domain::EventPatch;
use icalendar::parser::{self, Component, Property};

use super::generate::{PRODID, escape_text, format_utc, push_line};
use super::parse::{collect_vevents, is_named, master_event, unfold_document};
use crate::error::CalDavError;

/// Replacement for one property of the master VEVENT
struct Replacement {
    name: &'static str,
    /// `None` removes the property
    line: Option<String>,
    written: bool,
}

impl Replacement {
    const fn set(name: &'static str, line: String) -> Self {
        Self {
            name,
            line: Some(line),
            written: false,
        }
    }

    const fn remove(name: &'static str) -> Self {
        Self {
            name,
            line: None,
            written: false,
        }
    }
}

/// Apply `patch` to the master VEVENT of `resource` and serialize the result
///
/// `stamp` becomes the new DTSTAMP. A new window is written in UTC and
/// replaces DTSTART and DTEND; a DURATION property is dropped with it.
///
/// # Errors
///
/// Returns [`CalDavError::InvalidData`] when the resource cannot be parsed or
/// holds no VEVENT.
pub fn patch_event_body(
    resource: &str,
    patch: &EventPatch,
    stamp: DateTime<Utc>,
) -> Result<String, CalDavError> {
    let text = unfold_document(resource);
    let calendar = parser::read_calendar(&text)
        .map_err(|e| CalDavError::InvalidData(format!("iCalendar parse error: {e}")))?;

    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);
    let master = master_event(&vevents).ok_or_else(|| {
        CalDavError::InvalidData("resource does not contain a usable VEVENT".to_string())
    })?;

    let mut writer = ResourceWriter {
        master,
        replacements: replacements(patch, stamp),
        out: String::with_capacity(text.len() + 128),
    };

    let wrapped = matches!(
        calendar.components.as_slice(),
        [root] if is_named(root, "VCALENDAR")
    );
    if wrapped {
        for component in &calendar.components {
            writer.component(component);
        }
    } else {
        push_line(&mut writer.out, "BEGIN:VCALENDAR");
        let has_version = calendar
            .properties
            .iter()
            .any(|property| property.name.as_str().eq_ignore_ascii_case("VERSION"));
        if !has_version {
            push_line(&mut writer.out, "VERSION:2.0");
            push_line(&mut writer.out, &format!("PRODID:{PRODID}"));
        }
        for property in &calendar.properties {
            push_line(&mut writer.out, &property_line(property));
        }
        for component in &calendar.components {
            writer.component(component);
        }
        push_line(&mut writer.out, "END:VCALENDAR");
    }

    Ok(writer.out)
}

fn replacements(patch: &EventPatch, stamp: DateTime<Utc>) -> Vec<Replacement> {
    let mut replacements = vec![Replacement::set(
        "DTSTAMP",
        format!("DTSTAMP:{}", format_utc(&stamp)),
    )];
    if let Some(summary) = &patch.summary {
        replacements.push(Replacement::set(
            "SUMMARY",
            format!("SUMMARY:{}", escape_text(summary)),
        ));
    }
    if let Some((start, end)) = &patch.window {
        replacements.push(Replacement::set(
            "DTSTART",
            format!("DTSTART:{}", format_utc(start)),
        ));
        replacements.push(Replacement::set("DTEND", format!("DTEND:{}", format_utc(end))));
        replacements.push(Replacement::remove("DURATION"));
    }
    replacements
}

struct ResourceWriter<'c, 'a> {
    master: &'c Component<'a>,
    replacements: Vec<Replacement>,
    out: String,
}

impl<'a> ResourceWriter<'_, 'a> {
    fn component(&mut self, component: &Component<'a>) {
        let name = component.name.as_str();
        push_line(&mut self.out, &format!("BEGIN:{name}"));

        if std::ptr::eq(component, self.master) {
            self.master_properties(component);
        } else {
            for property in &component.properties {
                push_line(&mut self.out, &property_line(property));
            }
        }
        for child in &component.components {
            self.component(child);
        }

        push_line(&mut self.out, &format!("END:{name}"));
    }

    fn master_properties(&mut self, component: &Component<'_>) {
        for property in &component.properties {
            let name = property.name.as_str();
            let Some(replacement) = self
                .replacements
                .iter_mut()
                .find(|replacement| name.eq_ignore_ascii_case(replacement.name))
            else {
                push_line(&mut self.out, &property_line(property));
                continue;
            };
            if replacement.written {
                continue;
            }
            if let Some(line) = &replacement.line {
                push_line(&mut self.out, line);
            }
            replacement.written = true;
        }

        for replacement in &mut self.replacements {
            if replacement.written {
                continue;
            }
            if let Some(line) = &replacement.line {
                push_line(&mut self.out, line);
            }
            replacement.written = true;
        }
    }
}

/// A parsed property written back with its parameters and raw value
fn property_line(property: &Property<'_>) -> String {
    let mut line = property.name.as_str().to_string();
    for param in &property.params {
        line.push(';');
        line.push_str(param.key.as_str());
        if let Some(value) = &param.val {
            let value = value.as_str();
            line.push('=');
            if !value.starts_with('"') && value.contains([':', ';', ',']) {
                line.push('"');
                line.push_str(value);
                line.push('"');
            } else {
                line.push_str(value);
            }
        }
    }
    line.push(':');
    line.push_str(property.val.as_str());
    line
}
