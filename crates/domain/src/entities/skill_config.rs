//! Validated skill configuration

use std::collections::BTreeMap;
use std::time::Duration;

use crate::entities::CalendarProfile;
use crate::value_objects::{CalendarId, Timezone};

/// Limits and defaults shared by every command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillSettings {
    pub timezone: Timezone,
    pub default_duration_minutes: u32,
    pub request_timeout_seconds: u64,
    pub default_limit: usize,
    pub max_limit: usize,
    pub title_max_chars: usize,
    pub location_max_chars: usize,
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            timezone: Timezone::utc(),
            default_duration_minutes: 60,
            request_timeout_seconds: 10,
            default_limit: 10,
            max_limit: 25,
            title_max_chars: 180,
            location_max_chars: 140,
        }
    }
}

impl SkillSettings {
    /// Per-request network timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Clamp a user-supplied listing limit to `1..=max_limit`
    #[must_use]
    pub fn bounded_limit(&self, raw: Option<i64>) -> usize {
        bounded_limit(raw, self.default_limit, self.max_limit)
    }
}

/// Immutable configuration: settings plus calendars keyed by id
#[derive(Debug, Clone)]
pub struct SkillConfig {
    pub settings: SkillSettings,
    pub calendars: BTreeMap<CalendarId, CalendarProfile>,
}

impl SkillConfig {
    /// Look up a calendar by its raw id
    pub fn calendar(&self, id: &str) -> Option<&CalendarProfile> {
        CalendarId::new(id)
            .ok()
            .and_then(|id| self.calendars.get(&id))
    }

    /// Calendars with the read flag set, in id order
    pub fn readable_calendars(&self) -> impl Iterator<Item = &CalendarProfile> {
        self.calendars.values().filter(|profile| profile.read)
    }
}

/// Clamp a raw limit: absent → `default`, below one → 1, above `max` → `max`
///
/// # Examples
///
/// ```
/// use domain::bounded_limit;
///
/// assert_eq!(bounded_limit(None, 10, 25), 10);
/// assert_eq!(bounded_limit(Some(-4), 10, 25), 1);
/// assert_eq!(bounded_limit(Some(999), 10, 25), 25);
/// ```
#[must_use]
pub fn bounded_limit(raw: Option<i64>, default: usize, max: usize) -> usize {
    let max = max.max(1);
    match raw {
        None => default.clamp(1, max),
        Some(value) if value < 1 => 1,
        Some(value) => usize::try_from(value).map_or(max, |v| v.min(max)),
    }
}
