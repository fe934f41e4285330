//! Timezone value object
//!
//! Wraps a validated IANA zone and owns the rules for turning local wall-clock
//! times into instants, including the DST edge cases.

use std::fmt;

use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A validated IANA timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timezone(Tz);

impl Timezone {
    /// Parse an IANA timezone name
    ///
    /// # Examples
    ///
    /// ```
    /// use domain::Timezone;
    ///
    /// let tz = Timezone::parse("Europe/Berlin").unwrap();
    /// assert_eq!(tz.as_str(), "Europe/Berlin");
    /// assert!(Timezone::parse("Mars/Olympus").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        name.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
    }

    /// Parse a timezone name, falling back when it is unknown
    #[must_use]
    pub fn resolve_or(name: &str, fallback: Self) -> Self {
        Self::parse(name).unwrap_or(fallback)
    }

    /// UTC timezone
    #[must_use]
    pub const fn utc() -> Self {
        Self(Tz::UTC)
    }

    /// The underlying chrono-tz zone
    #[must_use]
    pub const fn tz(self) -> Tz {
        self.0
    }

    /// Get the IANA name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0.name()
    }

    /// Interpret a wall-clock time in this zone
    ///
    /// An ambiguous time (DST fall-back) takes the earlier instant. A time
    /// inside a DST gap is read with the offset in force before the
    /// transition, so 02:30 on a spring-forward night lands at 03:30.
    #[must_use]
    pub fn localize(self, naive: NaiveDateTime) -> DateTime<Tz> {
        match self.0.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => {
                let before = self
                    .0
                    .offset_from_utc_datetime(&(naive - TimeDelta::days(1)))
                    .fix();
                let utc = naive - TimeDelta::seconds(i64::from(before.local_minus_utc()));
                Utc.from_utc_datetime(&utc).with_timezone(&self.0)
            },
        }
    }

    /// Local midnight of a date
    #[must_use]
    pub fn start_of_day(self, date: NaiveDate) -> DateTime<Tz> {
        self.localize(date.and_time(NaiveTime::MIN))
    }

    /// Convert any instant into this zone
    #[must_use]
    pub fn convert<Z: TimeZone>(self, instant: &DateTime<Z>) -> DateTime<Tz> {
        instant.with_timezone(&self.0)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Timezone {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Timezone> for String {
    fn from(tz: Timezone) -> Self {
        tz.as_str().to_string()
    }
}

impl From<Tz> for Timezone {
    fn from(tz: Tz) -> Self {
        Self(tz)
    }
}
