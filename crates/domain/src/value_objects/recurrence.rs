//! Recurrence rule value objects

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::Timezone;

/// How often a recurring event repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The iCalendar `FREQ` value
    #[must_use]
    pub const fn as_ical(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ical())
    }
}

impl FromStr for Frequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(DomainError::InvalidRecurrence(format!(
                "Unknown repeat frequency '{other}' (use daily, weekly, monthly or yearly)"
            ))),
        }
    }
}

/// How a recurrence terminates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceEnd {
    /// A fixed number of occurrences
    Count(u32),
    /// Last day (inclusive, local time) on which an occurrence may start
    Until(NaiveDate),
}

/// A simple recurrence: a frequency plus exactly one terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecurrenceRule {
    frequency: Frequency,
    end: RecurrenceEnd,
}

impl RecurrenceRule {
    /// Create a rule from optional `count` / `until` inputs
    ///
    /// # Examples
    ///
    /// ```
    /// use domain::{Frequency, RecurrenceRule};
    ///
    /// assert!(RecurrenceRule::new(Frequency::Weekly, Some(5), None).is_ok());
    /// assert!(RecurrenceRule::new(Frequency::Weekly, None, None).is_err());
    /// ```
    pub fn new(
        frequency: Frequency,
        count: Option<u32>,
        until: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        let end = match (count, until) {
            (Some(_), Some(_)) => {
                return Err(DomainError::InvalidRecurrence(
                    "Use either --count or --until, not both".to_string(),
                ));
            },
            (None, None) => {
                return Err(DomainError::InvalidRecurrence(
                    "Recurring events require --count or --until".to_string(),
                ));
            },
            (Some(0), None) => {
                return Err(DomainError::InvalidRecurrence(
                    "--count must be at least 1".to_string(),
                ));
            },
            (Some(n), None) => RecurrenceEnd::Count(n),
            (None, Some(date)) => RecurrenceEnd::Until(date),
        };
        Ok(Self { frequency, end })
    }

    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    #[must_use]
    pub const fn end(&self) -> RecurrenceEnd {
        self.end
    }

    /// Render as an iCalendar `RRULE` value
    ///
    /// An `until` day becomes the UTC instant of 23:59:59 on that day in
    /// `timezone`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use domain::{Frequency, RecurrenceRule, Timezone};
    ///
    /// let until = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
    /// let rule = RecurrenceRule::new(Frequency::Daily, None, Some(until)).unwrap();
    /// let berlin = Timezone::parse("Europe/Berlin").unwrap();
    /// assert_eq!(rule.to_rrule(berlin), "FREQ=DAILY;UNTIL=20260630T215959Z");
    /// ```
    #[must_use]
    pub fn to_rrule(&self, timezone: Timezone) -> String {
        let freq = self.frequency.as_ical();
        match self.end {
            RecurrenceEnd::Count(count) => format!("FREQ={freq};COUNT={count}"),
            RecurrenceEnd::Until(date) => {
                let last_second =
                    date.and_time(NaiveTime::MIN) + TimeDelta::days(1) - TimeDelta::seconds(1);
                let until = timezone.localize(last_second).with_timezone(&Utc);
                format!("FREQ={freq};UNTIL={}", until.format("%Y%m%dT%H%M%SZ"))
            },
        }
    }
}
