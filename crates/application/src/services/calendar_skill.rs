//! Calendar skill service
//!
//! Executes one [`SkillCommand`] against the configured calendars and
//! renders the result as text. Local checks (event id shape, calendar
//! lookup, permissions, argument validation) all run before the calendar
//! port is touched.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use domain::{
    CalendarEvent, CalendarProfile, EventChanges, EventId, Frequency, RecurrenceRule,
    SkillCommand, SkillConfig, sanitize_text,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::calendar_aggregator::CalendarAggregator;
use super::event_formatter::{
    day_heading, format_availability, format_created, format_deleted, format_listing,
    format_updated, week_heading,
};
use crate::date_parser::{local_date, parse_user_date, parse_user_datetime};
use crate::error::ApplicationError;
use crate::ports::{CalendarPort, ClockPort, WritePrecondition};

/// Longest accepted event or slot duration (one week)
pub const MAX_DURATION_MINUTES: i64 = 10_080;

/// Arguments of a `create` command after the calendar is known
struct NewEventArgs<'a> {
    title: &'a str,
    start: &'a str,
    duration_minutes: Option<i64>,
    location: Option<&'a str>,
    repeat: Option<&'a str>,
    count: Option<u32>,
    until: Option<&'a str>,
}

/// Runs skill commands
pub struct CalendarSkillService {
    config: Arc<SkillConfig>,
    calendar_port: Arc<dyn CalendarPort>,
    clock: Arc<dyn ClockPort>,
    aggregator: CalendarAggregator,
}

impl fmt::Debug for CalendarSkillService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarSkillService")
            .field("calendars", &self.config.calendars.len())
            .finish_non_exhaustive()
    }
}

impl CalendarSkillService {
    /// Create a new skill service
    pub fn new(
        config: Arc<SkillConfig>,
        calendar_port: Arc<dyn CalendarPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let aggregator = CalendarAggregator::new(Arc::clone(&calendar_port));
        Self {
            config,
            calendar_port,
            clock,
            aggregator,
        }
    }

    /// Execute a command and return its rendered output
    #[instrument(skip(self, command), fields(verb = command.verb()))]
    pub async fn execute(&self, command: SkillCommand) -> Result<String, ApplicationError> {
        match command {
            SkillCommand::Today { limit } => {
                let today = local_date(self.clock.now(), self.config.settings.timezone);
                self.list_day(today, limit).await
            },
            SkillCommand::Tomorrow { limit } => {
                let today = local_date(self.clock.now(), self.config.settings.timezone);
                self.list_day(next_day(today)?, limit).await
            },
            SkillCommand::On { date, limit } => {
                let date = parse_user_date(&date)?;
                self.list_day(date, limit).await
            },
            SkillCommand::Week { start, limit } => {
                let first = match start {
                    Some(raw) => parse_user_date(&raw)?,
                    None => monday_of(local_date(self.clock.now(), self.config.settings.timezone)),
                };
                self.list_week(first, limit).await
            },
            SkillCommand::Free {
                at,
                duration_minutes,
            } => self.check_free(&at, duration_minutes).await,
            SkillCommand::Create {
                calendar,
                title,
                start,
                duration_minutes,
                location,
                repeat,
                count,
                until,
            } => {
                let args = NewEventArgs {
                    title: &title,
                    start: &start,
                    duration_minutes,
                    location: location.as_deref(),
                    repeat: repeat.as_deref(),
                    count,
                    until: until.as_deref(),
                };
                self.create_event(&calendar, &args).await
            },
            SkillCommand::Edit {
                event_id,
                title,
                start,
                duration_minutes,
            } => {
                self.edit_event(
                    &event_id,
                    title.as_deref(),
                    start.as_deref(),
                    duration_minutes,
                )
                .await
            },
            SkillCommand::Delete { event_id, confirm } => {
                self.delete_event(&event_id, confirm).await
            },
        }
    }

    // ── Listings ────────────────────────────────────────────────

    async fn list_day(
        &self,
        date: NaiveDate,
        limit: Option<i64>,
    ) -> Result<String, ApplicationError> {
        let tz = self.config.settings.timezone;
        let start = tz.start_of_day(date);
        let end = tz.start_of_day(next_day(date)?);
        let heading = day_heading(date, tz);
        self.render_window(&heading, start, end, limit, false).await
    }

    async fn list_week(
        &self,
        first: NaiveDate,
        limit: Option<i64>,
    ) -> Result<String, ApplicationError> {
        let tz = self.config.settings.timezone;
        let last = first
            .checked_add_days(chrono::Days::new(6))
            .ok_or_else(|| out_of_range(first))?;
        let start = tz.start_of_day(first);
        let end = tz.start_of_day(next_day(last)?);
        let heading = week_heading(first, last, tz);
        self.render_window(&heading, start, end, limit, true).await
    }

    async fn render_window(
        &self,
        heading: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        limit: Option<i64>,
        with_dates: bool,
    ) -> Result<String, ApplicationError> {
        let limit = self.config.settings.bounded_limit(limit);
        let mut result = self
            .aggregator
            .collect_events(&self.config, start.with_timezone(&Utc), end.with_timezone(&Utc))
            .await;
        result.events.sort_by_key(|event| event.start);
        Ok(format_listing(
            heading,
            &result.events,
            &result.warnings,
            limit,
            with_dates,
        ))
    }

    async fn check_free(
        &self,
        at: &str,
        duration_minutes: Option<i64>,
    ) -> Result<String, ApplicationError> {
        let start = parse_user_datetime(at, self.config.settings.timezone)?;
        let duration = self.validated_duration(duration_minutes)?;
        let end = start + duration;

        let mut result = self
            .aggregator
            .collect_events(&self.config, start.with_timezone(&Utc), end.with_timezone(&Utc))
            .await;
        result.events.retain(|event| event.overlaps(&start, &end));
        result.events.sort_by_key(|event| event.start);

        Ok(format_availability(
            &start,
            &end,
            &result.events,
            &result.warnings,
        ))
    }

    // ── Mutations ───────────────────────────────────────────────

    #[instrument(skip(self, args))]
    async fn create_event(
        &self,
        calendar: &str,
        args: &NewEventArgs<'_>,
    ) -> Result<String, ApplicationError> {
        let profile = self.calendar(calendar)?;
        ensure_writable(profile)?;

        let settings = &self.config.settings;
        let title = self.validated_title(args.title)?;
        let start = parse_user_datetime(args.start, settings.timezone)?;
        let duration = self.validated_duration(args.duration_minutes)?;
        let location = args
            .location
            .map(|raw| sanitize_text(raw, settings.location_max_chars))
            .filter(|value| !value.is_empty());
        let rrule = self.recurrence(args)?;

        let uid = Uuid::new_v4().to_string();
        let href = format!("{}/{uid}.ics", profile.url.base_path());
        let url = profile.url.resolve_event(&profile.id, &href)?;
        let event_id = EventId::new(profile.id.clone(), href.clone())?;

        let event = CalendarEvent {
            uid,
            summary: title,
            location,
            start,
            end: start + duration,
            all_day: false,
            calendar_id: profile.id.clone(),
            calendar_name: profile.display_name.clone(),
            href: Some(href),
            etag: None,
            rrule,
        };

        self.calendar_port
            .put_event(
                profile,
                &url,
                &event,
                WritePrecondition::CreateOnly,
                self.clock.now(),
            )
            .await?;

        info!(calendar = %profile.id, uid = %event.uid, "Event created");
        Ok(format_created(profile, &event, &event_id))
    }

    #[instrument(skip(self, title, start))]
    async fn edit_event(
        &self,
        event_id: &str,
        title: Option<&str>,
        start: Option<&str>,
        duration_minutes: Option<i64>,
    ) -> Result<String, ApplicationError> {
        let id = EventId::parse(event_id)?;
        let profile = self.calendar(id.calendar_id().as_str())?;
        if title.is_none() && start.is_none() && duration_minutes.is_none() {
            return Err(ApplicationError::Skill(
                "Edit requires at least one of --title, --start or --duration".to_string(),
            ));
        }
        ensure_writable(profile)?;

        let changes = EventChanges {
            title: title.map(|raw| self.validated_title(raw)).transpose()?,
            start: start
                .map(|raw| parse_user_datetime(raw, self.config.settings.timezone))
                .transpose()?,
            duration: duration_minutes
                .map(|minutes| self.validated_duration(Some(minutes)))
                .transpose()?,
        };
        let url = profile.url.resolve_event(&profile.id, id.href())?;

        let stored = self.calendar_port.fetch_event(profile, &url).await?;
        let precondition = stored
            .event
            .etag
            .clone()
            .map_or(WritePrecondition::Unconditional, WritePrecondition::IfMatch);

        let mut updated = stored.event.with_changes(&changes);
        updated.calendar_id = profile.id.clone();
        updated.calendar_name = profile.display_name.clone();
        updated.href = Some(id.href().to_string());
        let patch = changes.patch(&updated);

        self.calendar_port
            .update_event(profile, &url, &stored, &patch, precondition, self.clock.now())
            .await?;

        info!(calendar = %profile.id, uid = %updated.uid, "Event updated");
        Ok(format_updated(profile, &updated, &id))
    }

    #[instrument(skip(self))]
    async fn delete_event(
        &self,
        event_id: &str,
        confirm: bool,
    ) -> Result<String, ApplicationError> {
        let id = EventId::parse(event_id)?;
        let profile = self.calendar(id.calendar_id().as_str())?;
        if !confirm {
            return Err(ApplicationError::Skill("Delete requires --confirm".to_string()));
        }
        ensure_writable(profile)?;
        let url = profile.url.resolve_event(&profile.id, id.href())?;

        self.calendar_port.delete_event(profile, &url).await?;

        info!(calendar = %profile.id, href = id.href(), "Event deleted");
        Ok(format_deleted(profile, &id))
    }

    // ── Validation ──────────────────────────────────────────────

    fn calendar(&self, id: &str) -> Result<&CalendarProfile, ApplicationError> {
        self.config
            .calendar(id)
            .ok_or_else(|| ApplicationError::Skill(format!("Unknown calendar '{id}'")))
    }

    fn validated_title(&self, raw: &str) -> Result<String, ApplicationError> {
        let title = sanitize_text(raw, self.config.settings.title_max_chars);
        if title.is_empty() {
            return Err(ApplicationError::Skill("Title must not be empty".to_string()));
        }
        Ok(title)
    }

    fn validated_duration(&self, raw: Option<i64>) -> Result<TimeDelta, ApplicationError> {
        let default = i64::from(self.config.settings.default_duration_minutes);
        let minutes = raw.unwrap_or(default);
        if !(1..=MAX_DURATION_MINUTES).contains(&minutes) {
            return Err(ApplicationError::Skill(format!(
                "Duration must be between 1 and {MAX_DURATION_MINUTES} minutes"
            )));
        }
        Ok(TimeDelta::minutes(minutes))
    }

    fn recurrence(&self, args: &NewEventArgs<'_>) -> Result<Option<String>, ApplicationError> {
        let Some(repeat) = args.repeat else {
            if args.count.is_some() || args.until.is_some() {
                return Err(ApplicationError::Skill(
                    "--count and --until require --repeat".to_string(),
                ));
            }
            return Ok(None);
        };

        let frequency: Frequency = repeat.parse()?;
        let until = args.until.map(parse_user_date).transpose()?;
        let rule = RecurrenceRule::new(frequency, args.count, until)?;
        Ok(Some(rule.to_rrule(self.config.settings.timezone)))
    }
}

fn ensure_writable(profile: &CalendarProfile) -> Result<(), ApplicationError> {
    if profile.write {
        Ok(())
    } else {
        Err(ApplicationError::AccessDenied(format!(
            "Write access denied for calendar '{}'",
            profile.id
        )))
    }
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, ApplicationError> {
    date.succ_opt().ok_or_else(|| out_of_range(date))
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(i64::from(date.weekday().num_days_from_monday()))
}

fn out_of_range(date: NaiveDate) -> ApplicationError {
    ApplicationError::Skill(format!("Date is out of range: {date}"))
}
