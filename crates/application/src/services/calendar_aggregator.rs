//! Calendar aggregator
//!
//! Fans a read query out to every readable calendar. A calendar that fails
//! is reported as a warning instead of failing the whole listing.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use domain::{CalendarEvent, SkillConfig};
use futures::future::join_all;
use tracing::{debug, instrument, warn};

use crate::ports::CalendarPort;

/// Events pooled from several calendars plus per-calendar warnings
#[derive(Debug, Clone, Default)]
pub struct AggregatedEvents {
    pub events: Vec<CalendarEvent>,
    pub warnings: Vec<String>,
}

/// Queries all readable calendars concurrently
pub struct CalendarAggregator {
    calendar_port: Arc<dyn CalendarPort>,
}

impl fmt::Debug for CalendarAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarAggregator").finish_non_exhaustive()
    }
}

impl CalendarAggregator {
    /// Create a new aggregator
    pub fn new(calendar_port: Arc<dyn CalendarPort>) -> Self {
        Self { calendar_port }
    }

    /// Collect events in `[start, end)` from every calendar with read access
    ///
    /// Events are returned in calendar id order, each calendar's events in
    /// server order.
    #[instrument(skip(self, config), fields(calendars = config.calendars.len()))]
    pub async fn collect_events(
        &self,
        config: &SkillConfig,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AggregatedEvents {
        let queries = config.readable_calendars().map(|profile| async move {
            let result = self.calendar_port.query_events(profile, start, end).await;
            (profile, result)
        });

        let mut aggregated = AggregatedEvents::default();
        for (profile, result) in join_all(queries).await {
            match result {
                Ok(events) => {
                    debug!(calendar = %profile.id, events = events.len(), "Calendar queried");
                    aggregated.events.extend(events);
                },
                Err(e) => {
                    warn!(calendar = %profile.id, error = %e, "Calendar query failed");
                    aggregated
                        .warnings
                        .push(format!("Calendar '{}' unavailable: {e}", profile.display_name));
                },
            }
        }
        aggregated
    }
}
