//! Application services - Use case implementations

mod calendar_aggregator;
mod calendar_skill;
pub mod event_formatter;
#[cfg(test)]
pub(crate) mod test_support;

pub use calendar_aggregator::{AggregatedEvents, CalendarAggregator};
pub use calendar_skill::{CalendarSkillService, MAX_DURATION_MINUTES};
