//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod calendar_port;
mod clock_port;

pub use calendar_port::{CalendarError, CalendarPort, WritePrecondition};
#[cfg(test)]
pub use clock_port::MockClockPort;
pub use clock_port::{ClockPort, SystemClock};
