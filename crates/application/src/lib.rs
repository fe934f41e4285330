//! Application layer - Use cases and orchestration
//!
//! Turns skill commands into calendar port calls and renders the results.
//! Contains the port definitions implemented by the infrastructure layer.

pub mod date_parser;
pub mod error;
pub mod ports;
pub mod services;

pub use date_parser::{local_date, parse_user_date, parse_user_datetime};
pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
