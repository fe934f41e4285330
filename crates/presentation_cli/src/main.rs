//! Calendar skill CLI
//!
//! Runs a single calendar command against the configured CalDAV calendars.
//! Results and error messages go to stdout, logs to stderr.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use anyhow::Context;
use application::{ApplicationError, CalendarSkillService, SystemClock};
use clap::{Parser, Subcommand};
use domain::SkillCommand;
use infrastructure::{CONFIG_PATH_ENV, CalDavCalendarAdapter, DEFAULT_CONFIG_PATH};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Calendar skill
#[derive(Debug, Parser)]
#[command(name = "calendar-skill")]
#[command(author, version, about = "Read and manage CalDAV calendars", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the calendar account file
    #[arg(long, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List today's events
    Today {
        /// Maximum number of events to show
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// List events on a date
    On {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Maximum number of events to show
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// List tomorrow's events
    Tomorrow {
        /// Maximum number of events to show
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// List seven days of events
    Week {
        /// First day (YYYY-MM-DD), defaults to this week's Monday
        #[arg(long)]
        start: Option<String>,

        /// Maximum number of events to show
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// Check whether a time slot is free
    Free {
        /// Slot start (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        at: String,

        /// Slot length in minutes
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
    },

    /// Create an event
    ///
    /// Example: calendar-skill create --calendar family --title Dentist --start 2026-03-02T14:00
    Create {
        /// Calendar id
        #[arg(long)]
        calendar: String,

        /// Event title
        #[arg(long)]
        title: String,

        /// Start (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        start: String,

        /// Length in minutes
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,

        /// Event location
        #[arg(long)]
        location: Option<String>,

        /// Recurrence: daily, weekly, monthly or yearly
        #[arg(long)]
        repeat: Option<String>,

        /// Number of occurrences
        #[arg(long)]
        count: Option<u32>,

        /// Last occurrence day (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
    },

    /// Change the title, start or length of an event
    Edit {
        /// Event id as printed by a listing
        event_id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New start (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        start: Option<String>,

        /// New length in minutes
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
    },

    /// Delete an event
    Delete {
        /// Event id as printed by a listing
        event_id: String,

        /// Confirm the deletion
        #[arg(long)]
        confirm: bool,
    },
}

impl From<Commands> for SkillCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Today { limit } => Self::Today { limit },
            Commands::On { date, limit } => Self::On { date, limit },
            Commands::Tomorrow { limit } => Self::Tomorrow { limit },
            Commands::Week { start, limit } => Self::Week { start, limit },
            Commands::Free { at, duration } => Self::Free {
                at,
                duration_minutes: duration,
            },
            Commands::Create {
                calendar,
                title,
                start,
                duration,
                location,
                repeat,
                count,
                until,
            } => Self::Create {
                calendar,
                title,
                start,
                duration_minutes: duration,
                location,
                repeat,
                count,
                until,
            },
            Commands::Edit {
                event_id,
                title,
                start,
                duration,
            } => Self::Edit {
                event_id,
                title,
                start,
                duration_minutes: duration,
            },
            Commands::Delete { event_id, confirm } => Self::Delete { event_id, confirm },
        }
    }
}

/// Get log filter string from verbosity level
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(verbose)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to install the log subscriber")
}

/// Load the configuration, wire the adapters and run one command
async fn execute(config_path: &str, command: SkillCommand) -> Result<String, ApplicationError> {
    let config = infrastructure::load(config_path)?;
    let adapter = CalDavCalendarAdapter::new(&config.settings)?;
    debug!(calendars = config.calendars.len(), "Calendar adapter ready");

    let service = CalendarSkillService::new(
        Arc::new(config),
        Arc::new(adapter),
        Arc::new(SystemClock),
    );
    service.execute(command).await
}

/// Render an outcome as stdout text plus exit code
fn render(outcome: Result<String, ApplicationError>) -> (String, i32) {
    match outcome {
        Ok(output) => (output, 0),
        Err(e) => (format!("Error: {e}"), e.exit_code()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let command = SkillCommand::from(cli.command);
    info!(verb = command.verb(), config = %cli.config, "Running calendar command");

    let (output, code) = render(execute(&cli.config, command).await);
    println!("{output}");
    std::process::exit(code);
}
