//! `avail` CLI. Computes per-day free/busy blocks and reshapes calendar and
//! project plan documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Blocks for a week from a provider events.list payload (stdin → stdout)
//! avail blocks --start 2024-07-16 --end 2024-07-21 < events.json
//!
//! # Force a timezone instead of the calendar's own, read from a file
//! avail blocks --start 2024-07-16 --end 2024-07-16 --timezone Europe/Berlin -i events.json
//!
//! # Plain interval list input, compact output to a file
//! avail blocks --start 2024-07-16 --end 2024-07-16 --input-format intervals \
//!   -i busy.json -o blocks.json --compact
//!
//! # Weekly goals of a generated plan, or one week of a stored project
//! avail plan -i plan.json
//! avail plan --input-format stored --week 2 -i project.json
//!
//! # Build the provider body for scheduling a task
//! echo '{"summary":"Draft","start_time":"2024-07-20T15:00","end_time":"2024-07-20T15:25","timezone":"UTC"}' \
//!   | avail event
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` (e.g. `RUST_LOG=availability_engine=trace`)
//! or pass `--verbose`.

use anyhow::{bail, Context, Result};
use availability_engine::{
    availability_from_calendar, build_event_insert, compute_availability_json_with,
    AvailabilityConfig, CalendarEvents, EventRequest, ProjectPlan, ProjectTasks, WeeklyTasks,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::io::{self, Read};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "avail",
    version,
    about = "Per-day free/busy blocks from calendar events"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// A provider events.list response (or a bare array of its items)
    Gcal,
    /// A JSON array of {start, end, label?, category?} objects
    Intervals,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PlanFormat {
    /// A generated plan: project fields plus a flat task list
    Generated,
    /// A stored project row with its task rows nested under `tasks`
    Stored,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute free/busy blocks for every day of a date range
    Blocks {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day of the range, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// IANA timezone to lay the days out in (defaults to the calendar's own)
        #[arg(long)]
        timezone: Option<String>,
        /// Timezone used when neither --timezone nor the calendar names one
        #[arg(long, env = "AVAIL_TIMEZONE", default_value = "UTC")]
        default_timezone: String,
        /// Largest number of days one request may span (0 disables the cap)
        #[arg(long, env = "AVAIL_MAX_DAYS", default_value_t = 366)]
        max_days: u32,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Shape of the input document
        #[arg(long, value_enum, default_value_t = InputFormat::Gcal)]
        input_format: InputFormat,
        /// Emit single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Reshape a week-by-week project plan
    Plan {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Shape of the input document
        #[arg(long, value_enum, default_value_t = PlanFormat::Generated)]
        input_format: PlanFormat,
        /// Only show this week (stored projects only)
        #[arg(long)]
        week: Option<u32>,
        /// Emit single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Validate a task scheduling request and print the provider insert body
    Event {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Emit single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Blocks {
            start,
            end,
            timezone,
            default_timezone,
            max_days,
            input,
            output,
            input_format,
            compact,
        } => {
            let mut config = AvailabilityConfig::default().with_default_timezone(default_timezone);
            if max_days > 0 {
                config = config.with_max_days(max_days);
            }
            debug!(?config, ?input_format, "loaded configuration");

            let raw = read_input(input.as_deref())?;
            let result = match input_format {
                InputFormat::Gcal => {
                    let events = CalendarEvents::from_json(&raw)
                        .context("Failed to parse calendar events")?;
                    availability_from_calendar(&events, start, end, timezone.as_deref(), &config)
                }
                InputFormat::Intervals => compute_availability_json_with(
                    &config,
                    start,
                    end,
                    &raw,
                    timezone.as_deref(),
                ),
            }
            .context("Failed to compute availability")?;

            info!(
                timezone = %result.timezone,
                days = result.schedule.len(),
                "computed availability"
            );
            let value = serde_json::to_value(&result)?;
            write_json(output.as_deref(), &value, compact)?;
        }
        Commands::Plan {
            input,
            output,
            input_format,
            week,
            compact,
        } => {
            let raw = read_input(input.as_deref())?;
            let value = match (input_format, week) {
                (PlanFormat::Generated, None) => {
                    let plan =
                        ProjectPlan::from_json(&raw).context("Failed to parse project plan")?;
                    let mut value = serde_json::to_value(&plan)?;
                    value["weekly_goals"] = serde_json::to_value(plan.weekly_goals())?;
                    value
                }
                (PlanFormat::Generated, Some(_)) => {
                    bail!("--week needs --input-format stored")
                }
                (PlanFormat::Stored, None) => {
                    let tasks =
                        ProjectTasks::from_json(&raw).context("Failed to parse project tasks")?;
                    serde_json::to_value(&tasks)?
                }
                (PlanFormat::Stored, Some(week)) => {
                    let tasks = WeeklyTasks::from_json(&raw, week)
                        .with_context(|| format!("Failed to build tasks for week {}", week))?;
                    serde_json::to_value(&tasks)?
                }
            };
            write_json(output.as_deref(), &value, compact)?;
        }
        Commands::Event {
            input,
            output,
            compact,
        } => {
            let raw = read_input(input.as_deref())?;
            let request: EventRequest =
                serde_json::from_str(&raw).context("Failed to parse event request")?;
            let insert = build_event_insert(&request).context("Invalid event request")?;
            let value = serde_json::to_value(&insert)?;
            write_json(output.as_deref(), &value, compact)?;
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json(path: Option<&str>, value: &Value, compact: bool) -> Result<()> {
    let mut content = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    content.push('\n');

    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
