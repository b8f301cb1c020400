//! # availability-engine
//!
//! Timezone-aware free/busy day blocks for calendar-driven task planning.
//!
//! Given a date range, a list of busy intervals and an IANA timezone, the
//! engine partitions every local day of the range into an ordered, gapless
//! list of free and busy blocks from `00:00` to `00:00`. It also ingests the
//! calendar provider's event-list payload, shapes event-insert requests and
//! reshapes week-by-week project plans, without doing any I/O itself.
//!
//! ## Modules
//!
//! - [`availability`]: the per-day block partition (`compute_availability`)
//! - [`interval`]: busy interval value type and plain JSON interval lists
//! - [`calendar`]: provider `events.list` payload → busy intervals
//! - [`schedule`]: validated event-insert request bodies
//! - [`plan`]: project plans and their per-week task views
//! - [`config`]: explicit defaults (timezone, range cap)
//! - [`tz`]: timezone and datetime parsing helpers
//! - [`error`]: Error types and reason codes

pub mod availability;
pub mod calendar;
pub mod config;
pub mod error;
pub mod interval;
pub mod plan;
pub mod schedule;
pub mod tz;

pub use availability::{
    compute_availability, compute_availability_json, compute_availability_json_with,
    compute_availability_with, AvailabilityResult, DayBlock, DaySchedule, TIME_FORMAT_24HR,
};
pub use calendar::{availability_from_calendar, CalendarEvent, CalendarEvents, EventTime};
pub use config::AvailabilityConfig;
pub use error::{AvailabilityError, ErrorCode};
pub use interval::{parse_intervals_json, TimeInterval};
pub use plan::{
    group_by_week, PlanTask, ProjectPlan, ProjectResponse, ProjectTasks, StoredTask, Week,
    WeekTask, WeeklyGoal, WeeklyTask, WeeklyTasks,
};
pub use schedule::{build_event_insert, CreatedEvent, EventDateTime, EventInsert, EventRequest};
