//! # availability-engine-python
//!
//! Python bindings for availability-engine, built with PyO3, so the Python
//! web backend can compute day blocks in-process.
//!
//! Exposes the following functions as the `_native` module:
//!
//! - `compute_availability(start_date, end_date, intervals_json, timezone)` -- JSON string
//! - `availability_from_calendar(events_json, start_date, end_date, timezone=None, default_timezone=None)` -- JSON string
//! - `build_event_insert(request_json)` -- JSON string of the provider insert body
//! - `project_plan(plan_json, project_id)` -- validated plan with its project id
//! - `project_tasks(project_json)` -- stored task rows grouped by week
//! - `weekly_tasks(project_json, week_no)` -- goal and tasks of one week
//!
//! Engine errors raise `ValueError(code, message)` where `code` is a stable
//! string such as `"invalid_timezone"`.

use availability_engine::{
    AvailabilityConfig, AvailabilityError, CalendarEvents, EventRequest, ProjectPlan,
    ProjectTasks, WeeklyTasks,
};
use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(err: AvailabilityError) -> PyErr {
    PyValueError::new_err((err.code().as_str(), err.to_string()))
}

fn parse_date(s: &str) -> PyResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        to_py_err(AvailabilityError::InvalidDatetime(format!("'{}': {}", s, e)))
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Partition each day of a date range into free/busy blocks.
///
/// Args:
///     start_date: First day, "YYYY-MM-DD".
///     end_date: Last day (inclusive), "YYYY-MM-DD".
///     intervals_json: JSON array of {"start", "end", "label"?, "category"?}
///         objects with RFC 3339 datetimes.
///     timezone: IANA timezone identifier (e.g., "America/Los_Angeles").
///
/// Returns:
///     A JSON string: {"timezone", "time_format", "available_blocks"}.
///
/// Raises:
///     ValueError: (code, message) for invalid timezone, date range or intervals.
///         The timezone is checked before the intervals are read.
#[pyfunction]
fn compute_availability(
    start_date: &str,
    end_date: &str,
    intervals_json: &str,
    timezone: &str,
) -> PyResult<String> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;
    let result =
        availability_engine::compute_availability_json(start, end, intervals_json, timezone)
            .map_err(to_py_err)?;
    to_json(&result)
}

/// Compute availability from a calendar provider `events.list` response.
///
/// Args:
///     events_json: The provider response (or a bare array of its items).
///     start_date: First day, "YYYY-MM-DD".
///     end_date: Last day (inclusive), "YYYY-MM-DD".
///     timezone: Optional IANA timezone; defaults to the calendar's own, then
///         `default_timezone`.
///     default_timezone: Last-resort timezone, "UTC" unless given.
///
/// Returns:
///     A JSON string: {"timezone", "time_format", "available_blocks"}.
///
/// Raises:
///     ValueError: (code, message) for invalid input.
#[pyfunction]
#[pyo3(signature = (events_json, start_date, end_date, timezone=None, default_timezone=None))]
fn availability_from_calendar(
    events_json: &str,
    start_date: &str,
    end_date: &str,
    timezone: Option<&str>,
    default_timezone: Option<&str>,
) -> PyResult<String> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;
    let mut config = AvailabilityConfig::default();
    if let Some(tz) = default_timezone {
        config = config.with_default_timezone(tz);
    }
    let events = CalendarEvents::from_json(events_json).map_err(to_py_err)?;
    let result =
        availability_engine::availability_from_calendar(&events, start, end, timezone, &config)
            .map_err(to_py_err)?;
    to_json(&result)
}

/// Validate a task scheduling request and build the provider insert body.
///
/// Args:
///     request_json: {"summary", "start_time", "end_time", "timezone"}; times
///         are RFC 3339 or naive local "YYYY-MM-DDTHH:MM[:SS]".
///
/// Returns:
///     A JSON string: {"summary", "start": {"dateTime", "timeZone"}, "end": {...}}.
///
/// Raises:
///     ValueError: (code, message) for invalid requests.
#[pyfunction]
fn build_event_insert(request_json: &str) -> PyResult<String> {
    let request: EventRequest = serde_json::from_str(request_json)
        .map_err(|e| to_py_err(AvailabilityError::InvalidEventRequest(e.to_string())))?;
    let insert = availability_engine::build_event_insert(&request).map_err(to_py_err)?;
    to_json(&insert)
}

/// Validate a generated plan and attach its project id.
///
/// Raises:
///     ValueError: ("invalid_payload", message) when a field is missing.
#[pyfunction]
fn project_plan(plan_json: &str, project_id: i64) -> PyResult<String> {
    let plan = ProjectPlan::from_json(plan_json).map_err(to_py_err)?;
    to_json(&plan.into_response(project_id))
}

/// Group a stored project's task rows (nested under "tasks") by week.
#[pyfunction]
fn project_tasks(project_json: &str) -> PyResult<String> {
    let tasks = ProjectTasks::from_json(project_json).map_err(to_py_err)?;
    to_json(&tasks)
}

/// The goal and tasks of week `week_no` of a stored project.
#[pyfunction]
fn weekly_tasks(project_json: &str, week_no: u32) -> PyResult<String> {
    let tasks = WeeklyTasks::from_json(project_json, week_no).map_err(to_py_err)?;
    to_json(&tasks)
}

/// The `_native` Python module.
#[pymodule]
fn _native(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_availability, m)?)?;
    m.add_function(wrap_pyfunction!(availability_from_calendar, m)?)?;
    m.add_function(wrap_pyfunction!(build_event_insert, m)?)?;
    m.add_function(wrap_pyfunction!(project_plan, m)?)?;
    m.add_function(wrap_pyfunction!(project_tasks, m)?)?;
    m.add_function(wrap_pyfunction!(weekly_tasks, m)?)?;
    Ok(())
}
