//! WASM bindings for availability-engine.
//!
//! Exposes day-block computation, calendar payload ingestion, event-insert
//! shaping and project plan views to JavaScript via `wasm-bindgen`. All complex types cross the
//! boundary as JSON strings. Errors are thrown as a JSON string
//! `{"code": "...", "message": "..."}` so callers can branch on the code.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p availability-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/availability-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/availability_engine_wasm.wasm
//! ```

use availability_engine::{
    AvailabilityConfig, AvailabilityError, CalendarEvents, ErrorCode, EventRequest, ProjectPlan,
    ProjectTasks, WeeklyTasks,
};
use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Error rendering
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ErrorDto {
    code: ErrorCode,
    message: String,
}

fn render_error(err: &AvailabilityError) -> String {
    let dto = ErrorDto {
        code: err.code(),
        message: err.to_string(),
    };
    serde_json::to_string(&dto).unwrap_or_else(|_| err.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, AvailabilityError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| AvailabilityError::InvalidDatetime(format!("'{}': {}", s, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// Host-testable implementations
// ---------------------------------------------------------------------------

fn compute_availability_impl(
    start_date: &str,
    end_date: &str,
    intervals_json: &str,
    timezone: &str,
) -> Result<String, String> {
    let run = || -> Result<_, AvailabilityError> {
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        availability_engine::compute_availability_json(start, end, intervals_json, timezone)
    };
    let result = run().map_err(|e| render_error(&e))?;
    to_json(&result)
}

fn availability_from_calendar_impl(
    events_json: &str,
    start_date: &str,
    end_date: &str,
    timezone: Option<&str>,
) -> Result<String, String> {
    let run = || -> Result<_, AvailabilityError> {
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        let events = CalendarEvents::from_json(events_json)?;
        availability_engine::availability_from_calendar(
            &events,
            start,
            end,
            timezone,
            &AvailabilityConfig::default(),
        )
    };
    let result = run().map_err(|e| render_error(&e))?;
    to_json(&result)
}

fn build_event_insert_impl(request_json: &str) -> Result<String, String> {
    let request: EventRequest = serde_json::from_str(request_json).map_err(|e| {
        render_error(&AvailabilityError::InvalidEventRequest(e.to_string()))
    })?;
    let insert =
        availability_engine::build_event_insert(&request).map_err(|e| render_error(&e))?;
    to_json(&insert)
}

fn project_plan_impl(plan_json: &str, project_id: i64) -> Result<String, String> {
    let plan = ProjectPlan::from_json(plan_json).map_err(|e| render_error(&e))?;
    to_json(&plan.into_response(project_id))
}

fn project_tasks_impl(project_json: &str) -> Result<String, String> {
    let tasks = ProjectTasks::from_json(project_json).map_err(|e| render_error(&e))?;
    to_json(&tasks)
}

fn weekly_tasks_impl(project_json: &str, week_no: u32) -> Result<String, String> {
    let tasks = WeeklyTasks::from_json(project_json, week_no).map_err(|e| render_error(&e))?;
    to_json(&tasks)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Partition each day of `startDate..=endDate` into free/busy blocks.
///
/// `intervalsJson` is a JSON array of `{start, end, label?, category?}` objects
/// with RFC 3339 datetimes. Dates are `YYYY-MM-DD`. Returns the availability
/// result as a JSON string.
#[wasm_bindgen(js_name = "computeAvailability")]
pub fn compute_availability(
    start_date: &str,
    end_date: &str,
    intervals_json: &str,
    timezone: &str,
) -> Result<String, JsValue> {
    compute_availability_impl(start_date, end_date, intervals_json, timezone)
        .map_err(|e| JsValue::from_str(&e))
}

/// Compute availability from a provider `events.list` payload.
///
/// When `timezone` is omitted the calendar's own timezone is used, then UTC.
#[wasm_bindgen(js_name = "availabilityFromCalendar")]
pub fn availability_from_calendar(
    events_json: &str,
    start_date: &str,
    end_date: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    availability_from_calendar_impl(events_json, start_date, end_date, timezone.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Validate a `{summary, start_time, end_time, timezone}` request and return
/// the provider event-insert body as a JSON string.
#[wasm_bindgen(js_name = "buildEventInsert")]
pub fn build_event_insert(request_json: &str) -> Result<String, JsValue> {
    build_event_insert_impl(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Validate a generated plan and attach its project id.
#[wasm_bindgen(js_name = "projectPlan")]
pub fn project_plan(plan_json: &str, project_id: i64) -> Result<String, JsValue> {
    project_plan_impl(plan_json, project_id).map_err(|e| JsValue::from_str(&e))
}

/// Group a stored project's task rows by week.
#[wasm_bindgen(js_name = "projectTasks")]
pub fn project_tasks(project_json: &str) -> Result<String, JsValue> {
    project_tasks_impl(project_json).map_err(|e| JsValue::from_str(&e))
}

/// The goal and tasks of one week of a stored project.
#[wasm_bindgen(js_name = "weeklyTasks")]
pub fn weekly_tasks(project_json: &str, week_no: u32) -> Result<String, JsValue> {
    weekly_tasks_impl(project_json, week_no).map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn computes_blocks_from_interval_json() {
        let out = compute_availability_impl(
            "2024-07-16",
            "2024-07-16",
            r#"[{"start": "2024-07-16T09:00:00Z", "end": "2024-07-16T10:00:00Z"}]"#,
            "UTC",
        )
        .unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["available_blocks"]["2024-07-16"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn errors_carry_a_code() {
        let err = compute_availability_impl("2024-07-16", "2024-07-16", "[]", "Not/AZone")
            .unwrap_err();
        let json: Value = serde_json::from_str(&err).unwrap();
        assert_eq!(json["code"], "invalid_timezone");
        assert_eq!(json["message"], "Invalid timezone: Not/AZone");
    }

    #[test]
    fn invalid_timezone_is_reported_before_malformed_intervals() {
        let err = compute_availability_impl(
            "2024-07-16",
            "2024-07-16",
            r#"[{"end": "2024-07-16T10:00:00Z"}]"#,
            "Not/AZone",
        )
        .unwrap_err();
        let json: Value = serde_json::from_str(&err).unwrap();
        assert_eq!(json["code"], "invalid_timezone");
    }

    #[test]
    fn missing_interval_start_is_malformed() {
        let err = compute_availability_impl(
            "2024-07-16",
            "2024-07-16",
            r#"[{"end": "2024-07-16T10:00:00Z"}]"#,
            "UTC",
        )
        .unwrap_err();
        let json: Value = serde_json::from_str(&err).unwrap();
        assert_eq!(json["code"], "malformed_interval");
    }

    #[test]
    fn bad_date_is_invalid_datetime() {
        let err = availability_from_calendar_impl("[]", "July 16", "2024-07-16", None)
            .unwrap_err();
        let json: Value = serde_json::from_str(&err).unwrap();
        assert_eq!(json["code"], "invalid_datetime");
    }

    #[test]
    fn calendar_payload_uses_its_timezone() {
        let out = availability_from_calendar_impl(
            r#"{"timeZone": "Europe/Berlin", "items": []}"#,
            "2024-07-16",
            "2024-07-16",
            None,
        )
        .unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["timezone"], "Europe/Berlin");
    }

    #[test]
    fn event_request_round_trips_to_insert_body() {
        let out = build_event_insert_impl(
            r#"{"summary": "Task", "start_time": "2024-07-20T09:00", "end_time": "2024-07-20T10:00", "timezone": "Europe/Berlin"}"#,
        )
        .unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["start"]["dateTime"], "2024-07-20T09:00:00+02:00");
    }

    #[test]
    fn unparseable_event_request_is_coded() {
        let err = build_event_insert_impl("{}").unwrap_err();
        let json: Value = serde_json::from_str(&err).unwrap();
        assert_eq!(json["code"], "invalid_event_request");
    }

    const PROJECT: &str = r#"{"project_id": 4, "project_name": "Album", "description": "Ten songs.",
        "category": "music", "tasks": [
            {"task_id": 1, "week_no": 1, "task_no": 1, "task": "Demo", "weekly_goal": "Writing"},
            {"task_id": 2, "week_no": 2, "task_no": 1, "task": "Record", "weekly_goal": "Tracking"}
        ]}"#;

    #[test]
    fn plan_gets_project_id() {
        let out = project_plan_impl(
            r#"{"project_name": "Album", "description": "Ten songs.", "category": "music",
                "product_type": "album", "timeline": "2 weeks", "tasks": []}"#,
            4,
        )
        .unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["project_id"], 4);
        assert_eq!(json["product_type"], "album");
    }

    #[test]
    fn plan_missing_field_is_invalid_payload() {
        let err = project_plan_impl(r#"{"project_name": "Album"}"#, 4).unwrap_err();
        let json: Value = serde_json::from_str(&err).unwrap();
        assert_eq!(json["code"], "invalid_payload");
    }

    #[test]
    fn stored_tasks_are_grouped_and_filtered_by_week() {
        let grouped: Value = serde_json::from_str(&project_tasks_impl(PROJECT).unwrap()).unwrap();
        assert_eq!(grouped["weeks"].as_array().unwrap().len(), 2);

        let week: Value = serde_json::from_str(&weekly_tasks_impl(PROJECT, 2).unwrap()).unwrap();
        assert_eq!(week["weekly_goal"], "Tracking");
        assert_eq!(week["tasks"][0]["task"], "Record");
    }
}
