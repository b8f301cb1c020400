//! Shaping of "schedule this task" requests for the calendar provider.
//!
//! [`build_event_insert`] validates a request and produces the body the
//! provider's event-insert call expects; [`CreatedEvent::from_json`] reshapes
//! the provider's answer. Sending the request is left to the caller.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::EventTime;
use crate::error::{AvailabilityError, Result};
use crate::tz::{parse_datetime, parse_datetime_in, parse_timezone};

/// A request to block time for a task.
///
/// `start_time` and `end_time` are RFC 3339, or naive `YYYY-MM-DDTHH:MM[:SS]`
/// read as wall-clock time in `timezone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

/// Body of the provider's event-insert call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventInsert {
    pub summary: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

/// Validate `request` and build the insert body, with both datetimes
/// expressed in the request timezone.
///
/// # Errors
///
/// * [`AvailabilityError::InvalidTimezone`] for an unknown timezone.
/// * [`AvailabilityError::InvalidDatetime`] for unparseable or nonexistent times.
/// * [`AvailabilityError::InvalidEventRequest`] for a blank summary or when
///   `end_time` is not after `start_time`.
pub fn build_event_insert(request: &EventRequest) -> Result<EventInsert> {
    let tz = parse_timezone(&request.timezone)?;

    let summary = request.summary.trim();
    if summary.is_empty() {
        return Err(AvailabilityError::InvalidEventRequest(
            "summary must not be empty".to_string(),
        ));
    }

    let start = parse_datetime_in(&request.start_time, tz)?.with_timezone(&tz);
    let end = parse_datetime_in(&request.end_time, tz)?.with_timezone(&tz);
    if end <= start {
        return Err(AvailabilityError::InvalidEventRequest(
            "end_time must be after start_time".to_string(),
        ));
    }

    debug!(summary, %start, %end, "built event insert");

    let at = |dt: DateTime<chrono_tz::Tz>| EventDateTime {
        date_time: dt.to_rfc3339_opts(SecondsFormat::Secs, false),
        time_zone: request.timezone.clone(),
    };
    Ok(EventInsert {
        summary: summary.to_string(),
        start: at(start),
        end: at(end),
    })
}

/// The provider's answer to an insert, reduced to what the caller needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedEvent {
    pub id: String,
    pub html_link: String,
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCreatedEvent {
    id: Option<String>,
    html_link: Option<String>,
    summary: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
}

impl CreatedEvent {
    /// Parse an event-insert response.
    ///
    /// # Errors
    ///
    /// [`AvailabilityError::InvalidPayload`] when the JSON is invalid or a
    /// required field is missing.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawCreatedEvent = serde_json::from_str(json)
            .map_err(|e| AvailabilityError::InvalidPayload(format!("created event: {}", e)))?;

        let required = |value: Option<String>, field: &str| {
            value.ok_or_else(|| {
                AvailabilityError::InvalidPayload(format!("created event has no {}", field))
            })
        };
        let date_time = |time: Option<EventTime>, field: &str| {
            let value = required(time.and_then(|t| t.date_time), field)?;
            parse_datetime(&value)
        };

        Ok(CreatedEvent {
            id: required(raw.id, "id")?,
            html_link: required(raw.html_link, "htmlLink")?,
            summary: required(raw.summary, "summary")?,
            start: date_time(raw.start, "start.dateTime")?,
            end: date_time(raw.end, "end.dateTime")?,
        })
    }
}
