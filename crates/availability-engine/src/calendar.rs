//! Ingestion of the calendar provider's event-list payload.
//!
//! The calendar read collaborator hands over a Google-Calendar-shaped
//! `events.list` response. This module turns it into [`TimeInterval`]s and
//! feeds them to the calculator, using the calendar's declared timezone when
//! the caller did not ask for one.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::availability::{partition_range, validate_range, AvailabilityResult};
use crate::config::AvailabilityConfig;
use crate::error::{AvailabilityError, Result};
use crate::interval::TimeInterval;
use crate::tz::{local_midnight, parse_datetime_in, parse_timezone};

/// Label given to busy blocks whose event has no title.
pub const DEFAULT_LABEL: &str = "Busy";
/// Category given to events without an `eventType`.
pub const DEFAULT_CATEGORY: &str = "default";

/// Start or end of a provider event: `dateTime` for timed events, `date` for
/// all-day events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// One item of an `events.list` response. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
}

impl CalendarEvent {
    /// Cancelled events and events marked as "show me as free" do not block time.
    pub fn is_busy(&self) -> bool {
        self.status.as_deref() != Some("cancelled")
            && self.transparency.as_deref() != Some("transparent")
    }
}

/// A parsed `events.list` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvents {
    /// The calendar's own IANA timezone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Items(Vec<CalendarEvent>),
    Page(CalendarEvents),
}

impl CalendarEvents {
    /// Parse either a full `events.list` object or a bare array of items.
    pub fn from_json(json: &str) -> Result<Self> {
        let payload: Payload = serde_json::from_str(json).map_err(|e| {
            AvailabilityError::InvalidPayload(format!("expected an events list: {}", e))
        })?;
        Ok(match payload {
            Payload::Items(items) => CalendarEvents {
                time_zone: None,
                items,
            },
            Payload::Page(page) => page,
        })
    }

    /// Convert the busy items into intervals.
    ///
    /// All-day dates become local midnight in `tz`. A `dateTime` without an
    /// offset is read in the event's own `timeZone`, or `tz` when it has none.
    ///
    /// # Errors
    ///
    /// [`AvailabilityError::MalformedInterval`] for an item whose start or end
    /// has neither `dateTime` nor `date`; [`AvailabilityError::InvalidDatetime`]
    /// for values that do not parse.
    pub fn busy_intervals(&self, tz: Tz) -> Result<Vec<TimeInterval>> {
        let mut intervals = Vec::with_capacity(self.items.len());
        for (index, event) in self.items.iter().enumerate() {
            if !event.is_busy() {
                debug!(index, id = ?event.id, "skipping non-blocking event");
                continue;
            }
            let start = resolve_event_time(event.start.as_ref(), index, "start", tz)?;
            let end = resolve_event_time(event.end.as_ref(), index, "end", tz)?;
            let interval = TimeInterval {
                start,
                end,
                label: Some(
                    event
                        .summary
                        .clone()
                        .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
                ),
                category: Some(
                    event
                        .event_type
                        .clone()
                        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                ),
            };
            interval.check_order(index)?;
            intervals.push(interval);
        }
        Ok(intervals)
    }
}

fn resolve_event_time(
    time: Option<&EventTime>,
    index: usize,
    bound: &str,
    tz: Tz,
) -> Result<chrono::DateTime<chrono::FixedOffset>> {
    let missing = || AvailabilityError::MalformedInterval {
        index,
        reason: format!("event has no {} time", bound),
    };
    let time = time.ok_or_else(missing)?;

    if let Some(date_time) = time.date_time.as_deref() {
        let zone = match time.time_zone.as_deref() {
            Some(name) => parse_timezone(name).map_err(|_| {
                AvailabilityError::InvalidPayload(format!(
                    "event {} has unknown timeZone '{}'",
                    index, name
                ))
            })?,
            None => tz,
        };
        return parse_datetime_in(date_time, zone);
    }

    let date = time.date.as_deref().ok_or_else(missing)?;
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| AvailabilityError::InvalidDatetime(format!("'{}': {}", date, e)))?;
    Ok(local_midnight(tz, day)?.fixed_offset())
}

/// Compute availability straight from a calendar payload.
///
/// The timezone is the requested one, else the calendar's declared timezone,
/// else `config.default_timezone`. Timezone and date range are validated
/// before any event is read.
pub fn availability_from_calendar(
    events: &CalendarEvents,
    start_date: NaiveDate,
    end_date: NaiveDate,
    requested_timezone: Option<&str>,
    config: &AvailabilityConfig,
) -> Result<AvailabilityResult> {
    let timezone = config.resolve_timezone(requested_timezone, events.time_zone.as_deref());
    let tz = parse_timezone(timezone)?;
    validate_range(start_date, end_date, config.max_days)?;
    debug!(timezone, items = events.items.len(), "ingesting calendar payload");

    let intervals = events.busy_intervals(tz)?;
    partition_range(tz, timezone, start_date, end_date, &intervals)
}
