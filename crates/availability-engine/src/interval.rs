//! Busy intervals as supplied by the calendar read collaborator.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::tz::parse_datetime;

/// A half-open busy span `[start, end)`.
///
/// Each bound keeps the UTC offset it arrived with; the calculator converts
/// them into the target timezone itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Display label (the event title).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Category tag, e.g. `"default"` or `"outOfOffice"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TimeInterval {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            start,
            end,
            label: None,
            category: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Ordering check used by the calculator; `index` is only used for the
    /// error report.
    pub(crate) fn check_order(&self, index: usize) -> Result<()> {
        if self.end <= self.start {
            return Err(AvailabilityError::MalformedInterval {
                index,
                reason: format!(
                    "end {} is not after start {}",
                    self.end.to_rfc3339(),
                    self.start.to_rfc3339()
                ),
            });
        }
        Ok(())
    }
}

/// Wire format for a plain interval list.
#[derive(Deserialize)]
struct IntervalInput {
    start: Option<String>,
    end: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Parse a JSON array of `{start, end, label?, category?}` objects with
/// RFC 3339 bounds.
///
/// A missing bound is a [`AvailabilityError::MalformedInterval`]; an
/// unparseable one is an [`AvailabilityError::InvalidDatetime`].
pub fn parse_intervals_json(json: &str) -> Result<Vec<TimeInterval>> {
    let inputs: Vec<IntervalInput> = serde_json::from_str(json)
        .map_err(|e| AvailabilityError::InvalidPayload(format!("interval list: {}", e)))?;

    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let missing = |bound: &str| AvailabilityError::MalformedInterval {
                index,
                reason: format!("missing {}", bound),
            };
            let start = parse_datetime(input.start.as_deref().ok_or_else(|| missing("start"))?)?;
            let end = parse_datetime(input.end.as_deref().ok_or_else(|| missing("end"))?)?;
            Ok(TimeInterval {
                start,
                end,
                label: input.label,
                category: input.category,
            })
        })
        .collect()
}
