//! Error types for availability-engine operations.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date range: {start} to {end} ({reason})")]
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    /// An input interval violates basic ordering or is missing a bound.
    /// `index` is the position of the offending interval in the caller's input.
    #[error("Malformed interval at index {index}: {reason}")]
    MalformedInterval { index: usize, reason: String },

    #[error("Invalid calendar payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid event request: {0}")]
    InvalidEventRequest(String),
}

/// Machine-checkable reason code for an [`AvailabilityError`].
///
/// Callers branch on this instead of inspecting the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidTimezone,
    InvalidDateRange,
    InvalidDatetime,
    MalformedInterval,
    InvalidPayload,
    InvalidEventRequest,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidTimezone => "invalid_timezone",
            ErrorCode::InvalidDateRange => "invalid_date_range",
            ErrorCode::InvalidDatetime => "invalid_datetime",
            ErrorCode::MalformedInterval => "malformed_interval",
            ErrorCode::InvalidPayload => "invalid_payload",
            ErrorCode::InvalidEventRequest => "invalid_event_request",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AvailabilityError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AvailabilityError::InvalidTimezone(_) => ErrorCode::InvalidTimezone,
            AvailabilityError::InvalidDateRange { .. } => ErrorCode::InvalidDateRange,
            AvailabilityError::InvalidDatetime(_) => ErrorCode::InvalidDatetime,
            AvailabilityError::MalformedInterval { .. } => ErrorCode::MalformedInterval,
            AvailabilityError::InvalidPayload(_) => ErrorCode::InvalidPayload,
            AvailabilityError::InvalidEventRequest(_) => ErrorCode::InvalidEventRequest,
        }
    }

    /// True for caller-input validation failures that are reported before any
    /// interval processing takes place.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AvailabilityError::InvalidTimezone(_)
                | AvailabilityError::InvalidDateRange { .. }
                | AvailabilityError::InvalidDatetime(_)
                | AvailabilityError::InvalidEventRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
