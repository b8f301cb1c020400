//! Explicit configuration for availability computation.

use serde::{Deserialize, Serialize};

/// Timezone used when neither the caller nor the calendar names one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Settings passed into [`crate::availability::compute_availability_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// IANA timezone used as the last fallback.
    pub default_timezone: String,
    /// Largest number of days a single request may span. `None` means no cap.
    pub max_days: Option<u32>,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            max_days: None,
        }
    }
}

impl AvailabilityConfig {
    pub fn with_default_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.default_timezone = timezone.into();
        self
    }

    pub fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = Some(max_days);
        self
    }

    /// Pick the timezone for a request: the explicit one, then the calendar's
    /// own, then the configured default. Empty strings count as absent.
    pub fn resolve_timezone<'a>(
        &'a self,
        requested: Option<&'a str>,
        calendar_native: Option<&'a str>,
    ) -> &'a str {
        requested
            .filter(|tz| !tz.trim().is_empty())
            .or(calendar_native.filter(|tz| !tz.trim().is_empty()))
            .unwrap_or(self.default_timezone.as_str())
    }
}
