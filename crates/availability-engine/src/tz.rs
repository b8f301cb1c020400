//! Timezone and datetime parsing helpers shared by the calculator, the calendar
//! payload ingestion and the event request builder.
//!
//! Every function takes its inputs explicitly; nothing reads the system clock
//! or the host timezone.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone,
};
use chrono_tz::Tz;

use crate::error::{AvailabilityError, Result};

/// Parse an IANA timezone identifier (e.g., `"America/Los_Angeles"`).
///
/// # Errors
///
/// Returns [`AvailabilityError::InvalidTimezone`] if the name is unknown.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AvailabilityError::InvalidTimezone(name.to_string()))
}

/// Parse an RFC 3339 datetime, keeping its original UTC offset.
pub fn parse_datetime(s: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map_err(|e| AvailabilityError::InvalidDatetime(format!("'{}': {}", s, e)))
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a datetime that is either RFC 3339 (offset kept) or a naive local
/// wall-clock value, which is then placed in `tz`.
///
/// A naive value that is ambiguous (DST fall-back) resolves to the earlier
/// instant. A naive value inside a DST gap does not exist and is rejected.
pub fn parse_datetime_in(s: &str, tz: Tz) -> Result<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
        return Ok(dt);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
        .ok_or_else(|| {
            AvailabilityError::InvalidDatetime(format!(
                "'{}' is neither RFC 3339 nor YYYY-MM-DDTHH:MM[:SS]",
                s
            ))
        })?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.fixed_offset()),
        LocalResult::None => Err(AvailabilityError::InvalidDatetime(format!(
            "'{}' does not exist in {} (DST gap)",
            s, tz
        ))),
    }
}

/// The first instant of `date` in `tz`.
///
/// Normally this is local midnight. In zones whose DST transition happens at
/// midnight, local `00:00` may not exist; the day then begins at the
/// transition instant, which is midnight read with the pre-transition offset.
pub fn local_midnight(tz: Tz, date: NaiveDate) -> Result<DateTime<Tz>> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => {
            let before = tz
                .from_local_datetime(&(naive - Duration::days(1)))
                .earliest()
                .ok_or_else(|| {
                    AvailabilityError::InvalidDatetime(format!(
                        "cannot resolve start of {} in {}",
                        date, tz
                    ))
                })?;
            let offset_secs = i64::from(before.offset().fix().local_minus_utc());
            let utc = naive - Duration::seconds(offset_secs);
            Ok(tz.from_utc_datetime(&utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_known_zone() {
        assert_eq!(parse_timezone("Europe/Berlin").unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn rejects_unknown_zone() {
        let err = parse_timezone("Not/AZone").unwrap_err();
        assert_eq!(err, AvailabilityError::InvalidTimezone("Not/AZone".into()));
    }

    #[test]
    fn naive_datetime_is_placed_in_zone() {
        let dt = parse_datetime_in("2024-07-20T15:00", chrono_tz::America::Los_Angeles).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-07-20T15:00:00-07:00");
    }

    #[test]
    fn rfc3339_keeps_its_own_offset() {
        let dt = parse_datetime_in("2024-07-20T15:00:00+02:00", chrono_tz::UTC).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn naive_time_in_dst_gap_is_rejected() {
        let err = parse_datetime_in("2024-03-10T02:30:00", chrono_tz::America::New_York)
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidDatetime(_)));
    }

    #[test]
    fn midnight_in_regular_zone() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 16).unwrap();
        let start = local_midnight(chrono_tz::Asia::Tokyo, date).unwrap();
        assert_eq!(start.time(), NaiveTime::MIN);
        assert_eq!(
            start.with_timezone(&chrono::Utc).to_rfc3339(),
            "2024-07-15T15:00:00+00:00"
        );
    }

    #[test]
    fn midnight_inside_dst_gap_starts_at_transition() {
        // Santiago springs forward at 00:00 -> 01:00 on 2024-09-08.
        let date = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        let start = local_midnight(chrono_tz::America::Santiago, date).unwrap();
        assert_eq!(start.date_naive(), date);
        assert_eq!(start.hour(), 1);
        assert_eq!(start.minute(), 0);
    }
}
