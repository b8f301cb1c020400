//! Per-day free/busy partition of a date range.
//!
//! Busy intervals are converted into the target timezone, bucketed by the
//! local calendar day of their start instant, sorted, and walked with a
//! cursor that emits free blocks for the gaps. Every day in the range comes
//! out as a gapless, non-overlapping sequence of blocks from `00:00` to
//! `00:00` of the next day.
//!
//! An interval that crosses midnight is attributed entirely to its start day
//! and its busy block is clipped at the day boundary. It is not split across
//! days.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::AvailabilityConfig;
use crate::error::{AvailabilityError, Result};
use crate::interval::{parse_intervals_json, TimeInterval};
use crate::tz::{local_midnight, parse_timezone};

/// The only time format the calculator renders.
pub const TIME_FORMAT_24HR: &str = "24hr";

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A contiguous span of one local day, either free or busy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBlock {
    #[serde(with = "wall_clock")]
    pub start: NaiveTime,
    /// `00:00` when the block runs to the end of the day.
    #[serde(with = "wall_clock")]
    pub end: NaiveTime,
    pub is_available: bool,
    #[serde(rename = "event_name", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "event_type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl DayBlock {
    fn free(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start,
            end,
            is_available: true,
            label: None,
            category: None,
        }
    }

    fn busy(start: NaiveTime, end: NaiveTime, source: &TimeInterval) -> Self {
        Self {
            start,
            end,
            is_available: false,
            label: source.label.clone(),
            category: source.category.clone(),
        }
    }

    /// Minutes from local midnight to the block start.
    pub fn start_minute(&self) -> u32 {
        self.start.num_seconds_from_midnight() / 60
    }

    /// Minutes from local midnight to the block end. A block ending on the day
    /// boundary reports 1440.
    pub fn end_minute(&self) -> u32 {
        if self.end == NaiveTime::MIN {
            MINUTES_PER_DAY
        } else {
            self.end.num_seconds_from_midnight() / 60
        }
    }
}

/// Blocks for every day of a request, keyed by local calendar date.
///
/// Serialises as a JSON object with ISO date keys in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySchedule {
    days: BTreeMap<NaiveDate, Vec<DayBlock>>,
}

impl DaySchedule {
    pub fn get(&self, date: NaiveDate) -> Option<&[DayBlock]> {
        self.days.get(&date).map(Vec::as_slice)
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &[DayBlock])> {
        self.days.iter().map(|(date, blocks)| (*date, blocks.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Output of one availability computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub timezone: String,
    /// Always [`TIME_FORMAT_24HR`].
    pub time_format: String,
    #[serde(rename = "available_blocks")]
    pub schedule: DaySchedule,
}

/// Partition every day in `start_date..=end_date` into free/busy blocks.
///
/// # Arguments
///
/// * `start_date`, `end_date`: inclusive local calendar days; equal bounds
///   compute a single day.
/// * `busy_intervals`: busy spans in any offset; they are converted into
///   `timezone` before bucketing.
/// * `timezone`: IANA identifier the days are laid out in.
///
/// # Errors
///
/// * [`AvailabilityError::InvalidTimezone`] before any interval is looked at.
/// * [`AvailabilityError::InvalidDateRange`] when `start_date > end_date`.
/// * [`AvailabilityError::MalformedInterval`] when any interval has
///   `end <= start`; nothing is computed in that case.
///
/// # Examples
///
/// ```
/// use availability_engine::compute_availability;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 7, 16).unwrap();
/// let result = compute_availability(day, day, &[], "America/Los_Angeles").unwrap();
/// let blocks = result.schedule.get(day).unwrap();
/// assert_eq!(blocks.len(), 1);
/// assert!(blocks[0].is_available);
/// ```
pub fn compute_availability(
    start_date: NaiveDate,
    end_date: NaiveDate,
    busy_intervals: &[TimeInterval],
    timezone: &str,
) -> Result<AvailabilityResult> {
    calculate(timezone, start_date, end_date, busy_intervals, None)
}

/// Like [`compute_availability`], with the timezone resolved through `config`
/// (falling back to `config.default_timezone`) and the range capped by
/// `config.max_days`.
pub fn compute_availability_with(
    config: &AvailabilityConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
    busy_intervals: &[TimeInterval],
    timezone: Option<&str>,
) -> Result<AvailabilityResult> {
    let timezone = config.resolve_timezone(timezone, None);
    calculate(
        timezone,
        start_date,
        end_date,
        busy_intervals,
        config.max_days,
    )
}

/// Like [`compute_availability`], reading the busy intervals from a JSON
/// array of `{start, end, label?, category?}` objects.
///
/// The timezone and date range are validated before the JSON is parsed, so an
/// invalid timezone is reported even when the interval list is malformed.
pub fn compute_availability_json(
    start_date: NaiveDate,
    end_date: NaiveDate,
    intervals_json: &str,
    timezone: &str,
) -> Result<AvailabilityResult> {
    calculate_from_json(timezone, start_date, end_date, intervals_json, None)
}

/// [`compute_availability_json`] with the timezone resolved through `config`
/// and the range capped by `config.max_days`.
pub fn compute_availability_json_with(
    config: &AvailabilityConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
    intervals_json: &str,
    timezone: Option<&str>,
) -> Result<AvailabilityResult> {
    let timezone = config.resolve_timezone(timezone, None);
    calculate_from_json(
        timezone,
        start_date,
        end_date,
        intervals_json,
        config.max_days,
    )
}

fn calculate_from_json(
    timezone: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    intervals_json: &str,
    max_days: Option<u32>,
) -> Result<AvailabilityResult> {
    let tz = parse_timezone(timezone)?;
    validate_range(start_date, end_date, max_days)?;
    let intervals = parse_intervals_json(intervals_json)?;
    partition_range(tz, timezone, start_date, end_date, &intervals)
}

fn calculate(
    timezone: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    busy_intervals: &[TimeInterval],
    max_days: Option<u32>,
) -> Result<AvailabilityResult> {
    let tz = parse_timezone(timezone)?;
    validate_range(start_date, end_date, max_days)?;
    partition_range(tz, timezone, start_date, end_date, busy_intervals)
}

/// Partition an already validated range. Callers must have checked the
/// timezone and the date range.
pub(crate) fn partition_range(
    tz: Tz,
    timezone: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    busy_intervals: &[TimeInterval],
) -> Result<AvailabilityResult> {
    for (index, interval) in busy_intervals.iter().enumerate() {
        interval.check_order(index)?;
    }

    let mut buckets = bucket_by_start_day(busy_intervals, tz, start_date, end_date);

    let mut schedule = DaySchedule::default();
    for day in start_date.iter_days().take_while(|d| *d <= end_date) {
        let day_intervals = buckets.remove(&day).unwrap_or_default();
        let blocks = partition_day(tz, day, day_intervals)?;
        trace!(%day, blocks = blocks.len(), "partitioned day");
        schedule.days.insert(day, blocks);
    }

    debug!(
        timezone,
        days = schedule.len(),
        intervals = busy_intervals.len(),
        "computed availability"
    );

    Ok(AvailabilityResult {
        timezone: timezone.to_string(),
        time_format: TIME_FORMAT_24HR.to_string(),
        schedule,
    })
}

pub(crate) fn validate_range(start: NaiveDate, end: NaiveDate, max_days: Option<u32>) -> Result<()> {
    if start > end {
        return Err(AvailabilityError::InvalidDateRange {
            start,
            end,
            reason: "start date is after end date".to_string(),
        });
    }
    if let Some(max) = max_days {
        let days = (end - start).num_days() + 1;
        if days > i64::from(max) {
            return Err(AvailabilityError::InvalidDateRange {
                start,
                end,
                reason: format!("spans {} days, limit is {}", days, max),
            });
        }
    }
    Ok(())
}

/// An interval converted into the target timezone.
struct LocalInterval<'a> {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    source: &'a TimeInterval,
}

/// Group intervals by the local date of their start. Input order is kept
/// within each bucket so the later stable sort breaks ties by input order.
fn bucket_by_start_day(
    intervals: &[TimeInterval],
    tz: Tz,
    first_day: NaiveDate,
    last_day: NaiveDate,
) -> BTreeMap<NaiveDate, Vec<LocalInterval<'_>>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<LocalInterval<'_>>> = BTreeMap::new();
    for interval in intervals {
        let start = floor_to_minute(interval.start.with_timezone(&tz));
        let day = start.date_naive();
        if day < first_day || day > last_day {
            trace!(%day, "interval starts outside the requested range");
            continue;
        }
        buckets.entry(day).or_default().push(LocalInterval {
            start,
            end: ceil_to_minute(interval.end.with_timezone(&tz)),
            source: interval,
        });
    }
    buckets
}

// Busy bounds widen to whole minutes so a sub-minute interval never renders
// as an empty `HH:MM` span.
fn floor_to_minute(instant: DateTime<Tz>) -> DateTime<Tz> {
    instant
        - Duration::seconds(i64::from(instant.second()))
        - Duration::nanoseconds(i64::from(instant.nanosecond()))
}

fn ceil_to_minute(instant: DateTime<Tz>) -> DateTime<Tz> {
    let floored = floor_to_minute(instant);
    if floored == instant {
        instant
    } else {
        floored + Duration::minutes(1)
    }
}

fn partition_day(tz: Tz, day: NaiveDate, mut intervals: Vec<LocalInterval<'_>>) -> Result<Vec<DayBlock>> {
    let next_day = day.succ_opt().ok_or_else(|| AvailabilityError::InvalidDateRange {
        start: day,
        end: day,
        reason: "date has no following day".to_string(),
    })?;
    let day_start = local_midnight(tz, day)?;
    let day_end = local_midnight(tz, next_day)?;
    let wall = |instant: DateTime<Tz>| wall_clock_time(instant, day_start, day_end);

    intervals.sort_by_key(|iv| iv.start);

    let mut blocks = Vec::with_capacity(intervals.len() * 2 + 1);
    let mut cursor = day_start;

    for interval in &intervals {
        if cursor < interval.start {
            blocks.push(DayBlock::free(wall(cursor), wall(interval.start)));
        }

        // Overlapping intervals are clipped on the left to the cursor; one that
        // lies entirely inside earlier busy time yields no block.
        let busy_start = interval.start.max(cursor);
        let busy_end = interval.end.min(day_end);
        if busy_start < busy_end {
            blocks.push(DayBlock::busy(
                wall(busy_start),
                wall(busy_end),
                interval.source,
            ));
            cursor = busy_end;
        }
    }

    // Also covers a day without intervals: one free block 00:00-00:00.
    if cursor < day_end {
        blocks.push(DayBlock::free(wall(cursor), wall(day_end)));
    }

    Ok(blocks)
}

/// Render an instant as wall-clock time within its day. Both day boundaries
/// render as `00:00`, even when local midnight itself does not exist.
fn wall_clock_time(instant: DateTime<Tz>, day_start: DateTime<Tz>, day_end: DateTime<Tz>) -> NaiveTime {
    if instant == day_start || instant == day_end {
        NaiveTime::MIN
    } else {
        instant.time()
    }
}

mod wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
