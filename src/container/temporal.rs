//! Conversions between chrono values and Arrow's physical temporal encodings.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::dtype::TimeUnit;

/// Days from 0001-01-01 to 1970-01-01
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Days since the Unix epoch
#[must_use]
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Date from days since the Unix epoch
#[must_use]
pub fn days_to_date(days: i64) -> Option<NaiveDate> {
    i32::try_from(days)
        .ok()
        .and_then(|days| days.checked_add(EPOCH_DAYS_FROM_CE))
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Ticks since the Unix epoch; `None` when the instant does not fit in `unit`
#[must_use]
pub fn datetime_to_epoch(datetime: NaiveDateTime, unit: TimeUnit) -> Option<i64> {
    let utc = datetime.and_utc();
    match unit {
        TimeUnit::Second => Some(utc.timestamp()),
        TimeUnit::Millisecond => Some(utc.timestamp_millis()),
        TimeUnit::Microsecond => Some(utc.timestamp_micros()),
        TimeUnit::Nanosecond => utc.timestamp_nanos_opt(),
    }
}

/// Datetime from ticks since the Unix epoch
#[must_use]
pub fn epoch_to_datetime(ticks: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let utc = match unit {
        TimeUnit::Second => DateTime::from_timestamp(ticks, 0),
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(ticks),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(ticks),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(ticks)),
    };
    utc.map(|datetime| datetime.naive_utc())
}

/// Nanoseconds since midnight
#[must_use]
pub fn time_to_nanos(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) * 1_000_000_000 + i64::from(time.nanosecond())
}

/// Whole ticks of `unit` in a duration; `None` on overflow
#[must_use]
pub fn duration_to_count(duration: TimeDelta, unit: TimeUnit) -> Option<i64> {
    match unit {
        TimeUnit::Second => Some(duration.num_seconds()),
        TimeUnit::Millisecond => Some(duration.num_milliseconds()),
        TimeUnit::Microsecond => duration.num_microseconds(),
        TimeUnit::Nanosecond => duration.num_nanoseconds(),
    }
}
