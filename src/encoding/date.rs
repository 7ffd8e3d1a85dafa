use serde::{Serialize, Deserialize};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Bucket size a date is floored to before encoding. Two instants in the
/// same bucket encode identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateResolution {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    #[default]
    Millisecond,
}

/// Epoch milliseconds of the start of the bucket containing `date` (UTC).
pub fn epoch_millis_with_resolution(date: &DateTime<Utc>, resolution: DateResolution) -> i64 {
    let millis = date.timestamp_millis();
    match resolution {
        DateResolution::Millisecond => millis,
        DateResolution::Second => floor_to(millis, MILLIS_PER_SECOND),
        DateResolution::Minute => floor_to(millis, MILLIS_PER_MINUTE),
        DateResolution::Hour => floor_to(millis, MILLIS_PER_HOUR),
        DateResolution::Day => floor_to(millis, MILLIS_PER_DAY),
        DateResolution::Month => first_day_millis(date.year(), date.month()),
        DateResolution::Year => first_day_millis(date.year(), 1),
    }
}

pub fn truncate(date: &DateTime<Utc>, resolution: DateResolution) -> DateTime<Utc> {
    let millis = epoch_millis_with_resolution(date, resolution);
    DateTime::from_timestamp_millis(millis).unwrap_or(*date)
}

fn floor_to(millis: i64, bucket: i64) -> i64 {
    millis.div_euclid(bucket) * bucket
}

fn first_day_millis(year: i32, month: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .expect("the first day of a month of a representable year is valid")
}
