//! Store time arithmetic
//!
//! Recording stores address samples in nanoseconds. Sessions carry a time origin and
//! each sample stores its offset from that origin; stores that address time within
//! the day use the nanoseconds elapsed since midnight of the session day.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Nanoseconds in one second
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Nanoseconds in one day
pub const NANOS_PER_DAY: u64 = 86_400 * NANOS_PER_SECOND;

/// Nanoseconds elapsed since midnight of the timestamp's own day
///
/// # Examples
///
/// ```
/// use sessionframe::domain::time::nanos_since_midnight;
/// use chrono::NaiveDate;
///
/// let ts = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(10, 10, 10).unwrap();
/// assert_eq!(nanos_since_midnight(&ts), 36_610_000_000_000);
/// ```
pub fn nanos_since_midnight(ts: &NaiveDateTime) -> u64 {
    let time = ts.time();
    u64::from(time.num_seconds_from_midnight()) * NANOS_PER_SECOND + u64::from(time.nanosecond())
}

/// Rebuilds a timestamp from a day and nanoseconds since its midnight
///
/// Values past one day roll over into the following days. Returns `None` when the
/// result is out of range.
pub fn from_nanos_since_midnight(day: NaiveDate, nanos: u64) -> Option<NaiveDateTime> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    let delta = Duration::nanoseconds(i64::try_from(nanos).ok()?);
    midnight.checked_add_signed(delta)
}

/// Non-negative offset of `ts` from `origin` in nanoseconds
///
/// Returns `None` when `ts` precedes the origin or the span overflows.
pub fn offset_nanos(origin: &NaiveDateTime, ts: &NaiveDateTime) -> Option<u64> {
    let nanos = ts.signed_duration_since(*origin).num_nanoseconds()?;
    u64::try_from(nanos).ok()
}
