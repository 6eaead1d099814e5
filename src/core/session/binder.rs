//! Session binding
//!
//! Derives the session time origin and calendar day from the index. The first
//! timestamp by position is the origin; the index is never re-sorted.

use crate::domain::errors::SessionSpanError;
use crate::domain::session::SessionOrigin;
use chrono::NaiveDateTime;

/// Binds a time index to a single-day session
///
/// # Arguments
///
/// * `timestamps` - Index values in dataset order
///
/// # Returns
///
/// The session origin when every timestamp falls on the origin's day and the index
/// never goes backwards.
///
/// # Errors
///
/// * [`SessionSpanError::EmptyIndex`] - no timestamps
/// * [`SessionSpanError::MultiDayDataset`] - first row on another calendar day
/// * [`SessionSpanError::UnsortedIndex`] - first row earlier than its predecessor
///
/// # Examples
///
/// ```
/// use sessionframe::core::session::bind;
/// use sessionframe::domain::SessionSpanError;
/// use chrono::NaiveDate;
///
/// let day1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let day2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
/// let index = vec![
///     day1.and_hms_opt(23, 59, 59).unwrap(),
///     day2.and_hms_opt(0, 0, 1).unwrap(),
/// ];
///
/// assert!(matches!(
///     bind(&index),
///     Err(SessionSpanError::MultiDayDataset { offending_index: 1, .. })
/// ));
/// ```
pub fn bind(timestamps: &[NaiveDateTime]) -> Result<SessionOrigin, SessionSpanError> {
    let first = timestamps.first().ok_or(SessionSpanError::EmptyIndex)?;
    let origin = SessionOrigin::new(*first);

    for (i, pair) in timestamps.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        let row = i + 1;

        if current.date() != origin.day {
            return Err(SessionSpanError::MultiDayDataset {
                offending_index: row,
                session_day: origin.day,
                offending_day: current.date(),
            });
        }

        if current < previous {
            return Err(SessionSpanError::UnsortedIndex {
                offending_index: row,
                timestamp: *current,
            });
        }
    }

    tracing::debug!(
        time_origin = %origin.time_origin,
        day = %origin.day,
        "Session bound"
    );

    Ok(origin)
}
