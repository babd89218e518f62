/// Repeat interval arithmetic
///
/// Advances a due timestamp by `amount` units of a [`RepeatType`]:
///
/// | Unit      | Step                           |
/// |-----------|--------------------------------|
/// | `daily`   | `amount` × 24h                 |
/// | `weekly`  | `amount` × 7 days              |
/// | `monthly` | `amount` calendar months       |
/// | `yearly`  | `amount` × 12 calendar months  |
///
/// Calendar steps keep the day-of-month when it exists in the target month
/// and otherwise clamp to that month's last day, so 2024-01-31 plus one
/// month is 2024-02-29 and 2024-02-29 plus one year is 2025-02-28. The time
/// of day is always preserved.

use chrono::{DateTime, Duration, Months, Utc};

use crate::error::CoreError;
use crate::models::task::RepeatType;

/// Returns `due` advanced by one repeat interval
///
/// # Errors
///
/// - `amount` below 1
/// - `repeat` is `never`
/// - the result falls outside the representable date range
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use taskfold_shared::engine::recurrence::add_interval;
/// use taskfold_shared::models::task::RepeatType;
///
/// let due = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
/// let next = add_interval(due, RepeatType::Monthly, 1).unwrap();
/// assert_eq!(next, Utc.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).unwrap());
/// ```
pub fn add_interval(
    due: DateTime<Utc>,
    repeat: RepeatType,
    amount: i32,
) -> Result<DateTime<Utc>, CoreError> {
    if amount < 1 {
        return Err(CoreError::validation("repeat_amount must be at least 1"));
    }

    let amount = amount as u32;
    let next = match repeat {
        RepeatType::Never => {
            return Err(CoreError::validation("task does not repeat"));
        }
        RepeatType::Daily => Duration::try_days(i64::from(amount))
            .and_then(|step| due.checked_add_signed(step)),
        RepeatType::Weekly => Duration::try_weeks(i64::from(amount))
            .and_then(|step| due.checked_add_signed(step)),
        RepeatType::Monthly => due.checked_add_months(Months::new(amount)),
        RepeatType::Yearly => amount
            .checked_mul(12)
            .and_then(|months| due.checked_add_months(Months::new(months))),
    };

    next.ok_or_else(|| CoreError::validation("next due date is out of range"))
}
