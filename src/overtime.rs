use chrono::NaiveDate;

use crate::error::AppResult;
use crate::schedule::{day_kind, ot_threshold};
use crate::store::{Trip, TripCategory};
use crate::timeutil::to_minutes;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Computes the overtime hours for one day's record.
///
/// Pure and deterministic. Returns 0 when either clock time is unset or
/// when the day contains a cargo trip (cargo runs never earn OT). A
/// clock-out earlier than the clock-in is treated as crossing midnight
/// once; multi-day shifts are out of scope.
pub fn compute_ot(
    clock_in: Option<&str>,
    clock_out: Option<&str>,
    date: NaiveDate,
    trips: &[Trip],
) -> AppResult<f64> {
    let (clock_in, clock_out) = match (nonempty(clock_in), nonempty(clock_out)) {
        (Some(i), Some(o)) => (i, o),
        _ => return Ok(0.0),
    };

    if trips.iter().any(|t| t.category == TripCategory::Cargo) {
        return Ok(0.0);
    }

    let start = to_minutes(clock_in)?;
    let mut end = to_minutes(clock_out)?;

    if end < start {
        end += MINUTES_PER_DAY;
    }

    let ot_minutes = match ot_threshold(day_kind(date)) {
        // Sunday: the whole shift is OT
        None => end - start,
        Some(threshold) => (end - start.max(threshold)).max(0),
    };

    Ok(ot_minutes as f64 / 60.0)
}

fn nonempty(time: Option<&str>) -> Option<&str> {
    time.filter(|t| !t.is_empty())
}
