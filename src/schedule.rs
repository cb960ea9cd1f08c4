use chrono::{Datelike, NaiveDate, Weekday};

const SATURDAY_THRESHOLD_MIN: i64 = 14 * 60;
const WEEKDAY_THRESHOLD_MIN: i64 = 17 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    Weekday,
    Saturday,
    Sunday,
}

pub fn day_kind(date: NaiveDate) -> DayKind {
    match date.weekday() {
        Weekday::Sun => DayKind::Sunday,
        Weekday::Sat => DayKind::Saturday,
        _ => DayKind::Weekday,
    }
}

/// Minutes-since-midnight at which the OT window opens.
/// `None` means the entire shift counts as OT (Sunday).
pub fn ot_threshold(kind: DayKind) -> Option<i64> {
    match kind {
        DayKind::Sunday => None,
        DayKind::Saturday => Some(SATURDAY_THRESHOLD_MIN),
        DayKind::Weekday => Some(WEEKDAY_THRESHOLD_MIN),
    }
}
