use crate::error::{AppError, AppResult};

/// Parses a "HH:MM" wall-clock string into minutes since midnight.
///
/// Malformed input (missing colon, non-numeric parts, out-of-range
/// hour/minute) is rejected instead of propagating garbage into the
/// OT calculation.
pub fn to_minutes(time: &str) -> AppResult<i64> {
    let (h, m) = time
        .split_once(':')
        .ok_or_else(|| AppError::InvalidTime(time.to_string()))?;

    let hours: i64 = h
        .parse()
        .map_err(|_| AppError::InvalidTime(time.to_string()))?;
    let minutes: i64 = m
        .parse()
        .map_err(|_| AppError::InvalidTime(time.to_string()))?;

    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(AppError::InvalidTime(time.to_string()));
    }

    Ok(hours * 60 + minutes)
}

/// Display form of an optional clock time.
pub fn format_time(time: Option<&str>) -> String {
    match time {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => "Not set".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minutes_basic() {
        assert_eq!(to_minutes("08:00").unwrap(), 480);
        assert_eq!(to_minutes("17:00").unwrap(), 1020);
        assert_eq!(to_minutes("00:00").unwrap(), 0);
        assert_eq!(to_minutes("23:59").unwrap(), 1439);
    }

    #[test]
    fn test_to_minutes_rejects_malformed() {
        assert!(to_minutes("0800").is_err());
        assert!(to_minutes("ab:cd").is_err());
        assert!(to_minutes("").is_err());
        assert!(to_minutes("24:00").is_err());
        assert!(to_minutes("12:60").is_err());
        assert!(to_minutes("-1:30").is_err());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Some("08:30")), "08:30");
        assert_eq!(format_time(Some("")), "Not set");
        assert_eq!(format_time(None), "Not set");
    }
}
