use chrono::{DateTime, Days, NaiveDate, TimeDelta, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

// out of range values fall back to the unix epoch
pub fn from_epoch_milli(epoch_millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(epoch_millis).unwrap_or_default()
}

/// Drop sub-millisecond precision, matching what storage keeps.
pub fn truncate_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    from_epoch_milli(dt.timestamp_millis())
}

/// 00:00:00.000 UTC of the given date.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Last representable millisecond of the given date (UTC).
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    match date.checked_add_days(Days::new(1)) {
        Some(next) => start_of_day(next) - TimeDelta::milliseconds(1),
        None => start_of_day(date),
    }
}

/// Start of the current UTC day, the reference point for "posted today" queries.
pub fn today_start() -> DateTime<Utc> {
    start_of_day(now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let start = start_of_day(date);
        let end = end_of_day(date);
        assert_eq!(start.to_rfc3339(), "2025-03-14T00:00:00+00:00");
        assert_eq!(end.date_naive(), date);
        assert_eq!(end.hour(), 23);
        assert_eq!(end.timestamp_millis() - start.timestamp_millis(), 86_399_999);
    }

    #[test]
    fn test_epoch_millis_roundtrip() {
        let now = now();
        let millis = now.timestamp_millis();
        assert_eq!(from_epoch_milli(millis).timestamp_millis(), millis);
        assert_eq!(from_epoch_milli(i64::MAX).timestamp_millis(), 0);
        assert_eq!(truncate_millis(now), from_epoch_milli(millis));
        assert_eq!(truncate_millis(now).timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_today_start_is_midnight() {
        let start = today_start();
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
        assert_eq!(start.second(), 0);
        assert!(start <= now());
    }
}
