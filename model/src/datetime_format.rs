//! Lenient timestamp parsing for client supplied dates.
//!
//! Accepted forms: RFC 3339 (`2025-03-14T09:30:00Z`, `2025-03-14T18:30:00+09:00`),
//! a naive timestamp taken as UTC (`2025-03-14T09:30:00`) and a plain calendar
//! date (`2025-03-14`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use command_utils::util::datetime;
use serde::{Deserialize, Deserializer};

/// Which end of the day a date-only value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBound {
    Start,
    End,
}

pub fn parse_timestamp(value: &str, bound: DayBound) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| match bound {
            DayBound::Start => datetime::start_of_day(date),
            DayBound::End => datetime::end_of_day(date),
        })
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s, DayBound::Start)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}")))
}

pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => parse_timestamp(&s, DayBound::Start)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}"))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        let rfc = parse_timestamp("2025-03-14T18:30:00+09:00", DayBound::Start).unwrap();
        assert_eq!(rfc.to_rfc3339(), "2025-03-14T09:30:00+00:00");

        let naive = parse_timestamp("2025-03-14T09:30:00.250", DayBound::Start).unwrap();
        assert_eq!(naive.timestamp_millis() % 1000, 250);

        let start = parse_timestamp("2025-03-14", DayBound::Start).unwrap();
        let end = parse_timestamp("2025-03-14", DayBound::End).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-03-14T00:00:00+00:00");
        assert!(end > start);
        assert_eq!(end.date_naive(), start.date_naive());

        assert!(parse_timestamp("yesterday", DayBound::Start).is_none());
        assert!(parse_timestamp("2025-13-01", DayBound::Start).is_none());
    }
}
