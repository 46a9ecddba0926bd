//! Utility functions for the agro_price crate

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// Midnight UTC of a calendar date
pub fn to_utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// `count` consecutive daily timestamps starting at `start`
pub fn daily_timestamps(start: NaiveDate, count: usize) -> Vec<DateTime<Utc>> {
    let first = to_utc_midnight(start);
    (0..count)
        .map(|day| first + Duration::days(day as i64))
        .collect()
}

/// Whole and fractional days elapsed between two instants
pub fn days_between(origin: DateTime<Utc>, instant: DateTime<Utc>) -> f64 {
    (instant - origin).num_milliseconds() as f64 / 86_400_000.0
}

/// Round a monetary amount to two decimals
pub fn round_money(value: f64) -> f64 {
    agro_math::round_to(value, 2)
}

/// serde helper: serialize a monetary amount rounded to two decimals
pub(crate) fn serialize_money<S: serde::Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_money(*value))
}

/// serde helper: serialize a ratio rounded to four decimals
pub(crate) fn serialize_ratio<S: serde::Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(agro_math::round_to(*value, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_timestamps() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let stamps = daily_timestamps(start, 3);

        assert_eq!(stamps.len(), 3);
        assert_eq!(stamps[2].date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(days_between(stamps[0], stamps[2]), 2.0);
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(2539.9999999999995), 2540.0);
        assert_eq!(round_money(12.345), 12.35);
    }
}
