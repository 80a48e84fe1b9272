use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Default timezone for valuation dates.
/// This is the canonical timezone used to convert UTC instants to domain dates.
pub const DEFAULT_VALUATION_TZ: Tz = chrono_tz::America::New_York;

/// Converts a UTC instant to a valuation date in the given timezone.
pub fn valuation_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Convenience function that uses the default valuation timezone.
/// Equivalent to `valuation_date_from_utc(instant, DEFAULT_VALUATION_TZ)`.
pub fn valuation_date_today() -> NaiveDate {
    valuation_date_from_utc(Utc::now(), DEFAULT_VALUATION_TZ)
}

/// Whole days from `start` to `end`, never less than 1.
pub fn period_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(1)
}

/// Fraction of a year between two dates on the given day-count basis.
pub fn year_fraction(start: NaiveDate, end: NaiveDate, days_per_year: f64) -> f64 {
    (end - start).num_days() as f64 / days_per_year
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_valuation_date_uses_timezone() {
        // 02:00 UTC is still the previous evening in New York
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
        assert_eq!(valuation_date_from_utc(instant, DEFAULT_VALUATION_TZ), date(2024, 2, 29));
    }

    #[test]
    fn test_period_days_has_floor_of_one() {
        assert_eq!(period_days(date(2024, 1, 1), date(2024, 1, 1)), 1);
        assert_eq!(period_days(date(2024, 1, 2), date(2024, 1, 1)), 1);
        assert_eq!(period_days(date(2023, 1, 1), date(2024, 1, 1)), 365);
    }

    #[test]
    fn test_year_fraction() {
        assert_eq!(year_fraction(date(2023, 1, 1), date(2024, 1, 1), 365.0), 1.0);
        assert_eq!(year_fraction(date(2024, 1, 1), date(2023, 1, 1), 365.0), -1.0);
    }
}
