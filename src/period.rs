use chrono::{Datelike, Duration, NaiveDate};

/// One calendar month as a half-open `[first_day, last_day]` interval, keyed
/// by `YYYYMM`. Jobs match up to midnight opening `last_day`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub key: String,
}

/// The calendar month before the one containing `today`.
pub fn resolve_previous_month(today: NaiveDate) -> Period {
    let last_day = today - Duration::days(i64::from(today.day()));
    let first_day = last_day - Duration::days(i64::from(last_day.day() - 1));
    Period {
        first_day,
        last_day,
        key: first_day.format("%Y%m").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn mid_month_resolves_to_previous_month() {
        let p = resolve_previous_month(date(2024, 3, 15));
        assert_eq!(p.first_day, date(2024, 2, 1));
        assert_eq!(p.last_day, date(2024, 2, 29));
        assert_eq!(p.key, "202402");
    }

    #[test]
    fn january_rolls_back_a_year() {
        let p = resolve_previous_month(date(2024, 1, 1));
        assert_eq!(p.first_day, date(2023, 12, 1));
        assert_eq!(p.last_day, date(2023, 12, 31));
        assert_eq!(p.key, "202312");
    }

    #[test]
    fn last_day_of_month_still_reports_previous_month() {
        let p = resolve_previous_month(date(2023, 3, 31));
        assert_eq!(p.first_day, date(2023, 2, 1));
        assert_eq!(p.last_day, date(2023, 2, 28));
    }
}
