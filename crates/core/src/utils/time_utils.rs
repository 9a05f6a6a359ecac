use chrono::{Datelike, Duration, NaiveDate, Utc};

/// Today's date in UTC, the business date used for offers and policies.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Number of whole days from `start` to `end`; negative when `end` precedes `start`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Monday of the ISO week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// January 1st of the year containing `date`.
pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// First day of the month following the one containing `date`.
pub fn next_month_start(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn days_between_counts_nights() {
        assert_eq!(days_between(d(2024, 1, 1), d(2024, 1, 31)), 30);
        assert_eq!(days_between(d(2024, 1, 31), d(2024, 1, 1)), -30);
    }

    #[test]
    fn period_starts() {
        // 2024-03-14 is a Thursday
        assert_eq!(start_of_week(d(2024, 3, 14)), d(2024, 3, 11));
        assert_eq!(start_of_month(d(2024, 3, 14)), d(2024, 3, 1));
        assert_eq!(start_of_year(d(2024, 3, 14)), d(2024, 1, 1));
        assert_eq!(next_month_start(d(2024, 12, 5)), Some(d(2025, 1, 1)));
    }
}
