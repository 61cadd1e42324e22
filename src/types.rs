use crate::consts::{
    CENTURY_CYCLE, DAYS_IN_MONTH, DAYS_PER_WEEK, FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE,
    LEAP_YEAR_CYCLE, MONTHS_PER_YEAR,
};
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the week, numbered Sunday-first (`0..=6`) like the locale day tables.
///
/// Used as the first-day-of-week setting of a calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Creates a weekday from its Sunday-first number
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidWeekday` if the value is greater than 6.
    pub fn new(value: u8) -> Result<Self, ConfigError> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(ConfigError::InvalidWeekday(value))
    }

    /// Returns the Sunday-first number (0=Sunday..6=Saturday)
    #[inline]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Returns the weekday `offset` days after this one
    pub const fn add(self, offset: u8) -> Self {
        Self::ALL[((self as u8 + offset % DAYS_PER_WEEK) % DAYS_PER_WEEK) as usize]
    }

    /// Days since the preceding Monday (Monday=0..Sunday=6)
    pub const fn days_from_monday(self) -> u8 {
        (self as u8 + DAYS_PER_WEEK - 1) % DAYS_PER_WEEK
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        // chrono counts from Sunday = 0 here, matching our numbering
        Self::ALL[day.num_days_from_sunday() as usize]
    }
}

impl TryFrom<u8> for Weekday {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        day.number()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// Helper functions

pub const fn is_leap_year(year: i32) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

/// Number of days in `month` (0-based) of `year`, or `None` for a month
/// index of 12 or more
pub const fn days_in_month(year: i32, month: u8) -> Option<u8> {
    if month >= MONTHS_PER_YEAR {
        return None;
    }

    if month == FEBRUARY && is_leap_year(year) {
        Some(FEBRUARY_DAYS_LEAP)
    } else {
        Some(DAYS_IN_MONTH[month as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_new_valid() {
        for n in 0..=6 {
            let day = Weekday::new(n).unwrap();
            assert_eq!(day.number(), n);
        }
    }

    #[test]
    fn test_weekday_new_invalid() {
        let result = Weekday::new(7);
        assert!(matches!(result, Err(ConfigError::InvalidWeekday(7))));
    }

    #[test]
    fn test_weekday_add_wraps() {
        assert_eq!(Weekday::Saturday.add(1), Weekday::Sunday);
        assert_eq!(Weekday::Monday.add(6), Weekday::Sunday);
        assert_eq!(Weekday::Wednesday.add(14), Weekday::Wednesday);
    }

    #[test]
    fn test_weekday_days_from_monday() {
        assert_eq!(Weekday::Monday.days_from_monday(), 0);
        assert_eq!(Weekday::Thursday.days_from_monday(), 3);
        assert_eq!(Weekday::Sunday.days_from_monday(), 6);
    }

    #[test]
    fn test_weekday_from_chrono() {
        assert_eq!(Weekday::from(chrono::Weekday::Sun), Weekday::Sunday);
        assert_eq!(Weekday::from(chrono::Weekday::Mon), Weekday::Monday);
        assert_eq!(Weekday::from(chrono::Weekday::Sat), Weekday::Saturday);
    }

    #[test]
    fn test_weekday_serde() {
        let json = serde_json::to_string(&Weekday::Monday).unwrap();
        assert_eq!(json, "1");

        let parsed: Weekday = serde_json::from_str("6").unwrap();
        assert_eq!(parsed, Weekday::Saturday);

        let result: Result<Weekday, _> = serde_json::from_str("9");
        assert!(result.is_err());
    }

    #[test]
    fn test_is_leap_year_cases() {
        struct TestCase {
            year:        i32,
            is_leap:     bool,
            description: &'static str,
        }

        let cases = [
            TestCase {
                year:        2024,
                is_leap:     true,
                description: "divisible by 4",
            },
            TestCase {
                year:        2023,
                is_leap:     false,
                description: "not divisible by 4",
            },
            TestCase {
                year:        1900,
                is_leap:     false,
                description: "century not divisible by 400",
            },
            TestCase {
                year:        2100,
                is_leap:     false,
                description: "century not divisible by 400",
            },
            TestCase {
                year:        2000,
                is_leap:     true,
                description: "divisible by 400",
            },
            TestCase {
                year:        2400,
                is_leap:     true,
                description: "divisible by 400",
            },
        ];

        for case in &cases {
            assert_eq!(
                is_leap_year(case.year),
                case.is_leap,
                "Year {} ({})",
                case.year,
                case.description
            );
        }
    }

    #[test]
    fn test_days_in_month_february() {
        assert_eq!(days_in_month(2000, FEBRUARY), Some(29));
        assert_eq!(days_in_month(1900, FEBRUARY), Some(28));
        assert_eq!(days_in_month(2024, FEBRUARY), Some(29));
        assert_eq!(days_in_month(2023, FEBRUARY), Some(28));
    }

    #[test]
    fn test_days_in_month_rejects_month_index_12() {
        assert_eq!(days_in_month(2024, MONTHS_PER_YEAR), None);
        assert_eq!(days_in_month(2024, u8::MAX), None);
    }

    #[test]
    fn test_days_in_month_table() {
        let expected = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for month in 0..12 {
            assert_eq!(
                days_in_month(2023, month),
                Some(expected[month as usize]),
                "Month {month} has incorrect day count"
            );
        }
    }
}
