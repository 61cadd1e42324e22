//! Locale-aware date handling for form widgets.
//!
//! Three cores live here: a format mini-language that renders and parses
//! dates ([`format`]), a calendar grid builder with ISO week numbers
//! ([`grid`], driven by the [`Calendar`] widget state), and a rule engine that
//! validates form fields from declarative markers ([`Validator`]).

pub mod calendar;
mod consts;
pub mod format;
pub mod grid;
pub mod locale;
pub mod marker;
mod prelude;
mod range;
pub mod rules;
mod types;
pub mod validator;

pub use calendar::{Calendar, CalendarOptions, Handlers, Mode};
pub use consts::*;
pub use format::{FormatError, FormatSpec, FormatToken};
pub use grid::{CalendarGrid, GridCell, Navigation};
pub use locale::{LocaleTable, RegionalSettings};
pub use marker::{FieldMarker, MarkerError};
pub use range::{DateSpan, SpanError};
pub use rules::{NumericGrammar, Rule, RuleContext, RuleRegistry, Verdict};
pub use types::{days_in_month, is_leap_year, Weekday};
pub use validator::{Field, FieldKind, Form, ValidationResult, Validator, ValidatorOptions};

use crate::prelude::*;
use chrono::{Datelike, Days, NaiveDate};
use std::str::FromStr;

/// A naive Gregorian calendar date (no time, no timezone).
///
/// Months are 0-indexed (January = 0) as in the locale month tables. Every
/// value is a real date: construction rejects components that a lenient date
/// constructor would silently roll over (e.g. 31 April), and the year stays
/// within `MIN_YEAR..=MAX_YEAR` so every date prints as four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Into)]
#[display(fmt = "{:04}-{:02}-{:02}", "_0.year()", "_0.month()", "_0.day()")]
pub struct CalendarDate(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "No date format matches {input:?}")]
    NoMatchingFormat { input: String },
    #[display(fmt = "Invalid year: {} (must be {}-{})", "_0", MIN_YEAR, MAX_YEAR)]
    InvalidYear(i32),
    #[display(fmt = "Invalid date: year {year}, month index {month}, day {day}")]
    InvalidDate { year: i32, month: u8, day: u8 },
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}

/// Error raised while building widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A format string uses a token shape with no defined meaning.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A first-day-of-week number outside `0..=6`.
    #[error("Invalid weekday: {0} (must be 0-6)")]
    InvalidWeekday(u8),

    /// A format spec without any candidate format for parsing.
    #[error("At least one candidate date format is required")]
    NoCandidateFormats,

    /// A locale name table contains a blank entry.
    #[error("Locale table {table} has a blank entry at index {index}")]
    BlankLocaleEntry { table: &'static str, index: usize },

    /// Numeric separators that are empty or equal to each other.
    #[error("Invalid numeric separators: group {group:?}, decimal {decimal:?}")]
    InvalidSeparators { group: String, decimal: String },
}

impl CalendarDate {
    /// Creates a date from a year, a 0-based month and a day of month
    ///
    /// # Errors
    /// Returns `ParseError::InvalidYear` for a year outside
    /// `MIN_YEAR..=MAX_YEAR` and `ParseError::InvalidDate` if the components
    /// do not form a date.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, ParseError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ParseError::InvalidYear(year));
        }
        let invalid = || ParseError::InvalidDate { year, month, day };
        if day < MIN_DAY || days_in_month(year, month).is_none_or(|max| day > max) {
            return Err(invalid());
        }
        NaiveDate::from_ymd_opt(year, u32::from(month) + 1, u32::from(day))
            .map(Self)
            .ok_or_else(invalid)
    }

    /// Today's date on the local wall clock
    pub fn today() -> Self {
        Self::clamped(chrono::Local::now().date_naive())
    }

    /// Earliest representable date, 1 January of `MIN_YEAR`
    pub fn min_value() -> Self {
        Self::clamped(NaiveDate::MIN)
    }

    /// Latest representable date, 31 December of `MAX_YEAR`
    pub fn max_value() -> Self {
        Self::clamped(NaiveDate::MAX)
    }

    /// Pins a chrono date to the supported year range
    fn clamped(date: NaiveDate) -> Self {
        if date.year() < MIN_YEAR {
            NaiveDate::from_ymd_opt(MIN_YEAR, 1, 1).map_or(Self(date), Self)
        } else if date.year() > MAX_YEAR {
            NaiveDate::from_ymd_opt(MAX_YEAR, 12, 31).map_or(Self(date), Self)
        } else {
            Self(date)
        }
    }

    /// Returns the year
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the 0-based month (January = 0)
    pub fn month(&self) -> u8 {
        // month0() is always below 12
        self.0.month0() as u8
    }

    /// Returns the day of month (1-based)
    pub fn day(&self) -> u8 {
        // day() is always below 32
        self.0.day() as u8
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday().into()
    }

    /// First day of this date's month
    pub fn first_of_month(&self) -> Self {
        Self(self.0.with_day(1).unwrap_or(self.0))
    }

    /// Moves by a signed number of days.
    /// Saturates at [`min_value`](Self::min_value) and [`max_value`](Self::max_value).
    pub fn add_days(self, days: i64) -> Self {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        match shifted {
            Some(date) => Self::clamped(date),
            None if days >= 0 => Self::max_value(),
            None => Self::min_value(),
        }
    }

    /// First day of the month `months` away from this date's month.
    /// Saturates at the first month of `MIN_YEAR` and the last month of
    /// `MAX_YEAR`.
    pub fn add_months_to_first(self, months: i32) -> Self {
        let per_year = i32::from(MONTHS_PER_YEAR);
        let total = (self.year() * per_year + i32::from(self.month()))
            .saturating_add(months)
            .clamp(MIN_YEAR * per_year, MAX_YEAR * per_year + per_year - 1);
        let year = total.div_euclid(per_year);
        // rem_euclid by 12 is always below 12
        let month = total.rem_euclid(per_year) as u8;
        Self::new(year, month, MIN_DAY).unwrap_or_else(|_| self.first_of_month())
    }

    /// Signed number of days from this date to `other`
    pub fn days_until(&self, other: &Self) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    /// Returns the (year, 0-based month, day) triple
    pub fn components(&self) -> (i32, u8, u8) {
        (self.year(), self.month(), self.day())
    }
}

impl FromStr for CalendarDate {
    type Err = ParseError;

    /// Parses ISO 8601 `YYYY-MM-DD` (1-based month in the text)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let parts: Vec<&str> = trimmed.split(DATE_SEPARATOR).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(ParseError::InvalidFormat(format!(
                "expected YYYY{DATE_SEPARATOR}MM{DATE_SEPARATOR}DD, found {trimmed:?}"
            )));
        };

        let year = year
            .parse::<i32>()
            .map_err(|_| ParseError::InvalidFormat(trimmed.to_owned()))?;
        let month = month
            .parse::<u8>()
            .map_err(|_| ParseError::InvalidFormat(trimmed.to_owned()))?;
        let day = day
            .parse::<u8>()
            .map_err(|_| ParseError::InvalidFormat(trimmed.to_owned()))?;
        if month == 0 {
            return Err(ParseError::InvalidDate { year, month, day });
        }

        Self::new(year, month - 1, day)
    }
}

impl TryFrom<NaiveDate> for CalendarDate {
    type Error = ParseError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            Ok(Self(date))
        } else {
            Err(ParseError::InvalidYear(date.year()))
        }
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::CalendarDate;

    /// Builds a date from a 1-based month, panicking on invalid input
    pub fn ymd(year: i32, month: u8, day: u8) -> CalendarDate {
        CalendarDate::new(year, month - 1, day)
            .unwrap_or_else(|e| panic!("invalid test date {year}-{month}-{day}: {e}"))
    }
}
