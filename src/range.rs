use crate::{prelude::*, CalendarDate};

/// An inclusive span between two calendar dates.
/// The start date must be less than or equal to the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{start}/{end}")]
pub struct DateSpan {
    start: CalendarDate,
    end:   CalendarDate,
}

/// Error type for date span operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanError {
    /// Start date is after end date.
    #[error("Invalid date span: start ({start}) is after end ({end})")]
    InvalidSpan { start: CalendarDate, end: CalendarDate },
}

impl DateSpan {
    /// Creates a new span with validation.
    ///
    /// # Errors
    /// Returns `SpanError::InvalidSpan` if start > end.
    pub fn new(start: CalendarDate, end: CalendarDate) -> Result<Self, SpanError> {
        if start > end {
            return Err(SpanError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// A span of `days` consecutive dates beginning at `start`.
    /// Always covers at least one day.
    pub fn starting_at(start: CalendarDate, days: usize) -> Self {
        let extra = i64::try_from(days.saturating_sub(1)).unwrap_or(i64::MAX);
        Self {
            start,
            end: start.add_days(extra),
        }
    }

    /// Returns the first date of the span
    pub const fn start(&self) -> CalendarDate {
        self.start
    }

    /// Returns the last date of the span (inclusive)
    pub const fn end(&self) -> CalendarDate {
        self.end
    }

    /// Checks if the span contains a given date
    pub fn contains(&self, date: &CalendarDate) -> bool {
        self.start <= *date && *date <= self.end
    }

    /// Number of days in the span, both ends included
    pub fn len(&self) -> usize {
        usize::try_from(self.start.days_until(&self.end) + 1).unwrap_or(0)
    }

    /// A span always covers at least one day
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over every date of the span in order
    pub fn days(&self) -> impl Iterator<Item = CalendarDate> + '_ {
        let start = self.start;
        (0..self.len()).map(move |offset| start.add_days(offset as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ymd;

    #[test]
    fn test_new_span_cases() {
        struct TestCase {
            start:          CalendarDate,
            end:            CalendarDate,
            should_succeed: bool,
            description:    &'static str,
        }

        let cases = [
            TestCase {
                start:          ymd(2024, 1, 1),
                end:            ymd(2024, 2, 4),
                should_succeed: true,
                description:    "valid span (start < end)",
            },
            TestCase {
                start:          ymd(2024, 2, 4),
                end:            ymd(2024, 1, 1),
                should_succeed: false,
                description:    "invalid span (start > end)",
            },
            TestCase {
                start:          ymd(2024, 1, 1),
                end:            ymd(2024, 1, 1),
                should_succeed: true,
                description:    "single day (start == end)",
            },
        ];

        for case in &cases {
            let span = DateSpan::new(case.start, case.end);
            if case.should_succeed {
                assert!(span.is_ok(), "Expected success for: {}", case.description);
            } else {
                assert!(span.is_err(), "Expected failure for: {}", case.description);
            }
        }
    }

    #[test]
    fn test_contains() {
        let span = DateSpan::new(ymd(2024, 1, 29), ymd(2024, 3, 3)).expect("failed to construct span");

        assert!(span.contains(&ymd(2024, 1, 29)));
        assert!(span.contains(&ymd(2024, 2, 29)));
        assert!(span.contains(&ymd(2024, 3, 3)));
        assert!(!span.contains(&ymd(2024, 1, 28)));
        assert!(!span.contains(&ymd(2024, 3, 4)));
    }

    #[test]
    fn test_len_and_days() {
        let span = DateSpan::new(ymd(2023, 12, 30), ymd(2024, 1, 2)).expect("failed to construct span");
        assert_eq!(span.len(), 4);
        let days: Vec<_> = span.days().collect();
        assert_eq!(
            days,
            vec![ymd(2023, 12, 30), ymd(2023, 12, 31), ymd(2024, 1, 1), ymd(2024, 1, 2)]
        );
    }

    #[test]
    fn test_starting_at() {
        let span = DateSpan::starting_at(ymd(2024, 1, 29), 35);
        assert_eq!(span.end(), ymd(2024, 3, 3));
        assert_eq!(span.len(), 35);

        let single = DateSpan::starting_at(ymd(2024, 1, 29), 0);
        assert_eq!(single.start(), single.end());
    }

    #[test]
    fn test_display() {
        let span = DateSpan::new(ymd(2024, 1, 29), ymd(2024, 3, 3)).expect("failed to construct span");
        assert_eq!(span.to_string(), "2024-01-29/2024-03-03");
    }

    #[test]
    fn test_invalid_span_message() {
        let err = DateSpan::new(ymd(2024, 3, 3), ymd(2024, 1, 29)).expect_err("expected inverted span to fail");
        assert!(err.to_string().contains("is after end"));
    }
}
