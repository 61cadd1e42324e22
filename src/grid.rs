//! Month-to-week grid layout.

use serde::Serialize;

use crate::consts::{DAYS_PER_WEEK, ISO_WEEK_ANCHOR_DAY, JANUARY, MONTHS_PER_YEAR};
use crate::{days_in_month, CalendarDate, DateSpan, Weekday};

/// One day of a calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    date:             CalendarDate,
    in_current_month: bool,
    is_today:         bool,
    is_selected:      bool,
    week_index:       usize,
    column_index:     u8,
}

impl GridCell {
    pub const fn date(&self) -> CalendarDate {
        self.date
    }

    /// Whether the day belongs to the month the grid was built for
    pub const fn in_current_month(&self) -> bool {
        self.in_current_month
    }

    pub const fn is_today(&self) -> bool {
        self.is_today
    }

    pub const fn is_selected(&self) -> bool {
        self.is_selected
    }

    /// Row of the cell, from 0
    pub const fn week_index(&self) -> usize {
        self.week_index
    }

    /// Column of the cell, `0..=6`, relative to the first day of week
    pub const fn column_index(&self) -> u8 {
        self.column_index
    }
}

/// Full weeks covering one month, leading and trailing days included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    reference:         CalendarDate,
    first_day_of_week: Weekday,
    span:              DateSpan,
    cells:             Vec<GridCell>,
}

impl CalendarGrid {
    /// The date the grid was built for
    pub const fn reference(&self) -> CalendarDate {
        self.reference
    }

    pub const fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    /// First visible day; may belong to the previous month
    pub const fn start_date(&self) -> CalendarDate {
        self.span.start()
    }

    /// Last visible day; may belong to the next month
    pub const fn end_date(&self) -> CalendarDate {
        self.span.end()
    }

    pub const fn span(&self) -> DateSpan {
        self.span
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cells grouped by row
    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(usize::from(DAYS_PER_WEEK))
    }

    /// ISO week number of each row, taken from the row's first day
    pub fn week_numbers(&self) -> Vec<u32> {
        self.weeks()
            .filter_map(|week| week.first().map(|cell| week_number(&cell.date)))
            .collect()
    }

    /// The cell showing `date`, if it is visible
    pub fn cell_for(&self, date: &CalendarDate) -> Option<&GridCell> {
        if !self.span.contains(date) {
            return None;
        }
        let index = usize::try_from(self.span.start().days_until(date)).ok()?;
        self.cells.get(index)
    }
}

/// ISO 8601 week number of `date`.
///
/// The week is identified by its Thursday; week 1 is the week holding
/// 4 January of that Thursday's year.
pub fn week_number(date: &CalendarDate) -> u32 {
    let thursday = date.add_days(3 - i64::from(date.weekday().days_from_monday()));
    let days = CalendarDate::new(thursday.year(), JANUARY, ISO_WEEK_ANCHOR_DAY)
        .map_or(0, |anchor| anchor.days_until(&thursday));
    let week = (days + 3).div_euclid(i64::from(DAYS_PER_WEEK)) + 1;
    u32::try_from(week).unwrap_or(1)
}

/// Compares two optional dates by year, month and day.
/// A missing operand never equals anything.
pub fn dates_equal(a: Option<&CalendarDate>, b: Option<&CalendarDate>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.components() == b.components(),
        _ => false,
    }
}

/// Lays out the month of `reference` as full weeks starting on
/// `first_day_of_week`.
pub fn build_grid(
    reference: CalendarDate,
    first_day_of_week: Weekday,
    selected: Option<CalendarDate>,
    today: CalendarDate,
) -> CalendarGrid {
    let first = reference.first_of_month();
    let offset = (first.weekday().number() + DAYS_PER_WEEK - first_day_of_week.number()) % DAYS_PER_WEEK;
    let start = first.add_days(-i64::from(offset));
    let visible = usize::from(offset) + days_in_month(reference.year(), reference.month()).map_or(0, usize::from);
    let count = visible.div_ceil(usize::from(DAYS_PER_WEEK)) * usize::from(DAYS_PER_WEEK);

    let span = DateSpan::starting_at(start, count);
    let cells: Vec<GridCell> = span
        .days()
        .enumerate()
        .map(|(i, date)| GridCell {
            date,
            in_current_month: date.month() == reference.month(),
            is_today: dates_equal(Some(&date), Some(&today)),
            is_selected: dates_equal(Some(&date), selected.as_ref()),
            week_index: i / usize::from(DAYS_PER_WEEK),
            // always below 7
            column_index: (i % usize::from(DAYS_PER_WEEK)) as u8,
        })
        .collect();

    tracing::debug!(
        %reference,
        start = %span.start(),
        end = %span.end(),
        cells = cells.len(),
        "built calendar grid"
    );

    CalendarGrid {
        reference,
        first_day_of_week,
        span,
        cells,
    }
}

/// A navigation command of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    PreviousMonth,
    NextMonth,
    PreviousYear,
    NextYear,
    Today,
    GoTo(CalendarDate),
}

impl Navigation {
    /// The reference date to rebuild the grid for.
    /// Month and year steps land on the first day of the target month.
    pub fn apply(self, reference: CalendarDate, today: CalendarDate) -> CalendarDate {
        let year = i32::from(MONTHS_PER_YEAR);
        match self {
            Self::PreviousMonth => reference.add_months_to_first(-1),
            Self::NextMonth => reference.add_months_to_first(1),
            Self::PreviousYear => reference.add_months_to_first(-year),
            Self::NextYear => reference.add_months_to_first(year),
            Self::Today => today,
            Self::GoTo(date) => date,
        }
    }
}
