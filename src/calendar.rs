//! Date picker state.
//!
//! [`Calendar`] keeps the month being shown, the picked date and the linked
//! field text. Rendering and event wiring belong to the UI layer; it calls
//! [`Calendar::show`], [`Calendar::navigate`], [`Calendar::click`] and
//! [`Calendar::close`] and reads the grid back.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::grid::{build_grid, CalendarGrid, GridCell, Navigation};
use crate::{CalendarDate, ConfigError, FormatSpec, LocaleTable, RegionalSettings, Weekday};

/// How the calendar is attached to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Opened for a text field; picking a date fills the field and closes
    #[default]
    Popup,
    /// Always shown in its own container; picking only reports the date
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarOptions {
    pub mode:              Mode,
    pub show_footer:       bool,
    pub show_navigation:   bool,
    pub show_week_numbers: bool,
    /// Shown when the field holds no parseable date; today if unset
    pub default_date:      Option<CalendarDate>,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            mode:              Mode::Popup,
            show_footer:       true,
            show_navigation:   true,
            show_week_numbers: true,
            default_date:      None,
        }
    }
}

pub type Handler = Box<dyn Fn(&Calendar) + Send + Sync>;

/// Optional lifecycle hooks, each called with the calendar as context.
///
/// A set `on_show`, `on_click` or `on_close` replaces the default behaviour of
/// that event (showing, filling the field and closing, closing).
#[derive(Default)]
pub struct Handlers {
    pub on_show:     Option<Handler>,
    pub on_click:    Option<Handler>,
    pub on_close:    Option<Handler>,
    pub on_populate: Option<Handler>,
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("on_show", &self.on_show.is_some())
            .field("on_click", &self.on_click.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_populate", &self.on_populate.is_some())
            .finish()
    }
}

/// A column header of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayLabel {
    pub caption: String,
    pub title:   String,
}

pub struct Calendar {
    locale:            Arc<LocaleTable>,
    date_spec:         FormatSpec,
    title_spec:        FormatSpec,
    first_day_of_week: Weekday,
    options:           CalendarOptions,
    handlers:          Handlers,
    clock:             fn() -> CalendarDate,
    date:              CalendarDate,
    grid:              CalendarGrid,
    field_value:       Option<String>,
    visible:           bool,
}

impl fmt::Debug for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calendar")
            .field("date_format", &self.date_spec.output())
            .field("first_day_of_week", &self.first_day_of_week)
            .field("options", &self.options)
            .field("handlers", &self.handlers)
            .field("date", &self.date)
            .field("reference", &self.grid.reference())
            .field("field_value", &self.field_value)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

impl Calendar {
    /// Builds a hidden calendar showing today's month.
    ///
    /// # Errors
    /// Returns `ConfigError` for a malformed locale table or unsupported formats.
    pub fn new(
        locale: Arc<LocaleTable>,
        regional: &RegionalSettings,
        options: CalendarOptions,
        handlers: Handlers,
    ) -> Result<Self, ConfigError> {
        locale.validate()?;
        let date_spec = regional.date_spec()?;
        let title_spec = regional.title_spec()?;
        let today = CalendarDate::today();
        let date = options.default_date.unwrap_or(today);
        let grid = build_grid(date, regional.first_day_of_week, Some(date), today);

        Ok(Self {
            locale,
            date_spec,
            title_spec,
            first_day_of_week: regional.first_day_of_week,
            options,
            handlers,
            clock: CalendarDate::today,
            date,
            grid,
            field_value: None,
            visible: false,
        })
    }

    /// Replaces the source of today's date and rebuilds the initial grid
    /// against it
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> CalendarDate) -> Self {
        self.clock = clock;
        self.date = self.options.default_date.unwrap_or_else(clock);
        self.rebuild(self.date);
        self
    }

    /// Opens the calendar for a field's text (popup) or initially (inline).
    ///
    /// Unparseable or missing text falls back to the default date, then today.
    pub fn show(&mut self, field_value: Option<&str>) {
        let today = (self.clock)();
        self.field_value = field_value.map(str::to_owned);
        self.date = field_value
            .and_then(|text| self.date_spec.parse_relative_to(text, &self.locale, today).ok())
            .or(self.options.default_date)
            .unwrap_or(today);
        self.populate(self.date);

        if let Some(on_show) = &self.handlers.on_show {
            on_show(self);
        } else {
            self.visible = true;
        }
    }

    /// Rebuilds the grid for the month of `reference`
    pub fn populate(&mut self, reference: CalendarDate) {
        self.rebuild(reference);
        if let Some(on_populate) = &self.handlers.on_populate {
            on_populate(self);
        }
    }

    /// Applies a navigation command and rebuilds the grid
    pub fn navigate(&mut self, navigation: Navigation) {
        let reference = navigation.apply(self.grid.reference(), (self.clock)());
        self.populate(reference);
    }

    /// Picks a visible date. Returns false if `date` is not in the grid.
    ///
    /// Without an `on_click` handler a popup writes the formatted date to its
    /// field and closes.
    pub fn click(&mut self, date: CalendarDate) -> bool {
        if self.grid.cell_for(&date).is_none() {
            return false;
        }
        self.date = date;
        self.rebuild(self.grid.reference());

        if let Some(on_click) = &self.handlers.on_click {
            on_click(self);
        } else if self.options.mode == Mode::Popup {
            self.field_value = Some(self.cell_title(&date));
            self.visible = false;
        }
        true
    }

    /// Handles the close button
    pub fn close(&mut self) {
        if let Some(on_close) = &self.handlers.on_close {
            on_close(self);
        } else if self.options.mode == Mode::Popup {
            self.visible = false;
        }
    }

    fn rebuild(&mut self, reference: CalendarDate) {
        self.grid = build_grid(reference, self.first_day_of_week, Some(self.date), (self.clock)());
    }

    /// The shown date before a click, the clicked date after
    pub const fn date(&self) -> CalendarDate {
        self.date
    }

    pub const fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    pub const fn start_date(&self) -> CalendarDate {
        self.grid.start_date()
    }

    pub const fn end_date(&self) -> CalendarDate {
        self.grid.end_date()
    }

    /// The cell showing `date`, if visible
    pub fn get(&self, date: &CalendarDate) -> Option<&GridCell> {
        self.grid.cell_for(date)
    }

    /// Text of the linked field, updated by a popup click
    pub fn field_value(&self) -> Option<&str> {
        self.field_value.as_deref()
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn options(&self) -> &CalendarOptions {
        &self.options
    }

    pub fn locale(&self) -> &LocaleTable {
        &self.locale
    }

    /// Caption of the month being shown, e.g. `February 2024`
    pub fn title(&self) -> String {
        self.title_spec.format(&self.grid.reference(), &self.locale)
    }

    /// Title of the footer's today button
    pub fn today_title(&self) -> String {
        self.title_spec.format(&(self.clock)(), &self.locale)
    }

    /// `date` in the canonical format, as shown on its cell
    pub fn cell_title(&self, date: &CalendarDate) -> String {
        self.date_spec.format(date, &self.locale)
    }

    /// Column headers starting at the first day of week
    pub fn day_labels(&self) -> Vec<DayLabel> {
        (0..7)
            .map(|offset| {
                let day = usize::from(self.first_day_of_week.add(offset).number());
                DayLabel {
                    caption: self.locale.days_abbreviated()[day].clone(),
                    title:   self.locale.days()[day].clone(),
                }
            })
            .collect()
    }

    /// ISO week number per row, when the week column is enabled
    pub fn week_numbers(&self) -> Option<Vec<u32>> {
        self.options.show_week_numbers.then(|| self.grid.week_numbers())
    }
}
