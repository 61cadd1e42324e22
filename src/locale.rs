//! Locale tables and regional settings.
//!
//! Both are plain immutable configuration: build them once (from a preset or
//! by deserializing) and share them between widgets.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, FormatSpec, Weekday};

/// Short button captions shown by the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Captions {
    pub close:          String,
    pub next_month:     String,
    pub next_year:      String,
    pub previous_month: String,
    pub previous_year:  String,
    pub today:          String,
    pub week:           String,
}

/// Longer titles (tooltips) for the calendar buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Titles {
    pub close:          String,
    pub next_month:     String,
    pub next_year:      String,
    pub previous_month: String,
    pub previous_year:  String,
    pub today:          String,
    pub week:           String,
}

/// Validation message templates.
///
/// Templates may contain `#{name}` placeholders. The confirmation message may
/// also contain one `[...]` segment that is kept only when the confirmed
/// field has a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Messages {
    pub confirmation: String,
    pub date:         String,
    pub email:        String,
    pub max_length:   String,
    pub max_value:    String,
    pub min_length:   String,
    pub min_value:    String,
    pub numeric:      String,
    pub required:     String,
}

/// Day and month names plus the UI strings of one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleTable {
    /// Sunday first
    days:               [String; 7],
    days_abbreviated:   [String; 7],
    months:             [String; 12],
    months_abbreviated: [String; 12],
    captions:           Captions,
    titles:             Titles,
    messages:           Messages,
}

fn owned<const N: usize>(names: [&str; N]) -> [String; N] {
    names.map(str::to_owned)
}

impl LocaleTable {
    /// Creates a table, rejecting blank day or month names
    ///
    /// # Errors
    /// Returns `ConfigError::BlankLocaleEntry` for an empty name.
    pub fn new(
        days: [String; 7],
        days_abbreviated: [String; 7],
        months: [String; 12],
        months_abbreviated: [String; 12],
        captions: Captions,
        titles: Titles,
        messages: Messages,
    ) -> Result<Self, ConfigError> {
        let table = Self {
            days,
            days_abbreviated,
            months,
            months_abbreviated,
            captions,
            titles,
            messages,
        };
        table.validate()?;
        Ok(table)
    }

    /// Checks that no day or month name is blank.
    /// Deserialized tables should be checked before use.
    ///
    /// # Errors
    /// Returns `ConfigError::BlankLocaleEntry` for the first blank entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tables: [(&'static str, &[String]); 4] = [
            ("days", &self.days),
            ("daysAbbreviated", &self.days_abbreviated),
            ("months", &self.months),
            ("monthsAbbreviated", &self.months_abbreviated),
        ];
        for (table, names) in tables {
            if let Some(index) = names.iter().position(|name| name.trim().is_empty()) {
                return Err(ConfigError::BlankLocaleEntry { table, index });
            }
        }
        Ok(())
    }

    /// English names and messages
    pub fn english() -> Self {
        Self {
            days:               owned(["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]),
            days_abbreviated:   owned(["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]),
            months:             owned([
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]),
            months_abbreviated: owned([
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
            captions:           Captions {
                close:          "Close".into(),
                next_month:     ">".into(),
                next_year:      ">>".into(),
                previous_month: "<".into(),
                previous_year:  "<<".into(),
                today:          "Today".into(),
                week:           "Wk".into(),
            },
            titles:             Titles {
                close:          "Close calendar".into(),
                next_month:     "Next month".into(),
                next_year:      "Next year".into(),
                previous_month: "Previous month".into(),
                previous_year:  "Previous year".into(),
                today:          "Today's date".into(),
                week:           "Week".into(),
            },
            messages:           Messages {
                confirmation: "Field should be a confirmation[ of \"#{label}\"]".into(),
                date:         "Field should be a date (YYYY/MM/DD)".into(),
                email:        "Field should be an e-mail address".into(),
                max_length:   "Value is too long (maximum length is #{maxLength}, length is #{length})".into(),
                max_value:    "Value is too high (maximum value is #{maxValue}, value is #{value})".into(),
                min_length:   "Value is too short (minimum length is #{minLength}, length is #{length})".into(),
                min_value:    "Value is too low (minimum value is #{minValue}, value is #{value})".into(),
                numeric:      "Field is not numeric".into(),
                required:     "Field is required".into(),
            },
        }
    }

    /// Dutch names and messages
    pub fn dutch() -> Self {
        Self {
            days:               owned(["Zondag", "Maandag", "Dinsdag", "Woensdag", "Donderdag", "Vrijdag", "Zaterdag"]),
            days_abbreviated:   owned(["Zo", "Ma", "Di", "Wo", "Do", "Vr", "Za"]),
            months:             owned([
                "Januari",
                "Februari",
                "Maart",
                "April",
                "Mei",
                "Juni",
                "Juli",
                "Augustus",
                "September",
                "Oktober",
                "November",
                "December",
            ]),
            months_abbreviated: owned([
                "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dec",
            ]),
            captions:           Captions {
                close:          "Sluiten".into(),
                next_month:     ">".into(),
                next_year:      ">>".into(),
                previous_month: "<".into(),
                previous_year:  "<<".into(),
                today:          "Vandaag".into(),
                week:           "Wk".into(),
            },
            titles:             Titles {
                close:          "Sluit kalender".into(),
                next_month:     "Volgende maand".into(),
                next_year:      "Volgend jaar".into(),
                previous_month: "Vorige maand".into(),
                previous_year:  "Vorig jaar".into(),
                today:          "Vandaag".into(),
                week:           "Week".into(),
            },
            messages:           Messages {
                confirmation: "Veld moet een bevestiging zijn[ van \"#{label}\"]".into(),
                date:         "Veld moet een datum zijn (DD-MM-JJJJ)".into(),
                email:        "Veld moet een e-mail adres zijn".into(),
                max_length:   "Waarde is te lang (maximale lengte is #{maxLength}, lengte is #{length})".into(),
                max_value:    "Waarde is te hoog (maximale waarde is #{maxValue}, waarde is #{value})".into(),
                min_length:   "Waarde is te kort (minimale lengte is #{minLength}, lengte is #{length})".into(),
                min_value:    "Waarde is te laag (minimale waarde is #{minValue}, waarde is #{value})".into(),
                numeric:      "Veld is niet numeriek".into(),
                required:     "Veld is verplicht".into(),
            },
        }
    }

    /// Preset for a lowercase two-letter language code (`en`, `nl`)
    pub fn for_language(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::english()),
            "nl" => Some(Self::dutch()),
            _ => None,
        }
    }

    /// Full day names, Sunday first
    pub const fn days(&self) -> &[String; 7] {
        &self.days
    }

    /// Abbreviated day names, Sunday first
    pub const fn days_abbreviated(&self) -> &[String; 7] {
        &self.days_abbreviated
    }

    pub const fn months(&self) -> &[String; 12] {
        &self.months
    }

    pub const fn months_abbreviated(&self) -> &[String; 12] {
        &self.months_abbreviated
    }

    pub const fn captions(&self) -> &Captions {
        &self.captions
    }

    pub const fn titles(&self) -> &Titles {
        &self.titles
    }

    pub const fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Replaces the message templates
    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self::english()
    }
}

/// Country-specific date formats, week start and number separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalSettings {
    /// Canonical format; parsed dates are rewritten to it
    pub date_format:        String,
    /// Format of the calendar's month caption
    pub title_format:       String,
    /// Formats tried in order when parsing user input
    pub valid_date_formats: Vec<String>,
    pub first_day_of_week:  Weekday,
    pub decimal_separator:  String,
    pub group_separator:    String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl RegionalSettings {
    /// Great Britain
    pub fn gb() -> Self {
        Self {
            date_format:        "yyyy/mm/dd".into(),
            title_format:       "Mmmmm yyyy".into(),
            valid_date_formats: strings(&[
                "yy/m/d",
                "y/m/d",
                "yy-m-d",
                "y-m-d",
                "m/d",
                "m-d",
                "d",
                "d-mmm-yy",
                "d-mmm-y",
                "d mmmmm yy",
                "d mmmmm y",
                "d mmm yy",
                "d mmm y",
            ]),
            first_day_of_week:  Weekday::Monday,
            decimal_separator:  ".".into(),
            group_separator:    ",".into(),
        }
    }

    /// The Netherlands
    pub fn nl() -> Self {
        Self {
            date_format:        "dd-mm-yyyy".into(),
            title_format:       "Mmmmm yyyy".into(),
            valid_date_formats: strings(&[
                "d-m-yy",
                "d-m-y",
                "d/m/yy",
                "d/m/y",
                "d-m",
                "d/m",
                "d",
                "d-mmm-yy",
                "d-mmm-y",
                "d mmmmm yy",
                "d mmmmm y",
                "d mmm yy",
                "d mmm y",
            ]),
            first_day_of_week:  Weekday::Monday,
            decimal_separator:  ",".into(),
            group_separator:    ".".into(),
        }
    }

    /// Preset for an uppercase two-letter country code (`GB`, `NL`)
    pub fn for_country(code: &str) -> Option<Self> {
        match code {
            "GB" => Some(Self::gb()),
            "NL" => Some(Self::nl()),
            _ => None,
        }
    }

    /// Output format with the valid formats as parse candidates
    ///
    /// # Errors
    /// Returns `ConfigError` for unsupported formats or an empty candidate list.
    pub fn date_spec(&self) -> Result<FormatSpec, ConfigError> {
        FormatSpec::new(self.date_format.clone(), self.valid_date_formats.iter().cloned())
    }

    /// Title format, which also parses itself
    ///
    /// # Errors
    /// Returns `ConfigError::Format` for an unsupported format.
    pub fn title_spec(&self) -> Result<FormatSpec, ConfigError> {
        FormatSpec::canonical(self.title_format.clone())
    }

    /// Checks that the separators are non-empty and distinct
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidSeparators` otherwise.
    pub fn validate_separators(&self) -> Result<(), ConfigError> {
        if self.group_separator.is_empty()
            || self.decimal_separator.is_empty()
            || self.group_separator == self.decimal_separator
        {
            return Err(ConfigError::InvalidSeparators {
                group:   self.group_separator.clone(),
                decimal: self.decimal_separator.clone(),
            });
        }
        Ok(())
    }
}

impl Default for RegionalSettings {
    fn default() -> Self {
        Self::gb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for locale in [LocaleTable::english(), LocaleTable::dutch()] {
            assert!(locale.validate().is_ok());
        }
        for regional in [RegionalSettings::gb(), RegionalSettings::nl()] {
            assert!(regional.date_spec().is_ok(), "{}", regional.date_format);
            assert!(regional.title_spec().is_ok());
            assert!(regional.validate_separators().is_ok());
        }
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(LocaleTable::for_language("nl").unwrap().months()[2], "Maart");
        assert!(LocaleTable::for_language("fr").is_none());
        assert_eq!(RegionalSettings::for_country("NL").unwrap().date_format, "dd-mm-yyyy");
        assert!(RegionalSettings::for_country("US").is_none());
    }

    #[test]
    fn test_blank_entry_rejected() {
        let english = LocaleTable::english();
        let mut months = english.months().clone();
        months[4] = "  ".into();

        let result = LocaleTable::new(
            english.days().clone(),
            english.days_abbreviated().clone(),
            months,
            english.months_abbreviated().clone(),
            english.captions().clone(),
            english.titles().clone(),
            english.messages().clone(),
        );
        assert_eq!(
            result,
            Err(ConfigError::BlankLocaleEntry {
                table: "months",
                index: 4,
            })
        );
    }

    #[test]
    fn test_equal_separators_rejected() {
        let mut regional = RegionalSettings::gb();
        regional.decimal_separator = ",".into();
        assert!(matches!(
            regional.validate_separators(),
            Err(ConfigError::InvalidSeparators { .. })
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let locale = LocaleTable::dutch();
        let json = serde_json::to_string(&locale).unwrap();
        assert!(json.contains("\"monthsAbbreviated\""));
        let parsed: LocaleTable = serde_json::from_str(&json).unwrap();
        assert_eq!(locale, parsed);
    }

    #[test]
    fn test_deserialize_rejects_short_tables() {
        let mut value = serde_json::to_value(LocaleTable::english()).unwrap();
        value["days"] = serde_json::json!(["Sunday", "Monday"]);
        let result: Result<LocaleTable, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_regional_settings_deserialize() {
        let json = r#"{
            "dateFormat": "dd.mm.yyyy",
            "titleFormat": "Mmmmm yyyy",
            "validDateFormats": ["d.m.yyyy", "d.m.yy"],
            "firstDayOfWeek": 1,
            "decimalSeparator": ",",
            "groupSeparator": "."
        }"#;
        let regional: RegionalSettings = serde_json::from_str(json).unwrap();
        assert_eq!(regional.first_day_of_week, Weekday::Monday);
        let spec = regional.date_spec().unwrap();
        assert_eq!(spec.candidates().collect::<Vec<_>>(), vec!["d.m.yyyy", "d.m.yy"]);
    }
}
