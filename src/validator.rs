//! Form fields and the validation engine.
//!
//! Fields declare the rules they are subject to through markers. The
//! [`Validator`] evaluates the registered rules in registry order against
//! each field, collects the messages, and writes normalized values back.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::marker::parse_markers;
use crate::rules::{NumericGrammar, RuleContext, RuleRegistry, Verdict};
use crate::{
    CalendarDate, ConfigError, FieldMarker, FormatSpec, LocaleTable, RegionalSettings, DEFAULT_ERROR_SEPARATOR,
    DEFAULT_TITLE_SEPARATOR, NO_STRIP_MARKER,
};

/// The kinds of form control that take part in validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Password,
    TextArea,
    Select,
    Checkbox { checked: bool },
    Radio { checked: bool },
}

impl FieldKind {
    /// Single-line text input, the only kind value rules look at
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text | Self::Password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    id:       String,
    /// Group name; radios with the same name form one choice
    name:     String,
    kind:     FieldKind,
    value:    String,
    markers:  Vec<FieldMarker>,
    label:    Option<String>,
    /// Externally supplied messages, split on the title separator
    title:    Option<String>,
    disabled: bool,
}

impl Field {
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            value: String::new(),
            markers: Vec::new(),
            label: None,
            title: None,
            disabled: false,
        }
    }

    pub fn text(id: impl Into<String>) -> Self {
        Self::new(id, FieldKind::Text)
    }

    pub fn password(id: impl Into<String>) -> Self {
        Self::new(id, FieldKind::Password)
    }

    pub fn checkbox(id: impl Into<String>, checked: bool) -> Self {
        Self::new(id, FieldKind::Checkbox { checked })
    }

    pub fn radio(id: impl Into<String>, name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            ..Self::new(id, FieldKind::Radio { checked })
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Replaces the markers with the parsed token list
    #[must_use]
    pub fn with_markers(mut self, tokens: &str) -> Self {
        self.markers = parse_markers(tokens);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn markers(&self) -> &[FieldMarker] {
        &self.markers
    }

    /// The first marker of the given kind
    pub fn marker(&self, kind: &str) -> Option<&FieldMarker> {
        self.markers.iter().find(|marker| marker.kind() == kind)
    }

    pub fn has_marker(&self, kind: &str) -> bool {
        self.marker(kind).is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub const fn is_checked(&self) -> bool {
        matches!(self.kind, FieldKind::Checkbox { checked: true } | FieldKind::Radio { checked: true })
    }

    /// Updates the checked state of a checkbox or radio; other kinds ignore it
    pub fn set_checked(&mut self, checked: bool) {
        match &mut self.kind {
            FieldKind::Checkbox { checked: state } | FieldKind::Radio { checked: state } => *state = checked,
            _ => {},
        }
    }
}

/// An ordered collection of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<Field>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.id == id)
    }

    /// Radios sharing a group name
    pub fn radio_group<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields
            .iter()
            .filter(move |field| matches!(field.kind, FieldKind::Radio { .. }) && field.name == name)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorOptions {
    /// Stop at the first message of a field
    pub first_message_only: bool,
    /// Seed a field's messages from its title
    pub use_titles:         bool,
    pub title_separator:    String,
    /// Joins messages for display
    pub error_separator:    String,
    /// Trim text values before validating, unless marked `noStrip`
    pub strip_fields:       bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            first_message_only: true,
            use_titles:         true,
            title_separator:    DEFAULT_TITLE_SEPARATOR.into(),
            error_separator:    DEFAULT_ERROR_SEPARATOR.into(),
            strip_fields:       true,
        }
    }
}

/// Messages produced for one field, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// Messages joined for display
    pub fn joined(&self, separator: &str) -> String {
        self.errors.join(separator)
    }
}

pub struct Validator {
    locale:            Arc<LocaleTable>,
    date_spec:         FormatSpec,
    numbers:           NumericGrammar,
    rules:             RuleRegistry,
    options:           ValidatorOptions,
    clock:             fn() -> CalendarDate,
    already_submitted: bool,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("date_format", &self.date_spec.output())
            .field("rules", &self.rules)
            .field("options", &self.options)
            .field("already_submitted", &self.already_submitted)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// # Errors
    /// Returns `ConfigError` for a malformed locale table, unsupported date
    /// formats or unusable numeric separators.
    pub fn new(
        locale: Arc<LocaleTable>,
        regional: &RegionalSettings,
        options: ValidatorOptions,
        rules: RuleRegistry,
    ) -> Result<Self, ConfigError> {
        locale.validate()?;
        regional.validate_separators()?;
        let date_spec = regional.date_spec()?;
        let numbers = NumericGrammar::new(&regional.group_separator, &regional.decimal_separator)?;
        tracing::debug!(rules = rules.len(), date_format = date_spec.output(), "validator configured");

        Ok(Self {
            locale,
            date_spec,
            numbers,
            rules,
            options,
            clock: CalendarDate::today,
            already_submitted: false,
        })
    }

    /// Built-in rules for a country and language preset; unknown codes fall
    /// back to `GB` and English.
    ///
    /// # Errors
    /// Returns `ConfigError` if a preset is malformed.
    pub fn for_locale(country: &str, language: &str, options: ValidatorOptions) -> Result<Self, ConfigError> {
        let regional = RegionalSettings::for_country(country).unwrap_or_else(|| {
            tracing::warn!(country, "unknown country preset, using GB");
            RegionalSettings::gb()
        });
        let locale = LocaleTable::for_language(language).unwrap_or_else(|| {
            tracing::warn!(language, "unknown language preset, using en");
            LocaleTable::english()
        });
        Self::new(Arc::new(locale), &regional, options, RuleRegistry::builtin())
    }

    /// Replaces the source of today's date, which completes partial dates
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> CalendarDate) -> Self {
        self.clock = clock;
        self
    }

    pub const fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub const fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleRegistry {
        &mut self.rules
    }

    pub fn numbers(&self) -> &NumericGrammar {
        &self.numbers
    }

    pub const fn is_submitted(&self) -> bool {
        self.already_submitted
    }

    pub fn is_numeric(&self, value: &str) -> bool {
        self.numbers.is_numeric(value)
    }

    /// Validates one field and stores its stripped or normalized value.
    /// An unknown id is reported valid.
    pub fn validate_field(&self, form: &mut Form, id: &str) -> ValidationResult {
        match form.position(id) {
            Some(index) => self.validate_at(form, index),
            None => {
                tracing::warn!(id, "no such field");
                ValidationResult::default()
            },
        }
    }

    fn validate_at(&self, form: &mut Form, index: usize) -> ValidationResult {
        let Some(field) = form.fields.get(index) else {
            return ValidationResult::default();
        };
        if field.disabled {
            return ValidationResult::default();
        }

        let mut errors: Vec<String> = Vec::new();
        if self.options.use_titles {
            if let Some(title) = field.title() {
                errors.extend(
                    title
                        .split(self.options.title_separator.as_str())
                        .filter(|message| !message.is_empty())
                        .map(str::to_owned),
                );
            }
        }

        let mut value = field.value.clone();
        if self.options.strip_fields && field.kind.is_text() && !field.has_marker(NO_STRIP_MARKER) {
            value = value.trim().to_owned();
        }

        let today = (self.clock)();
        for (key, rule) in self.rules.iter() {
            if self.options.first_message_only && !errors.is_empty() {
                break;
            }
            let Some(marker) = field.marker(key) else {
                continue;
            };
            let ctx = RuleContext {
                value: &value,
                field,
                form,
                parameter: marker.parameter(),
                locale: &self.locale,
                numbers: &self.numbers,
                dates: &self.date_spec,
                today,
            };
            match rule.evaluate(&ctx) {
                Verdict::Valid => {},
                Verdict::Rewrite(normalized) => value = normalized,
                Verdict::Invalid(message) => {
                    tracing::trace!(field = field.id(), rule = key, %message, "rule failed");
                    errors.push(message);
                },
            }
        }

        if let Some(field) = form.fields.get_mut(index) {
            field.value = value;
        }
        ValidationResult { errors }
    }

    /// Validates fields in order and stops at the first invalid one
    pub fn is_form_valid(&self, form: &mut Form) -> bool {
        (0..form.fields.len()).all(|index| self.validate_at(form, index).is_valid())
    }

    /// Validates every field and returns the ids of the invalid ones with
    /// their messages
    pub fn validate_form(&self, form: &mut Form) -> Vec<(String, ValidationResult)> {
        (0..form.fields.len())
            .filter_map(|index| {
                let result = self.validate_at(form, index);
                if result.is_valid() {
                    return None;
                }
                form.fields.get(index).map(|field| (field.id.clone(), result))
            })
            .collect()
    }

    /// Runs `on_submit` once the form is valid, at most once per validator
    pub fn submit<F>(&mut self, form: &mut Form, on_submit: F) -> bool
    where
        F: FnOnce(&Form),
    {
        if !self.is_form_valid(form) {
            return false;
        }
        if self.already_submitted {
            tracing::debug!("form already submitted");
            return false;
        }
        self.already_submitted = true;
        on_submit(form);
        true
    }

    /// Messages joined with the configured separator
    pub fn display(&self, result: &ValidationResult) -> String {
        result.joined(&self.options.error_separator)
    }
}
