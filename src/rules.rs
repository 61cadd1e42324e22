//! Validation rules and their registry.
//!
//! A rule looks at one field's value (plus the marker parameter and the rest
//! of the form) and returns a [`Verdict`]. The registry keeps rules in
//! insertion order; that order decides evaluation order and, when only the
//! first message is kept, which message wins.

use std::fmt;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use regex::Regex;

use crate::{CalendarDate, ConfigError, Field, FieldKind, Form, FormatSpec, LocaleTable, UNKNOWN_PLACEHOLDER};

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.\-]+@([a-zA-Z0-9\-]+\.)+[a-zA-Z0-9]{2,}$").expect("email pattern is valid")
});

#[allow(clippy::expect_used)]
static OPTIONAL_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[]*)\]").expect("optional segment pattern is valid"));

/// Outcome of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// The value is valid once replaced by the given normalized text
    Rewrite(String),
    Invalid(String),
}

/// Everything a rule may look at.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// The field's current value (already stripped, possibly rewritten by an
    /// earlier rule)
    pub value:     &'a str,
    pub field:     &'a Field,
    pub form:      &'a Form,
    /// Parameter of the marker that selected the rule
    pub parameter: Option<&'a str>,
    pub locale:    &'a LocaleTable,
    pub numbers:   &'a NumericGrammar,
    pub dates:     &'a FormatSpec,
    pub today:     CalendarDate,
}

pub trait Rule: Send + Sync {
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict;
}

impl<F> Rule for F
where
    F: Fn(&RuleContext<'_>) -> Verdict + Send + Sync,
{
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        self(ctx)
    }
}

/// Ordered mapping from marker kind to rule.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: IndexMap<String, Arc<dyn Rule>>,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.keys()).finish()
    }
}

impl RuleRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rules, in evaluation order
    pub fn builtin() -> Self {
        Self::new()
            .with("required", required)
            .with("numeric", numeric)
            .with("minLength", min_length)
            .with("maxLength", max_length)
            .with("minValue", min_value)
            .with("maxValue", max_value)
            .with("date", date)
            .with("email", email)
            .with("confirmation", confirmation)
    }

    /// Adds a rule at the end, or replaces an existing rule in place
    pub fn register(&mut self, key: impl Into<String>, rule: impl Rule + 'static) -> &mut Self {
        self.rules.insert(key.into(), Arc::new(rule));
        self
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, rule: impl Rule + 'static) -> Self {
        self.register(key, rule);
        self
    }

    /// Removes a rule, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> bool {
        self.rules.shift_remove(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&dyn Rule> {
        self.rules.get(key).map(AsRef::as_ref)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Rule)> {
        self.rules.iter().map(|(key, rule)| (key.as_str(), rule.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Locale-aware number syntax: optional sign, digits with optional thousands
/// grouping, optional fraction.
#[derive(Debug, Clone)]
pub struct NumericGrammar {
    group_separator:   String,
    decimal_separator: String,
    grouped:           Regex,
    plain:             Regex,
}

impl NumericGrammar {
    /// # Errors
    /// Returns `ConfigError::InvalidSeparators` for empty or equal separators.
    pub fn new(group_separator: &str, decimal_separator: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidSeparators {
            group:   group_separator.to_owned(),
            decimal: decimal_separator.to_owned(),
        };
        if group_separator.is_empty() || decimal_separator.is_empty() || group_separator == decimal_separator {
            return Err(invalid());
        }

        let group = regex::escape(group_separator);
        let fraction = format!("(?:{}[0-9]+)?", regex::escape(decimal_separator));
        let grouped = Regex::new(&format!("^[-+]?[0-9]{{1,3}}(?:{group}[0-9]{{3}})*{fraction}$")).map_err(|_| invalid())?;
        let plain = Regex::new(&format!("^[-+]?[0-9]+{fraction}$")).map_err(|_| invalid())?;

        Ok(Self {
            group_separator: group_separator.to_owned(),
            decimal_separator: decimal_separator.to_owned(),
            grouped,
            plain,
        })
    }

    /// Strict grouping applies as soon as the value holds a group separator
    pub fn is_numeric(&self, value: &str) -> bool {
        if value.contains(&self.group_separator) {
            self.grouped.is_match(value)
        } else {
            self.plain.is_match(value)
        }
    }

    /// The value as a number, if it is numeric
    pub fn to_number(&self, value: &str) -> Option<f64> {
        if !self.is_numeric(value) {
            return None;
        }
        value
            .replace(&self.group_separator, "")
            .replace(&self.decimal_separator, ".")
            .parse()
            .ok()
    }
}

/// Replaces every `#{name}` in `template`
pub fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_owned(), |message, (name, value)| {
        message.replace(&format!("#{{{name}}}"), value)
    })
}

/// Keeps the first `[...]` segment (with `#{label}` filled in) when there is a
/// label, and drops it otherwise
pub fn with_optional_label(template: &str, label: Option<&str>) -> String {
    let Some(segment) = OPTIONAL_SEGMENT.captures(template) else {
        return template.to_owned();
    };
    let (Some(whole), Some(inner)) = (segment.get(0), segment.get(1)) else {
        return template.to_owned();
    };
    let replacement = label.map_or_else(String::new, |label| substitute(inner.as_str(), &[("label", label)]));
    format!("{}{replacement}{}", &template[..whole.start()], &template[whole.end()..])
}

fn length(value: &str) -> usize {
    value.chars().count()
}

/// Checkbox checked, a radio of the group checked, or a non-empty value
pub fn required(ctx: &RuleContext<'_>) -> Verdict {
    let missing = match ctx.field.kind() {
        FieldKind::Checkbox { checked } => !checked,
        FieldKind::Radio { checked } => {
            !checked && ctx.form.radio_group(ctx.field.name()).all(|radio| !radio.is_checked())
        },
        _ => ctx.value.is_empty(),
    };
    if missing {
        Verdict::Invalid(ctx.locale.messages().required.clone())
    } else {
        Verdict::Valid
    }
}

pub fn numeric(ctx: &RuleContext<'_>) -> Verdict {
    if ctx.field.kind().is_text() && !ctx.value.is_empty() && !ctx.numbers.is_numeric(ctx.value) {
        Verdict::Invalid(ctx.locale.messages().numeric.clone())
    } else {
        Verdict::Valid
    }
}

fn length_bound(ctx: &RuleContext<'_>, name: &str, template: &str, violates: fn(usize, usize) -> bool) -> Verdict {
    if !ctx.field.kind().is_text() {
        return Verdict::Valid;
    }
    let len = length(ctx.value);
    let bound = ctx.parameter.and_then(|p| p.parse::<usize>().ok());
    match bound {
        Some(bound) if !violates(len, bound) => Verdict::Valid,
        _ => Verdict::Invalid(substitute(
            template,
            &[
                (name, ctx.parameter.unwrap_or(UNKNOWN_PLACEHOLDER)),
                ("length", &len.to_string()),
            ],
        )),
    }
}

pub fn min_length(ctx: &RuleContext<'_>) -> Verdict {
    length_bound(ctx, "minLength", &ctx.locale.messages().min_length, |len, min| len < min)
}

pub fn max_length(ctx: &RuleContext<'_>) -> Verdict {
    length_bound(ctx, "maxLength", &ctx.locale.messages().max_length, |len, max| len > max)
}

fn value_bound(ctx: &RuleContext<'_>, name: &str, template: &str, violates: fn(f64, f64) -> bool) -> Verdict {
    if !ctx.field.kind().is_text() || ctx.value.is_empty() {
        return Verdict::Valid;
    }
    let number = ctx.numbers.to_number(ctx.value);
    let bound = ctx.parameter.and_then(|p| p.parse::<i32>().ok()).map(f64::from);
    match (number, bound) {
        (Some(number), Some(bound)) if !violates(number, bound) => Verdict::Valid,
        _ => Verdict::Invalid(substitute(
            template,
            &[
                (name, ctx.parameter.unwrap_or(UNKNOWN_PLACEHOLDER)),
                ("value", if number.is_some() { ctx.value } else { UNKNOWN_PLACEHOLDER }),
            ],
        )),
    }
}

pub fn min_value(ctx: &RuleContext<'_>) -> Verdict {
    value_bound(ctx, "minValue", &ctx.locale.messages().min_value, |value, min| value < min)
}

pub fn max_value(ctx: &RuleContext<'_>) -> Verdict {
    value_bound(ctx, "maxValue", &ctx.locale.messages().max_value, |value, max| value > max)
}

/// Parses against the valid formats and normalizes to the output format
pub fn date(ctx: &RuleContext<'_>) -> Verdict {
    if !ctx.field.kind().is_text() || ctx.value.is_empty() {
        return Verdict::Valid;
    }
    match ctx.dates.parse_relative_to(ctx.value, ctx.locale, ctx.today) {
        Ok(date) => Verdict::Rewrite(ctx.dates.format(&date, ctx.locale)),
        Err(_) => Verdict::Invalid(ctx.locale.messages().date.clone()),
    }
}

pub fn email(ctx: &RuleContext<'_>) -> Verdict {
    if ctx.field.kind().is_text() && !ctx.value.is_empty() && !EMAIL.is_match(ctx.value) {
        Verdict::Invalid(ctx.locale.messages().email.clone())
    } else {
        Verdict::Valid
    }
}

/// Equal to the field named by the parameter
pub fn confirmation(ctx: &RuleContext<'_>) -> Verdict {
    if !ctx.field.kind().is_text() {
        return Verdict::Valid;
    }
    let original = ctx.parameter.and_then(|id| ctx.form.field(id));
    match original {
        Some(original) if original.value() == ctx.value => Verdict::Valid,
        _ => Verdict::Invalid(with_optional_label(
            &ctx.locale.messages().confirmation,
            original.and_then(Field::label),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ymd;

    struct Env {
        locale:  LocaleTable,
        numbers: NumericGrammar,
        dates:   FormatSpec,
    }

    impl Env {
        fn gb() -> Self {
            Self {
                locale:  LocaleTable::english(),
                numbers: NumericGrammar::new(",", ".").unwrap(),
                dates:   FormatSpec::new("yyyy/mm/dd", ["yy/m/d", "y/m/d", "d mmm y"]).unwrap(),
            }
        }

        fn run(&self, rule: impl Rule, form: &Form, id: &str, parameter: Option<&str>) -> Verdict {
            let field = form.field(id).unwrap();
            let ctx = RuleContext {
                value: field.value(),
                field,
                form,
                parameter,
                locale: &self.locale,
                numbers: &self.numbers,
                dates: &self.dates,
                today: ymd(2024, 2, 20),
            };
            rule.evaluate(&ctx)
        }
    }

    fn text(value: &str) -> Form {
        Form::new().with_field(Field::text("f").with_value(value))
    }

    #[test]
    fn test_numeric_grammar_cases() {
        struct TestCase {
            value:   &'static str,
            group:   &'static str,
            decimal: &'static str,
            numeric: bool,
        }

        let cases = [
            TestCase {
                value:   "1,234.56",
                group:   ",",
                decimal: ".",
                numeric: true,
            },
            TestCase {
                value:   "1.234,56",
                group:   ".",
                decimal: ",",
                numeric: true,
            },
            TestCase {
                value:   "1,23,4",
                group:   ",",
                decimal: ".",
                numeric: false,
            },
            TestCase {
                value:   "-1234.5",
                group:   ",",
                decimal: ".",
                numeric: true,
            },
            TestCase {
                value:   "+12,345,678",
                group:   ",",
                decimal: ".",
                numeric: true,
            },
            TestCase {
                value:   "1234,567",
                group:   ",",
                decimal: ".",
                numeric: false,
            },
            TestCase {
                value:   "12.",
                group:   ",",
                decimal: ".",
                numeric: false,
            },
            TestCase {
                value:   "abc",
                group:   ",",
                decimal: ".",
                numeric: false,
            },
            TestCase {
                value:   "1 234,5",
                group:   " ",
                decimal: ",",
                numeric: true,
            },
        ];

        for case in &cases {
            let grammar = NumericGrammar::new(case.group, case.decimal).unwrap();
            assert_eq!(
                grammar.is_numeric(case.value),
                case.numeric,
                "{:?} with group {:?} and decimal {:?}",
                case.value,
                case.group,
                case.decimal
            );
        }
    }

    #[test]
    fn test_to_number() {
        let nl = NumericGrammar::new(".", ",").unwrap();
        assert_eq!(nl.to_number("1.234,5"), Some(1234.5));
        assert_eq!(nl.to_number("-7"), Some(-7.0));
        assert_eq!(nl.to_number("1,2,3"), None);
    }

    #[test]
    fn test_numeric_grammar_rejects_bad_separators() {
        assert!(NumericGrammar::new(",", ",").is_err());
        assert!(NumericGrammar::new("", ".").is_err());
    }

    #[test]
    fn test_substitute() {
        let message = substitute("max #{maxLength}, got #{length} (#{maxLength})", &[
            ("maxLength", "3"),
            ("length", "5"),
        ]);
        assert_eq!(message, "max 3, got 5 (3)");
    }

    #[test]
    fn test_optional_label_segment() {
        let template = "Field should be a confirmation[ of \"#{label}\"]";
        assert_eq!(
            with_optional_label(template, Some("Password")),
            "Field should be a confirmation of \"Password\""
        );
        assert_eq!(with_optional_label(template, None), "Field should be a confirmation");
        assert_eq!(with_optional_label("No segment", Some("x")), "No segment");
    }

    #[test]
    fn test_required() {
        let env = Env::gb();
        assert!(matches!(env.run(required, &text(""), "f", None), Verdict::Invalid(m) if m == "Field is required"));
        assert_eq!(env.run(required, &text("x"), "f", None), Verdict::Valid);

        let form = Form::new()
            .with_field(Field::checkbox("agree", false))
            .with_field(Field::checkbox("news", true));
        assert!(matches!(env.run(required, &form, "agree", None), Verdict::Invalid(_)));
        assert_eq!(env.run(required, &form, "news", None), Verdict::Valid);
    }

    #[test]
    fn test_required_radio_group() {
        let env = Env::gb();
        let unchecked = Form::new()
            .with_field(Field::radio("size-s", "size", false))
            .with_field(Field::radio("size-m", "size", false))
            .with_field(Field::radio("color-red", "color", true));
        assert!(matches!(env.run(required, &unchecked, "size-s", None), Verdict::Invalid(_)));

        let checked = Form::new()
            .with_field(Field::radio("size-s", "size", false))
            .with_field(Field::radio("size-m", "size", true));
        assert_eq!(env.run(required, &checked, "size-s", None), Verdict::Valid);
    }

    #[test]
    fn test_numeric() {
        let env = Env::gb();
        assert_eq!(env.run(numeric, &text(""), "f", None), Verdict::Valid);
        assert_eq!(env.run(numeric, &text("1,234"), "f", None), Verdict::Valid);
        assert!(matches!(env.run(numeric, &text("12a"), "f", None), Verdict::Invalid(_)));
    }

    #[test]
    fn test_length_bounds() {
        let env = Env::gb();
        assert_eq!(env.run(max_length, &text("abc"), "f", Some("3")), Verdict::Valid);
        assert_eq!(
            env.run(max_length, &text("abcd"), "f", Some("3")),
            Verdict::Invalid("Value is too long (maximum length is 3, length is 4)".into())
        );
        assert_eq!(
            env.run(min_length, &text("ab"), "f", Some("3")),
            Verdict::Invalid("Value is too short (minimum length is 3, length is 2)".into())
        );
        // lengths count characters, not bytes
        assert_eq!(env.run(max_length, &text("äöü"), "f", Some("3")), Verdict::Valid);
        // a missing bound is reported with a placeholder
        assert_eq!(
            env.run(max_length, &text("a"), "f", None),
            Verdict::Invalid("Value is too long (maximum length is ?, length is 1)".into())
        );
    }

    #[test]
    fn test_value_bounds() {
        let env = Env::gb();
        assert_eq!(env.run(max_value, &text("10"), "f", Some("10")), Verdict::Valid);
        assert_eq!(
            env.run(max_value, &text("1,200"), "f", Some("1000")),
            Verdict::Invalid("Value is too high (maximum value is 1000, value is 1,200)".into())
        );
        assert_eq!(
            env.run(min_value, &text("2.5"), "f", Some("3")),
            Verdict::Invalid("Value is too low (minimum value is 3, value is 2.5)".into())
        );
        assert_eq!(
            env.run(min_value, &text("abc"), "f", Some("3")),
            Verdict::Invalid("Value is too low (minimum value is 3, value is ?)".into())
        );
        assert_eq!(env.run(min_value, &text(""), "f", Some("3")), Verdict::Valid);
    }

    #[test]
    fn test_date_rewrites_to_output_format() {
        let env = Env::gb();
        assert_eq!(env.run(date, &text("24/2/1"), "f", None), Verdict::Rewrite("2024/02/01".into()));
        assert_eq!(env.run(date, &text("3 mar 2023"), "f", None), Verdict::Rewrite("2023/03/03".into()));
        assert!(matches!(env.run(date, &text("31/4/2023"), "f", None), Verdict::Invalid(_)));
        assert_eq!(env.run(date, &text(""), "f", None), Verdict::Valid);
    }

    #[test]
    fn test_email() {
        let env = Env::gb();
        for valid in ["john.doe@example.com", "a_b-c@mail.example.co.uk"] {
            assert_eq!(env.run(email, &text(valid), "f", None), Verdict::Valid, "{valid}");
        }
        for invalid in ["john", "john@", "@example.com", "john@example", "john doe@example.com"] {
            assert!(matches!(env.run(email, &text(invalid), "f", None), Verdict::Invalid(_)), "{invalid}");
        }
    }

    #[test]
    fn test_confirmation() {
        let env = Env::gb();
        let form = Form::new()
            .with_field(Field::password("password").with_value("secret").with_label("Password"))
            .with_field(Field::password("again").with_value("secret"))
            .with_field(Field::password("typo").with_value("secrets"))
            .with_field(Field::text("unlabeled").with_value("x"))
            .with_field(Field::text("other").with_value("y"));

        assert_eq!(env.run(confirmation, &form, "again", Some("password")), Verdict::Valid);
        assert_eq!(
            env.run(confirmation, &form, "typo", Some("password")),
            Verdict::Invalid("Field should be a confirmation of \"Password\"".into())
        );
        assert_eq!(
            env.run(confirmation, &form, "other", Some("unlabeled")),
            Verdict::Invalid("Field should be a confirmation".into())
        );
        assert_eq!(
            env.run(confirmation, &form, "other", Some("missing")),
            Verdict::Invalid("Field should be a confirmation".into())
        );
    }

    #[test]
    fn test_registry_order_and_replacement() {
        let mut registry = RuleRegistry::builtin();
        assert_eq!(registry.keys().next(), Some("required"));
        assert_eq!(registry.len(), 9);

        registry.register("numeric", |_: &RuleContext<'_>| Verdict::Valid);
        assert_eq!(registry.keys().nth(1), Some("numeric"), "replacement keeps position");

        registry.register("postcode", |_: &RuleContext<'_>| Verdict::Valid);
        assert_eq!(registry.keys().last(), Some("postcode"));

        assert!(registry.remove("email"));
        assert!(registry.get("email").is_none());
        assert_eq!(registry.len(), 9);
    }
}
