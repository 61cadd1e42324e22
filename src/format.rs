//! Date format mini-language.
//!
//! A format string is a sequence of letter runs and literal text. Runs of
//! `d`, `m` and `y` select date components by length (`dd` is a zero-padded
//! day, `yyyy` a four-digit year); the casing of a month-name run selects the
//! casing of the rendered name (`mmm`, `MMM`, `Mmm`). Everything else is
//! literal text that parsing must find verbatim.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::{CalendarDate, ConfigError, LocaleTable, ParseError};

/// Splits parse input into alternating word and non-word runs
#[allow(clippy::expect_used)]
static INPUT_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+|\W+").expect("input run pattern is valid"));

/// One element of a tokenized format string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatToken {
    /// `d`: day of month
    Day,
    /// `dd`: zero-padded day of month
    Day2,
    /// `m`: 1-based month number
    Month,
    /// `mm`: zero-padded 1-based month number
    Month2,
    /// `mmm`: abbreviated month name, lowercase
    MonthAbbrevLower,
    /// `MMM`: abbreviated month name, uppercase
    MonthAbbrevUpper,
    /// `Mmm`: abbreviated month name as written in the locale table
    MonthAbbrevTitle,
    /// `mmmmm`: full month name, lowercase
    MonthFullLower,
    /// `MMMMM`: full month name, uppercase
    MonthFullUpper,
    /// `Mmmmm`: full month name as written in the locale table
    MonthFullTitle,
    /// `y`: year, rendered in full; parses one to four digits
    Year1,
    /// `yy`: last two digits of the year
    Year2,
    /// `yyyy`: zero-padded four-digit year
    Year4,
    /// Text that is copied on output and matched verbatim on input
    Literal(String),
}

/// A format string uses a token shape with no defined meaning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Unsupported token {run:?} in date format {format:?}")]
    UnsupportedToken { run: String, format: String },
    #[error("Empty date format")]
    Empty,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LetterClass {
    Day,
    Month,
    Year,
}

impl LetterClass {
    const fn of(c: char) -> Option<Self> {
        match c {
            'd' | 'D' => Some(Self::Day),
            'm' | 'M' => Some(Self::Month),
            'y' | 'Y' => Some(Self::Year),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
enum Casing {
    Lower,
    Upper,
    Title,
}

impl Casing {
    fn of(run: &str) -> Option<Self> {
        let mut chars = run.chars();
        let first = chars.next()?;
        let rest = chars.as_str();
        if run.chars().all(char::is_lowercase) {
            Some(Self::Lower)
        } else if run.chars().all(char::is_uppercase) {
            Some(Self::Upper)
        } else if first.is_uppercase() && rest.chars().all(char::is_lowercase) {
            Some(Self::Title)
        } else {
            None
        }
    }

    fn apply(self, name: &str) -> String {
        match self {
            Self::Lower => name.to_lowercase(),
            Self::Upper => name.to_uppercase(),
            Self::Title => name.to_owned(),
        }
    }
}

impl FormatToken {
    fn from_run(class: LetterClass, run: &str) -> Option<Self> {
        let token = match (class, run.chars().count()) {
            (LetterClass::Day, 1) => Self::Day,
            (LetterClass::Day, 2) => Self::Day2,
            (LetterClass::Month, 1) => Self::Month,
            (LetterClass::Month, 2) => Self::Month2,
            (LetterClass::Month, 3) => match Casing::of(run)? {
                Casing::Lower => Self::MonthAbbrevLower,
                Casing::Upper => Self::MonthAbbrevUpper,
                Casing::Title => Self::MonthAbbrevTitle,
            },
            (LetterClass::Month, 5) => match Casing::of(run)? {
                Casing::Lower => Self::MonthFullLower,
                Casing::Upper => Self::MonthFullUpper,
                Casing::Title => Self::MonthFullTitle,
            },
            (LetterClass::Year, 1) => Self::Year1,
            (LetterClass::Year, 2) => Self::Year2,
            (LetterClass::Year, 4) => Self::Year4,
            _ => return None,
        };
        Some(token)
    }

    /// Renders this token for `date`
    fn render(&self, out: &mut String, date: &CalendarDate, locale: &LocaleTable) {
        let month = usize::from(date.month());
        // Writing into a String cannot fail
        let _ = match self {
            Self::Day => write!(out, "{}", date.day()),
            Self::Day2 => write!(out, "{:02}", date.day()),
            Self::Month => write!(out, "{}", month + 1),
            Self::Month2 => write!(out, "{:02}", month + 1),
            Self::MonthAbbrevLower => write!(out, "{}", Casing::Lower.apply(&locale.months_abbreviated()[month])),
            Self::MonthAbbrevUpper => write!(out, "{}", Casing::Upper.apply(&locale.months_abbreviated()[month])),
            Self::MonthAbbrevTitle => write!(out, "{}", Casing::Title.apply(&locale.months_abbreviated()[month])),
            Self::MonthFullLower => write!(out, "{}", Casing::Lower.apply(&locale.months()[month])),
            Self::MonthFullUpper => write!(out, "{}", Casing::Upper.apply(&locale.months()[month])),
            Self::MonthFullTitle => write!(out, "{}", Casing::Title.apply(&locale.months()[month])),
            Self::Year1 => write!(out, "{}", date.year()),
            Self::Year2 => write!(out, "{:02}", date.year().rem_euclid(100)),
            Self::Year4 => write!(out, "{:04}", date.year()),
            Self::Literal(text) => write!(out, "{text}"),
        };
    }
}

/// Splits a format string into tokens.
///
/// Maximal runs of one letter class become a single token chosen by the run's
/// length; any other characters form literal tokens.
///
/// # Errors
/// Returns `FormatError` for a run length (or month-name casing) without a
/// defined meaning, such as `ddd`, and for an empty format.
pub fn tokenize(format: &str) -> Result<Vec<FormatToken>, FormatError> {
    if format.is_empty() {
        return Err(FormatError::Empty);
    }

    let mut tokens = Vec::new();
    let mut rest = format;
    while let Some(first) = rest.chars().next() {
        let class = LetterClass::of(first);
        let end = rest
            .char_indices()
            .find(|&(_, c)| LetterClass::of(c) != class)
            .map_or(rest.len(), |(i, _)| i);
        let (run, tail) = rest.split_at(end);

        let token = match class {
            Some(class) => FormatToken::from_run(class, run).ok_or_else(|| FormatError::UnsupportedToken {
                run:    run.to_owned(),
                format: format.to_owned(),
            })?,
            None => FormatToken::Literal(run.to_owned()),
        };
        tokens.push(token);
        rest = tail;
    }
    Ok(tokens)
}

/// Renders `date` with already tokenized format. Never fails.
pub fn format(date: &CalendarDate, tokens: &[FormatToken], locale: &LocaleTable) -> String {
    let mut out = String::new();
    for token in tokens {
        token.render(&mut out, date, locale);
    }
    out
}

/// Parses `input` against `candidates` in order; the first match wins.
///
/// Components missing from a candidate default to today's date. Candidates
/// with an unsupported token shape are skipped.
///
/// # Errors
/// Returns `ParseError::NoMatchingFormat` if no candidate matches.
pub fn parse(input: &str, candidates: &[&str], locale: &LocaleTable) -> Result<CalendarDate, ParseError> {
    parse_relative_to(input, candidates, locale, CalendarDate::today())
}

/// Like [`parse`], with `reference` standing in for today's date.
///
/// # Errors
/// Returns `ParseError::NoMatchingFormat` if no candidate matches.
pub fn parse_relative_to(
    input: &str,
    candidates: &[&str],
    locale: &LocaleTable,
    reference: CalendarDate,
) -> Result<CalendarDate, ParseError> {
    let tokenized: Vec<Vec<FormatToken>> = candidates
        .iter()
        .filter_map(|candidate| match tokenize(&candidate.to_lowercase()) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                tracing::warn!(candidate, error = %e, "skipping unsupported date format");
                None
            },
        })
        .collect();
    parse_tokens(input, tokenized.iter().map(Vec::as_slice), locale, reference)
}

fn parse_tokens<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = &'a [FormatToken]>,
    locale: &LocaleTable,
    reference: CalendarDate,
) -> Result<CalendarDate, ParseError> {
    if input.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let lowered = input.to_lowercase();
    let runs: Vec<&str> = INPUT_RUNS.find_iter(&lowered).map(|m| m.as_str()).collect();

    candidates
        .into_iter()
        .enumerate()
        .find_map(|(index, tokens)| {
            let date = match_candidate(&runs, tokens, locale, reference);
            if date.is_none() {
                tracing::trace!(input, candidate = index, "date format candidate rejected");
            }
            date
        })
        .inspect(|date| tracing::debug!(input, %date, "parsed date"))
        .ok_or_else(|| ParseError::NoMatchingFormat {
            input: input.to_owned(),
        })
}

/// Digits of `run` as a number, if it is `min..=max` ASCII digits long
fn digits(run: &str, min: usize, max: usize) -> Option<i32> {
    if run.len() < min || run.len() > max || !run.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    run.parse().ok()
}

fn month_index(run: &str, names: &[String]) -> Option<i32> {
    names
        .iter()
        .position(|name| name.to_lowercase() == run)
        .and_then(|i| i32::try_from(i).ok())
}

/// Walks tokens and lowercased input runs pairwise
fn match_candidate(
    runs: &[&str],
    tokens: &[FormatToken],
    locale: &LocaleTable,
    reference: CalendarDate,
) -> Option<CalendarDate> {
    if runs.len() != tokens.len() {
        return None;
    }

    let mut year = reference.year();
    let mut month = i32::from(reference.month());
    let mut day = i32::from(reference.day());

    for (token, run) in tokens.iter().zip(runs) {
        match token {
            FormatToken::Day | FormatToken::Day2 => day = digits(run, 1, 2)?,
            FormatToken::Month | FormatToken::Month2 => month = digits(run, 1, 2)? - 1,
            FormatToken::MonthAbbrevLower | FormatToken::MonthAbbrevUpper | FormatToken::MonthAbbrevTitle => {
                month = month_index(run, locale.months_abbreviated())?;
            },
            FormatToken::MonthFullLower | FormatToken::MonthFullUpper | FormatToken::MonthFullTitle => {
                month = month_index(run, locale.months())?;
            },
            // Century comes from today, not from any date already in the field
            FormatToken::Year2 => year = 100 * reference.year().div_euclid(100) + digits(run, 2, 2)?,
            FormatToken::Year1 | FormatToken::Year4 => year = digits(run, 1, 4)?,
            FormatToken::Literal(text) => {
                if text.as_str() != *run {
                    return None;
                }
            },
        }
    }

    let month = u8::try_from(month).ok()?;
    let day = u8::try_from(day).ok()?;
    CalendarDate::new(year, month, day).ok()
}

/// Canonical output format plus the ordered candidate formats for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    output:     String,
    tokens:     Vec<FormatToken>,
    candidates: Vec<(String, Vec<FormatToken>)>,
}

impl FormatSpec {
    /// Tokenizes the output format and every candidate up front.
    ///
    /// # Errors
    /// Returns `ConfigError::Format` for an unsupported format and
    /// `ConfigError::NoCandidateFormats` for an empty candidate list.
    pub fn new<I, S>(output: impl Into<String>, candidates: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let output = output.into();
        let tokens = tokenize(&output)?;
        let candidates = candidates
            .into_iter()
            .map(|candidate| {
                let candidate = candidate.into();
                // Candidates match case-insensitively
                let tokens = tokenize(&candidate.to_lowercase())?;
                Ok((candidate, tokens))
            })
            .collect::<Result<Vec<_>, FormatError>>()?;
        if candidates.is_empty() {
            return Err(ConfigError::NoCandidateFormats);
        }
        Ok(Self {
            output,
            tokens,
            candidates,
        })
    }

    /// A spec whose only candidate is its own output format
    ///
    /// # Errors
    /// Returns `ConfigError::Format` for an unsupported format.
    pub fn canonical(output: impl Into<String>) -> Result<Self, ConfigError> {
        let output = output.into();
        Self::new(output.clone(), [output])
    }

    /// Returns the canonical output format string
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Returns the candidate format strings in parse order
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|(source, _)| source.as_str())
    }

    /// Renders `date` in the canonical output format
    pub fn format(&self, date: &CalendarDate, locale: &LocaleTable) -> String {
        format(date, &self.tokens, locale)
    }

    /// Parses `input` against the candidates, defaulting missing components
    /// to today's date.
    ///
    /// # Errors
    /// Returns `ParseError` if no candidate matches.
    pub fn parse(&self, input: &str, locale: &LocaleTable) -> Result<CalendarDate, ParseError> {
        self.parse_relative_to(input, locale, CalendarDate::today())
    }

    /// Parses `input` with `reference` standing in for today's date.
    ///
    /// # Errors
    /// Returns `ParseError` if no candidate matches.
    pub fn parse_relative_to(
        &self,
        input: &str,
        locale: &LocaleTable,
        reference: CalendarDate,
    ) -> Result<CalendarDate, ParseError> {
        parse_tokens(
            input,
            self.candidates.iter().map(|(_, tokens)| tokens.as_slice()),
            locale,
            reference,
        )
    }
}
