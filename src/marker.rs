//! Field markers: the declarative tokens that select validation rules.
//!
//! A field declares a whitespace-separated token list, the way a class
//! attribute does. `required` selects a rule as is; `maxLength:40` selects a
//! rule with a parameter.

use std::fmt;
use std::str::FromStr;

use crate::MARKER_PARAMETER_SEPARATOR;

/// A marker token that cannot select a rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("Marker {token:?} has no name")]
    MissingKind { token: String },
}

/// A parsed marker token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldMarker {
    kind:      String,
    parameter: Option<String>,
}

impl FieldMarker {
    pub fn new(kind: impl Into<String>, parameter: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            parameter,
        }
    }

    /// Name of the rule this marker selects
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }
}

impl FromStr for FieldMarker {
    type Err = MarkerError;

    /// Splits `name:param` at the first separator. An empty parameter counts
    /// as none; an empty name is rejected.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (kind, parameter) = match token.split_once(MARKER_PARAMETER_SEPARATOR) {
            Some((kind, parameter)) => (kind, Some(parameter).filter(|p| !p.is_empty())),
            None => (token, None),
        };
        if kind.is_empty() {
            return Err(MarkerError::MissingKind {
                token: token.to_owned(),
            });
        }
        Ok(Self::new(kind, parameter.map(str::to_owned)))
    }
}

impl fmt::Display for FieldMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parameter {
            Some(parameter) => write!(f, "{}{MARKER_PARAMETER_SEPARATOR}{parameter}", self.kind),
            None => f.write_str(&self.kind),
        }
    }
}

/// Parses a marker token list.
///
/// Order is kept and each token counts once; tokens without a name are
/// skipped.
pub fn parse_markers(tokens: &str) -> Vec<FieldMarker> {
    let mut markers: Vec<FieldMarker> = Vec::new();
    for token in tokens.split_whitespace() {
        match token.parse::<FieldMarker>() {
            Ok(marker) if !markers.contains(&marker) => markers.push(marker),
            Ok(_) => {},
            Err(error) => tracing::trace!(%error, "ignoring field marker"),
        }
    }
    markers
}
