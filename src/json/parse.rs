//! Purpose: Provide the permissive (JSON5) decode entrypoints.
//! Exports: `try_parse_json`, `parse_json5`, `parse_json5_as`, `ParseFailure`, `ParseFailureCategory`.
//! Role: Parser boundary that centralizes json5 usage details.
//! Invariants: Text decodes straight into the caller's type; no intermediate `Value` step.
//! Invariants: Strict JSON that json5 rejects (integers beyond i64) falls back to serde_json.
//! Invariants: Failure categories are stable labels; messages are parser-defined.
//! Notes: `try_parse_json` is intentionally lossy; use `parse_json5_as` when the reason matters.
//! Notes: `serde_json::Value` cannot hold non-finite floats, so `parse_json5` maps them to null.

use std::error::Error as StdError;
use std::fmt;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    /// Input is not valid JSON5 text.
    Syntax,
    /// Input parsed, but the value does not map onto the requested type.
    Shape,
}

impl ParseFailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Shape => "shape",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseFailure {
    category: ParseFailureCategory,
    message: String,
    line: Option<usize>,
    column: Option<usize>,
}

impl ParseFailure {
    pub fn category(&self) -> ParseFailureCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    fn from_json5(category: ParseFailureCategory, err: json5::Error) -> Self {
        match err {
            json5::Error::Message { msg, location } => Self {
                category,
                message: msg,
                line: location.as_ref().map(|loc| loc.line),
                column: location.as_ref().map(|loc| loc.column),
            },
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.category.as_str(), self.message)?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " (line {line}, column {column})")?;
        }
        Ok(())
    }
}

impl StdError for ParseFailure {}

/// Parse JSON5 text into a dynamic value, keeping the failure detail.
pub fn parse_json5(input: &str) -> Result<Value, ParseFailure> {
    parse_json5_as(input)
}

/// Parse JSON5 text directly into `T`.
pub fn parse_json5_as<T: DeserializeOwned>(input: &str) -> Result<T, ParseFailure> {
    let err = match json5::from_str::<T>(input) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    if let Ok(value) = serde_json::from_str::<T>(input) {
        return Ok(value);
    }
    Err(ParseFailure::from_json5(categorize(input), err))
}

/// Parse JSON5 text, returning `None` for anything that is not a usable value.
///
/// Absent input, a literal `null` document, malformed text, and values that do
/// not map onto `T` are indistinguishable to the caller.
pub fn try_parse_json<T: DeserializeOwned>(input: Option<&str>) -> Option<T> {
    parse_json5_as::<Option<T>>(input?).ok().flatten()
}

fn categorize(input: &str) -> ParseFailureCategory {
    let well_formed = json5::from_str::<IgnoredAny>(input).is_ok()
        || serde_json::from_str::<IgnoredAny>(input).is_ok();
    if well_formed {
        ParseFailureCategory::Shape
    } else {
        ParseFailureCategory::Syntax
    }
}
