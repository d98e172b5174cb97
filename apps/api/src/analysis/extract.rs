//! Best-effort extraction of a single JSON object from raw model output.
//!
//! Model replies are not guaranteed to be well-formed: they are often wrapped
//! in markdown fences or surrounded by prose. Extraction tries, in order:
//! the whole (de-fenced) text, then the greedy span from the first `{` to the
//! last `}`. The span is deliberately NOT balanced-bracket matched, so two
//! independent objects in one reply fail to parse rather than silently
//! returning the first one.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// The structured object recovered from a model reply.
pub type ParsedResult = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("empty output")]
    EmptyInput,

    #[error("no JSON object found")]
    NoJsonFound,

    #[error("candidate parse error: {0}")]
    CandidateParseError(String),
}

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```[a-z0-9_+.-]*[ \t]*").expect("valid fence regex"));
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[ \t]*$").expect("valid fence regex"));

/// Extracts the JSON object embedded in `text`.
pub fn extract(text: &str) -> Result<ParsedResult, ExtractionError> {
    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyInput);
    }

    let cleaned = strip_fences(text);

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(cleaned) {
        return Ok(map);
    }

    let candidate = greedy_brace_span(cleaned).ok_or(ExtractionError::NoJsonFound)?;

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        // A valid JSON text starting with '{' is always an object.
        Ok(_) => Err(ExtractionError::NoJsonFound),
        Err(e) => Err(ExtractionError::CandidateParseError(e.to_string())),
    }
}

/// Trims the text and removes a fence marker at the very start and very end,
/// along with any backtick/newline padding they leave behind.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let start = LEADING_FENCE
        .find(trimmed)
        .map(|m| m.end())
        .unwrap_or(0);
    let rest = &trimmed[start..];
    let end = TRAILING_FENCE
        .find(rest)
        .map(|m| m.start())
        .unwrap_or(rest.len());

    rest[..end].trim_matches(|c: char| matches!(c, '`' | '\n' | '\r' | ' '))
}

/// First `{` through the last `}` of `text`, if the latter follows the former.
fn greedy_brace_span(text: &str) -> Option<&str> {
    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (close > open).then(|| &text[open..=close])
}
