//! Placeholder extraction.
//!
//! A placeholder is written `{name}`, `{name:type}` or `{name:type:format}`.
//! Splitting a message yields the text around the placeholders plus the
//! placeholders themselves, so that `"{a}{b}"` gives three (empty) segments
//! and two placeholders.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(
        r"\{([a-zA-Z_][a-zA-Z0-9_]*)(?::([a-zA-Z0-9_%.]*))?(?::([a-zA-Z0-9_%.]+))?\}"
    )
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    /// Declared type name; `None` when it was left out or empty.
    pub kind: Option<String>,
    pub format: Option<String>,
}

/// Splits `input` into text segments and placeholders.
///
/// The returned segment list is always one longer than the placeholder list.
pub fn split_placeholders(input: &str) -> (Vec<String>, Vec<Placeholder>) {
    let mut segments = Vec::new();
    let mut placeholders = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER_REGEX.captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        segments.push(input[last..whole.start()].to_string());
        placeholders.push(placeholder_from(&caps));
        last = whole.end();
    }
    segments.push(input[last..].to_string());

    (segments, placeholders)
}

fn placeholder_from(caps: &regex::Captures<'_>) -> Placeholder {
    let non_empty = |index: usize| {
        caps.get(index)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Placeholder {
        name: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
        kind: non_empty(2),
        format: non_empty(3),
    }
}
