//! Python identifier sanitization.
//!
//! Raw GI symbol names are C-oriented and may collide with Python keywords or
//! contain characters that are illegal in identifiers. Sanitization is total
//! (every non-empty input maps to a valid identifier), deterministic, and
//! idempotent; when a rewrite happens, the reason is returned so callers can
//! surface it as an advisory note in the generated artifact.

use crate::error::{Result, StubError};

/// Python 3 hard keywords.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Rewrite `name` into a valid, non-keyword Python identifier.
///
/// Returns the (possibly unchanged) identifier and, when a rewrite happened,
/// a note of the form `changed: <reasons>`. Keyword collisions gain a
/// trailing underscore; invalid characters are substituted with underscores
/// and a leading digit gains a leading underscore. The rules compose.
/// Empty input is the only failure.
pub fn sanitize(name: &str) -> Result<(String, Option<String>)> {
    if name.is_empty() {
        return Err(StubError::EmptyIdentifier);
    }

    let mut reasons: Vec<&str> = Vec::new();
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out != name {
        reasons.push("invalid characters");
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
        reasons.push("leading digit");
    }
    if is_keyword(&out) {
        out.push('_');
        reasons.push("reserved keyword");
    }

    let note = if reasons.is_empty() {
        None
    } else {
        Some(format!("changed: {}", reasons.join(" and ")))
    };
    Ok((out, note))
}
