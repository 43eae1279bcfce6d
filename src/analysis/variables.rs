//! Local variable extraction
//!
//! Dawn declares variables with `let <name> = <value>`. Extraction is a single
//! regex over the whole document: there is no notion of scope, so a `let`
//! nested anywhere is reported, duplicates are kept, and names are not checked
//! for being valid identifiers.

use once_cell::sync::Lazy;
use regex::Regex;

// CRLF mode: `.` excludes `\r` as well as `\n`.
static LET_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?R)let\s+(.+)\s+=\s+.+").expect("let-binding pattern is valid")
});

/// Returns the names bound by `let` in document order.
pub fn extract_variables(text: &str) -> Vec<String> {
    LET_BINDING
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().trim().to_string())
        .collect()
}
