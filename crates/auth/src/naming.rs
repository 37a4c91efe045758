//! Structural naming rule tying a privilege identifier to its value.
//!
//! A privilege value is written in camel case (`listComments`); its identifier
//! must be the upper-snake-case spelling of that value (`LIST_COMMENTS`).

use thiserror::Error;

/// A privilege identifier that does not spell its value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("privilege identifier '{identifier}' does not match value '{value}' (expected '{expected}')")]
pub struct NamingError {
    pub identifier: String,
    pub value: String,
    pub expected: String,
}

/// Transliterate a camel-case value into its upper-snake-case identifier.
///
/// Every ASCII uppercase letter gets an `_` in front of it, leading underscores
/// are stripped, then the whole string is uppercased.
pub fn upper_snake_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c);
    }
    out.trim_start_matches('_').to_ascii_uppercase()
}

/// Check that `identifier` is exactly `upper_snake_case(value)`.
pub fn validate_naming(identifier: &str, value: &str) -> Result<(), NamingError> {
    let expected = upper_snake_case(value);
    if expected == identifier {
        Ok(())
    } else {
        Err(NamingError {
            identifier: identifier.to_string(),
            value: value.to_string(),
            expected,
        })
    }
}
