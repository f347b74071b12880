//! Deterministic identifier sanitization
//!
//! Register descriptions come from vendor sources whose symbol names may
//! contain spaces, slashes, bracketed bit ranges, or leading digits. Every
//! generated artifact uses the sanitized spelling; the raw spelling is kept
//! for diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix applied to names that would otherwise start with a digit.
pub const DIGIT_PREFIX: &str = "reg_";

/// A symbol name carrying both its sanitized and raw spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    name: String,
    raw: String,
}

impl Ident {
    pub fn new(raw: &str) -> Self {
        Ident {
            name: sanitize(raw),
            raw: raw.to_string(),
        }
    }

    /// Sanitized spelling, safe for generated identifiers.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Original spelling as declared in the source.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn was_sanitized(&self) -> bool {
        self.name != self.raw
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Sanitize a raw symbol name: non-alphanumeric characters become `_`, and a
/// leading digit gains the fixed [`DIGIT_PREFIX`]. The mapping is total and
/// deterministic so regenerated artifacts never drift.
pub fn sanitize(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();

    if name.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
        name.insert_str(0, DIGIT_PREFIX);
    }
    name
}
