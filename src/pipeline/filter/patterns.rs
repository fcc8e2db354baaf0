//! Whole-value predicates for the optional filter stages.
//!
//! Every pattern is anchored at both ends: a fragment is dropped only when
//! the entire value is noise, never because it merely contains some.

use std::sync::LazyLock;

use regex::Regex;

/// Noise only: punctuation, digits, underscores and `x` separators with at
/// most one letter token (e.g. "12345", "--- x ---", "A.", "3 x 4").
static NOISE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[\W\d_x]*[a-z]?[\s\d]*[\W\d_x]*$").unwrap());

/// Codes of short letter runs interleaved with digits (e.g. "A1B2C3", "x86", "12ab34").
static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:[a-z]{0,3}\d+[a-z]{0,3}\d*)+|(?:\d+[a-z]{0,3}\d+[a-z]{0,3})+)$",
    )
    .unwrap()
});

/// A number with an SI unit and nothing else (e.g. "5 kg", "3.2ms", "1e3 Hz").
static MEASUREMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\d+(?:\.\d+)?(?:\s*e[+-]?\d+)?\s*(?:M|k|m|c)?(?:m|g|s|A|Hz|N|Pa|J|W|V|F|Ω|S|T|H|lm|lx)$",
    )
    .unwrap()
});

static HYPERLINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:www\.|https?://)\S+$").unwrap());

pub fn is_untranslatable(text: &str) -> bool {
    NOISE_PATTERN.is_match(text) || CODE_PATTERN.is_match(text)
}

pub fn is_measurement(text: &str) -> bool {
    MEASUREMENT_PATTERN.is_match(text)
}

pub fn is_hyperlink(text: &str) -> bool {
    HYPERLINK_PATTERN.is_match(text)
}
