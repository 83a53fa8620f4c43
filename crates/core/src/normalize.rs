//! Canonical text form used for storage and comparison of every partner field.
//!
//! A value is trimmed, compatibility-decomposed (NFKD), stripped of anything
//! outside ASCII, trimmed again and upper-cased. Accented Latin letters thus
//! collapse to their base letter (`"São Paulo"` becomes `"SAO PAULO"`), while
//! non-Latin scripts disappear entirely.

use unicode_normalization::UnicodeNormalization;

/// Normalize an optional value. Absent input yields an empty string.
///
/// The second trim matters: characters that survive the first trim but are
/// discarded as non-ASCII (e.g. a leading variation selector) can otherwise
/// expose whitespace, and the result must be a fixed point of this function.
pub fn normalize(value: Option<&str>) -> String {
    match value {
        Some(text) => normalize_str(text),
        None => String::new(),
    }
}

/// Normalize a present value.
pub fn normalize_str(text: &str) -> String {
    let ascii: String = text.trim().nfkd().filter(char::is_ascii).collect();
    ascii.trim().to_ascii_uppercase()
}

/// Returns `true` when `text` is already in canonical form.
pub fn is_normalized(text: &str) -> bool {
    normalize_str(text) == text
}
