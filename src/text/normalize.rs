// Text normalization: the canonical token space shared by queries and
// corpus fingerprints.
//
// Lowercase, split on Unicode word boundaries (UAX #29), lemmatize each word,
// rejoin with single spaces. Punctuation and whitespace never become tokens.

use std::fmt::Display;

use unicode_segmentation::UnicodeSegmentation;

use super::lemma::lemmatize;

/// Normalize free text into a space-joined string of lemmas.
///
/// Never fails: empty or punctuation-only input yields an empty string.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    lower
        .unicode_words()
        .map(lemmatize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize any displayable value by stringifying it first.
pub fn normalize_display(value: impl Display) -> String {
    normalize(&value.to_string())
}
