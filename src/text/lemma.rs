// Noun lemmatizer: reduces plural word forms to their singular base.
//
// This is a normalization heuristic, not a linguistic transform. It applies
// an irregular-plural table first, then a short list of regular suffix rules,
// then the irregular table once more on the stripped form. Suffix rules never
// yield a word another suffix rule rewrites, and the second table lookup
// catches stems that are themselves irregular plurals, so lemmatizing a lemma
// is a no-op.

/// Irregular plurals that suffix rules can't handle.
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
];

/// Suffix rewrites for sibilant plurals, checked in order.
const SIBILANT_SUFFIXES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("zzes", "zz"),
];

/// Endings that look plural but usually aren't: "glass", "chorus", "this".
const KEEP_S_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Shortest word that suffix rules are applied to. Keeps "was", "has",
/// "its" and friends intact.
const MIN_SUFFIX_LEN: usize = 4;

/// Reduce a single lowercase token to its lemma.
///
/// Tokens that contain anything other than letters (digits, apostrophes,
/// underscores) are returned unchanged.
pub fn lemmatize(token: &str) -> String {
    if let Some(lemma) = irregular_singular(token) {
        return lemma.to_string();
    }

    let stem = strip_plural_suffix(token);

    // "mens" strips to "men", which is itself an irregular plural
    match irregular_singular(&stem) {
        Some(lemma) => lemma.to_string(),
        None => stem,
    }
}

fn irregular_singular(token: &str) -> Option<&'static str> {
    IRREGULAR_PLURALS
        .iter()
        .find(|(plural, _)| *plural == token)
        .map(|(_, singular)| *singular)
}

/// Apply the regular suffix rules once.
fn strip_plural_suffix(token: &str) -> String {
    if !token.chars().all(char::is_alphabetic) || token.chars().count() < MIN_SUFFIX_LEN {
        return token.to_string();
    }

    for (suffix, replacement) in SIBILANT_SUFFIXES {
        if let Some(stem) = token.strip_suffix(*suffix) {
            return format!("{stem}{replacement}");
        }
    }

    if token.chars().count() > MIN_SUFFIX_LEN {
        if let Some(stem) = token.strip_suffix("ies") {
            return format!("{stem}y");
        }
    }

    if KEEP_S_ENDINGS.iter().any(|ending| token.ends_with(*ending)) {
        return token.to_string();
    }

    match token.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => token.to_string(),
    }
}
