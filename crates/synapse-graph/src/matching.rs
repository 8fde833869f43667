//! Fuzzy entity name matching.
//!
//! Two free-text names denote the same entity when they are equal after
//! normalisation, or when both are longer than four characters and one
//! contains the other. The substring rule has known false positives
//! ("Georgia" matches "Georgian Army").

/// Quote and apostrophe variants removed during normalisation.
const STRIPPED_QUOTES: &[char] = &[
    '\'', '"', '`', '\u{00B4}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}',
];

/// Names must be strictly longer than this (in chars) for substring matching.
const MIN_SUBSTRING_LEN: usize = 4;

/// Lowercase, strip quotes, turn hyphens and underscores into spaces, trim.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_QUOTES.contains(c))
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Decide whether two names denote the same entity. Symmetric.
pub fn names_match(a: &str, b: &str) -> bool {
    normalized_match(&normalize_name(a), &normalize_name(b))
}

/// Same as [`names_match`] for names that are already normalised.
pub fn normalized_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    a.chars().count() > MIN_SUBSTRING_LEN
        && b.chars().count() > MIN_SUBSTRING_LEN
        && (a.contains(b) || b.contains(a))
}
