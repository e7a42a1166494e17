//! Utilities for sanitizing harvested strings.
//!
//! Scraped text carries invisible formatting characters, URL-encoding residue
//! and punctuation glued to the match. These helpers remove them before any
//! pattern is applied.

/// Zero-width space, non-joiner, joiner, word joiner and byte-order mark.
const INVISIBLE_CHARS: &[char] = &['\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}', '\u{feff}'];

/// Punctuation stripped from both ends of an email candidate.
const SURROUNDING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '\'', '`', '(', ')', '[', ']', '{', '}', '<', '>',
];

/// Removes invisible Unicode formatting characters.
pub fn strip_invisible(text: &str) -> String {
    text.chars().filter(|c| !INVISIBLE_CHARS.contains(c)).collect()
}

/// Strips leading URL-encoding artifacts (`%20`, `+`) until none remain.
///
/// Mailto targets such as `mailto:%20info@school.edu.au` or `+info@...` keep
/// the encoded space in front of the address.
pub fn strip_leading_encoding(text: &str) -> &str {
    let mut rest = text.trim_start();
    loop {
        if rest.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("%20")) {
            rest = rest[3..].trim_start();
        } else if let Some(stripped) = rest.strip_prefix('+') {
            rest = stripped.trim_start();
        } else {
            return rest;
        }
    }
}

/// Trims whitespace and surrounding punctuation.
pub fn strip_surrounding_punctuation(text: &str) -> &str {
    text.trim()
        .trim_matches(|c: char| SURROUNDING_PUNCTUATION.contains(&c) || c.is_whitespace())
}

/// Full cleanup applied to every harvested candidate: invisible characters,
/// leading encoding residue and surrounding whitespace.
pub fn clean_candidate(raw: &str) -> String {
    let visible = strip_invisible(raw);
    strip_leading_encoding(visible.trim()).trim().to_string()
}
