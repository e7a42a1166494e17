//! Field-level normalization helpers.

/// Trims a raw field, treating empty strings and the spreadsheet residue
/// `nan` as absent.
pub fn clean_str(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(trimmed.to_string())
}

/// Cleans an owned optional field in place.
pub(crate) fn clean_field(field: &mut Option<String>) {
    *field = clean_str(field.as_deref());
}

/// Title-cases text: a letter following a non-letter is uppercased, every
/// other letter lowercased (`ST. KILDA-EAST` becomes `St. Kilda-East`).
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Normalizes a postcode to four digits: a spreadsheet float suffix (`.0`)
/// and non-digits dropped, left-padded with zeros, last four digits kept.
/// `None` when no digit remains.
pub fn normalise_postcode(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let padded = format!("{digits:0>4}");
    Some(padded[padded.len() - 4..].to_string())
}

/// Ensures a website URL carries a scheme, defaulting to https.
pub fn ensure_http(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() || url.eq_ignore_ascii_case("nan") {
        return None;
    }
    let lower = url.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(url.to_string())
    } else if let Some(rest) = url.strip_prefix("//") {
        Some(format!("https://{rest}"))
    } else {
        Some(format!("https://{url}"))
    }
}

/// Lowercased, trimmed, whitespace-collapsed comparison key; absent values
/// (including `nan`) give the empty key.
pub fn norm_key(raw: Option<&str>) -> String {
    clean_str(raw)
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Collapses whitespace runs in a phone number.
pub fn normalize_phone(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_str() {
        assert_eq!(clean_str(Some("  Hill School ")).as_deref(), Some("Hill School"));
        assert_eq!(clean_str(Some("   ")), None);
        assert_eq!(clean_str(Some("NaN")), None);
        assert_eq!(clean_str(None), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ST. KILDA-EAST"), "St. Kilda-East");
        assert_eq!(title_case("o'connor"), "O'Connor");
        assert_eq!(title_case("mount  barker"), "Mount  Barker");
        assert_eq!(title_case(&title_case("NORTH hobart")), "North Hobart");
    }

    #[test]
    fn test_normalise_postcode() {
        assert_eq!(normalise_postcode("800").as_deref(), Some("0800"));
        assert_eq!(normalise_postcode("2000.0").as_deref(), Some("2000"));
        assert_eq!(normalise_postcode("812.0").as_deref(), Some("0812"));
        assert_eq!(normalise_postcode(" 3000 ").as_deref(), Some("3000"));
        assert_eq!(normalise_postcode("VIC 3121").as_deref(), Some("3121"));
        assert_eq!(normalise_postcode("n/a"), None);
    }

    #[test]
    fn test_ensure_http() {
        assert_eq!(
            ensure_http("www.school.edu.au").as_deref(),
            Some("https://www.school.edu.au")
        );
        assert_eq!(
            ensure_http("HTTP://school.edu.au").as_deref(),
            Some("HTTP://school.edu.au")
        );
        assert_eq!(
            ensure_http("//school.edu.au/x").as_deref(),
            Some("https://school.edu.au/x")
        );
        assert_eq!(ensure_http("  "), None);
    }

    #[test]
    fn test_norm_key_and_phone() {
        assert_eq!(norm_key(Some("  Hill   School ")), "hill school");
        assert_eq!(norm_key(None), "");
        assert_eq!(norm_key(Some("nan")), "");
        assert_eq!(normalize_phone(" (03)  9555\t1234 "), "(03) 9555 1234");
    }
}
