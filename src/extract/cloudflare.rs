//! Cloudflare email-protection decoding.
//!
//! Protected addresses are published either as a `data-cfemail` attribute or as
//! the fragment of a `/cdn-cgi/l/email-protection#<hex>` link. The first hex
//! byte is an XOR key applied to every following byte.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::utils::parse_selector_unsafe;

static CFEMAIL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("[data-cfemail]", "CFEMAIL_SELECTOR"));

static PROTECTION_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(
        r#"a[href*="/cdn-cgi/l/email-protection"]"#,
        "PROTECTION_LINK_SELECTOR",
    )
});

/// Decodes one hex-encoded protected address.
///
/// Returns `None` for malformed hex, an empty payload, or a decoding that is
/// not printable ASCII containing `@`.
pub fn decode_cfemail(encoded: &str) -> Option<String> {
    let encoded = encoded.trim();
    if encoded.len() < 4 || encoded.len() % 2 != 0 || !encoded.is_ascii() {
        return None;
    }

    let bytes = (0..encoded.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&encoded[i..i + 2], 16).ok())
        .collect::<Option<Vec<u8>>>()?;

    let (key, payload) = bytes.split_first()?;
    let decoded: Vec<u8> = payload.iter().map(|b| b ^ key).collect();

    let printable = decoded.iter().all(|b| (0x20..=0x7e).contains(b));
    if !printable || !decoded.contains(&b'@') {
        return None;
    }
    String::from_utf8(decoded).ok()
}

/// Collects every decodable protected address in document order.
pub fn find_cloudflare_emails(document: &Html) -> Vec<String> {
    let mut found = Vec::new();

    for element in document.select(&CFEMAIL_SELECTOR) {
        if let Some(email) = element.value().attr("data-cfemail").and_then(decode_cfemail) {
            found.push(email);
        }
    }

    for element in document.select(&PROTECTION_LINK_SELECTOR) {
        let fragment = element
            .value()
            .attr("href")
            .and_then(|href| href.split_once('#'))
            .map(|(_, hex)| hex);
        if let Some(email) = fragment.and_then(decode_cfemail) {
            found.push(email);
        }
    }

    found
}
