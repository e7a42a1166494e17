//! JSON-LD structured data extraction.
//!
//! School sites commonly publish an `EducationalOrganization` (or plain
//! `Organization`) block carrying name, phone, URL, email and postal address.
//! Blocks may be a single object, an array of objects, or an object with an
//! `@graph` array.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;

use crate::utils::parse_selector_unsafe;

static JSON_LD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(r#"script[type="application/ld+json"]"#, "JSON_LD_SELECTOR")
});

/// Contact fields gathered from JSON-LD nodes, first non-empty value per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonLdContact {
    /// `name`
    pub name: Option<String>,
    /// `telephone`
    pub telephone: Option<String>,
    /// `url`
    pub url: Option<String>,
    /// Every `email` value, in node order
    pub emails: Vec<String>,
    /// `address.addressLocality`
    pub locality: Option<String>,
    /// `address.postalCode`
    pub postal_code: Option<String>,
}

/// Parses every JSON-LD block, flattening arrays and `@graph` containers into
/// a list of nodes. Unparseable blocks are skipped.
pub fn extract_json_ld(document: &Html) -> Vec<Value> {
    let mut nodes = Vec::new();
    for script in document.select(&JSON_LD_SELECTOR) {
        let raw: String = script.text().collect();
        if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
            flatten_into(value, &mut nodes);
        }
    }
    nodes
}

fn flatten_into(value: Value, nodes: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, nodes);
            }
        }
        Value::Object(mut map) => {
            let graph = map.remove("@graph");
            nodes.push(Value::Object(map));
            if let Some(graph) = graph {
                flatten_into(graph, nodes);
            }
        }
        _ => {}
    }
}

/// Text of a scalar JSON value; numbers count (postcodes are often numeric).
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn first_text(slot: &mut Option<String>, value: Option<&Value>) {
    if slot.is_none() {
        *slot = value.and_then(value_text);
    }
}

/// Collects contact fields from JSON-LD nodes.
pub fn extract_json_ld_contact(document: &Html) -> JsonLdContact {
    let mut contact = JsonLdContact::default();

    for node in extract_json_ld(document) {
        first_text(&mut contact.name, node.get("name"));
        first_text(&mut contact.telephone, node.get("telephone"));
        first_text(&mut contact.url, node.get("url"));

        match node.get("email") {
            Some(Value::Array(items)) => contact.emails.extend(items.iter().filter_map(value_text)),
            Some(value) => contact.emails.extend(value_text(value)),
            None => {}
        }

        let addresses: Vec<&Value> = match node.get("address") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(value @ Value::Object(_)) => vec![value],
            _ => Vec::new(),
        };
        for address in addresses {
            first_text(&mut contact.locality, address.get("addressLocality"));
            first_text(&mut contact.postal_code, address.get("postalCode"));
        }
    }

    contact
}
