//! Visible-text extraction from parsed HTML.

use scraper::{ElementRef, Html, Node};

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Returns the document's visible text, one trimmed text node per line.
///
/// Text inside `script`, `style`, `noscript` and `template` is skipped; empty
/// nodes are dropped.
pub fn visible_text(document: &Html) -> String {
    let mut lines = Vec::new();
    for node in document.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            let trimmed = text.trim();
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            if !trimmed.is_empty() && !hidden {
                lines.push(trimmed);
            }
        }
    }
    lines.join("\n")
}

/// Collapses an element's text into a single space-separated line.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
