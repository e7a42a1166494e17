//! Shared helpers.
//!
//! This module provides:
//! - String sanitization for harvested candidates
//! - Regex and CSS selector compilation for static patterns
//! - Visible-text extraction from parsed HTML

mod pattern;
pub mod sanitize;
mod selector;
mod text;

pub use pattern::compile_regex_unsafe;
pub use selector::parse_selector_unsafe;
pub use text::{element_text, visible_text};
