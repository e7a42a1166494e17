//! Contact extraction and email validation.
//!
//! This module provides:
//! - Raw email candidate harvesting (mailto, spelled-out, plain text, Cloudflare)
//! - Email classification with disposition and reason codes
//! - General-mailbox selection
//! - Contact-form discovery
//! - JSON-LD parsing and core field extraction
//!
//! Everything here is synchronous and pure: malformed input produces absent
//! results, never errors.

mod candidates;
mod classify;
mod cloudflare;
mod contact_form;
mod fields;
mod select;
mod structured;

pub use candidates::{collect_candidates, find_email_candidates, parse_mailto, CandidateSet};
pub use classify::{
    classify_email, normalize_email, validate_email, Disposition, EmailClassification,
    EmailReason, EmailSource,
};
pub use cloudflare::decode_cfemail;
pub use contact_form::find_contact_form;
pub(crate) use contact_form::resolve_url;
pub use fields::{extract_core_fields, CoreFields};
pub use select::{choose_general_email, choose_tiered_email};
pub use structured::{extract_json_ld, extract_json_ld_contact, JsonLdContact};
