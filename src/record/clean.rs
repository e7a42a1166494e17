//! Row standardization and deduplication.

use std::collections::HashMap;

use super::normalize::{clean_field, norm_key, normalize_phone, title_case};
use super::SchoolRecord;
use crate::extract::validate_email;

/// Enforces the canonical row shape.
///
/// Text fields are trimmed with empties collapsed, suburbs title-cased, phone
/// whitespace collapsed, and `public_email` re-checked against the strict
/// grammar (lowercased; non-conformant addresses dropped). Applying it twice
/// changes nothing.
pub fn standardize(rows: Vec<SchoolRecord>) -> Vec<SchoolRecord> {
    rows.into_iter().map(standardize_row).collect()
}

fn standardize_row(mut row: SchoolRecord) -> SchoolRecord {
    row.clean_text_fields();
    row.suburb = row.suburb.as_deref().map(title_case);
    row.phone = row.phone.as_deref().map(normalize_phone);
    row.public_email = row.public_email.as_deref().and_then(validate_email);
    clean_field(&mut row.phone);
    row
}

/// Collapses rows sharing a `(school_name, suburb)` key.
///
/// The survivor is the first row of the group carrying an email, else the
/// group's first row. Groups keep the order of their first appearance.
pub fn deduplicate(rows: Vec<SchoolRecord>) -> Vec<SchoolRecord> {
    let mut survivors: Vec<SchoolRecord> = Vec::with_capacity(rows.len());
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for row in rows {
        let key = (
            norm_key(row.school_name.as_deref()),
            norm_key(row.suburb.as_deref()),
        );
        match positions.get(&key) {
            Some(&idx) => {
                if !survivors[idx].has_email() && row.has_email() {
                    survivors[idx] = row;
                }
            }
            None => {
                positions.insert(key, survivors.len());
                survivors.push(row);
            }
        }
    }

    survivors
}
