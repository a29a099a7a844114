//! Bibliographic record types returned by the document lookup service

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Bibcodes are 19 characters: year, journal, volume, page, author initial.
static BIBCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}[A-Za-z0-9.&]{15}$").unwrap());

/// Check a document identifier has the bibcode shape before storing it
pub fn is_valid_bibcode(identifier: &str) -> bool {
    BIBCODE_RE.is_match(identifier)
}

/// Metadata for one bibliographic record, as returned by the lookup service.
///
/// An identifier the index does not know still yields a record carrying the
/// bibcode alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DocumentRecord {
    pub bibcode: String,
    pub title: Option<String>,
    pub first_author: Option<String>,
    pub year: Option<i32>,
}

impl DocumentRecord {
    /// Placeholder record for an identifier the index did not resolve
    pub fn unresolved(bibcode: &str) -> Self {
        Self {
            bibcode: bibcode.to_string(),
            title: None,
            first_author: None,
            year: None,
        }
    }
}
