//! The structured record harvested from one detail page
//!
//! Field order here is load-bearing: the CSV header row is derived from the
//! struct's declaration order via serde.

use serde::{Deserialize, Serialize};

/// One business listing, fully stringly-typed
///
/// A field whose element is absent on the page is the empty string, never
/// `None` - a partially populated record is preferred over dropping the
/// listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub rating: String,
    pub reviews: String,
    pub category: String,
    pub address: String,
    pub website: String,
    pub phone: String,
    pub url: String,
}

impl Record {
    /// Column names in serialization order, used to emit a header when there
    /// is no record to derive one from
    pub const FIELD_NAMES: [&'static str; 8] = [
        "name", "rating", "reviews", "category", "address", "website", "phone", "url",
    ];
}

/// Strips the parentheses Google Maps wraps around review counts,
/// e.g. `"(128)"` becomes `"128"`
pub fn strip_review_parens(raw: &str) -> String {
    raw.chars().filter(|c| *c != '(' && *c != ')').collect()
}
