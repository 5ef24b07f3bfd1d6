use crate::values::{CanonicalValue, TokenType};
use serde::Serialize;
use std::collections::BTreeSet;

/// Where a token was seen. The smallest source across all observations is reported.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TokenSource {
    pub selector: String,
    pub element: String,
    pub property: String,
}

impl TokenSource {
    #[must_use]
    pub fn new(selector: impl Into<String>, element: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            element: element.into(),
            property: property.into(),
        }
    }
}

/// A finalized, named, deduplicated design value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedToken {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub name: String,
    pub value: CanonicalValue,
    pub category: String,
    pub description: String,
    pub usage_count: u64,
    pub source: TokenSource,
    pub source_urls: BTreeSet<String>,
}
