use super::PageFetchError;
use serde::{Deserialize, Serialize};

/// A page that could not be processed, reported in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemPage {
    pub url: String,
    pub error_kind: String,
    pub message: String,
    pub attempts: u32,
}

impl ProblemPage {
    #[must_use]
    pub fn from_error(url: &str, error: &PageFetchError, attempts: u32) -> Self {
        Self {
            url: url.to_string(),
            error_kind: error.kind().to_string(),
            message: error.to_string(),
            attempts,
        }
    }
}

/// A raw value one of the extractors could not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedValue {
    pub url: String,
    pub selector: String,
    pub property: String,
    pub raw_value: String,
    pub reason: String,
}
