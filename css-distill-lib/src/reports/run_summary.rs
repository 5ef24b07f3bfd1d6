use crate::crawl::{CollectionOutcome, ProblemPage, SkippedValue};
use crate::extractors::DomainReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Skipped values listed individually in the summary; the count always covers all of them.
const MAX_LISTED_SKIPPED_VALUES: usize = 200;

/// What one run did, written as `summary.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub url: String,
    pub cache_key: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pages_processed: usize,
    pub problem_pages: Vec<ProblemPage>,
    pub skipped_values: Vec<SkippedValue>,
    pub skipped_value_count: usize,

    /// Token count per domain name.
    pub domains: BTreeMap<String, usize>,
}

impl RunSummary {
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        cache_key: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        outcome: CollectionOutcome,
        reports: &[DomainReport],
    ) -> Self {
        let skipped_value_count = outcome.skipped_values.len();
        let mut skipped_values = outcome.skipped_values;
        skipped_values.truncate(MAX_LISTED_SKIPPED_VALUES);

        Self {
            url: url.into(),
            cache_key: cache_key.into(),
            started_at,
            finished_at,
            pages_processed: outcome.pages_processed,
            problem_pages: outcome.problem_pages,
            skipped_values,
            skipped_value_count,
            domains: reports.iter().map(|report| (report.domain.to_string(), report.tokens.len())).collect(),
        }
    }

    #[must_use]
    pub fn total_tokens(&self) -> usize {
        self.domains.values().sum()
    }
}
