use super::{ExtractedToken, TokenSource};
use crate::classify::Classification;
use crate::values::CanonicalValue;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Mutex;

const LOG_TARGET: &str = "  registry";

/// A registry entry before thresholding and name deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDraft {
    pub key: String,
    pub value: CanonicalValue,
    pub classification: Classification,
    pub usage_count: u64,
    pub source: TokenSource,
    pub source_urls: BTreeSet<String>,

    /// Replaces the generated description when set.
    pub description: Option<String>,
}

impl TokenDraft {
    /// The name and category stay those of the first observation.
    fn merge_observation(&mut self, value: CanonicalValue, source: TokenSource, page_url: &str) {
        self.usage_count += 1;
        let _ = self.source_urls.insert(page_url.to_string());

        // the smallest source, and the value seen there, are reported regardless of arrival order
        if source < self.source {
            self.source = source;
            self.value = value;
        }
    }

    fn describe(&self) -> String {
        let pages = self.source_urls.len();
        format!(
            "{} seen {} {} on {} {}",
            self.value.identity_key(),
            self.usage_count,
            if self.usage_count == 1 { "time" } else { "times" },
            pages,
            if pages == 1 { "page" } else { "pages" }
        )
    }
}

/// The result of finalizing one registry.
#[derive(Debug, Clone, Default)]
pub struct FinalizedTokens {
    pub tokens: Vec<ExtractedToken>,

    /// Number of distinct entries before the occurrence threshold was applied.
    pub total_entries: usize,

    /// Output tokens per category.
    pub category_counts: BTreeMap<String, usize>,
}

impl FinalizedTokens {
    #[must_use]
    pub fn count(&self, category: &str) -> usize {
        self.category_counts.get(category).copied().unwrap_or_default()
    }
}

/// Merges observations of the same canonical value across elements and pages.
///
/// Entries are keyed by the value's identity key plus its category. Every operation takes the
/// registry's lock, so concurrent page tasks can observe into one shared registry.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    entries: Mutex<BTreeMap<String, TokenDraft>>,
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_key(value: &CanonicalValue, classification: &Classification) -> String {
        format!("{}::{}", classification.category, value.identity_key())
    }

    /// Record one element observation.
    pub fn observe(&self, value: CanonicalValue, classification: Classification, source: TokenSource, page_url: &str) {
        self.observe_grouped(value, classification, source, page_url, |_, _| false);
    }

    /// Record one element observation, merging it into an existing entry of the same category
    /// for which `similar` holds when its exact key is not yet present.
    pub fn observe_grouped(
        &self,
        value: CanonicalValue,
        classification: Classification,
        source: TokenSource,
        page_url: &str,
        similar: impl Fn(&CanonicalValue, &CanonicalValue) -> bool,
    ) {
        let key = Self::entry_key(&value, &classification);
        let mut entries = self.entries.lock().expect("lock not poisoned");

        if let Some(entry) = entries.get_mut(&key) {
            entry.merge_observation(value, source, page_url);
            return;
        }

        if let Some(entry) = entries
            .values_mut()
            .find(|entry| entry.classification.category == classification.category && similar(&entry.value, &value))
        {
            log::debug!(target: LOG_TARGET, "Grouping '{}' with similar value '{}'", value.identity_key(), entry.value.identity_key());
            entry.usage_count += 1;
            let _ = entry.source_urls.insert(page_url.to_string());
            if source < entry.source {
                entry.source = source;
            }
            return;
        }

        log::trace!(target: LOG_TARGET, "New entry '{key}' named '{}'", classification.name);
        let _ = entries.insert(
            key.clone(),
            TokenDraft {
                key,
                value,
                classification,
                usage_count: 1,
                source,
                source_urls: BTreeSet::from([page_url.to_string()]),
                description: None,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock not poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of every entry in key order.
    #[must_use]
    pub fn drafts(&self) -> Vec<TokenDraft> {
        self.entries.lock().expect("lock not poisoned").values().cloned().collect()
    }

    /// Apply the occurrence threshold, sort, and assign unique names.
    #[must_use]
    pub fn finalize(&self, minimum_occurrences: u64) -> FinalizedTokens {
        finalize_drafts(self.drafts(), minimum_occurrences)
    }
}

/// Turn drafts into output tokens.
///
/// Drafts used fewer than `minimum_occurrences` times are dropped. The rest are ordered by usage
/// (descending), then name, then key, and a repeated name gets `-2`, `-3`, ... in that order.
#[must_use]
pub fn finalize_drafts(drafts: Vec<TokenDraft>, minimum_occurrences: u64) -> FinalizedTokens {
    let total_entries = drafts.len();

    let mut kept: Vec<TokenDraft> = drafts.into_iter().filter(|draft| draft.usage_count >= minimum_occurrences).collect();
    kept.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.classification.name.cmp(&b.classification.name))
            .then_with(|| a.key.cmp(&b.key))
    });

    let mut used_names = HashSet::with_capacity(kept.len());
    let mut category_counts = BTreeMap::new();

    let tokens = kept
        .into_iter()
        .map(|draft| {
            let base = draft.classification.name.clone();
            let mut name = base.clone();
            let mut suffix = 2;
            while used_names.contains(&name) {
                name = format!("{base}-{suffix}");
                suffix += 1;
            }
            let _ = used_names.insert(name.clone());

            *category_counts.entry(draft.classification.category.clone()).or_insert(0) += 1;

            let description = draft.description.clone().unwrap_or_else(|| draft.describe());
            ExtractedToken {
                token_type: draft.value.token_type(),
                name,
                value: draft.value,
                category: draft.classification.category,
                description,
                usage_count: draft.usage_count,
                source: draft.source,
                source_urls: draft.source_urls,
            }
        })
        .collect();

    FinalizedTokens {
        tokens,
        total_entries,
        category_counts,
    }
}
