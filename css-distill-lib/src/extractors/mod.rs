//! Domain extractors: one converter, one classifier, and one registry per token domain.
//!
//! Every extractor implements [`DomainExtractor`]. An [`ExtractorSet`] holds the enabled ones,
//! fans each page out to all of them, and finalizes them together once the crawl is done.
//! Extraction is synchronous; page tasks call into a shared set concurrently and the registries
//! serialize the updates.

mod animation;
mod border;
mod color;
mod component;
mod spacing;
mod typography;

pub use animation::AnimationExtractor;
pub use border::BorderExtractor;
pub use color::ColorExtractor;
pub use component::ComponentExtractor;
pub use spacing::SpacingExtractor;
pub use typography::TypographyExtractor;

use crate::classify::{RadiusBuckets, ShadowTiers, SpacingScale};
use crate::crawl::{Observation, PageObservations, SkippedValue};
use crate::registry::ExtractedToken;
use crate::values::{DimensionOptions, ParseError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use strum::{Display, EnumIter, EnumString};

const LOG_TARGET: &str = "extractors";

/// The token domains, one output file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Domain {
    Colors,
    Typography,
    Spacing,
    Borders,
    Animations,
    Components,
}

impl Domain {
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{self}.json")
    }
}

/// Finalized output of one domain.
#[derive(Debug, Clone, Serialize)]
pub struct DomainReport {
    #[serde(skip)]
    pub domain: Domain,
    pub tokens: Vec<ExtractedToken>,
    pub stats: BTreeMap<&'static str, usize>,
}

/// The knobs extractors need from the run configuration.
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub dimensions: DimensionOptions,
    pub group_similar_values: bool,
    pub color_similarity_threshold: f32,
    pub include_text_colors: bool,
    pub include_background_colors: bool,
    pub include_border_colors: bool,
    pub include_typography: bool,
    pub include_spacing: bool,
    pub include_borders: bool,
    pub include_animations: bool,
    pub include_components: bool,
    pub radius: RadiusBuckets,
    pub shadow: ShadowTiers,
    pub spacing: SpacingScale,
    pub components: Vec<String>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            dimensions: DimensionOptions::default(),
            group_similar_values: false,
            color_similarity_threshold: 2.0,
            include_text_colors: true,
            include_background_colors: true,
            include_border_colors: true,
            include_typography: true,
            include_spacing: true,
            include_borders: true,
            include_animations: true,
            include_components: true,
            radius: RadiusBuckets::default(),
            shadow: ShadowTiers::default(),
            spacing: SpacingScale::default(),
            components: ["button", "card", "nav", "header", "footer", "hero", "modal", "form", "input", "badge", "alert"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// The uniform contract of a token domain.
pub trait DomainExtractor: Send + Sync {
    fn domain(&self) -> Domain;

    /// The computed-style properties this extractor reads.
    fn properties(&self) -> &'static [&'static str];

    /// Feed one page's observations into the registry, returning the values that could not be parsed.
    fn extract_page(&self, page: &PageObservations) -> Vec<SkippedValue>;

    /// Produce the domain's tokens and statistics.
    fn finalize(&self, minimum_occurrences: u64) -> DomainReport;
}

/// Build an extractor for every domain the settings enable.
#[must_use]
pub fn create_all_extractors(settings: &ExtractionSettings) -> Vec<Box<dyn DomainExtractor>> {
    let mut extractors: Vec<Box<dyn DomainExtractor>> = Vec::new();

    if settings.include_text_colors || settings.include_background_colors || settings.include_border_colors {
        extractors.push(Box::new(ColorExtractor::new(settings)));
    }

    if settings.include_typography {
        extractors.push(Box::new(TypographyExtractor::new(settings)));
    }

    if settings.include_spacing {
        extractors.push(Box::new(SpacingExtractor::new(settings)));
    }

    if settings.include_borders {
        extractors.push(Box::new(BorderExtractor::new(settings)));
    }

    if settings.include_animations {
        extractors.push(Box::new(AnimationExtractor::new(settings)));
    }

    if settings.include_components {
        extractors.push(Box::new(ComponentExtractor::new(settings)));
    }

    extractors
}

/// All enabled extractors, driven as one.
pub struct ExtractorSet {
    extractors: Vec<Box<dyn DomainExtractor>>,
}

impl core::fmt::Debug for ExtractorSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExtractorSet").field("domains", &self.domains()).finish()
    }
}

impl ExtractorSet {
    #[must_use]
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            extractors: create_all_extractors(settings),
        }
    }

    #[must_use]
    pub fn domains(&self) -> Vec<Domain> {
        self.extractors.iter().map(|e| e.domain()).collect()
    }

    /// The union of every extractor's properties, sorted.
    #[must_use]
    pub fn properties(&self) -> Vec<String> {
        self.extractors
            .iter()
            .flat_map(|e| e.properties().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Run every extractor over one page.
    pub fn extract_page(&self, page: &PageObservations) -> Vec<SkippedValue> {
        let mut skipped: Vec<SkippedValue> = self.extractors.iter().flat_map(|e| e.extract_page(page)).collect();
        skipped.sort();
        skipped.dedup();

        log::debug!(
            target: LOG_TARGET,
            "Extracted '{}': {} observation(s), {} skipped",
            page.url,
            page.observations.len(),
            skipped.len()
        );

        skipped
    }

    #[must_use]
    pub fn finalize(&self, minimum_occurrences: u64) -> Vec<DomainReport> {
        self.extractors.iter().map(|e| e.finalize(minimum_occurrences)).collect()
    }
}

/// Record one unparseable value.
pub(crate) fn skip(page: &PageObservations, observation: &Observation, error: &ParseError) -> SkippedValue {
    log::warn!(target: LOG_TARGET, "Skipping {} on '{}' ({}): {error}", observation.property, observation.selector, page.url);

    SkippedValue {
        url: page.url.clone(),
        selector: observation.selector.clone(),
        property: observation.property.clone(),
        raw_value: observation.raw_value.clone(),
        reason: error.to_string(),
    }
}

/// The observations of one element on one page, keyed by property.
#[derive(Debug)]
pub(crate) struct ElementStyles<'a> {
    pub selector: &'a str,
    pub tag: &'a str,
    pub values: BTreeMap<&'a str, &'a Observation>,
}

impl ElementStyles<'_> {
    pub fn raw(&self, property: &str) -> Option<&str> {
        self.values.get(property).map(|o| o.raw_value.as_str())
    }
}

/// Group a page's observations of `properties` by element, in page order.
pub(crate) fn group_by_element<'a>(page: &'a PageObservations, properties: &[&str]) -> Vec<ElementStyles<'a>> {
    let mut elements: Vec<ElementStyles<'a>> = Vec::new();
    let mut positions: HashMap<usize, usize> = HashMap::new();

    for (observation, id) in page.observations.iter().zip(page.element_ids()) {
        if !properties.contains(&observation.property.as_str()) {
            continue;
        }

        let position = *positions.entry(id).or_insert_with(|| {
            elements.push(ElementStyles {
                selector: observation.selector.as_str(),
                tag: observation.element_tag.as_str(),
                values: BTreeMap::new(),
            });
            elements.len() - 1
        });

        let _ = elements[position].values.entry(observation.property.as_str()).or_insert(observation);
    }

    elements
}
