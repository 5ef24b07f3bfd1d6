use super::{Domain, DomainExtractor, DomainReport, ExtractionSettings, skip};
use crate::classify::{ColorRole, classify_color};
use crate::crawl::{PageObservations, SkippedValue};
use crate::registry::{TokenRegistry, TokenSource};
use crate::values::{CanonicalValue, parse_color};
use std::collections::{BTreeMap, BTreeSet, HashSet};

const PROPERTIES: &[&str] = &[
    "color",
    "background-color",
    "border-color",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "outline-color",
];

/// Text, background, and border colors.
#[derive(Debug)]
pub struct ColorExtractor {
    roles: BTreeSet<ColorRole>,
    similarity_threshold: Option<f32>,
    registry: TokenRegistry,
}

impl ColorExtractor {
    #[must_use]
    pub fn new(settings: &ExtractionSettings) -> Self {
        let mut roles = BTreeSet::new();
        if settings.include_text_colors {
            let _ = roles.insert(ColorRole::Text);
        }
        if settings.include_background_colors {
            let _ = roles.insert(ColorRole::Background);
        }
        if settings.include_border_colors {
            let _ = roles.insert(ColorRole::Border);
        }

        Self {
            roles,
            similarity_threshold: settings.group_similar_values.then_some(settings.color_similarity_threshold),
            registry: TokenRegistry::new(),
        }
    }
}

impl DomainExtractor for ColorExtractor {
    fn domain(&self) -> Domain {
        Domain::Colors
    }

    fn properties(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn extract_page(&self, page: &PageObservations) -> Vec<SkippedValue> {
        let mut skipped = Vec::new();

        // the four border sides of one element usually share a color; count it once
        let mut seen = HashSet::new();

        for (observation, element) in page.observations.iter().zip(page.element_ids()) {
            let Some(role) = ColorRole::from_property(&observation.property) else {
                continue;
            };

            if !self.roles.contains(&role) || !PROPERTIES.contains(&observation.property.as_str()) {
                continue;
            }

            let color = match parse_color(&observation.raw_value) {
                Ok(color) => color,
                Err(e) => {
                    skipped.push(skip(page, observation, &e));
                    continue;
                }
            };

            if color.is_transparent() {
                continue;
            }

            if !seen.insert((element, role, color.identity_key())) {
                continue;
            }

            let classification = classify_color(&color, role);
            let source = TokenSource::new(&observation.selector, &observation.element_tag, &observation.property);
            let value = CanonicalValue::Color(color);

            match self.similarity_threshold {
                Some(threshold) => self.registry.observe_grouped(value, classification, source, &page.url, |a, b| match (a, b) {
                    (CanonicalValue::Color(a), CanonicalValue::Color(b)) => a.alpha == b.alpha && a.distance(b) <= threshold,
                    _ => false,
                }),
                None => self.registry.observe(value, classification, source, &page.url),
            }
        }

        skipped
    }

    fn finalize(&self, minimum_occurrences: u64) -> DomainReport {
        let finalized = self.registry.finalize(minimum_occurrences);

        let unique = finalized
            .tokens
            .iter()
            .map(|token| token.value.identity_key())
            .collect::<BTreeSet<_>>()
            .len();

        let stats = BTreeMap::from([
            ("totalColors", finalized.total_entries),
            ("uniqueColors", unique),
            ("textColors", finalized.count("text")),
            ("backgroundColors", finalized.count("background")),
            ("borderColors", finalized.count("border")),
        ]);

        DomainReport {
            domain: Domain::Colors,
            tokens: finalized.tokens,
            stats,
        }
    }
}
