use super::{Domain, DomainExtractor, DomainReport, ElementStyles, ExtractionSettings, group_by_element, skip};
use crate::classify::{TypographyCategory, classify_typography};
use crate::crawl::{PageObservations, SkippedValue};
use crate::registry::{TokenRegistry, TokenSource};
use crate::values::{
    CanonicalValue, DimensionOptions, LineHeight, ParseError, TypographyValue, parse_dimension, parse_font_family, parse_font_weight,
    parse_line_height,
};
use std::collections::{BTreeMap, BTreeSet};

const LOG_TARGET: &str = "typography";

const PROPERTIES: &[&str] = &["font-family", "font-size", "font-weight", "line-height"];

/// Composite text styles, one per element.
#[derive(Debug)]
pub struct TypographyExtractor {
    options: DimensionOptions,
    registry: TokenRegistry,
}

impl TypographyExtractor {
    #[must_use]
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            options: settings.dimensions,
            registry: TokenRegistry::new(),
        }
    }

    /// Build the element's style. `Ok(None)` when it lacks a family or a size.
    fn typography(&self, element: &ElementStyles<'_>) -> Result<Option<TypographyValue>, (&'static str, ParseError)> {
        let (Some(family), Some(size)) = (element.raw("font-family"), element.raw("font-size")) else {
            return Ok(None);
        };

        let font_family = parse_font_family(family).map_err(|e| ("font-family", e))?;
        let font_size = parse_dimension(size, self.options).map_err(|e| ("font-size", e))?;

        let font_weight = match element.raw("font-weight") {
            Some(raw) => parse_font_weight(raw).map_err(|e| ("font-weight", e))?,
            None => 400,
        };

        let line_height = match element.raw("line-height") {
            Some(raw) => parse_line_height(raw, self.options, &font_size).map_err(|e| ("line-height", e))?,
            None => LineHeight::NORMAL,
        };

        Ok(Some(TypographyValue {
            font_family,
            font_size,
            font_weight,
            line_height,
        }))
    }
}

impl DomainExtractor for TypographyExtractor {
    fn domain(&self) -> Domain {
        Domain::Typography
    }

    fn properties(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn extract_page(&self, page: &PageObservations) -> Vec<SkippedValue> {
        let mut skipped = Vec::new();

        for element in group_by_element(page, PROPERTIES) {
            match self.typography(&element) {
                Ok(Some(value)) => {
                    let classification = classify_typography(element.tag);
                    let source = TokenSource::new(element.selector, element.tag, "font");
                    self.registry.observe(CanonicalValue::Typography(value), classification, source, &page.url);
                }
                Ok(None) => {
                    log::trace!(target: LOG_TARGET, "'{}' on '{}' has no complete text style", element.selector, page.url);
                }
                Err((property, e)) => {
                    if let Some(observation) = element.values.get(property) {
                        skipped.push(skip(page, observation, &e));
                    }
                }
            }
        }

        skipped
    }

    fn finalize(&self, minimum_occurrences: u64) -> DomainReport {
        let finalized = self.registry.finalize(minimum_occurrences);

        let families = finalized
            .tokens
            .iter()
            .filter_map(|token| match &token.value {
                CanonicalValue::Typography(value) => Some(value.font_family.as_str()),
                _ => None,
            })
            .collect::<BTreeSet<_>>()
            .len();

        let stats = BTreeMap::from([
            ("totalStyles", finalized.total_entries),
            ("uniqueFontFamilies", families),
            ("headingStyles", finalized.count(&TypographyCategory::Heading.to_string())),
            ("bodyStyles", finalized.count(&TypographyCategory::Body.to_string())),
            ("textStyles", finalized.count(&TypographyCategory::Text.to_string())),
        ]);

        DomainReport {
            domain: Domain::Typography,
            tokens: finalized.tokens,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::Observation;

    fn element(selector: &str, tag: &str, family: &str, size: &str, weight: &str, line_height: &str) -> Vec<Observation> {
        vec![
            Observation::new(selector, "font-family", family, tag),
            Observation::new(selector, "font-size", size, tag),
            Observation::new(selector, "font-weight", weight, tag),
            Observation::new(selector, "line-height", line_height, tag),
        ]
    }

    fn page(url: &str, observations: Vec<Observation>) -> PageObservations {
        PageObservations {
            url: url.to_string(),
            title: String::new(),
            observations,
            annotations: BTreeMap::new(),
        }
    }

    #[test]
    fn test_equivalent_styles_merge() {
        let extractor = TypographyExtractor::new(&ExtractionSettings::default());

        let mut observations = element("p.intro", "p", "\"Inter\", sans-serif", "1rem", "normal", "24px");
        observations.extend(element("p.body", "p", "Inter, sans-serif", "16px", "400", "1.5"));
        let _ = extractor.extract_page(&page("u", observations));

        let report = extractor.finalize(1);
        assert_eq!(report.tokens.len(), 1);
        assert_eq!(report.tokens[0].name, "body-text");
        assert_eq!(report.tokens[0].usage_count, 2);
        assert_eq!(report.tokens[0].value.identity_key(), "inter, sans-serif|16px|400|1.5");
        assert_eq!(report.stats["uniqueFontFamilies"], 1);
        assert_eq!(report.stats["bodyStyles"], 1);
    }

    #[test]
    fn test_heading_categories() {
        let extractor = TypographyExtractor::new(&ExtractionSettings::default());

        let mut observations = element("h1", "h1", "Georgia", "32px", "bold", "normal");
        observations.extend(element("code", "code", "monospace", "14px", "400", "normal"));
        let _ = extractor.extract_page(&page("u", observations));

        let report = extractor.finalize(1);
        assert_eq!(report.stats["headingStyles"], 1);
        assert_eq!(report.stats["textStyles"], 1);
        assert_eq!(report.stats["totalStyles"], 2);
    }

    #[test]
    fn test_same_style_keeps_first_name() {
        let run = |first: &str, second: &str| {
            let extractor = TypographyExtractor::new(&ExtractionSettings::default());
            let _ = extractor.extract_page(&page("u", element(first, first, "Arial", "24px", "700", "normal")));
            let _ = extractor.extract_page(&page("u", element(second, second, "Arial", "24px", "700", "normal")));
            extractor.finalize(1).tokens[0].name.clone()
        };

        assert_eq!(run("h2", "h3"), "heading-h2");
        assert_eq!(run("h3", "h2"), "heading-h3");
    }

    #[test]
    fn test_incomplete_style_ignored() {
        let extractor = TypographyExtractor::new(&ExtractionSettings::default());
        let skipped = extractor.extract_page(&page("u", vec![Observation::new("p", "font-size", "16px", "p")]));

        assert!(skipped.is_empty());
        assert!(extractor.finalize(1).tokens.is_empty());
    }

    #[test]
    fn test_bad_weight_skips_element() {
        let extractor = TypographyExtractor::new(&ExtractionSettings::default());
        let skipped = extractor.extract_page(&page("u", element("p", "p", "Arial", "16px", "heavy", "normal")));

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].property, "font-weight");
        assert!(extractor.finalize(1).tokens.is_empty());
    }

    #[test]
    fn test_elements_sharing_a_selector_kept_apart() {
        let extractor = TypographyExtractor::new(&ExtractionSettings::default());

        let mut observations = element("p", "p", "Arial", "16px", "400", "normal");
        observations.extend(element("p", "p", "Arial", "14px", "400", "normal"));
        observations.extend(element("p", "p", "Arial", "16px", "400", "normal"));
        let _ = extractor.extract_page(&page("u", observations));

        let report = extractor.finalize(1);
        let mut counts: Vec<u64> = report.tokens.iter().map(|t| t.usage_count).collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 2]);
        assert_eq!(report.stats["totalStyles"], 2);
    }
}
