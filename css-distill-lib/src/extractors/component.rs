use super::{Domain, DomainExtractor, DomainReport, ExtractionSettings, group_by_element};
use crate::classify::{ComponentMatcher, SelectorParts};
use crate::crawl::{PageObservations, SkippedValue};
use crate::registry::{TokenRegistry, TokenSource};
use crate::values::{CanonicalValue, ComponentValue};
use std::collections::BTreeMap;

const LOG_TARGET: &str = "components";

/// Styles kept on a component token to show what an instance looks like.
const PROPERTIES: &[&str] = &[
    "background-color",
    "color",
    "border-radius",
    "padding",
    "font-size",
    "font-weight",
    "box-shadow",
];

/// Recurring UI components, detected from annotations, classes, and `data-component` attributes.
#[derive(Debug)]
pub struct ComponentExtractor {
    matcher: ComponentMatcher,
    registry: TokenRegistry,
}

impl ComponentExtractor {
    #[must_use]
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            matcher: ComponentMatcher::new(&settings.components),
            registry: TokenRegistry::new(),
        }
    }
}

impl DomainExtractor for ComponentExtractor {
    fn domain(&self) -> Domain {
        Domain::Components
    }

    fn properties(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn extract_page(&self, page: &PageObservations) -> Vec<SkippedValue> {
        for element in group_by_element(page, PROPERTIES) {
            let selector = element.selector;
            let parts = SelectorParts::parse(selector);
            let annotation = page.annotations.get(selector).map(String::as_str);

            let Some(detected) = self.matcher.detect(&parts, annotation) else {
                continue;
            };

            log::trace!(target: LOG_TARGET, "'{selector}' on '{}' is a {} ({})", page.url, detected.component_type, detected.variant);

            let value = ComponentValue {
                component_type: detected.component_type.clone(),
                variant: detected.variant.clone(),
                modifiers: detected.modifiers.clone(),
                properties: element
                    .values
                    .iter()
                    .map(|(property, observation)| ((*property).to_string(), observation.raw_value.clone()))
                    .collect(),
            };

            let source = TokenSource::new(selector, element.tag, "component");
            self.registry
                .observe(CanonicalValue::Component(value), detected.classification(), source, &page.url);
        }

        Vec::new()
    }

    fn finalize(&self, minimum_occurrences: u64) -> DomainReport {
        let finalized = self.registry.finalize(minimum_occurrences);

        let types = finalized.category_counts.len();
        let instances: u64 = finalized.tokens.iter().map(|token| token.usage_count).sum();

        let stats = BTreeMap::from([
            ("componentTypes", types),
            ("variants", finalized.tokens.len()),
            ("instances", usize::try_from(instances).unwrap_or(usize::MAX)),
        ]);

        DomainReport {
            domain: Domain::Components,
            tokens: finalized.tokens,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::Observation;
    use std::collections::BTreeSet;

    fn page(url: &str, observations: Vec<Observation>, annotations: &[(&str, &str)]) -> PageObservations {
        PageObservations {
            url: url.to_string(),
            title: String::new(),
            observations,
            annotations: annotations.iter().map(|(s, a)| ((*s).to_string(), (*a).to_string())).collect(),
        }
    }

    #[test]
    fn test_variants_and_instances() {
        let extractor = ComponentExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(
            "https://x.test/one",
            vec![
                Observation::new("button.btn.button--primary", "background-color", "#0066cc", "button"),
                Observation::new("button.btn.button--primary", "color", "#fff", "button"),
                Observation::new("a.button", "color", "#333", "a"),
            ],
            &[],
        ));
        let _ = extractor.extract_page(&page(
            "https://x.test/two",
            vec![Observation::new("button.button--primary", "background-color", "#0066cc", "button")],
            &[],
        ));

        let report = extractor.finalize(1);
        let names: BTreeSet<_> = report.tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            BTreeSet::from(["component-button", "component-button-btn-primary", "component-button-primary"])
        );

        assert_eq!(report.stats["componentTypes"], 1);
        assert_eq!(report.stats["variants"], 3);
        assert_eq!(report.stats["instances"], 3);
    }

    #[test]
    fn test_annotation_wins() {
        let extractor = ComponentExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(
            "u",
            vec![Observation::new("div#plans", "color", "#000", "div")],
            &[("div#plans", "Pricing Table")],
        ));

        let report = extractor.finalize(1);
        assert_eq!(report.tokens.len(), 1);
        assert_eq!(report.tokens[0].category, "pricing-table");
        assert_eq!(report.tokens[0].name, "component-pricing-table");
    }

    #[test]
    fn test_representative_styles_from_smallest_selector() {
        let extractor = ComponentExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(
            "u",
            vec![
                Observation::new("section div.card", "background-color", "#eee", "div"),
                Observation::new("main div.card", "background-color", "#fff", "div"),
            ],
            &[],
        ));

        let report = extractor.finalize(1);
        assert_eq!(report.tokens.len(), 1);

        let token = &report.tokens[0];
        assert_eq!(token.name, "component-card");
        assert_eq!(token.usage_count, 2);
        assert_eq!(token.source.selector, "main div.card");

        let CanonicalValue::Component(value) = &token.value else {
            panic!("not a component");
        };
        assert_eq!(value.properties["background-color"], "#fff");
    }

    #[test]
    fn test_unmatched_elements_ignored() {
        let extractor = ComponentExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page("u", vec![Observation::new("div.wrapper", "color", "#000", "div")], &[]));
        assert!(extractor.finalize(1).tokens.is_empty());
    }
}
