use super::{Domain, DomainExtractor, DomainReport, ExtractionSettings, skip};
use crate::classify::{Classification, RadiusBuckets, ShadowTiers, classify_border_style, classify_border_width, classify_radius, classify_shadow};
use crate::crawl::{Observation, PageObservations, SkippedValue};
use crate::registry::{TokenRegistry, TokenSource};
use crate::values::{
    CanonicalValue, DimensionOptions, ParseError, parse_border_style, parse_dimensions, parse_shadows, split_top_level,
    split_whitespace_top_level,
};
use std::collections::{BTreeMap, HashSet};

const RADIUS_PROPERTIES: &[&str] = &[
    "border-radius",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
];

const WIDTH_PROPERTIES: &[&str] = &[
    "border-width",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
];

const STYLE_PROPERTIES: &[&str] = &[
    "border-style",
    "border-top-style",
    "border-right-style",
    "border-bottom-style",
    "border-left-style",
];

const PROPERTIES: &[&str] = &[
    "border-radius",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
    "border-width",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "border-style",
    "border-top-style",
    "border-right-style",
    "border-bottom-style",
    "border-left-style",
    "box-shadow",
];

/// Radii, widths, styles, and box shadows.
#[derive(Debug)]
pub struct BorderExtractor {
    options: DimensionOptions,
    radius: RadiusBuckets,
    shadow: ShadowTiers,
    registry: TokenRegistry,
}

impl BorderExtractor {
    #[must_use]
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            options: settings.dimensions,
            radius: settings.radius.clone(),
            shadow: settings.shadow.clone(),
            registry: TokenRegistry::new(),
        }
    }

    /// Convert and classify one observation into zero or more `(value, classification)` pairs.
    fn convert(&self, observation: &Observation) -> Result<Vec<(CanonicalValue, Classification)>, ParseError> {
        let property = observation.property.as_str();
        let raw = observation.raw_value.as_str();

        if RADIUS_PROPERTIES.contains(&property) {
            // elliptical radii (`a / b`): the horizontal radii name the token
            let horizontal = split_top_level(raw, '/').into_iter().next().unwrap_or_default();
            return Ok(parse_dimensions(horizontal, self.options)?
                .into_iter()
                .map(|radius| {
                    let classification = classify_radius(&radius, &self.radius);
                    (CanonicalValue::Dimension(radius), classification)
                })
                .collect());
        }

        if WIDTH_PROPERTIES.contains(&property) {
            return Ok(parse_dimensions(raw, self.options)?
                .into_iter()
                .filter(|width| !width.is_zero())
                .map(|width| {
                    let classification = classify_border_width(&width);
                    (CanonicalValue::Dimension(width), classification)
                })
                .collect());
        }

        if STYLE_PROPERTIES.contains(&property) {
            return split_whitespace_top_level(raw)
                .into_iter()
                .map(parse_border_style)
                .filter(|style| !matches!(style, Ok(s) if !s.is_visible()))
                .map(|style| style.map(|s| (CanonicalValue::StrokeStyle(s), classify_border_style(s))))
                .collect();
        }

        Ok(parse_shadows(raw, self.options)?
            .into_iter()
            .filter(|shadow| !shadow.is_invisible())
            .map(|shadow| {
                let classification = classify_shadow(&shadow, &self.shadow, self.options.root_font_size);
                (CanonicalValue::Shadow(shadow), classification)
            })
            .collect())
    }
}

impl DomainExtractor for BorderExtractor {
    fn domain(&self) -> Domain {
        Domain::Borders
    }

    fn properties(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn extract_page(&self, page: &PageObservations) -> Vec<SkippedValue> {
        let mut skipped = Vec::new();

        // corners and sides repeat the same value; an element counts once per value
        let mut seen = HashSet::new();

        for (observation, element) in page
            .observations
            .iter()
            .zip(page.element_ids())
            .filter(|(o, _)| PROPERTIES.contains(&o.property.as_str()))
        {
            let values = match self.convert(observation) {
                Ok(values) => values,
                Err(e) => {
                    skipped.push(skip(page, observation, &e));
                    continue;
                }
            };

            for (value, classification) in values {
                if !seen.insert((element, classification.category.clone(), value.identity_key())) {
                    continue;
                }

                let source = TokenSource::new(&observation.selector, &observation.element_tag, &observation.property);
                self.registry.observe(value, classification, source, &page.url);
            }
        }

        skipped
    }

    fn finalize(&self, minimum_occurrences: u64) -> DomainReport {
        let finalized = self.registry.finalize(minimum_occurrences);

        let stats = BTreeMap::from([
            ("radiusValues", finalized.count("radius")),
            ("widthValues", finalized.count("width")),
            ("styleValues", finalized.count("style")),
            ("shadowValues", finalized.count("shadow") + finalized.count("inner-shadow")),
        ]);

        DomainReport {
            domain: Domain::Borders,
            tokens: finalized.tokens,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(observations: Vec<Observation>) -> PageObservations {
        PageObservations {
            url: "https://x.test/".to_string(),
            title: String::new(),
            observations,
            annotations: BTreeMap::new(),
        }
    }

    fn names(report: &DomainReport) -> Vec<String> {
        let mut names: Vec<_> = report.tokens.iter().map(|t| t.name.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_border_radius_scenario() {
        let extractor = BorderExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(vec![
            Observation::new(".pill", "border-radius", "9999px", "span"),
            Observation::new(".card", "border-radius", "8px", "div"),
            Observation::new(".modal", "border-radius", "12px", "div"),
        ]));

        let report = extractor.finalize(1);
        assert_eq!(names(&report), vec!["border-radius-full", "border-radius-lg", "border-radius-md"]);
        assert_eq!(report.stats["radiusValues"], 3);
    }

    #[test]
    fn test_corners_counted_once() {
        let extractor = BorderExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(vec![
            Observation::new(".card", "border-radius", "8px 8px 8px 8px", "div"),
            Observation::new(".card", "border-top-left-radius", "8px", "div"),
        ]));

        let report = extractor.finalize(1);
        assert_eq!(report.tokens.len(), 1);
        assert_eq!(report.tokens[0].usage_count, 1);
    }

    #[test]
    fn test_invisible_borders_ignored() {
        let extractor = BorderExtractor::new(&ExtractionSettings::default());
        let skipped = extractor.extract_page(&page(vec![
            Observation::new("div", "border-top-width", "0px", "div"),
            Observation::new("div", "border-top-style", "none", "div"),
            Observation::new("div", "box-shadow", "none", "div"),
            Observation::new("p", "border-top-style", "dashed", "p"),
            Observation::new("p", "border-top-width", "1.5px", "p"),
        ]));

        assert!(skipped.is_empty());
        let report = extractor.finalize(1);
        assert_eq!(names(&report), vec!["border-style-dashed", "border-width-1-5"]);
        assert_eq!(report.stats["styleValues"], 1);
        assert_eq!(report.stats["widthValues"], 1);
    }

    #[test]
    fn test_shadow_layers() {
        let extractor = BorderExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(vec![Observation::new(
            ".card",
            "box-shadow",
            "0 1px 2px rgba(0, 0, 0, 0.2), inset 0 0 20px #000",
            "div",
        )]));

        let report = extractor.finalize(1);
        assert_eq!(report.stats["shadowValues"], 2);
        assert!(report.tokens.iter().any(|t| t.category == "inner-shadow" && t.name == "shadow-lg"));
        assert!(report.tokens.iter().any(|t| t.category == "shadow" && t.name == "shadow-sm"));
    }

    #[test]
    fn test_bad_style_skipped() {
        let extractor = BorderExtractor::new(&ExtractionSettings::default());
        let skipped = extractor.extract_page(&page(vec![Observation::new("div", "border-top-style", "wavy", "div")]));
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn test_elliptical_radius_uses_horizontal() {
        let extractor = BorderExtractor::new(&ExtractionSettings::default());
        let skipped = extractor.extract_page(&page(vec![Observation::new("div", "border-radius", "8px / 4px", "div")]));

        assert!(skipped.is_empty());
        assert_eq!(names(&extractor.finalize(1)), vec!["border-radius-md"]);
    }

    #[test]
    fn test_elements_sharing_a_selector_each_count() {
        let extractor = BorderExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(vec![
            Observation::new("button.btn", "border-radius", "8px", "button"),
            Observation::new("button.btn", "border-top-left-radius", "8px", "button"),
            Observation::new("button.btn", "border-radius", "8px", "button"),
            Observation::new("button.btn", "border-top-left-radius", "8px", "button"),
        ]));

        let report = extractor.finalize(1);
        assert_eq!(report.tokens.len(), 1);
        assert_eq!(report.tokens[0].usage_count, 2);
    }
}
