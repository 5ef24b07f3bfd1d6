use super::{Domain, DomainExtractor, DomainReport, ElementStyles, ExtractionSettings, group_by_element, skip};
use crate::classify::{classify_delay, classify_duration, classify_easing};
use crate::crawl::{PageObservations, SkippedValue};
use crate::registry::{TokenRegistry, TokenSource};
use crate::values::{CanonicalValue, DurationValue, ParseError, TimingFunctionValue, parse_durations, parse_timing_functions, parse_transition};
use std::collections::{BTreeMap, HashSet};

const PROPERTIES: &[&str] = &[
    "transition",
    "transition-duration",
    "transition-delay",
    "transition-timing-function",
    "animation",
    "animation-duration",
    "animation-delay",
    "animation-timing-function",
];

/// The shorthand and longhand properties of one timing family.
struct Family {
    shorthand: &'static str,
    duration: &'static str,
    delay: &'static str,
    timing_function: &'static str,
}

const FAMILIES: [Family; 2] = [
    Family {
        shorthand: "transition",
        duration: "transition-duration",
        delay: "transition-delay",
        timing_function: "transition-timing-function",
    },
    Family {
        shorthand: "animation",
        duration: "animation-duration",
        delay: "animation-delay",
        timing_function: "animation-timing-function",
    },
];

/// What one element declares for one family, with the property each part came from.
#[derive(Default)]
struct Timings {
    durations: Vec<(DurationValue, &'static str)>,
    delays: Vec<(DurationValue, &'static str)>,
    functions: Vec<(TimingFunctionValue, &'static str)>,
}

type Failure = (&'static str, ParseError);

/// Durations, delays, and easing curves of transitions and animations.
#[derive(Debug)]
pub struct AnimationExtractor {
    registry: TokenRegistry,
}

impl AnimationExtractor {
    #[must_use]
    pub fn new(_settings: &ExtractionSettings) -> Self {
        Self {
            registry: TokenRegistry::new(),
        }
    }

    fn timings(element: &ElementStyles<'_>, family: &Family) -> Result<Timings, Failure> {
        let mut timings = Timings::default();

        if let Some(raw) = element.raw(family.duration) {
            let tag = |values: Vec<DurationValue>, property| values.into_iter().map(|v| (v, property)).collect::<Vec<_>>();

            timings.durations = tag(parse_durations(raw).map_err(|e| (family.duration, e))?, family.duration);

            if let Some(raw) = element.raw(family.delay) {
                timings.delays = tag(parse_durations(raw).map_err(|e| (family.delay, e))?, family.delay);
            }

            if let Some(raw) = element.raw(family.timing_function) {
                timings.functions = parse_timing_functions(raw)
                    .map_err(|e| (family.timing_function, e))?
                    .into_iter()
                    .map(|f| (f, family.timing_function))
                    .collect();
            }
        } else if let Some(raw) = element.raw(family.shorthand) {
            for layer in parse_transition(raw).map_err(|e| (family.shorthand, e))? {
                timings.durations.push((layer.duration, family.shorthand));
                timings.delays.push((layer.delay, family.shorthand));
                if let Some(function) = layer.timing_function {
                    timings.functions.push((function, family.shorthand));
                }
            }
        }

        Ok(timings)
    }
}

impl DomainExtractor for AnimationExtractor {
    fn domain(&self) -> Domain {
        Domain::Animations
    }

    fn properties(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn extract_page(&self, page: &PageObservations) -> Vec<SkippedValue> {
        let mut skipped = Vec::new();

        for element in group_by_element(page, PROPERTIES) {
            let mut seen = HashSet::new();

            for family in &FAMILIES {
                let timings = match Self::timings(&element, family) {
                    Ok(timings) => timings,
                    Err((property, e)) => {
                        if let Some(observation) = element.values.get(property) {
                            skipped.push(skip(page, observation, &e));
                        }
                        continue;
                    }
                };

                // every element reports the default `0s ease`; only a real duration makes the rest meaningful
                if timings.durations.iter().all(|(d, _)| d.is_zero()) {
                    continue;
                }

                let durations = timings
                    .durations
                    .into_iter()
                    .filter(|(d, _)| !d.is_zero())
                    .map(|(d, property)| (classify_duration(&d), CanonicalValue::Duration(d), property));
                let delays = timings
                    .delays
                    .into_iter()
                    .filter(|(d, _)| !d.is_zero())
                    .map(|(d, property)| (classify_delay(&d), CanonicalValue::Duration(d), property));
                let functions = timings
                    .functions
                    .into_iter()
                    .map(|(f, property)| (classify_easing(&f), CanonicalValue::TimingFunction(f), property));

                for (classification, value, property) in durations.chain(delays).chain(functions) {
                    if !seen.insert((classification.category.clone(), value.identity_key())) {
                        continue;
                    }

                    let source = TokenSource::new(element.selector, element.tag, property);
                    self.registry.observe(value, classification, source, &page.url);
                }
            }
        }

        skipped
    }

    fn finalize(&self, minimum_occurrences: u64) -> DomainReport {
        let finalized = self.registry.finalize(minimum_occurrences);

        let stats = BTreeMap::from([
            ("durationValues", finalized.count("duration")),
            ("delayValues", finalized.count("delay")),
            ("easingValues", finalized.count("easing")),
        ]);

        DomainReport {
            domain: Domain::Animations,
            tokens: finalized.tokens,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::Observation;

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
    fn test_longhands() {
        let extractor = AnimationExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(vec![
            Observation::new(".btn", "transition-duration", "0.2s", "button"),
            Observation::new(".btn", "transition-delay", "50ms", "button"),
            Observation::new(".btn", "transition-timing-function", "cubic-bezier(0.4, 0, 0.2, 1)", "button"),
        ]));

        let report = extractor.finalize(1);
        assert_eq!(names(&report), vec!["delay-50", "duration-200", "easing-cubic-bezier-0-4-0-0-2-1"]);
        assert_eq!(report.stats["durationValues"], 1);
        assert_eq!(report.stats["delayValues"], 1);
        assert_eq!(report.stats["easingValues"], 1);
    }

    #[test]
    fn test_static_elements_ignored() {
        let extractor = AnimationExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(vec![
            Observation::new("p", "transition-duration", "0s", "p"),
            Observation::new("p", "transition-delay", "0s", "p"),
            Observation::new("p", "transition-timing-function", "ease", "p"),
            Observation::new("p", "animation-duration", "0s", "p"),
        ]));

        assert!(extractor.finalize(1).tokens.is_empty());
    }

    #[test]
    fn test_shorthand_layers() {
        let extractor = AnimationExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(vec![
            Observation::new(".menu", "transition", "opacity 150ms ease-in, transform 300ms ease-out 100ms", "nav"),
            Observation::new(".spinner", "animation", "spin 1s linear infinite", "div"),
        ]));

        let report = extractor.finalize(1);
        assert_eq!(
            names(&report),
            vec![
                "delay-100",
                "duration-1000",
                "duration-150",
                "duration-300",
                "easing-ease-in",
                "easing-ease-out",
                "easing-linear",
            ]
        );
    }

    #[test]
    fn test_same_duration_counts_once_per_element() {
        let extractor = AnimationExtractor::new(&ExtractionSettings::default());
        let _ = extractor.extract_page(&page(vec![Observation::new(".a", "transition-duration", "200ms, 0.2s", "a")]));

        let report = extractor.finalize(1);
        assert_eq!(report.tokens.len(), 1);
        assert_eq!(report.tokens[0].usage_count, 1);
    }

    #[test]
    fn test_bad_duration_skipped() {
        let extractor = AnimationExtractor::new(&ExtractionSettings::default());
        let skipped = extractor.extract_page(&page(vec![Observation::new(".a", "transition-duration", "fast", "a")]));

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].property, "transition-duration");
    }
}
