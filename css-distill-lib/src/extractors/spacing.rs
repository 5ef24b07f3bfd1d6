use super::{Domain, DomainExtractor, DomainReport, ExtractionSettings, skip};
use crate::classify::{Classification, SpacingScale, build_scale, classify_literal_spacing};
use crate::crawl::{PageObservations, SkippedValue};
use crate::registry::{TokenDraft, TokenRegistry, TokenSource, finalize_drafts};
use crate::values::{CanonicalValue, DimensionOptions, DimensionValue, format_number, parse_dimension, split_whitespace_top_level};
use std::collections::{BTreeMap, BTreeSet, HashSet};

const PROPERTIES: &[&str] = &[
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "gap",
    "row-gap",
    "column-gap",
];

/// Keywords that are legal in spacing properties but carry no length.
const NON_LENGTHS: &[&str] = &["auto", "normal"];

fn category_of(property: &str) -> &'static str {
    if property.starts_with("margin") {
        "margin"
    } else if property.starts_with("padding") {
        "padding"
    } else {
        "gap"
    }
}

/// Margin, padding, and gap lengths, clustered into a spacing scale at finalization.
///
/// Pages record plain values per property family. The scale can only be built once every
/// value is known, so naming happens entirely in [`DomainExtractor::finalize`].
#[derive(Debug)]
pub struct SpacingExtractor {
    options: DimensionOptions,
    scale: SpacingScale,
    registry: TokenRegistry,
}

impl SpacingExtractor {
    #[must_use]
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            options: settings.dimensions,
            scale: settings.spacing.clone(),
            registry: TokenRegistry::new(),
        }
    }
}

impl DomainExtractor for SpacingExtractor {
    fn domain(&self) -> Domain {
        Domain::Spacing
    }

    fn properties(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn extract_page(&self, page: &PageObservations) -> Vec<SkippedValue> {
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();

        for (observation, element) in page
            .observations
            .iter()
            .zip(page.element_ids())
            .filter(|(o, _)| PROPERTIES.contains(&o.property.as_str()))
        {
            let lengths: Result<Vec<DimensionValue>, _> = split_whitespace_top_level(&observation.raw_value)
                .into_iter()
                .filter(|part| !NON_LENGTHS.contains(&part.to_ascii_lowercase().as_str()))
                .map(|part| parse_dimension(part, self.options))
                .collect();

            let lengths = match lengths {
                Ok(lengths) => lengths,
                Err(e) => {
                    skipped.push(skip(page, observation, &e));
                    continue;
                }
            };

            let category = category_of(&observation.property);
            for length in lengths {
                if !seen.insert((element, observation.property.as_str(), length.identity_key())) {
                    continue;
                }

                let classification = Classification::new(category, classify_literal_spacing(&length).name);
                let source = TokenSource::new(&observation.selector, &observation.element_tag, &observation.property);
                self.registry.observe(CanonicalValue::Dimension(length), classification, source, &page.url);
            }
        }

        skipped
    }

    fn finalize(&self, minimum_occurrences: u64) -> DomainReport {
        let drafts = self.registry.drafts();

        let per_category = |category: &str| drafts.iter().filter(|d| d.classification.category == category).count();
        let margin_values = per_category("margin");
        let padding_values = per_category("padding");
        let gap_values = per_category("gap");

        // one entry per length, regardless of which property family used it
        let mut by_value: BTreeMap<String, Vec<TokenDraft>> = BTreeMap::new();
        for draft in drafts {
            by_value.entry(draft.value.identity_key()).or_default().push(draft);
        }
        let total_values = by_value.len();

        let mut zeros = Vec::new();
        let mut scaled: Vec<(f64, TokenDraft)> = Vec::new();
        let mut output = Vec::new();

        for (identity, parts) in by_value {
            let Some(merged) = combine(identity.clone(), parts, None) else {
                continue;
            };

            if merged.usage_count < minimum_occurrences {
                continue;
            }

            let CanonicalValue::Dimension(length) = merged.value.clone() else {
                continue;
            };

            if length.is_zero() {
                zeros.push(merged);
            } else if length.is_comparable() && length.value > 0.0 {
                scaled.push((length.value, merged));
            } else {
                let classification = classify_literal_spacing(&length);
                output.push(TokenDraft {
                    key: format!("{}::{identity}", classification.category),
                    classification,
                    ..merged
                });
            }
        }

        if let Some(mut zero) = combine("scale::0".to_string(), zeros, None) {
            zero.classification = Classification::new("scale", "spacing-0");
            output.push(zero);
        }

        let magnitudes: Vec<f64> = scaled.iter().map(|(value, _)| *value).collect();
        let tiers = build_scale(&magnitudes, &self.scale);

        for tier in &tiers {
            let members: Vec<&(f64, TokenDraft)> = scaled.iter().filter(|(value, _)| tier.contains(*value)).collect();

            // the most used member speaks for the tier; ties go to the smaller length
            let Some((_, representative)) = members
                .iter()
                .copied()
                .max_by(|(a_value, a), (b_value, b)| a.usage_count.cmp(&b.usage_count).then_with(|| b_value.total_cmp(a_value)))
            else {
                continue;
            };

            let listed: Vec<String> = tier.members.iter().map(|m| format!("{}px", format_number(*m))).collect();
            let description = format!(
                "spacing scale step {}px to {}px ({})",
                format_number(tier.min()),
                format_number(tier.max()),
                listed.join(", ")
            );

            let parts: Vec<TokenDraft> = members.iter().map(|(_, draft)| draft.clone()).collect();
            let Some(mut step) = combine(format!("scale::{}", tier.name), parts, Some(description)) else {
                continue;
            };
            step.value = representative.value.clone();
            step.classification = Classification::new("scale", tier.name.clone());
            output.push(step);
        }

        let finalized = finalize_drafts(output, 1);

        let stats = BTreeMap::from([
            ("totalValues", total_values),
            ("scaleTiers", tiers.len()),
            ("marginValues", margin_values),
            ("paddingValues", padding_values),
            ("gapValues", gap_values),
            ("relativeValues", finalized.count("relative")),
        ]);

        DomainReport {
            domain: Domain::Spacing,
            tokens: finalized.tokens,
            stats,
        }
    }
}

/// Fold several drafts into one: counts add up, URLs unite, and the smallest source wins along
/// with the value and classification observed there. `None` for an empty list.
fn combine(key: String, parts: Vec<TokenDraft>, description: Option<String>) -> Option<TokenDraft> {
    let mut iter = parts.into_iter();
    let mut merged = TokenDraft {
        key,
        description,
        ..iter.next()?
    };

    for part in iter {
        merged.usage_count += part.usage_count;
        merged.source_urls.extend(part.source_urls);
        if part.source < merged.source {
            merged.source = part.source;
            merged.value = part.value;
            merged.classification = part.classification;
        }
    }

    Some(merged)
}
