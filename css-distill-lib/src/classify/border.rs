use super::Classification;
use crate::values::{BorderStyleValue, DimensionValue, ShadowValue, Unit, format_number, kebab_segment};
use serde::{Deserialize, Serialize};

/// Bucket boundaries for naming `border-radius` values, all in px except `full_percent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RadiusBuckets {
    pub sm: f64,
    pub md: f64,
    pub lg: f64,

    /// How far from a bucket a value may be, as a fraction of the bucket value.
    pub tolerance: f64,
    pub full_px: f64,
    pub full_percent: f64,
}

impl Default for RadiusBuckets {
    fn default() -> Self {
        Self {
            sm: 4.0,
            md: 8.0,
            lg: 16.0,
            tolerance: 0.5,
            full_px: 9999.0,
            full_percent: 50.0,
        }
    }
}

/// Blur limits for naming shadows, in px.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ShadowTiers {
    pub sm_max_blur: f64,
    pub md_max_blur: f64,
}

impl Default for ShadowTiers {
    fn default() -> Self {
        Self {
            sm_max_blur: 4.0,
            md_max_blur: 12.0,
        }
    }
}

fn literal_radius(value: &DimensionValue) -> Classification {
    Classification::new("radius", format!("border-radius-{}", value.slug()))
}

/// Name a `border-radius` after the nearest configured bucket.
#[must_use]
pub fn classify_radius(value: &DimensionValue, buckets: &RadiusBuckets) -> Classification {
    if value.is_zero() {
        return Classification::new("radius", "border-radius-0");
    }

    match value.unit {
        Unit::Percent if value.value >= buckets.full_percent => Classification::new("radius", "border-radius-full"),
        Unit::Px if value.value >= buckets.full_px => Classification::new("radius", "border-radius-full"),
        Unit::Px => {
            let mut best: Option<(&str, f64)> = None;
            for (label, bucket) in [("sm", buckets.sm), ("md", buckets.md), ("lg", buckets.lg)] {
                let distance = (value.value - bucket).abs();
                if distance > bucket * buckets.tolerance {
                    continue;
                }

                // buckets ascend, so `<=` lets the larger bucket win a tie
                if best.is_none_or(|(_, closest)| distance <= closest) {
                    best = Some((label, distance));
                }
            }

            match best {
                Some((label, _)) => Classification::new("radius", format!("border-radius-{label}")),
                None => literal_radius(value),
            }
        }
        _ => literal_radius(value),
    }
}

/// Name a shadow by its blur radius; inset shadows get their own category.
#[must_use]
pub fn classify_shadow(shadow: &ShadowValue, tiers: &ShadowTiers, root_font_size: f64) -> Classification {
    let blur = shadow.blur.to_px(root_font_size).unwrap_or(shadow.blur.value);
    let size = if blur < tiers.sm_max_blur {
        "sm"
    } else if blur < tiers.md_max_blur {
        "md"
    } else {
        "lg"
    };

    let category = if shadow.inset { "inner-shadow" } else { "shadow" };
    Classification::new(category, format!("shadow-{size}"))
}

#[must_use]
pub fn classify_border_width(value: &DimensionValue) -> Classification {
    let name = if value.unit == Unit::Px {
        format!("border-width-{}", kebab_segment(&format_number(value.value)))
    } else {
        format!("border-width-{}", value.slug())
    };

    Classification::new("width", name)
}

#[must_use]
pub fn classify_border_style(style: BorderStyleValue) -> Classification {
    Classification::new("style", format!("border-style-{style}"))
}
