use super::Classification;
use crate::values::DimensionValue;
use serde::{Deserialize, Serialize};

const BASE_TIER_NAMES: [&str; 5] = ["xs", "sm", "md", "lg", "xl"];

/// Parameters of the spacing scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SpacingScale {
    /// A new tier starts where a value exceeds its predecessor by more than this factor.
    pub ratio_threshold: f64,
}

impl Default for SpacingScale {
    fn default() -> Self {
        Self { ratio_threshold: 1.5 }
    }
}

/// One step of the scale: a run of px magnitudes close enough to share a name.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingTier {
    pub name: String,
    pub members: Vec<f64>,
}

impl SpacingTier {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.members.iter().any(|member| *member == value)
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.members.first().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.members.last().copied().unwrap_or_default()
    }
}

/// Names for `count` tiers, smallest first.
///
/// Up to five tiers take a contiguous window of `xs..xl` centered on `md`; beyond five the scale
/// grows upward through `2xl`, `3xl`, and so on.
#[must_use]
pub fn tier_names(count: usize) -> Vec<String> {
    if count <= BASE_TIER_NAMES.len() {
        let start = 2 - (count.saturating_sub(1) / 2);
        return BASE_TIER_NAMES[start..start + count].iter().map(ToString::to_string).collect();
    }

    BASE_TIER_NAMES
        .iter()
        .map(ToString::to_string)
        .chain((2..=count - BASE_TIER_NAMES.len() + 1).map(|n| format!("{n}xl")))
        .collect()
}

/// Cluster positive px magnitudes into an ordered scale.
///
/// Duplicates collapse; zero and negative values are not part of the scale.
#[must_use]
pub fn build_scale(values: &[f64], scale: &SpacingScale) -> Vec<SpacingTier> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();

    let mut groups: Vec<Vec<f64>> = Vec::new();
    for value in sorted {
        match groups.last_mut() {
            Some(group) if group.last().is_some_and(|previous| value / previous <= scale.ratio_threshold) => group.push(value),
            _ => groups.push(vec![value]),
        }
    }

    tier_names(groups.len())
        .into_iter()
        .zip(groups)
        .map(|(name, members)| SpacingTier {
            name: format!("spacing-{name}"),
            members,
        })
        .collect()
}

/// A literal name for values that stay outside the scale, such as `%` or `vw` lengths.
#[must_use]
pub fn classify_literal_spacing(value: &DimensionValue) -> Classification {
    if value.is_zero() {
        return Classification::new("scale", "spacing-0");
    }

    let name = if value.value < 0.0 {
        format!("spacing-neg-{}", DimensionValue::new(-value.value, value.unit).slug())
    } else {
        format!("spacing-{}", value.slug())
    };

    Classification::new("relative", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Unit;

    #[test]
    fn test_tier_names_centered() {
        assert_eq!(tier_names(1), vec!["md"]);
        assert_eq!(tier_names(2), vec!["md", "lg"]);
        assert_eq!(tier_names(3), vec!["sm", "md", "lg"]);
        assert_eq!(tier_names(4), vec!["sm", "md", "lg", "xl"]);
        assert_eq!(tier_names(5), vec!["xs", "sm", "md", "lg", "xl"]);
        assert!(tier_names(0).is_empty());
    }

    #[test]
    fn test_tier_names_extend() {
        assert_eq!(tier_names(7), vec!["xs", "sm", "md", "lg", "xl", "2xl", "3xl"]);
    }

    #[test]
    fn test_scale_groups_close_values() {
        let tiers = build_scale(&[4.0, 8.0, 8.0, 16.0, 48.0], &SpacingScale::default());
        assert!(tiers.len() >= 2);

        let last = tiers.last().unwrap();
        assert_eq!(last.members, vec![48.0]);
        assert!(!last.contains(8.0));

        let tier_of = |v: f64| tiers.iter().position(|t| t.contains(v)).unwrap();
        assert!(tier_of(8.0) - tier_of(4.0) <= tier_of(48.0) - tier_of(8.0));
    }

    #[test]
    fn test_scale_merges_runs() {
        let tiers = build_scale(&[4.0, 5.0, 6.0, 8.0, 16.0], &SpacingScale::default());
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].name, "spacing-md");
        assert_eq!(tiers[0].members, vec![4.0, 5.0, 6.0, 8.0]);
        assert_eq!(tiers[0].min(), 4.0);
        assert_eq!(tiers[0].max(), 8.0);
        assert_eq!(tiers[1].name, "spacing-lg");
    }

    #[test]
    fn test_scale_with_looser_threshold() {
        let scale = SpacingScale { ratio_threshold: 3.0 };
        let tiers = build_scale(&[4.0, 8.0, 16.0, 48.0], &scale);
        assert_eq!(tiers.len(), 1);
    }

    #[test]
    fn test_scale_ignores_zero() {
        let tiers = build_scale(&[0.0, 0.0, 12.0], &SpacingScale::default());
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].members, vec![12.0]);
    }

    #[test]
    fn test_literal_names() {
        assert_eq!(classify_literal_spacing(&DimensionValue::new(5.0, Unit::Percent)).name, "spacing-5-percent");
        assert_eq!(classify_literal_spacing(&DimensionValue::px(0.0)).name, "spacing-0");
        assert_eq!(classify_literal_spacing(&DimensionValue::new(-2.0, Unit::Vw)).name, "spacing-neg-2-vw");
    }
}
