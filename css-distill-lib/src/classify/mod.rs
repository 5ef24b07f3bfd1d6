//! Per-domain heuristics that give a canonical value a semantic category and a readable name.
//!
//! Classifiers are deterministic functions of the value, the element context it was seen in,
//! and the configured bucket boundaries. They never look at other observations; cross-value
//! decisions such as the spacing scale are computed once all pages are in.

mod animation;
mod border;
mod color;
mod component;
mod spacing;
mod typography;

pub use animation::{classify_delay, classify_duration, classify_easing};
pub use border::{RadiusBuckets, ShadowTiers, classify_border_style, classify_border_width, classify_radius, classify_shadow};
pub use color::{ColorRole, classify_color};
pub use component::{ComponentMatch, ComponentMatcher, SelectorParts};
pub use spacing::{SpacingScale, SpacingTier, build_scale, classify_literal_spacing, tier_names};
pub use typography::{TypographyCategory, classify_typography};

/// The category and name assigned to one canonical value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Classification {
    pub category: String,
    pub name: String,
}

impl Classification {
    #[must_use]
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }
}
