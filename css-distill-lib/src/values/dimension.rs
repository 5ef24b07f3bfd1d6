use super::{ParseError, ValueKind, format_number, round_to, split_number_unit, split_whitespace_top_level};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Points to pixels at the CSS reference resolution.
const PX_PER_PT: f64 = 4.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Unit {
    #[serde(rename = "px")]
    #[strum(serialize = "px")]
    Px,

    #[serde(rename = "rem")]
    #[strum(serialize = "rem")]
    Rem,

    #[serde(rename = "em")]
    #[strum(serialize = "em")]
    Em,

    #[serde(rename = "%")]
    #[strum(serialize = "%")]
    Percent,

    #[serde(rename = "vw")]
    #[strum(serialize = "vw")]
    Vw,

    #[serde(rename = "vh")]
    #[strum(serialize = "vh")]
    Vh,

    #[serde(rename = "pt")]
    #[strum(serialize = "pt")]
    Pt,
}

impl Unit {
    /// Relative units depend on the containing block or viewport and never convert to px.
    #[must_use]
    pub const fn is_relative(self) -> bool {
        matches!(self, Self::Percent | Self::Vw | Self::Vh)
    }

    /// A name-safe spelling of the unit.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Rem => "rem",
            Self::Em => "em",
            Self::Percent => "percent",
            Self::Vw => "vw",
            Self::Vh => "vh",
            Self::Pt => "pt",
        }
    }
}

/// Unit handling for one extraction run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionOptions {
    /// Convert absolute units to px.
    pub normalize: bool,

    /// Size of `1rem` (and `1em`, lacking a parent font size) in px.
    pub root_font_size: f64,
}

impl Default for DimensionOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            root_font_size: 16.0,
        }
    }
}

/// The value/unit pair as it appeared on the page, kept for display after conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OriginalDimension {
    pub value: f64,
    pub unit: Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionValue {
    pub value: f64,
    pub unit: Unit,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub original: Option<OriginalDimension>,
}

impl DimensionValue {
    #[must_use]
    pub fn new(value: f64, unit: Unit) -> Self {
        Self {
            value: round_to(value, 3),
            unit,
            original: None,
        }
    }

    #[must_use]
    pub fn px(value: f64) -> Self {
        Self::new(value, Unit::Px)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    /// Only px values can be ordered against each other across elements.
    #[must_use]
    pub fn is_comparable(&self) -> bool {
        self.unit == Unit::Px
    }

    /// The px equivalent, if the unit allows one.
    #[must_use]
    pub fn to_px(&self, root_font_size: f64) -> Option<f64> {
        match self.unit {
            Unit::Px => Some(self.value),
            Unit::Rem | Unit::Em => Some(self.value * root_font_size),
            Unit::Pt => Some(self.value * PX_PER_PT),
            Unit::Percent | Unit::Vw | Unit::Vh => None,
        }
    }

    #[must_use]
    pub fn identity_key(&self) -> String {
        format!("{}{}", format_number(self.value), self.unit)
    }

    /// Name-safe rendering such as `1-5-rem` or `50-percent`.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}-{}", super::kebab_segment(&format_number(self.value)), self.unit.slug())
    }

    fn normalized(self, options: DimensionOptions) -> Self {
        if !options.normalize || self.unit == Unit::Px || self.unit.is_relative() {
            return self;
        }

        match self.to_px(options.root_font_size) {
            Some(px) => Self {
                value: round_to(px, 3),
                unit: Unit::Px,
                original: Some(OriginalDimension {
                    value: self.value,
                    unit: self.unit,
                }),
            },
            None => self,
        }
    }
}

impl core::fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", format_number(self.value), self.unit)
    }
}

/// Parse a single length such as `12px`, `1.5rem`, `50%`, or a bare `0`.
pub fn parse_dimension(raw: &str, options: DimensionOptions) -> Result<DimensionValue, ParseError> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Err(ParseError::Empty { kind: ValueKind::Dimension });
    }

    let Some((number, unit)) = split_number_unit(&value) else {
        return Err(ParseError::invalid(ValueKind::Dimension, raw, "not a number"));
    };

    let unit = if unit.is_empty() {
        if number != 0.0 {
            return Err(ParseError::invalid(ValueKind::Dimension, raw, "missing unit"));
        }
        Unit::Px
    } else {
        unit.parse::<Unit>()
            .map_err(|_| ParseError::invalid(ValueKind::Dimension, raw, "unsupported unit"))?
    };

    Ok(DimensionValue::new(number, unit).normalized(options))
}

/// Parse a whitespace-separated list of lengths such as the `margin` shorthand.
pub fn parse_dimensions(raw: &str, options: DimensionOptions) -> Result<Vec<DimensionValue>, ParseError> {
    let parts = split_whitespace_top_level(raw);
    if parts.is_empty() {
        return Err(ParseError::Empty { kind: ValueKind::Dimension });
    }

    parts.into_iter().map(|part| parse_dimension(part, options)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: DimensionOptions = DimensionOptions {
        normalize: false,
        root_font_size: 16.0,
    };

    #[test]
    fn test_parse_px() {
        let value = parse_dimension("12px", DimensionOptions::default()).unwrap();
        assert_eq!(value, DimensionValue::px(12.0));
        assert!(value.is_comparable());
    }

    #[test]
    fn test_bare_zero() {
        let value = parse_dimension("0", DimensionOptions::default()).unwrap();
        assert!(value.is_zero());
        assert_eq!(value.unit, Unit::Px);
    }

    #[test]
    fn test_rem_normalized_with_root_size() {
        let options = DimensionOptions {
            normalize: true,
            root_font_size: 10.0,
        };
        let value = parse_dimension("1.5rem", options).unwrap();
        assert_eq!(value.value, 15.0);
        assert_eq!(value.unit, Unit::Px);
        assert_eq!(value.original.unwrap().unit, Unit::Rem);
    }

    #[test]
    fn test_rem_and_px_share_identity() {
        let rem = parse_dimension("1rem", DimensionOptions::default()).unwrap();
        let px = parse_dimension("16px", DimensionOptions::default()).unwrap();
        assert_eq!(rem.identity_key(), px.identity_key());
    }

    #[test]
    fn test_relative_units_untouched() {
        let value = parse_dimension("50%", DimensionOptions::default()).unwrap();
        assert_eq!(value.unit, Unit::Percent);
        assert!(!value.is_comparable());
        assert_eq!(value.slug(), "50-percent");

        let vw = parse_dimension("10vw", DimensionOptions::default()).unwrap();
        assert_eq!(vw.unit, Unit::Vw);
    }

    #[test]
    fn test_no_normalization_keeps_units() {
        let value = parse_dimension("2em", RAW).unwrap();
        assert_eq!(value.unit, Unit::Em);
        assert_eq!(value.original, None);
    }

    #[test]
    fn test_pt_conversion() {
        let value = parse_dimension("12pt", DimensionOptions::default()).unwrap();
        assert_eq!(value.value, 16.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse_dimension("auto", DimensionOptions::default()).is_err());
        assert!(parse_dimension("12", DimensionOptions::default()).is_err());
        assert!(parse_dimension("3ch", DimensionOptions::default()).is_err());
        assert!(parse_dimension("", DimensionOptions::default()).is_err());
    }

    #[test]
    fn test_parse_shorthand_list() {
        let values = parse_dimensions("8px 1rem", DimensionOptions::default()).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1].value, 16.0);
    }

    #[test]
    fn test_display_and_slug() {
        let value = parse_dimension("1.5px", RAW).unwrap();
        assert_eq!(value.to_string(), "1.5px");
        assert_eq!(value.slug(), "1-5-px");
    }
}
