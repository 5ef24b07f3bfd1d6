use super::{DimensionOptions, DimensionValue, ParseError, Unit, ValueKind, format_number, parse_dimension, round_to, split_number_unit, split_top_level};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineHeightKeyword {
    Normal,
}

/// A resolved `line-height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineHeight {
    Keyword(LineHeightKeyword),
    Ratio(f64),
    Length(DimensionValue),
}

impl LineHeight {
    pub const NORMAL: Self = Self::Keyword(LineHeightKeyword::Normal);

    #[must_use]
    pub fn identity_key(&self) -> String {
        match self {
            Self::Keyword(_) => "normal".to_string(),
            Self::Ratio(ratio) => format_number(*ratio),
            Self::Length(length) => length.identity_key(),
        }
    }
}

/// A composite text style: the four properties that together define how a run of text looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyValue {
    pub font_family: String,
    pub font_size: DimensionValue,
    pub font_weight: u16,
    pub line_height: LineHeight,
}

impl TypographyValue {
    #[must_use]
    pub fn identity_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.font_family,
            self.font_size.identity_key(),
            self.font_weight,
            self.line_height.identity_key()
        )
    }
}

/// Normalize a `font-family` stack: unquoted, lowercase, single-spaced, `, `-joined.
pub fn parse_font_family(raw: &str) -> Result<String, ParseError> {
    let families: Vec<String> = split_top_level(raw, ',')
        .into_iter()
        .map(|family| {
            family
                .trim_matches(|c| c == '"' || c == '\'')
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
        .filter(|family| !family.is_empty())
        .collect();

    if families.is_empty() {
        return Err(ParseError::Empty { kind: ValueKind::FontFamily });
    }

    Ok(families.join(", "))
}

/// Map a `font-weight` to the 100–900 scale.
///
/// Relative keywords resolve against the default weight of 400.
pub fn parse_font_weight(raw: &str) -> Result<u16, ParseError> {
    let value = raw.trim().to_ascii_lowercase();
    match value.as_str() {
        "" => Err(ParseError::Empty { kind: ValueKind::FontWeight }),
        "normal" => Ok(400),
        "bold" | "bolder" => Ok(700),
        "lighter" => Ok(300),
        numeric => match split_number_unit(numeric) {
            Some((number, "")) if (1.0..=1000.0).contains(&number) => {
                #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "range checked above")]
                let hundreds = (number / 100.0).round().clamp(1.0, 9.0) as u16;
                Ok(hundreds * 100)
            }
            Some((_, "")) => Err(ParseError::invalid(ValueKind::FontWeight, raw, "weight must be within 1-1000")),
            _ => Err(ParseError::invalid(ValueKind::FontWeight, raw, "unknown font weight")),
        },
    }
}

/// Parse a `line-height` given the element's font size.
///
/// Percentages become ratios. With normalization on, a px length over a px font size also becomes
/// a ratio so `24px` on `16px` text matches a declared `1.5`.
pub fn parse_line_height(raw: &str, options: DimensionOptions, font_size: &DimensionValue) -> Result<LineHeight, ParseError> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Err(ParseError::Empty { kind: ValueKind::LineHeight });
    }

    if value == "normal" {
        return Ok(LineHeight::NORMAL);
    }

    match split_number_unit(&value) {
        Some((number, "")) if number >= 0.0 => return Ok(LineHeight::Ratio(round_to(number, 3))),
        Some((number, "%")) if number >= 0.0 => return Ok(LineHeight::Ratio(round_to(number / 100.0, 3))),
        Some((number, _)) if number < 0.0 => {
            return Err(ParseError::invalid(ValueKind::LineHeight, raw, "negative line height"));
        }
        _ => {}
    }

    let length = parse_dimension(&value, options).map_err(|_| ParseError::invalid(ValueKind::LineHeight, raw, "invalid line height"))?;

    if options.normalize && length.unit == Unit::Px && font_size.unit == Unit::Px && !font_size.is_zero() {
        return Ok(LineHeight::Ratio(round_to(length.value / font_size.value, 3)));
    }

    Ok(LineHeight::Length(length))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: DimensionOptions = DimensionOptions {
        normalize: false,
        root_font_size: 16.0,
    };

    #[test]
    fn test_font_family_normalized() {
        assert_eq!(
            parse_font_family("\"Helvetica  Neue\", Arial, sans-serif").unwrap(),
            "helvetica neue, arial, sans-serif"
        );
        assert_eq!(parse_font_family("'Inter'").unwrap(), "inter");
        assert!(parse_font_family(" , ").is_err());
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(parse_font_weight("normal").unwrap(), 400);
        assert_eq!(parse_font_weight("bold").unwrap(), 700);
        assert_eq!(parse_font_weight("bolder").unwrap(), 700);
        assert_eq!(parse_font_weight("lighter").unwrap(), 300);
    }

    #[test]
    fn test_font_weight_numeric_snaps_to_scale() {
        assert_eq!(parse_font_weight("400").unwrap(), 400);
        assert_eq!(parse_font_weight("450").unwrap(), 500);
        assert_eq!(parse_font_weight("1").unwrap(), 100);
        assert_eq!(parse_font_weight("1000").unwrap(), 900);
        assert!(parse_font_weight("0").is_err());
        assert!(parse_font_weight("1200").is_err());
        assert!(parse_font_weight("heavy").is_err());
    }

    #[test]
    fn test_line_height_forms() {
        let size = DimensionValue::px(16.0);
        let options = DimensionOptions::default();

        assert_eq!(parse_line_height("normal", options, &size).unwrap(), LineHeight::NORMAL);
        assert_eq!(parse_line_height("1.5", options, &size).unwrap(), LineHeight::Ratio(1.5));
        assert_eq!(parse_line_height("150%", options, &size).unwrap(), LineHeight::Ratio(1.5));
        assert_eq!(parse_line_height("24px", options, &size).unwrap(), LineHeight::Ratio(1.5));
    }

    #[test]
    fn test_line_height_kept_as_length_without_normalization() {
        let size = DimensionValue::px(16.0);
        let height = parse_line_height("24px", RAW, &size).unwrap();
        assert_eq!(height, LineHeight::Length(DimensionValue::px(24.0)));
        assert_eq!(height.identity_key(), "24px");
    }

    #[test]
    fn test_line_height_rejects() {
        let size = DimensionValue::px(16.0);
        assert!(parse_line_height("-1", DimensionOptions::default(), &size).is_err());
        assert!(parse_line_height("tall", DimensionOptions::default(), &size).is_err());
    }

    #[test]
    fn test_identity_key() {
        let value = TypographyValue {
            font_family: "inter, sans-serif".into(),
            font_size: DimensionValue::px(16.0),
            font_weight: 400,
            line_height: LineHeight::Ratio(1.5),
        };
        assert_eq!(value.identity_key(), "inter, sans-serif|16px|400|1.5");
    }

    #[test]
    fn test_line_height_serializes_plainly() {
        assert_eq!(serde_json::to_string(&LineHeight::NORMAL).unwrap(), "\"normal\"");
        assert_eq!(serde_json::to_string(&LineHeight::Ratio(1.25)).unwrap(), "1.25");
    }
}
