use super::{ParseError, ValueKind};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BorderStyleValue {
    None,
    Hidden,
    Solid,
    Dashed,
    Dotted,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

impl BorderStyleValue {
    /// `none` and `hidden` draw no border.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

pub fn parse_border_style(raw: &str) -> Result<BorderStyleValue, ParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ParseError::Empty {
            kind: ValueKind::BorderStyle,
        });
    }

    value
        .parse()
        .map_err(|_| ParseError::invalid(ValueKind::BorderStyle, raw, "unknown border style"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_keyword_round_trips() {
        for style in BorderStyleValue::iter() {
            assert_eq!(parse_border_style(&style.to_string()).unwrap(), style);
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(parse_border_style(" Dashed ").unwrap(), BorderStyleValue::Dashed);
    }

    #[test]
    fn test_visibility() {
        assert!(!BorderStyleValue::None.is_visible());
        assert!(!BorderStyleValue::Hidden.is_visible());
        assert!(BorderStyleValue::Solid.is_visible());
    }

    #[test]
    fn test_unknown() {
        assert!(parse_border_style("wavy").is_err());
        assert!(parse_border_style("").is_err());
    }
}
