use super::Classification;
use crate::values::ColorValue;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// What a color paints on its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorRole {
    Text,
    Background,
    Border,
}

impl ColorRole {
    /// The role a color property plays, or `None` for properties that are not color-bearing.
    #[must_use]
    pub fn from_property(property: &str) -> Option<Self> {
        match property {
            "color" => Some(Self::Text),
            "background-color" | "background" => Some(Self::Background),
            p if p.starts_with("border") && p.ends_with("color") => Some(Self::Border),
            "outline-color" => Some(Self::Border),
            _ => None,
        }
    }
}

/// Name a color `{role}-{hex}`, appending `-a{percent}` when it is translucent.
#[must_use]
pub fn classify_color(color: &ColorValue, role: ColorRole) -> Classification {
    let name = match color.alpha {
        Some(alpha) => format!("{role}-{}-a{}", color.hex_digits(), (alpha * 100.0).round()),
        None => format!("{role}-{}", color.hex_digits()),
    };

    Classification::new(role.to_string(), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::parse_color;

    #[test]
    fn test_opaque_name() {
        let classification = classify_color(&parse_color("#FFFFFF").unwrap(), ColorRole::Background);
        assert_eq!(classification, Classification::new("background", "background-ffffff"));
    }

    #[test]
    fn test_translucent_name() {
        let classification = classify_color(&parse_color("rgba(0, 0, 0, 0.5)").unwrap(), ColorRole::Text);
        assert_eq!(classification.name, "text-000000-a50");
    }

    #[test]
    fn test_role_from_property() {
        assert_eq!(ColorRole::from_property("color"), Some(ColorRole::Text));
        assert_eq!(ColorRole::from_property("background-color"), Some(ColorRole::Background));
        assert_eq!(ColorRole::from_property("border-top-color"), Some(ColorRole::Border));
        assert_eq!(ColorRole::from_property("border-color"), Some(ColorRole::Border));
        assert_eq!(ColorRole::from_property("margin"), None);
    }
}
