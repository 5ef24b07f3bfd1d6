use super::Classification;
use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TypographyCategory {
    Heading,
    Body,
    Text,
}

/// Name a text style after the element it was seen on.
#[must_use]
pub fn classify_typography(tag: &str) -> Classification {
    let tag = tag.trim().to_ascii_lowercase();
    let (category, name) = match tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => (TypographyCategory::Heading, format!("heading-{tag}")),
        "p" => (TypographyCategory::Body, "body-text".to_string()),
        "span" => (TypographyCategory::Body, "body-inline".to_string()),
        "a" => (TypographyCategory::Body, "body-link".to_string()),
        "code" | "pre" | "kbd" | "samp" => (TypographyCategory::Text, "text-code".to_string()),
        "blockquote" | "q" => (TypographyCategory::Text, "text-quote".to_string()),
        "em" | "i" => (TypographyCategory::Text, "text-emphasis".to_string()),
        "strong" | "b" => (TypographyCategory::Text, "text-strong".to_string()),
        other if !other.is_empty() && other.chars().all(|c| c.is_ascii_alphanumeric()) => (TypographyCategory::Body, format!("body-{other}")),
        _ => (TypographyCategory::Body, "body-unknown".to_string()),
    };

    Classification::new(category.to_string(), name)
}
