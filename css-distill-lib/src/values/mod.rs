//! Canonical value types and the converters that produce them from raw CSS strings.
//!
//! Every raw computed-style string goes through exactly one converter before it reaches a
//! registry. Converters are pure and total over the grammar they claim: anything they cannot
//! interpret comes back as a [`ParseError`] and the caller skips that one observation.
//!
//! # Implementation Model
//!
//! Each token domain has an explicit value type ([`ColorValue`], [`DimensionValue`],
//! [`TypographyValue`], [`BorderStyleValue`], [`ShadowValue`], [`DurationValue`],
//! [`TimingFunctionValue`], [`ComponentValue`]) and all of them are gathered in the
//! [`CanonicalValue`] union. The union knows the output token type of each variant and how to
//! produce the stable identity key used by the registries.

mod border_style;
mod color;
mod component;
mod dimension;
mod font;
mod parse_error;
mod shadow;
mod timing;

pub use border_style::{BorderStyleValue, parse_border_style};
pub use color::{ColorSpace, ColorValue, parse_color};
pub use component::ComponentValue;
pub use dimension::{DimensionOptions, DimensionValue, OriginalDimension, Unit, parse_dimension, parse_dimensions};
pub use font::{LineHeight, LineHeightKeyword, TypographyValue, parse_font_family, parse_font_weight, parse_line_height};
pub use parse_error::{ParseError, ValueKind};
pub use shadow::{ShadowValue, parse_shadows};
pub use timing::{
    DurationValue, StepPosition, TimingFunctionValue, TransitionLayer, parse_duration, parse_durations, parse_timing_function,
    parse_timing_functions, parse_transition,
};

use serde::Serialize;
use strum::{Display, EnumString};

/// The `type` field of an emitted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum TokenType {
    Color,
    Dimension,
    Typography,
    StrokeStyle,
    Shadow,
    Duration,
    CubicBezier,
    Component,
}

/// A normalized in-memory representation of a raw CSS value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalValue {
    Color(ColorValue),
    Dimension(DimensionValue),
    Typography(TypographyValue),
    StrokeStyle(BorderStyleValue),
    Shadow(ShadowValue),
    Duration(DurationValue),
    TimingFunction(TimingFunctionValue),
    Component(ComponentValue),
}

impl CanonicalValue {
    #[must_use]
    pub const fn token_type(&self) -> TokenType {
        match self {
            Self::Color(_) => TokenType::Color,
            Self::Dimension(_) => TokenType::Dimension,
            Self::Typography(_) => TokenType::Typography,
            Self::StrokeStyle(_) => TokenType::StrokeStyle,
            Self::Shadow(_) => TokenType::Shadow,
            Self::Duration(_) => TokenType::Duration,
            Self::TimingFunction(_) => TokenType::CubicBezier,
            Self::Component(_) => TokenType::Component,
        }
    }

    /// A stable serialization of the value alone; the registry appends the category.
    ///
    /// Display-only data such as the originally observed unit does not take part, so `1rem`
    /// and `16px` share a key once normalized.
    #[must_use]
    pub fn identity_key(&self) -> String {
        match self {
            Self::Color(color) => color.identity_key(),
            Self::Dimension(dimension) => dimension.identity_key(),
            Self::Typography(typography) => typography.identity_key(),
            Self::StrokeStyle(style) => style.to_string(),
            Self::Shadow(shadow) => shadow.identity_key(),
            Self::Duration(duration) => duration.identity_key(),
            Self::TimingFunction(function) => function.identity_key(),
            Self::Component(component) => component.identity_key(),
        }
    }
}

/// Format a magnitude compactly: at most three decimals, no trailing zeros, no `-0`.
#[must_use]
pub fn format_number(value: f64) -> String {
    let rounded = round_to(value, 3);
    if rounded == 0.0 {
        return "0".to_string();
    }

    let text = format!("{rounded:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

/// Round to a fixed number of decimals so equal-looking values compare equal.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Split on `separator`, ignoring separators nested inside parentheses.
#[must_use]
pub fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(input[start..index].trim());
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }

    parts.push(input[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

/// Split on runs of whitespace, keeping function calls such as `rgb(0, 0, 0)` intact.
#[must_use]
pub fn split_whitespace_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (index, ch) in input.char_indices() {
        match ch {
            '(' => {
                depth += 1;
                if start.is_none() {
                    start = Some(index);
                }
            }
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    parts.push(&input[begin..index]);
                }
            }
            _ => {
                if start.is_none() {
                    start = Some(index);
                }
            }
        }
    }

    if let Some(begin) = start {
        parts.push(&input[begin..]);
    }

    parts
}

/// Split a numeric literal from its trailing unit, e.g. `"1.5rem"` into `(1.5, "rem")`.
pub(crate) fn split_number_unit(input: &str) -> Option<(f64, &str)> {
    let bytes = input.as_bytes();
    let end = bytes
        .iter()
        .enumerate()
        .find(|&(index, &byte)| {
            let sign_allowed = index == 0 || matches!(bytes[index - 1], b'e' | b'E');
            !(byte.is_ascii_digit()
                || byte == b'.'
                || (matches!(byte, b'-' | b'+') && sign_allowed)
                || (matches!(byte, b'e' | b'E') && index > 0 && is_exponent(input, index)))
        })
        .map_or(input.len(), |(index, _)| index);

    let number: f64 = input[..end].parse().ok()?;
    if !number.is_finite() {
        return None;
    }

    Some((number, &input[end..]))
}

/// `e` only counts as part of a number when followed by a digit or sign (so `1em` stays `1` + `em`).
fn is_exponent(input: &str, index: usize) -> bool {
    let rest = &input.as_bytes()[index + 1..];
    match rest {
        [b'0'..=b'9', ..] => true,
        [b'-' | b'+', b'0'..=b'9', ..] => true,
        _ => false,
    }
}

/// Turn an arbitrary fragment into a kebab-case name segment.
#[must_use]
pub fn kebab_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_hyphen = true;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }

    while out.ends_with('-') {
        let _ = out.pop();
    }

    out
}
