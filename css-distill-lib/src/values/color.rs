use super::{ParseError, ValueKind, round_to, split_number_unit, split_top_level, split_whitespace_top_level};
use palette::color_difference::Ciede2000;
use palette::{Hsl, IntoColor, Lab, Srgb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Srgb,
}

/// A resolved color. The lowercase `#rrggbb` hex plus alpha is its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorValue {
    pub color_space: ColorSpace,
    pub components: [f64; 3],
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub alpha: Option<f64>,
    pub hex: String,
}

impl ColorValue {
    /// Build from 8-bit channels. An alpha of 1 (or above) is stored as `None`.
    #[must_use]
    pub fn from_rgba8(red: u8, green: u8, blue: u8, alpha: Option<f64>) -> Self {
        let alpha = alpha.map(|a| round_to(a.clamp(0.0, 1.0), 3)).filter(|a| *a < 1.0);

        Self {
            color_space: ColorSpace::Srgb,
            components: [channel_to_unit(red), channel_to_unit(green), channel_to_unit(blue)],
            alpha,
            hex: format!("#{red:02x}{green:02x}{blue:02x}"),
        }
    }

    #[must_use]
    pub fn black() -> Self {
        Self::from_rgba8(0, 0, 0, None)
    }

    /// Fully transparent colors carry no visual signal and are never emitted as tokens.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.alpha.is_some_and(|a| a <= 0.0)
    }

    /// The hex digits without the leading `#`.
    #[must_use]
    pub fn hex_digits(&self) -> &str {
        self.hex.trim_start_matches('#')
    }

    #[must_use]
    pub fn identity_key(&self) -> String {
        match self.alpha {
            Some(alpha) => format!("{}/{}", self.hex, super::format_number(alpha)),
            None => self.hex.clone(),
        }
    }

    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "components are in [0, 1]")]
    pub fn to_srgb(&self) -> Srgb {
        Srgb::new(self.components[0] as f32, self.components[1] as f32, self.components[2] as f32)
    }

    /// Perceptual distance (CIEDE2000) between two colors, ignoring alpha.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let lhs: Lab = self.to_srgb().into_color();
        let rhs: Lab = other.to_srgb().into_color();
        lhs.difference(rhs)
    }
}

fn channel_to_unit(channel: u8) -> f64 {
    round_to(f64::from(channel) / 255.0, 4)
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "value is clamped to [0, 255] first")]
fn unit_to_channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Parse any supported CSS color syntax.
///
/// Accepts hex (3, 4, 6, or 8 digits), `rgb()`/`rgba()`, `hsl()`/`hsla()`, the CSS named colors,
/// and `transparent`. Keywords without a concrete value (`currentcolor`, `inherit`, ...) are
/// rejected.
pub fn parse_color(raw: &str) -> Result<ColorValue, ParseError> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Err(ParseError::Empty { kind: ValueKind::Color });
    }

    if let Some(digits) = value.strip_prefix('#') {
        return parse_hex(raw, digits);
    }

    if let Some(args) = function_args(&value, &["rgba", "rgb"]) {
        return parse_rgb_function(raw, args);
    }

    if let Some(args) = function_args(&value, &["hsla", "hsl"]) {
        return parse_hsl_function(raw, args);
    }

    match value.as_str() {
        "transparent" => Ok(ColorValue::from_rgba8(0, 0, 0, Some(0.0))),
        "currentcolor" | "inherit" | "initial" | "unset" | "revert" => Err(ParseError::unresolved(ValueKind::Color, raw)),
        name => palette::named::from_str(name)
            .map(|named| {
                let (red, green, blue) = named.into_components();
                ColorValue::from_rgba8(red, green, blue, None)
            })
            .ok_or_else(|| ParseError::invalid(ValueKind::Color, raw, "unknown color syntax")),
    }
}

/// Return the argument text of `name(...)` for the first matching function name.
fn function_args<'a>(value: &'a str, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        value
            .strip_prefix(name)
            .and_then(|rest| rest.trim_start().strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
    })
}

fn parse_hex(raw: &str, digits: &str) -> Result<ColorValue, ParseError> {
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::invalid(ValueKind::Color, raw, "non-hex digit"));
    }

    let nibble = |index: usize| u8::from_str_radix(&digits[index..=index], 16).map(|n| n * 17);
    let byte = |index: usize| u8::from_str_radix(&digits[index..index + 2], 16);
    let bad = |_| ParseError::invalid(ValueKind::Color, raw, "non-hex digit");

    let (red, green, blue, alpha) = match digits.len() {
        3 => (nibble(0).map_err(bad)?, nibble(1).map_err(bad)?, nibble(2).map_err(bad)?, None),
        4 => (
            nibble(0).map_err(bad)?,
            nibble(1).map_err(bad)?,
            nibble(2).map_err(bad)?,
            Some(f64::from(nibble(3).map_err(bad)?) / 255.0),
        ),
        6 => (byte(0).map_err(bad)?, byte(2).map_err(bad)?, byte(4).map_err(bad)?, None),
        8 => (
            byte(0).map_err(bad)?,
            byte(2).map_err(bad)?,
            byte(4).map_err(bad)?,
            Some(f64::from(byte(6).map_err(bad)?) / 255.0),
        ),
        _ => return Err(ParseError::invalid(ValueKind::Color, raw, "hex colors need 3, 4, 6, or 8 digits")),
    };

    Ok(ColorValue::from_rgba8(red, green, blue, alpha))
}

/// Split function arguments in either the legacy comma form or the modern `a b c / alpha` form.
fn color_arguments(args: &str) -> (Vec<&str>, Option<&str>) {
    if args.contains(',') {
        let mut parts = split_top_level(args, ',');
        let alpha = if parts.len() == 4 { parts.pop() } else { None };
        return (parts, alpha);
    }

    match args.split_once('/') {
        Some((channels, alpha)) => (split_whitespace_top_level(channels.trim()), Some(alpha.trim())),
        None => (split_whitespace_top_level(args.trim()), None),
    }
}

fn parse_alpha(raw: &str, alpha: Option<&str>) -> Result<Option<f64>, ParseError> {
    let Some(alpha) = alpha else {
        return Ok(None);
    };

    match split_number_unit(alpha) {
        Some((number, "")) => Ok(Some(number)),
        Some((number, "%")) => Ok(Some(number / 100.0)),
        _ => Err(ParseError::invalid(ValueKind::Color, raw, "invalid alpha channel")),
    }
}

fn parse_rgb_function(raw: &str, args: &str) -> Result<ColorValue, ParseError> {
    let (channels, alpha) = color_arguments(args);
    if channels.len() != 3 {
        return Err(ParseError::invalid(ValueKind::Color, raw, "rgb() takes three channels"));
    }

    let mut rgb = [0u8; 3];
    for (slot, channel) in rgb.iter_mut().zip(&channels) {
        *slot = match split_number_unit(channel) {
            Some((number, "")) => unit_to_channel(number / 255.0),
            Some((number, "%")) => unit_to_channel(number / 100.0),
            _ => return Err(ParseError::invalid(ValueKind::Color, raw, "invalid rgb channel")),
        };
    }

    let alpha = parse_alpha(raw, alpha)?;
    Ok(ColorValue::from_rgba8(rgb[0], rgb[1], rgb[2], alpha))
}

fn parse_hue(raw: &str, hue: &str) -> Result<f64, ParseError> {
    match split_number_unit(hue) {
        Some((number, "" | "deg")) => Ok(number),
        Some((number, "rad")) => Ok(number.to_degrees()),
        Some((number, "grad")) => Ok(number * 0.9),
        Some((number, "turn")) => Ok(number * 360.0),
        _ => Err(ParseError::invalid(ValueKind::Color, raw, "invalid hue")),
    }
}

fn parse_percentage(raw: &str, value: &str) -> Result<f64, ParseError> {
    match split_number_unit(value) {
        Some((number, "%" | "")) => Ok((number / 100.0).clamp(0.0, 1.0)),
        _ => Err(ParseError::invalid(ValueKind::Color, raw, "invalid saturation or lightness")),
    }
}

fn parse_hsl_function(raw: &str, args: &str) -> Result<ColorValue, ParseError> {
    let (channels, alpha) = color_arguments(args);
    let [hue, saturation, lightness] = channels.as_slice() else {
        return Err(ParseError::invalid(ValueKind::Color, raw, "hsl() takes three channels"));
    };

    let hue = parse_hue(raw, hue)?;
    let saturation = parse_percentage(raw, saturation)?;
    let lightness = parse_percentage(raw, lightness)?;

    #[expect(clippy::cast_possible_truncation, reason = "color math happens in f32")]
    let hsl: Hsl = Hsl::new(hue.rem_euclid(360.0) as f32, saturation as f32, lightness as f32);
    let rgb: Srgb = hsl.into_color();

    let alpha = parse_alpha(raw, alpha)?;
    Ok(ColorValue::from_rgba8(
        unit_to_channel(f64::from(rgb.red)),
        unit_to_channel(f64::from(rgb.green)),
        unit_to_channel(f64::from(rgb.blue)),
        alpha,
    ))
}
