use super::{ColorValue, DimensionOptions, DimensionValue, ParseError, ValueKind, parse_color, parse_dimension, split_top_level, split_whitespace_top_level};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowValue {
    pub color: ColorValue,
    pub offset_x: DimensionValue,
    pub offset_y: DimensionValue,
    pub blur: DimensionValue,
    pub spread: DimensionValue,
    pub inset: bool,
}

impl ShadowValue {
    #[must_use]
    pub fn identity_key(&self) -> String {
        format!(
            "{}{} {} {} {} {}",
            if self.inset { "inset " } else { "" },
            self.offset_x.identity_key(),
            self.offset_y.identity_key(),
            self.blur.identity_key(),
            self.spread.identity_key(),
            self.color.identity_key()
        )
    }

    /// A shadow that is fully transparent or has no extent draws nothing.
    #[must_use]
    pub fn is_invisible(&self) -> bool {
        self.color.is_transparent() || (self.offset_x.is_zero() && self.offset_y.is_zero() && self.blur.is_zero() && self.spread.is_zero())
    }
}

/// Parse a `box-shadow` value into one [`ShadowValue`] per comma-separated layer.
///
/// `none` yields an empty list. The color may lead or trail the lengths; a missing color
/// resolves to black.
pub fn parse_shadows(raw: &str, options: DimensionOptions) -> Result<Vec<ShadowValue>, ParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ParseError::Empty { kind: ValueKind::Shadow });
    }

    if value.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    split_top_level(value, ',').into_iter().map(|layer| parse_layer(raw, layer, options)).collect()
}

fn looks_numeric(token: &str) -> bool {
    token
        .as_bytes()
        .first()
        .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'))
}

fn parse_layer(raw: &str, layer: &str, options: DimensionOptions) -> Result<ShadowValue, ParseError> {
    let mut inset = false;
    let mut color = None;
    let mut lengths = Vec::with_capacity(4);

    for token in split_whitespace_top_level(layer) {
        if token.eq_ignore_ascii_case("inset") {
            if inset {
                return Err(ParseError::invalid(ValueKind::Shadow, raw, "repeated inset keyword"));
            }
            inset = true;
        } else if looks_numeric(token) {
            let length = parse_dimension(token, options).map_err(|_| ParseError::invalid(ValueKind::Shadow, raw, "invalid length"))?;
            lengths.push(length);
        } else {
            if color.is_some() {
                return Err(ParseError::invalid(ValueKind::Shadow, raw, "more than one color"));
            }
            color = Some(parse_color(token).map_err(|_| ParseError::invalid(ValueKind::Shadow, raw, "invalid color"))?);
        }
    }

    let zero = DimensionValue::px(0.0);
    let (offset_x, offset_y, blur, spread) = match lengths.as_slice() {
        [x, y] => (*x, *y, zero, zero),
        [x, y, blur] => (*x, *y, *blur, zero),
        [x, y, blur, spread] => (*x, *y, *blur, *spread),
        _ => return Err(ParseError::invalid(ValueKind::Shadow, raw, "expected two to four lengths")),
    };

    if blur.value < 0.0 {
        return Err(ParseError::invalid(ValueKind::Shadow, raw, "negative blur radius"));
    }

    Ok(ShadowValue {
        color: color.unwrap_or_else(ColorValue::black),
        offset_x,
        offset_y,
        blur,
        spread,
        inset,
    })
}
