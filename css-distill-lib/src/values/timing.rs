use super::{ParseError, ValueKind, format_number, round_to, split_number_unit, split_top_level, split_whitespace_top_level};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A time value in canonical milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationValue {
    pub milliseconds: f64,
}

impl DurationValue {
    #[must_use]
    pub fn from_millis(milliseconds: f64) -> Self {
        Self {
            milliseconds: round_to(milliseconds, 3),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.milliseconds == 0.0
    }

    #[must_use]
    pub fn identity_key(&self) -> String {
        format!("{}ms", format_number(self.milliseconds))
    }
}

/// Where the jumps of a `steps()` function happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StepPosition {
    #[strum(to_string = "start", serialize = "jump-start")]
    Start,

    #[strum(to_string = "end", serialize = "jump-end")]
    End,

    JumpNone,
    JumpBoth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TimingFunctionValue {
    /// A named easing. Bezier-defined keywords carry their control points.
    #[serde(rename_all = "camelCase")]
    Keyword {
        keyword: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        control_points: Option<[f64; 4]>,
    },

    #[serde(rename_all = "camelCase")]
    CubicBezier { control_points: [f64; 4] },

    Steps { count: u32, position: StepPosition },
}

impl TimingFunctionValue {
    #[must_use]
    pub fn identity_key(&self) -> String {
        match self {
            Self::Keyword { keyword, .. } => keyword.clone(),
            Self::CubicBezier { control_points } => {
                let points: Vec<_> = control_points.iter().map(|p| format_number(*p)).collect();
                format!("cubic-bezier({})", points.join(","))
            }
            Self::Steps { count, position } => format!("steps({count},{position})"),
        }
    }
}

fn keyword_points(keyword: &str) -> Option<Option<[f64; 4]>> {
    match keyword {
        "linear" => Some(Some([0.0, 0.0, 1.0, 1.0])),
        "ease" => Some(Some([0.25, 0.1, 0.25, 1.0])),
        "ease-in" => Some(Some([0.42, 0.0, 1.0, 1.0])),
        "ease-out" => Some(Some([0.0, 0.0, 0.58, 1.0])),
        "ease-in-out" => Some(Some([0.42, 0.0, 0.58, 1.0])),
        "step-start" | "step-end" => Some(None),
        _ => None,
    }
}

/// Parse a single `<time>` such as `200ms`, `.3s`, or a bare `0`.
pub fn parse_duration(raw: &str) -> Result<DurationValue, ParseError> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Err(ParseError::Empty { kind: ValueKind::Duration });
    }

    match split_number_unit(&value) {
        Some((number, "ms")) => Ok(DurationValue::from_millis(number)),
        Some((number, "s")) => Ok(DurationValue::from_millis(number * 1000.0)),
        Some((number, "")) if number == 0.0 => Ok(DurationValue::from_millis(0.0)),
        Some(_) => Err(ParseError::invalid(ValueKind::Duration, raw, "expected ms or s")),
        None => Err(ParseError::invalid(ValueKind::Duration, raw, "not a number")),
    }
}

/// Parse a comma-separated list of times, as found in `transition-duration`.
pub fn parse_durations(raw: &str) -> Result<Vec<DurationValue>, ParseError> {
    let parts = split_top_level(raw, ',');
    if parts.is_empty() {
        return Err(ParseError::Empty { kind: ValueKind::Duration });
    }

    parts.into_iter().map(parse_duration).collect()
}

/// Parse one easing function: a keyword, `cubic-bezier()`, or `steps()`.
pub fn parse_timing_function(raw: &str) -> Result<TimingFunctionValue, ParseError> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Err(ParseError::Empty {
            kind: ValueKind::TimingFunction,
        });
    }

    if let Some(args) = value.strip_prefix("cubic-bezier(").and_then(|rest| rest.strip_suffix(')')) {
        return parse_cubic_bezier(raw, args);
    }

    if let Some(args) = value.strip_prefix("steps(").and_then(|rest| rest.strip_suffix(')')) {
        return parse_steps(raw, args);
    }

    match value.as_str() {
        "step-start" => Ok(TimingFunctionValue::Steps {
            count: 1,
            position: StepPosition::Start,
        }),
        "step-end" => Ok(TimingFunctionValue::Steps {
            count: 1,
            position: StepPosition::End,
        }),
        keyword => match keyword_points(keyword) {
            Some(control_points) => Ok(TimingFunctionValue::Keyword {
                keyword: keyword.to_string(),
                control_points,
            }),
            None => Err(ParseError::invalid(ValueKind::TimingFunction, raw, "unknown easing keyword")),
        },
    }
}

fn parse_cubic_bezier(raw: &str, args: &str) -> Result<TimingFunctionValue, ParseError> {
    let parts = split_top_level(args, ',');
    let [x1, y1, x2, y2] = parts.as_slice() else {
        return Err(ParseError::invalid(ValueKind::TimingFunction, raw, "cubic-bezier() takes four numbers"));
    };

    let mut points = [0.0; 4];
    for (slot, part) in points.iter_mut().zip([x1, y1, x2, y2]) {
        *slot = match split_number_unit(part) {
            Some((number, "")) => round_to(number, 3),
            _ => return Err(ParseError::invalid(ValueKind::TimingFunction, raw, "invalid cubic-bezier() argument")),
        };
    }

    if !(0.0..=1.0).contains(&points[0]) || !(0.0..=1.0).contains(&points[2]) {
        return Err(ParseError::invalid(ValueKind::TimingFunction, raw, "x coordinates must be within [0, 1]"));
    }

    Ok(TimingFunctionValue::CubicBezier { control_points: points })
}

fn parse_steps(raw: &str, args: &str) -> Result<TimingFunctionValue, ParseError> {
    let parts = split_top_level(args, ',');
    let (count, position) = match parts.as_slice() {
        [count] => (*count, StepPosition::End),
        [count, position] => (
            *count,
            position
                .parse::<StepPosition>()
                .map_err(|_| ParseError::invalid(ValueKind::TimingFunction, raw, "unknown steps() position"))?,
        ),
        _ => return Err(ParseError::invalid(ValueKind::TimingFunction, raw, "steps() takes one or two arguments")),
    };

    let count: u32 = count
        .parse()
        .map_err(|_| ParseError::invalid(ValueKind::TimingFunction, raw, "steps() count must be a positive integer"))?;

    let minimum = if position == StepPosition::JumpNone { 2 } else { 1 };
    if count < minimum {
        return Err(ParseError::invalid(ValueKind::TimingFunction, raw, "too few steps"));
    }

    Ok(TimingFunctionValue::Steps { count, position })
}

/// Parse a comma-separated list of easing functions, as found in `transition-timing-function`.
pub fn parse_timing_functions(raw: &str) -> Result<Vec<TimingFunctionValue>, ParseError> {
    let parts = split_top_level(raw, ',');
    if parts.is_empty() {
        return Err(ParseError::Empty {
            kind: ValueKind::TimingFunction,
        });
    }

    parts.into_iter().map(parse_timing_function).collect()
}

/// One comma-separated layer of a `transition` or `animation` shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionLayer {
    /// The transitioned property or animation name, if present.
    pub target: Option<String>,
    pub duration: DurationValue,
    pub delay: DurationValue,
    pub timing_function: Option<TimingFunctionValue>,
}

/// Parse a `transition`/`animation` shorthand.
///
/// The first time in a layer is its duration and the second its delay. Tokens that are neither a
/// time nor an easing are treated as the target; only the first one is kept.
pub fn parse_transition(raw: &str) -> Result<Vec<TransitionLayer>, ParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ParseError::Empty { kind: ValueKind::Duration });
    }

    if value.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    split_top_level(value, ',')
        .into_iter()
        .map(|layer| {
            let mut times = Vec::with_capacity(2);
            let mut timing_function = None;
            let mut target = None;

            for token in split_whitespace_top_level(layer) {
                if let Ok(time) = parse_duration(token) {
                    if times.len() == 2 {
                        return Err(ParseError::invalid(ValueKind::Duration, raw, "more than two times in one layer"));
                    }
                    times.push(time);
                } else if let Ok(function) = parse_timing_function(token) {
                    timing_function = Some(function);
                } else if target.is_none() {
                    target = Some(token.to_string());
                }
            }

            let zero = DurationValue::from_millis(0.0);
            Ok(TransitionLayer {
                target,
                duration: times.first().copied().unwrap_or(zero),
                delay: times.get(1).copied().unwrap_or(zero),
                timing_function,
            })
        })
        .collect()
}
