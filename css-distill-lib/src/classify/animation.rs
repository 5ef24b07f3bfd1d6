use super::Classification;
use crate::values::{DurationValue, TimingFunctionValue, format_number, kebab_segment};

fn millis_segment(duration: &DurationValue) -> String {
    let digits = kebab_segment(&format_number(duration.milliseconds.abs()));
    if duration.milliseconds < 0.0 {
        format!("neg-{digits}")
    } else {
        digits
    }
}

#[must_use]
pub fn classify_duration(duration: &DurationValue) -> Classification {
    Classification::new("duration", format!("duration-{}", millis_segment(duration)))
}

#[must_use]
pub fn classify_delay(delay: &DurationValue) -> Classification {
    Classification::new("delay", format!("delay-{}", millis_segment(delay)))
}

#[must_use]
pub fn classify_easing(function: &TimingFunctionValue) -> Classification {
    let name = match function {
        TimingFunctionValue::Keyword { keyword, .. } => format!("easing-{keyword}"),
        TimingFunctionValue::CubicBezier { control_points } => {
            let points: Vec<_> = control_points.iter().map(|p| kebab_segment(&format_number(*p))).collect();
            format!("easing-cubic-bezier-{}", points.join("-"))
        }
        TimingFunctionValue::Steps { count, position } => format!("easing-steps-{count}-{position}"),
    };

    Classification::new("easing", name)
}
