use serde_json::{Value, json};

use crate::colors::NO_SCORE_FILL;

/// `interpolate linear` over `value`, pinned to [`NO_SCORE_FILL`] at 0 and
/// then one stop per break/color pair. Stops that would not be strictly
/// ascending are dropped since the renderer rejects them.
pub fn color_expression(breaks: &[f64], colors: &[String], value: Value) -> Value {
    let mut expression = vec![
        json!("interpolate"),
        json!(["linear"]),
        json!(["to-number", value]),
        json!(0),
        json!(NO_SCORE_FILL),
    ];

    let mut last = 0.0_f64;
    for (stop, color) in breaks.iter().zip(colors) {
        if !stop.is_finite() || *stop <= last {
            continue;
        }
        expression.push(json!(stop));
        expression.push(json!(color));
        last = *stop;
    }

    // interpolate needs at least two stops.
    if expression.len() == 5 {
        expression.push(json!(1));
        expression.push(json!(NO_SCORE_FILL));
    }
    Value::Array(expression)
}

/// `when_true` if the boolean feature-state `key` is set, else `when_false`.
/// An unset flag reads as true, so freshly loaded features are highlighted
/// until the first reset pass clears them.
pub fn feature_flag_case(key: &str, when_true: Value, when_false: Value) -> Value {
    json!([
        "case",
        ["boolean", ["feature-state", key], true],
        when_true,
        when_false
    ])
}

pub fn feature_state(key: &str) -> Value {
    json!(["feature-state", key])
}
