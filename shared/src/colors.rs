/// Parse `#rrggbb` (leading `#` optional) into RGB.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let t = t.clamp(0.0, 1.0);
    let value = a as f64 + (b as f64 - a as f64) * t;
    value.round().clamp(0.0, 255.0) as u8
}

/// `count` evenly spaced colors from `from` to `to` (inclusive), interpolated
/// per RGB channel.
pub fn linear_scale(from: (u8, u8, u8), to: (u8, u8, u8), count: usize) -> Vec<String> {
    match count {
        0 => Vec::new(),
        1 => vec![to_hex(from.0, from.1, from.2)],
        _ => (0..count)
            .map(|i| {
                let t = i as f64 / (count - 1) as f64;
                to_hex(
                    lerp_u8(from.0, to.0, t),
                    lerp_u8(from.1, to.1, t),
                    lerp_u8(from.2, to.2, t),
                )
            })
            .collect(),
    }
}

/// Class breaks splitting `values` into `classes` quantile classes.
///
/// Returns `classes + 1` limits: the minimum, the interior quantiles
/// (linearly interpolated between neighbours) and the maximum. Empty input
/// yields no limits.
pub fn quantile_limits(values: &[f64], classes: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || classes == 0 {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    let last = sorted.len() - 1;
    let mut limits = Vec::with_capacity(classes + 1);
    limits.push(sorted[0]);
    for i in 1..classes {
        let position = last as f64 * i as f64 / classes as f64;
        let below = position.floor() as usize;
        let frac = position - below as f64;
        let value = if frac == 0.0 || below >= last {
            sorted[below.min(last)]
        } else {
            sorted[below] * (1.0 - frac) + sorted[below + 1] * frac
        };
        limits.push(value);
    }
    limits.push(sorted[last]);
    limits
}
