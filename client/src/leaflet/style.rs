use pledge_map_shared::PledgerRecord;
use serde::Serialize;

use crate::colors::{DISTRICT_BORDER, STATE_BORDER, STATE_BUCKETS};

/// Leaflet path options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<&'static str>,
    pub weight: f64,
    pub opacity: f64,
    pub color: &'static str,
    pub fill_opacity: f64,
}

/// Fixed buckets by raw pledger count: 1, 2, 3, then 4 and up.
pub fn state_fill_color(count: usize) -> &'static str {
    STATE_BUCKETS[count.min(STATE_BUCKETS.len() - 1)]
}

pub fn state_style(count: usize) -> PathStyle {
    PathStyle {
        fill_color: Some(state_fill_color(count)),
        weight: 2.0,
        opacity: 0.5,
        color: STATE_BORDER,
        fill_opacity: 1.0,
    }
}

/// Outline only; districts never fill.
pub fn district_style() -> PathStyle {
    PathStyle {
        fill_color: None,
        weight: 3.0,
        opacity: 1.0,
        color: DISTRICT_BORDER,
        fill_opacity: 0.0,
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Hover card for a state: one line per pledger, then a click hint.
pub fn state_tooltip(name: &str, records: &[PledgerRecord]) -> String {
    let mut html = format!("<h4>{}</h4>", escape_html(name));
    for person in records {
        let kind = if person.incumbent {
            "incumbent"
        } else {
            "candidate"
        };
        let negation = if person.pledged { "" } else { " not" };
        html.push_str(&format!(
            "<h6>{} ({}, {kind}) has{negation} taken the town hall pledge.</h6>",
            escape_html(&person.name),
            escape_html(&person.seat_label()),
        ));
    }
    html.push_str("<h6><em>(Please click for more information)</em></h6>");
    html
}
