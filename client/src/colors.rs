/// Highlight for "Do Your Job" districts and states.
pub const DYJD_COLOR: &str = "#ffa800";
/// District fill where at least one pledger has signed.
pub const PLEDGED_COLOR: &str = "#3a3474";
/// Base fill for states and districts before data arrives.
pub const BASE_FILL: &str = "#847aa3";
/// Mapbox choropleth value 0.
pub const NO_SCORE_FILL: &str = "#e7e7e7";
/// Ends of the Mapbox quantile ramp.
pub const SCORE_RAMP: (&str, &str) = ("#d4d0f1", "#7366b7");

/// Leaflet fixed buckets: zero pledgers, then 1, 2, 3 and 4+.
pub const STATE_BUCKETS: [&str; 5] = ["#f2f0f7", "#cbc9e2", "#9e9ac8", "#756bb1", "#54278f"];
pub const STATE_BORDER: &str = "#ccc77a";
pub const DISTRICT_BORDER: &str = "#ffffff";
