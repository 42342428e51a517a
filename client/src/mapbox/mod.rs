//! Vector-map adapter: choropleth and "Do Your Job" highlighting through
//! feature state on the `states` / `districts` GeoJSON sources.

pub mod bindings;
pub mod expression;

use pledge_map_shared::colors::{linear_scale, parse_hex, quantile_limits};
use pledge_map_shared::dictionaries::STATES;
use pledge_map_shared::{
    DistrictSlice, DoYourJobDistricts, DyjTarget, FeatureId, StateGroups, StateSlice, Status,
};
use serde_json::{Value, json};

use crate::colors::{BASE_FILL, DYJD_COLOR, PLEDGED_COLOR, SCORE_RAMP};
use crate::engine::{FeatureRef, FeatureState, GeoJsonSource, LayerKind, LayerSpec, MapEngine};
use crate::geo::LngLatBounds;
use expression::{color_expression, feature_flag_case, feature_state};

pub const STATES_SOURCE: &str = "states";
pub const DISTRICTS_SOURCE: &str = "districts";
pub const STATES_URL: &str = "/data/states.geojson";
pub const DISTRICTS_URL: &str = "/data/districts.geojson";

pub const STATES_FILL: &str = "states-fill";
pub const DISTRICTS_FILL: &str = "districts-fill";
pub const DYJ_STATES_OUTLINE: &str = "dyj-states-outline";
pub const DYJ_DISTRICT_FILL: &str = "dyj-district-level-color-fill";
/// Base-style layers the data layers slot beneath.
pub const DISTRICT_NUMBER_LABELS: &str = "district_high_number";
pub const STATE_BORDER: &str = "state border";

pub const DYJ_FLAG: &str = "doYourJobDistrict";
pub const PLEDGED_FLAG: &str = "pledged";
pub const COLOR_VALUE: &str = "colorValue";

const SCORE_CLASSES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLevel {
    States,
    Districts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapMetadata {
    pub level: MapLevel,
    pub selected_state: Option<String>,
}

/// Breaks and colors used by the last choropleth pass, for the legend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoroplethScale {
    pub breaks: Vec<f64>,
    pub colors: Vec<String>,
}

pub struct MbMap<E: MapEngine> {
    engine: E,
    metadata: MapMetadata,
}

impl<E: MapEngine> MbMap<E> {
    pub fn new(engine: E, selected_state: Option<String>) -> Self {
        Self {
            engine,
            metadata: MapMetadata {
                level: MapLevel::States,
                selected_state,
            },
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn metadata(&self) -> &MapMetadata {
        &self.metadata
    }

    pub fn set_selected_state(&mut self, selected_state: Option<String>) {
        self.metadata.level = if selected_state.is_some() {
            MapLevel::Districts
        } else {
            MapLevel::States
        };
        self.metadata.selected_state = selected_state;
    }

    /// Runs once the engine reports its style loaded.
    pub fn on_load(&mut self, bounds: LngLatBounds, padding: f64) {
        self.add_sources();
        self.engine.fit_bounds(bounds, padding);
    }

    pub fn add_sources(&mut self) {
        if !self.engine.has_source(STATES_SOURCE) {
            self.engine
                .add_source(STATES_SOURCE, &GeoJsonSource::url(STATES_URL));
        }
        if !self.engine.has_source(DISTRICTS_SOURCE) {
            self.engine
                .add_source(DISTRICTS_SOURCE, &GeoJsonSource::url(DISTRICTS_URL));
        }
    }

    pub fn set_feature_state(&mut self, id: FeatureId, source: &str, state: &FeatureState) {
        self.engine
            .set_feature_state(FeatureRef { id, source }, state);
    }

    fn set_flag(&mut self, id: FeatureId, source: &str, key: &str, value: Value) {
        let mut state = FeatureState::new();
        state.insert(key.to_owned(), value);
        self.set_feature_state(id, source, &state);
    }

    fn clear_district_flags(&mut self, abbr: &str, districts: u32) {
        for district in 0..=districts {
            if let Some(id) = FeatureId::district(abbr, district) {
                self.set_flag(id, DISTRICTS_SOURCE, DYJ_FLAG, json!(false));
            }
        }
    }

    pub fn reset_all_state_dyj_flags_to_false(&mut self) {
        for state in STATES {
            if let Some(id) = FeatureId::state(state.abbr) {
                self.set_flag(id, STATES_SOURCE, DYJ_FLAG, json!(false));
            }
            self.clear_district_flags(state.abbr, state.districts);
        }
    }

    /// Clears district flags everywhere except `selected_state`.
    pub fn reset_do_your_job_district_flags_to_false(&mut self, selected_state: Option<&str>) {
        for state in STATES {
            if selected_state == Some(state.abbr) {
                continue;
            }
            self.clear_district_flags(state.abbr, state.districts);
        }
    }

    pub fn color_by_dyj(&mut self, codes: &DoYourJobDistricts, selected_state: Option<&str>) {
        self.add_state_and_district_dyj_layers();
        self.add_dyj_district_fill_layer();

        self.reset_all_state_dyj_flags_to_false();
        self.reset_do_your_job_district_flags_to_false(selected_state);

        for code in codes.in_state(selected_state) {
            let Some((id, target)) = code.target() else {
                continue;
            };
            let source = match target {
                DyjTarget::State => STATES_SOURCE,
                DyjTarget::District => DISTRICTS_SOURCE,
            };
            self.set_flag(id, source, DYJ_FLAG, json!(true));
        }
    }

    pub fn color_states_by_pledgers_and_dyj(
        &mut self,
        codes: &DoYourJobDistricts,
        items: &StateSlice,
    ) -> ChoroplethScale {
        let scale = self.state_choropleth_fill(items);
        self.color_by_dyj(codes, None);
        scale
    }

    pub fn color_districts_by_pledgers_and_dyj(
        &mut self,
        codes: &DoYourJobDistricts,
        items: &DistrictSlice,
        selected_state: Option<&str>,
    ) {
        self.color_by_dyj(codes, selected_state);
        for (state, districts) in items {
            let Some(districts) = districts else {
                continue;
            };
            for (key, records) in districts {
                let Some(id) = key.district().and_then(|d| FeatureId::district(state, d)) else {
                    continue;
                };
                let pledged = records
                    .as_ref()
                    .is_some_and(|records| records.iter().any(|r| r.pledged));
                self.set_flag(id, DISTRICTS_SOURCE, PLEDGED_FLAG, json!(pledged));
            }
        }
    }

    pub fn state_choropleth_fill(&mut self, items: &StateSlice) -> ChoroplethScale {
        self.add_states_fill_layer();

        let mut domain = Vec::new();
        for (state, groups) in items {
            let score = groups.as_ref().map(nominee_score).unwrap_or(0.0);
            if score > 0.0 {
                domain.push(score);
            }
            if let Some(id) = FeatureId::state(state) {
                self.set_flag(id, STATES_SOURCE, COLOR_VALUE, json!(score));
            }
        }

        let from = parse_hex(SCORE_RAMP.0).unwrap_or((212, 208, 241));
        let to = parse_hex(SCORE_RAMP.1).unwrap_or((115, 102, 183));
        let colors = linear_scale(from, to, SCORE_CLASSES + 1);
        let breaks = quantile_limits(&domain, SCORE_CLASSES);
        let fill = color_expression(&breaks, &colors, feature_state(COLOR_VALUE));
        self.engine
            .set_paint_property(STATES_FILL, "fill-color", &fill);
        ChoroplethScale { breaks, colors }
    }

    pub fn add_states_fill_layer(&mut self) {
        if self.engine.has_layer(STATES_FILL) {
            return;
        }
        self.add_sources();
        let layer = LayerSpec::new(STATES_FILL, LayerKind::Fill, STATES_SOURCE)
            .paint("fill-color", json!(BASE_FILL))
            .paint("fill-opacity", json!(1));
        self.engine.add_layer(&layer, Some(DISTRICT_NUMBER_LABELS));
    }

    pub fn add_dyj_district_fill_layer(&mut self) {
        if self.engine.has_layer(DISTRICTS_FILL) {
            return;
        }
        self.add_sources();
        let layer = LayerSpec::new(DISTRICTS_FILL, LayerKind::Fill, DISTRICTS_SOURCE)
            .paint(
                "fill-color",
                feature_flag_case(DYJ_FLAG, json!(DYJD_COLOR), json!(BASE_FILL)),
            )
            .paint(
                "fill-opacity",
                feature_flag_case(PLEDGED_FLAG, json!(0.6), json!(0)),
            );
        self.engine.add_layer(&layer, Some(DISTRICT_NUMBER_LABELS));
    }

    pub fn add_state_and_district_dyj_layers(&mut self) {
        if self.engine.has_layer(DYJ_STATES_OUTLINE) {
            return;
        }
        self.add_sources();
        let outline = LayerSpec::new(DYJ_STATES_OUTLINE, LayerKind::Line, STATES_SOURCE)
            .paint("line-color", json!(DYJD_COLOR))
            .paint("line-width", json!(2))
            .paint("line-opacity", feature_flag_case(DYJ_FLAG, json!(1), json!(0)));
        self.engine.add_layer(&outline, None);

        let fill = LayerSpec::new(DYJ_DISTRICT_FILL, LayerKind::Fill, DISTRICTS_SOURCE)
            .paint("fill-opacity", feature_flag_case(DYJ_FLAG, json!(1), json!(0)))
            .paint(
                "fill-color",
                feature_flag_case(DYJ_FLAG, json!(DYJD_COLOR), json!(PLEDGED_COLOR)),
            )
            .paint(
                "fill-outline-color",
                feature_flag_case(DYJ_FLAG, json!(PLEDGED_COLOR), json!("white")),
            );
        self.engine.add_layer(&fill, Some(STATE_BORDER));
    }
}

/// Pledged nominees per seat slot, scaled to 0..10. Each partition counts as
/// two slots; a state with no partitions scores 0.
pub fn nominee_score(groups: &StateGroups) -> f64 {
    let slots = groups.len() * 2;
    if slots == 0 {
        return 0.0;
    }
    let pledged_nominees = groups
        .values()
        .flatten()
        .filter(|record| record.pledged && record.status == Status::Nominee)
        .count();
    pledged_nominees as f64 / slots as f64 * 10.0
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pledge_map_shared::{FilterCriteria, GroupKey, PledgerRecord, PledgerStore};
    use pledge_map_shared::grouping::{group_by_state_and_district, pledgers_by_district, pledgers_by_state};

    use super::*;
    use crate::engine::MemoryEngine;
    use crate::geo::CONTINENTAL_US;

    fn nominee(state: &str, district: Option<u32>, pledged: bool) -> PledgerRecord {
        PledgerRecord {
            name: format!("{state}-{district:?}"),
            state: state.into(),
            district,
            role: if district.is_some() { "Rep" } else { "Senate" }.into(),
            status: Status::Nominee,
            pledged,
            incumbent: false,
        }
    }

    fn store() -> PledgerStore {
        let mut store = PledgerStore::new();
        store.insert(
            "CA".into(),
            vec![
                nominee("CA", Some(12), true),
                nominee("CA", Some(5), false),
                nominee("CA", None, true),
            ],
        );
        store.insert("TX".into(), vec![nominee("TX", Some(7), true)]);
        store.insert("WA".into(), vec![nominee("WA", Some(1), false)]);
        store
    }

    fn base_engine() -> MemoryEngine {
        MemoryEngine::new()
            .with_base_layer(STATE_BORDER, "composite")
            .with_base_layer(DISTRICT_NUMBER_LABELS, "composite")
    }

    fn codes(list: &[&str]) -> DoYourJobDistricts {
        list.iter()
            .map(|code| code.parse().expect("valid code"))
            .collect()
    }

    #[test]
    fn layer_creation_is_idempotent() {
        let mut map = MbMap::new(base_engine(), None);
        for _ in 0..2 {
            map.add_states_fill_layer();
            map.add_dyj_district_fill_layer();
            map.add_state_and_district_dyj_layers();
        }
        for id in [STATES_FILL, DISTRICTS_FILL, DYJ_STATES_OUTLINE, DYJ_DISTRICT_FILL] {
            let count = map.engine().layers.iter().filter(|l| l.id == id).count();
            assert_eq!(count, 1, "{id}");
        }
        assert_eq!(map.engine().sources.len(), 2);
    }

    #[test]
    fn data_layers_sit_below_base_labels() {
        let mut map = MbMap::new(base_engine(), None);
        map.add_states_fill_layer();
        map.add_state_and_district_dyj_layers();
        let engine = map.engine();
        let position = |id| engine.layer_position(id).expect("layer present");
        assert!(position(STATES_FILL) < position(DISTRICT_NUMBER_LABELS));
        assert!(position(DYJ_DISTRICT_FILL) < position(STATE_BORDER));
    }

    #[test]
    fn on_load_adds_sources_and_fits() {
        let mut map = MbMap::new(MemoryEngine::new(), None);
        map.on_load(CONTINENTAL_US, 20.0);
        assert!(map.engine().has_source(STATES_SOURCE));
        assert!(map.engine().has_source(DISTRICTS_SOURCE));
        assert_eq!(map.engine().fitted, Some((CONTINENTAL_US, 20.0)));
    }

    #[test]
    fn color_by_dyj_flags_codes_and_clears_the_rest() {
        let mut map = MbMap::new(base_engine(), None);
        map.color_by_dyj(&codes(&["CA-5", "ME"]), None);
        let engine = map.engine();

        assert_eq!(engine.flag(DISTRICTS_SOURCE, FeatureId(605), DYJ_FLAG), Some(&json!(true)));
        assert_eq!(engine.flag(STATES_SOURCE, FeatureId(23), DYJ_FLAG), Some(&json!(true)));
        assert_eq!(engine.flag(DISTRICTS_SOURCE, FeatureId(612), DYJ_FLAG), Some(&json!(false)));
        assert_eq!(engine.flag(STATES_SOURCE, FeatureId(6), DYJ_FLAG), Some(&json!(false)));
        // At-large seat 00 is reset too.
        assert_eq!(engine.flag(DISTRICTS_SOURCE, FeatureId(5600), DYJ_FLAG), Some(&json!(false)));
    }

    #[test]
    fn color_by_dyj_limits_codes_to_selected_state() {
        let mut map = MbMap::new(base_engine(), Some("CA".into()));
        map.color_by_dyj(&codes(&["CA-5", "NY-3"]), Some("CA"));
        let engine = map.engine();
        assert_eq!(engine.flag(DISTRICTS_SOURCE, FeatureId(605), DYJ_FLAG), Some(&json!(true)));
        assert_eq!(engine.flag(DISTRICTS_SOURCE, FeatureId(3603), DYJ_FLAG), Some(&json!(false)));
    }

    #[test]
    fn reset_district_flags_skips_selected_state() {
        let mut map = MbMap::new(base_engine(), None);
        map.reset_do_your_job_district_flags_to_false(Some("CA"));
        let engine = map.engine();
        assert!(engine.feature_state(DISTRICTS_SOURCE, FeatureId(605)).is_none());
        assert!(engine.feature_state(DISTRICTS_SOURCE, FeatureId(4807)).is_some());
        assert!(engine.feature_state(STATES_SOURCE, FeatureId(48)).is_none());
    }

    #[test]
    fn nominee_score_handles_empty_state() {
        assert_eq!(nominee_score(&BTreeMap::new()), 0.0);
        let mut groups = StateGroups::new();
        groups.insert(GroupKey::District(1), Vec::new());
        assert_eq!(nominee_score(&groups), 0.0);
    }

    #[test]
    fn choropleth_scores_and_paints_states() {
        let grouped = group_by_state_and_district(&store(), &FilterCriteria::new());
        let mut items = pledgers_by_state(&grouped, None);
        items.insert("VT".into(), None);

        let mut map = MbMap::new(base_engine(), None);
        let scale = map.state_choropleth_fill(&items);
        let engine = map.engine();

        // CA: 2 pledged nominees over 3 partitions -> 2 / 6 * 10.
        let ca = engine.flag(STATES_SOURCE, FeatureId(6), COLOR_VALUE).and_then(Value::as_f64);
        assert!((ca.expect("CA scored") - 10.0 / 3.0).abs() < 1e-9);
        // TX: 1 over 1 partition -> 5.
        assert_eq!(engine.flag(STATES_SOURCE, FeatureId(48), COLOR_VALUE), Some(&json!(5.0)));
        assert_eq!(engine.flag(STATES_SOURCE, FeatureId(53), COLOR_VALUE), Some(&json!(0.0)));
        assert_eq!(engine.flag(STATES_SOURCE, FeatureId(50), COLOR_VALUE), Some(&json!(0.0)));

        assert_eq!(scale.colors.len(), 4);
        assert_eq!(scale.breaks.len(), 4);
        assert!(scale.breaks.iter().all(|b| b.is_finite() && *b > 0.0));

        let fill = &engine.layer(STATES_FILL).expect("states-fill").paint["fill-color"];
        assert_eq!(fill[0], json!("interpolate"));
        assert_eq!(fill[4], json!("#e7e7e7"));
    }

    #[test]
    fn districts_get_pledged_flags() {
        let grouped = group_by_state_and_district(&store(), &FilterCriteria::new());
        let by_state = pledgers_by_state(&grouped, Some("CA"));
        let items = pledgers_by_district(&by_state, Some("CA"), &["12".into(), "5".into(), "9".into()]);

        let mut map = MbMap::new(base_engine(), Some("CA".into()));
        map.color_districts_by_pledgers_and_dyj(&DoYourJobDistricts::default(), &items, Some("CA"));
        let engine = map.engine();
        assert_eq!(engine.flag(DISTRICTS_SOURCE, FeatureId(612), PLEDGED_FLAG), Some(&json!(true)));
        assert_eq!(engine.flag(DISTRICTS_SOURCE, FeatureId(605), PLEDGED_FLAG), Some(&json!(false)));
        assert_eq!(engine.flag(DISTRICTS_SOURCE, FeatureId(609), PLEDGED_FLAG), Some(&json!(false)));
    }

    #[test]
    fn selecting_a_state_switches_level() {
        let mut map = MbMap::new(MemoryEngine::new(), None);
        assert_eq!(map.metadata().level, MapLevel::States);
        map.set_selected_state(Some("OR".into()));
        assert_eq!(map.metadata().level, MapLevel::Districts);
        assert_eq!(map.metadata().selected_state.as_deref(), Some("OR"));
    }
}
