//! Owns the live map for the page and routes derived views into whichever
//! adapter is mounted.

use std::cell::RefCell;
use std::sync::Arc;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use pledge_map_shared::dictionaries::state_abbr;
use pledge_map_shared::{
    DistrictSlice, DoYourJobDistricts, PledgeState, PledgerStore, Selectors, StateSlice,
};

use crate::data::fetch_geojson;
use crate::engine::MapEngine;
use crate::geo::CONTINENTAL_US;
use crate::leaflet::bindings::{JsLeafletMap, event_layer_bounds};
use crate::leaflet::{LeafletMap, OverlayLayer};
use crate::mapbox::bindings::JsMapboxMap;
use crate::mapbox::{
    ChoroplethScale, DISTRICTS_URL, MapLevel, MapMetadata, MbMap, STATES_FILL, STATES_URL,
};
use crate::settings::EngineKind;

pub const MAP_CONTAINER: &str = "map";
const FIT_PADDING: f64 = 20.0;

pub enum MapView {
    Mapbox(MbMap<JsMapboxMap>),
    Leaflet(LeafletMap<JsLeafletMap>),
}

thread_local! {
    static MAP_VIEW: RefCell<Option<MapView>> = const { RefCell::new(None) };
}

/// Runs `f` against the mounted map. Returns `None` when nothing is mounted
/// or the map is already borrowed further up the stack.
pub fn with_map_view<R>(f: impl FnOnce(&mut MapView) -> R) -> Option<R> {
    MAP_VIEW.with(|slot| {
        let mut slot = slot.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    })
}

fn install(view: MapView) {
    MAP_VIEW.with(|slot| {
        // Dropping the previous view removes its map from the page.
        let _old = slot.borrow_mut().replace(view);
    });
}

/// Everything a restyle pass reads, pulled out of the memoized selectors.
#[derive(Clone, Default)]
pub struct Derived {
    pub pledgers: Option<Arc<PledgerStore>>,
    pub by_state: Option<Arc<StateSlice>>,
    pub by_district: Option<Arc<DistrictSlice>>,
    pub selected_state: Option<String>,
    pub total_pledged: Option<usize>,
    pub pledged_on_ballot: Option<usize>,
}

impl Derived {
    pub fn compute(selectors: &mut Selectors, state: &PledgeState) -> Self {
        Self {
            pledgers: selectors.filtered_pledgers(state),
            by_state: selectors.pledgers_by_state(state),
            by_district: selectors.pledgers_by_district(state),
            selected_state: state.selection().selected_state.clone(),
            total_pledged: selectors.total_pledged(state),
            pledged_on_ballot: selectors.pledged_on_ballot(state),
        }
    }
}

/// States level colors every state and returns the legend scale; district
/// level colors the selected state's districts only.
pub fn restyle_mapbox<E: MapEngine>(
    map: &mut MbMap<E>,
    derived: &Derived,
    codes: &DoYourJobDistricts,
) -> Option<ChoroplethScale> {
    map.set_selected_state(derived.selected_state.clone());
    let MapMetadata {
        level,
        selected_state,
    } = map.metadata().clone();
    match level {
        MapLevel::States => derived
            .by_state
            .as_deref()
            .map(|items| map.color_states_by_pledgers_and_dyj(codes, items)),
        MapLevel::Districts => {
            if let Some(items) = derived.by_district.as_deref() {
                map.color_districts_by_pledgers_and_dyj(codes, items, selected_state.as_deref());
            }
            None
        }
    }
}

/// Push the latest derived view into the mounted map.
pub fn restyle(derived: &Derived, codes: &DoYourJobDistricts) -> Option<ChoroplethScale> {
    with_map_view(|view| match view {
        MapView::Mapbox(map) => restyle_mapbox(map, derived, codes),
        MapView::Leaflet(map) => {
            if let Some(pledgers) = derived.pledgers.clone() {
                map.set_pledgers(pledgers);
            }
            None
        }
    })
    .flatten()
}

const FALLBACK_SCREEN_WIDTH: f64 = 1280.0;

fn screen_width() -> f64 {
    width_or_fallback(
        web_sys::window()
            .and_then(|w| w.screen().ok())
            .and_then(|s| s.width().ok()),
    )
}

fn width_or_fallback(width: Option<i32>) -> f64 {
    width
        .filter(|w| *w > 0)
        .map_or(FALLBACK_SCREEN_WIDTH, f64::from)
}

/// Mount the chosen engine into [`MAP_CONTAINER`]. `ready` flips once the
/// map can take styling calls.
pub fn mount(
    kind: EngineKind,
    selected_state: RwSignal<Option<String>>,
    selected_districts: RwSignal<Vec<String>>,
    ready: RwSignal<bool>,
) {
    match kind {
        EngineKind::Mapbox => {
            if let Err(e) = set_initial_state(selected_state, selected_districts, ready) {
                web_sys::console::warn_1(&format!("mapbox init failed: {e}").into());
            }
        }
        EngineKind::Leaflet => spawn_local(async move {
            if let Err(e) = mount_leaflet(ready).await {
                web_sys::console::warn_1(&format!("leaflet init failed: {e}").into());
            }
        }),
    }
}

/// Main-map controls, the load hook that adds sources and fits the lower 48,
/// and the click hook that drills into a state.
fn set_initial_state(
    selected_state: RwSignal<Option<String>>,
    selected_districts: RwSignal<Vec<String>>,
    ready: RwSignal<bool>,
) -> Result<(), String> {
    let mut engine = JsMapboxMap::new(MAP_CONTAINER)?;
    engine.configure_main_map();

    engine.on("load", move |_| {
        with_map_view(|view| {
            if let MapView::Mapbox(map) = view {
                map.on_load(CONTINENTAL_US, FIT_PADDING);
            }
        });
        ready.set(true);
    });

    engine.on("click", move |event| {
        let name = with_map_view(|view| match view {
            MapView::Mapbox(map) => map.engine().clicked_state_name(&event, STATES_FILL),
            MapView::Leaflet(_) => None,
        })
        .flatten();
        if let Some(abbr) = name.as_deref().and_then(state_abbr) {
            selected_districts.set(Vec::new());
            selected_state.set(Some(abbr.to_owned()));
        }
    });

    install(MapView::Mapbox(MbMap::new(
        engine,
        selected_state.get_untracked(),
    )));
    Ok(())
}

/// Leaflet fires zoom events synchronously from inside view changes, so
/// handlers run on the next tick once the current borrow is released.
fn defer_leaflet(f: impl FnOnce(&mut LeafletMap<JsLeafletMap>) + 'static) {
    spawn_local(async move {
        with_map_view(|view| {
            if let MapView::Leaflet(map) = view {
                f(map);
            }
        });
    });
}

async fn mount_leaflet(ready: RwSignal<bool>) -> Result<(), String> {
    let states = fetch_geojson(STATES_URL).await?;
    let districts = fetch_geojson(DISTRICTS_URL).await?;

    let mut map = JsLeafletMap::new(MAP_CONTAINER, &states, &districts);
    map.on_map("zoomend", |_| defer_leaflet(|map| map.on_zoom_end()));
    map.on_layer(OverlayLayer::States, "click", |event| {
        if let Some(bounds) = event_layer_bounds(&event) {
            defer_leaflet(move |map| map.on_state_click(bounds));
        }
    });
    map.on_layer(OverlayLayer::Districts, "click", |_| {
        defer_leaflet(|map| map.on_district_click());
    });

    install(MapView::Leaflet(LeafletMap::new(map, screen_width())));
    ready.set(true);
    Ok(())
}

#[cfg(test)]
mod tests {
    use pledge_map_shared::dyj::DyjCode;
    use pledge_map_shared::{FeatureId, FilterCriteria, PledgerRecord, Status};

    use super::*;
    use crate::engine::MemoryEngine;
    use crate::leaflet;
    use crate::mapbox::{COLOR_VALUE, DISTRICTS_SOURCE, PLEDGED_FLAG, STATES_SOURCE};

    fn record(state: &str, district: Option<u32>, pledged: bool) -> PledgerRecord {
        PledgerRecord {
            name: format!("{state}{district:?}"),
            state: state.into(),
            district,
            role: "Senate".into(),
            status: Status::Nominee,
            pledged,
            incumbent: false,
        }
    }

    fn loaded_state() -> PledgeState {
        let mut store = PledgerStore::new();
        store.insert(
            "OH".into(),
            vec![record("OH", Some(3), true), record("OH", Some(4), false)],
        );
        store.insert("VT".into(), vec![record("VT", None, true)]);
        let mut state = PledgeState::new(FilterCriteria::default_statuses());
        state.set_pledgers(store);
        state
    }

    #[test]
    fn screen_width_picks_leaflet_zoom() {
        assert_eq!(leaflet::default_zoom(width_or_fallback(Some(1920))), 4.7);
        assert_eq!(leaflet::default_zoom(width_or_fallback(Some(1600))), 4.3);
        assert_eq!(leaflet::default_zoom(width_or_fallback(Some(1440))), 4.5);
        assert_eq!(width_or_fallback(None), FALLBACK_SCREEN_WIDTH);
        assert_eq!(width_or_fallback(Some(0)), FALLBACK_SCREEN_WIDTH);
        assert_eq!(leaflet::default_zoom(width_or_fallback(None)), 4.5);
    }

    #[test]
    fn derived_is_empty_before_data_loads() {
        let state = PledgeState::new(FilterCriteria::default_statuses());
        let derived = Derived::compute(&mut Selectors::new(), &state);
        assert!(derived.pledgers.is_none());
        assert!(derived.by_state.is_none());
        assert_eq!(derived.total_pledged, None);

        let mut map = MbMap::new(MemoryEngine::new(), None);
        assert_eq!(restyle_mapbox(&mut map, &derived, &DoYourJobDistricts::default()), None);
    }

    #[test]
    fn states_level_sets_color_values() {
        let state = loaded_state();
        let derived = Derived::compute(&mut Selectors::new(), &state);
        assert_eq!(derived.total_pledged, Some(2));
        assert_eq!(derived.pledged_on_ballot, Some(2));

        let mut map = MbMap::new(MemoryEngine::new(), None);
        let scale = restyle_mapbox(&mut map, &derived, &DoYourJobDistricts::default())
            .expect("states level returns a scale");
        assert_eq!(scale.colors.len(), 4);
        assert_eq!(map.metadata().level, MapLevel::States);

        let ohio = FeatureId::state("OH").expect("ohio");
        let score = map
            .engine()
            .flag(STATES_SOURCE, ohio, COLOR_VALUE)
            .and_then(|v| v.as_f64())
            .expect("ohio scored");
        assert!(score > 0.0);
    }

    #[test]
    fn district_level_flags_pledged_districts() {
        let mut state = loaded_state();
        state.select_state(Some("OH".into()));
        let derived = Derived::compute(&mut Selectors::new(), &state);
        let codes: DoYourJobDistricts =
            ["OH-4".parse::<DyjCode>().expect("code")].into_iter().collect();

        let mut map = MbMap::new(MemoryEngine::new(), None);
        assert_eq!(restyle_mapbox(&mut map, &derived, &codes), None);
        assert_eq!(map.metadata().level, MapLevel::Districts);

        let oh3 = FeatureId::district("OH", 3).expect("oh-3");
        let oh4 = FeatureId::district("OH", 4).expect("oh-4");
        let engine = map.engine();
        assert_eq!(
            engine.flag(DISTRICTS_SOURCE, oh3, PLEDGED_FLAG),
            Some(&serde_json::json!(true))
        );
        assert_eq!(
            engine.flag(DISTRICTS_SOURCE, oh4, PLEDGED_FLAG),
            Some(&serde_json::json!(false))
        );
    }
}
