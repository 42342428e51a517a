use std::sync::Arc;

use gloo_storage::Storage;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use pledge_map_shared::{DistrictSlice, DoYourJobDistricts, FilterCriteria, PledgeState, Selectors};

use crate::data;
use crate::map_view::{self, Derived, MAP_CONTAINER};
use crate::mapbox::ChoroplethScale;
use crate::settings::{EngineKind, SETTINGS_KEY, Settings, resolve_engine};
use crate::sidebar::Sidebar;

/// Newtype wrappers so each signal gets its own context slot.
#[derive(Clone, Copy)]
pub(crate) struct SelectedState(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct SelectedDistricts(pub RwSignal<Vec<String>>);
#[derive(Clone, Copy)]
pub(crate) struct ActiveFilter(pub RwSignal<FilterCriteria>);
#[derive(Clone, Copy)]
pub(crate) struct ActiveEngine(pub EngineKind);
#[derive(Clone, Copy)]
pub(crate) struct LoadError(pub RwSignal<Option<String>>);

/// Headline counts; `None` until the dataset arrives.
#[derive(Clone, Copy, Default, PartialEq)]
pub(crate) struct Totals {
    pub pledged: Option<usize>,
    pub on_ballot: Option<usize>,
}

#[derive(Clone, Copy)]
pub(crate) struct TotalsSignal(pub RwSignal<Totals>);
#[derive(Clone, Copy)]
pub(crate) struct DistrictView(pub RwSignal<Option<Arc<DistrictSlice>>>);
#[derive(Clone, Copy)]
pub(crate) struct Legend(pub RwSignal<Option<ChoroplethScale>>);

fn current_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

/// Root application component. Loads data, mounts the map and keeps it in
/// sync with the sidebar selection.
#[component]
pub fn App() -> impl IntoView {
    let saved: Settings = gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default();
    let engine = resolve_engine(EngineKind::from_query(&current_query()), &saved);
    let _ = gloo_storage::LocalStorage::set(
        SETTINGS_KEY,
        &Settings {
            engine: Some(engine),
        },
    );

    let selected_state: RwSignal<Option<String>> = RwSignal::new(None);
    let selected_districts: RwSignal<Vec<String>> = RwSignal::new(Vec::new());
    let filter: RwSignal<FilterCriteria> = RwSignal::new(FilterCriteria::default_statuses());
    let codes: RwSignal<Arc<DoYourJobDistricts>> = RwSignal::new(Arc::default());
    let data_version: RwSignal<u64> = RwSignal::new(0);
    let map_ready: RwSignal<bool> = RwSignal::new(false);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);
    let totals: RwSignal<Totals> = RwSignal::new(Totals::default());
    let district_view: RwSignal<Option<Arc<DistrictSlice>>> = RwSignal::new(None);
    let legend: RwSignal<Option<ChoroplethScale>> = RwSignal::new(None);

    let pledge_state: StoredValue<PledgeState> =
        StoredValue::new(PledgeState::new(filter.get_untracked()));
    let selectors: StoredValue<Selectors> = StoredValue::new(Selectors::new());

    provide_context(SelectedState(selected_state));
    provide_context(SelectedDistricts(selected_districts));
    provide_context(ActiveFilter(filter));
    provide_context(ActiveEngine(engine));
    provide_context(LoadError(load_error));
    provide_context(TotalsSignal(totals));
    provide_context(DistrictView(district_view));
    provide_context(Legend(legend));

    spawn_local(async move {
        match data::fetch_pledgers().await {
            Ok(store) => {
                pledge_state.update_value(|state| state.set_pledgers(store));
                data_version.update(|v| *v += 1);
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("Pledger fetch failed: {e}").into());
                load_error.set(Some(e));
            }
        }
    });

    spawn_local(async move {
        match data::fetch_do_your_job_districts().await {
            Ok(loaded) => codes.set(Arc::new(loaded)),
            Err(e) => {
                web_sys::console::warn_1(&format!("DYJD fetch failed: {e}").into());
            }
        }
    });

    // Mount after the container element exists.
    Effect::new(move || {
        map_view::mount(engine, selected_state, selected_districts, map_ready);
    });

    Effect::new(move || {
        data_version.track();
        let state = selected_state.get();
        let districts = selected_districts.get();
        let criteria = filter.get();
        let codes = codes.get();
        let ready = map_ready.get();

        pledge_state.update_value(|s| {
            s.select_state(state);
            s.select_districts(districts);
            s.set_filter(criteria);
        });
        let Some(derived) = pledge_state.with_value(|state| {
            selectors.try_update_value(|selectors| Derived::compute(selectors, state))
        }) else {
            return;
        };

        totals.set(Totals {
            pledged: derived.total_pledged,
            on_ballot: derived.pledged_on_ballot,
        });
        district_view.set(derived.by_district.clone());

        if ready && derived.pledgers.is_some() {
            legend.set(map_view::restyle(&derived, &codes));
        }
    });

    view! {
        <div style="display: flex; width: 100vw; height: 100vh; overflow: hidden; background: #f7f6fb;">
            <Sidebar />
            <div id=MAP_CONTAINER style="flex: 1; position: relative; min-width: 0;" />
        </div>
    }
}
