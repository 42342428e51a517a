use leptos::prelude::*;
use wasm_bindgen::JsCast;

use pledge_map_shared::dictionaries::STATES;
use pledge_map_shared::{FilterCriteria, FilterField, Status};

use crate::app::{
    ActiveEngine, ActiveFilter, DistrictView, Legend, LoadError, SelectedDistricts, SelectedState,
    TotalsSignal,
};
use crate::colors::{DYJD_COLOR, NO_SCORE_FILL};
use crate::settings::EngineKind;

pub(crate) const SIDEBAR_WIDTH: f64 = 320.0;

const STATUS_OPTIONS: [Status; 5] = [
    Status::Nominee,
    Status::PrimaryCandidate,
    Status::Incumbent,
    Status::Lost,
    Status::Withdrawn,
];

/// Comma separated district numbers as typed; blanks are dropped, anything
/// else is passed through for the selector to skip.
pub(crate) fn parse_district_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Flip one status in or out of the accepted set. An emptied set stays as an
/// explicit constraint so nothing matches.
pub(crate) fn toggle_status(filter: &mut FilterCriteria, label: &str) {
    let mut accepted = filter
        .accepted(FilterField::Status)
        .cloned()
        .unwrap_or_default();
    if !accepted.remove(label) {
        accepted.insert(label.to_owned());
    }
    filter.set(FilterField::Status, accepted);
}

fn format_count(count: Option<usize>) -> String {
    count.map_or_else(|| "\u{2014}".to_owned(), |c| c.to_string())
}

#[component]
pub fn Sidebar() -> impl IntoView {
    let SelectedState(selected_state) = expect_context();
    let SelectedDistricts(selected_districts) = expect_context();
    let ActiveFilter(filter) = expect_context();
    let ActiveEngine(engine) = expect_context();
    let LoadError(load_error) = expect_context();
    let TotalsSignal(totals) = expect_context();

    let on_state_change = move |e: leptos::ev::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(select) = target.dyn_into::<web_sys::HtmlSelectElement>() else {
            return;
        };
        let value = select.value();
        selected_districts.set(Vec::new());
        selected_state.set((!value.is_empty()).then_some(value));
    };

    let on_districts_change = move |e: leptos::ev::Event| {
        if let Some(target) = e.target()
            && let Ok(input) = target.dyn_into::<web_sys::HtmlInputElement>()
        {
            selected_districts.set(parse_district_list(&input.value()));
        }
    };

    let other_engine = match engine {
        EngineKind::Leaflet => EngineKind::Mapbox,
        EngineKind::Mapbox => EngineKind::Leaflet,
    };

    view! {
        <aside style=format!(
            "width: {SIDEBAR_WIDTH}px; flex-shrink: 0; overflow-y: auto; padding: 16px; background: #ffffff; border-right: 1px solid #e0def0; font-family: 'Inter', system-ui, sans-serif; color: #2c2a3a;"
        )>
            <h1 style="font-size: 1.1rem; margin: 0 0 4px;">"Town Hall Pledge"</h1>
            <div style="font-size: 0.72rem; color: #7a7890; margin-bottom: 12px;">
                {format!("Rendering with {} \u{00B7} ", engine.label())}
                <a href=format!("?engine={}", match other_engine {
                    EngineKind::Leaflet => "leaflet",
                    EngineKind::Mapbox => "mapbox",
                })>
                    {format!("switch to {}", other_engine.label())}
                </a>
            </div>

            {move || load_error.get().map(|e| view! {
                <div style="font-size: 0.75rem; color: #a0302a; margin-bottom: 10px;">
                    {format!("Could not load pledgers: {e}")}
                </div>
            })}

            <div style="display: flex; gap: 12px; margin-bottom: 14px; font-size: 0.8rem;">
                <div>
                    <div style="font-size: 1.3rem; font-weight: 700;">
                        {move || format_count(totals.get().pledged)}
                    </div>
                    "pledged"
                </div>
                <div>
                    <div style="font-size: 1.3rem; font-weight: 700;">
                        {move || format_count(totals.get().on_ballot)}
                    </div>
                    "pledged and on the ballot"
                </div>
            </div>

            <label style="display: block; font-size: 0.75rem; color: #7a7890;">"State"</label>
            <select
                prop:value=move || selected_state.get().unwrap_or_default()
                on:change=on_state_change
                style="width: 100%; margin: 4px 0 10px; padding: 4px 6px;"
            >
                <option value="">"All states"</option>
                {STATES
                    .iter()
                    .map(|state| view! { <option value=state.abbr>{state.name}</option> })
                    .collect_view()}
            </select>

            {move || selected_state.get().is_some().then(|| view! {
                <label style="display: block; font-size: 0.75rem; color: #7a7890;">
                    "Districts (comma separated, empty for all)"
                </label>
                <input
                    type="text"
                    prop:value=move || selected_districts.get().join(", ")
                    on:change=on_districts_change
                    style="width: 100%; margin: 4px 0 10px; padding: 4px 6px; box-sizing: border-box;"
                />
            })}

            <fieldset style="border: 1px solid #e0def0; border-radius: 4px; margin: 0 0 14px; padding: 6px 10px;">
                <legend style="font-size: 0.75rem; color: #7a7890;">"Status"</legend>
                {STATUS_OPTIONS
                    .iter()
                    .map(|status| {
                        let label = status.label().to_owned();
                        let checked_label = label.clone();
                        let toggle_label = label.clone();
                        view! {
                            <label style="display: block; font-size: 0.8rem;">
                                <input
                                    type="checkbox"
                                    prop:checked=move || filter.with(|f| {
                                        f.accepted(FilterField::Status)
                                            .is_some_and(|accepted| accepted.contains(&checked_label))
                                    })
                                    on:change=move |_| filter.update(|f| toggle_status(f, &toggle_label))
                                />
                                " " {label}
                            </label>
                        }
                    })
                    .collect_view()}
            </fieldset>

            <ScaleLegend />
            <PledgerList />
        </aside>
    }
}

/// Swatches for the last state choropleth pass. Hidden at district level.
#[component]
fn ScaleLegend() -> impl IntoView {
    let Legend(legend) = expect_context();

    move || {
        legend.get().map(|scale| {
            let rows = scale
                .breaks
                .iter()
                .zip(scale.colors.iter())
                .map(|(value, color)| {
                    view! {
                        <div style="display: flex; align-items: center; gap: 6px; font-size: 0.72rem;">
                            <span style=format!("display: inline-block; width: 14px; height: 14px; background: {color};") />
                            {format!("{value:.1}")}
                        </div>
                    }
                })
                .collect_view();
            view! {
                <div style="margin-bottom: 14px;">
                    <div style="font-size: 0.75rem; color: #7a7890; margin-bottom: 4px;">"Pledged nominee score"</div>
                    <div style="display: flex; align-items: center; gap: 6px; font-size: 0.72rem;">
                        <span style=format!("display: inline-block; width: 14px; height: 14px; background: {NO_SCORE_FILL};") />
                        "none"
                    </div>
                    {rows}
                    <div style="display: flex; align-items: center; gap: 6px; font-size: 0.72rem;">
                        <span style=format!("display: inline-block; width: 14px; height: 14px; border: 2px solid {DYJD_COLOR}; box-sizing: border-box;") />
                        "Do Your Job district"
                    </div>
                </div>
            }
        })
    }
}

/// Filtered pledgers for the current selection, grouped by seat.
#[component]
fn PledgerList() -> impl IntoView {
    let DistrictView(district_view) = expect_context();
    let SelectedState(selected_state) = expect_context();

    move || {
        let selected = selected_state.get()?;
        let slice = district_view.get()?;
        let groups = slice.get(&selected).cloned().flatten();
        let Some(groups) = groups else {
            return Some(
                view! {
                    <div style="font-size: 0.8rem; color: #7a7890;">"No pledgers tracked in this state."</div>
                }
                .into_any(),
            );
        };

        let rows = groups
            .into_iter()
            .map(|(key, records)| {
                let heading = match key.district() {
                    Some(district) => format!("{selected}-{district}"),
                    None => format!("{selected} {key}"),
                };
                let body = match records {
                    None => view! {
                        <div style="font-size: 0.75rem; color: #7a7890;">"Nobody tracked for this district."</div>
                    }
                    .into_any(),
                    Some(records) if records.is_empty() => view! {
                        <div style="font-size: 0.75rem; color: #7a7890;">"No one matches the status filter."</div>
                    }
                    .into_any(),
                    Some(records) => records
                        .into_iter()
                        .map(|person| {
                            let mark = if person.pledged { "\u{2713}" } else { "\u{2717}" };
                            view! {
                                <div style="font-size: 0.78rem;">
                                    {format!("{mark} {} ({})", person.name, person.status)}
                                </div>
                            }
                        })
                        .collect_view()
                        .into_any(),
                };
                view! {
                    <div style="margin-bottom: 8px;">
                        <div style="font-size: 0.75rem; font-weight: 600;">{heading}</div>
                        {body}
                    </div>
                }
            })
            .collect_view();

        Some(view! { <div>{rows}</div> }.into_any())
    }
}
