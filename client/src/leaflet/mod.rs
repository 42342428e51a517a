//! Raster-tile adapter: fixed-bucket state choropleth, zoom-gated district
//! outlines and hover tooltips.

pub mod bindings;
pub mod style;

use std::sync::Arc;

use pledge_map_shared::dictionaries::state_abbr;
use pledge_map_shared::{PledgerRecord, PledgerStore};

use crate::geo::{LngLat, LngLatBounds, US_CENTER};
use style::PathStyle;

pub const TILE_URL: &str =
    "https://cartodb-basemaps-{s}.global.ssl.fastly.net/light_all/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "&copy; <a href=\"http://www.openstreetmap.org/copyright\">OpenStreetMap</a> &copy; <a href=\"http://cartodb.com/attributions\">CartoDB</a>";
pub const MIN_ZOOM: f64 = 4.5;
pub const MAX_ZOOM: f64 = 19.0;
pub const ZOOM_SNAP: f64 = 0.1;
/// Districts only show once the map is this far past the default zoom.
const DISTRICT_ZOOM_OFFSET: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayLayer {
    Tiles,
    States,
    Districts,
}

/// The slice of a raster map engine the adapter drives.
pub trait SlippyMap {
    fn zoom(&self) -> f64;
    fn set_view(&mut self, center: LngLat, zoom: f64);
    fn fit_bounds(&mut self, bounds: LngLatBounds);
    fn set_dragging(&mut self, enabled: bool);
    fn has_layer(&self, layer: OverlayLayer) -> bool;
    fn add_layer(&mut self, layer: OverlayLayer);
    fn remove_layer(&mut self, layer: OverlayLayer);
    /// Restyle every state polygon from its `name` property.
    fn style_states(&mut self, style: &dyn Fn(&str) -> PathStyle);
    fn style_districts(&mut self, style: &PathStyle);
    /// Rebind every state polygon's tooltip from its `name` property.
    fn bind_state_tooltips(&mut self, tooltip: &dyn Fn(&str) -> String);
}

/// Default zoom for the screen width: wide screens zoom in a touch, the
/// 1600px band zooms out to fit.
pub fn default_zoom(screen_width: f64) -> f64 {
    if screen_width >= 1700.0 {
        4.7
    } else if screen_width >= 1600.0 {
        4.3
    } else {
        4.5
    }
}

pub struct LeafletMap<M: SlippyMap> {
    map: M,
    screen_width: f64,
    pledgers: Option<Arc<PledgerStore>>,
}

impl<M: SlippyMap> LeafletMap<M> {
    /// Starts at the default view with dragging off and only tiles and
    /// states attached.
    pub fn new(map: M, screen_width: f64) -> Self {
        let mut adapter = Self {
            map,
            screen_width,
            pledgers: None,
        };
        adapter.map.set_dragging(false);
        adapter.set_default_zoom();
        for layer in [OverlayLayer::Tiles, OverlayLayer::States] {
            if !adapter.map.has_layer(layer) {
                adapter.map.add_layer(layer);
            }
        }
        adapter
    }

    pub fn default_zoom(&self) -> f64 {
        default_zoom(self.screen_width)
    }

    pub fn set_default_zoom(&mut self) {
        let zoom = self.default_zoom();
        self.map.set_view(US_CENTER, zoom);
    }

    /// Swap in a new dataset and restyle.
    pub fn set_pledgers(&mut self, pledgers: Arc<PledgerStore>) {
        self.pledgers = Some(pledgers);
        self.refresh_styles();
    }

    pub fn refresh_styles(&mut self) {
        let pledgers = self.pledgers.clone();
        self.map.style_states(&|name: &str| {
            style::state_style(records_for(pledgers.as_deref(), name).len())
        });
        self.map.style_districts(&style::district_style());
        self.map.bind_state_tooltips(&|name: &str| {
            style::state_tooltip(name, records_for(pledgers.as_deref(), name))
        });
    }

    /// Below default + 1 the district layer is detached and the map is
    /// pinned; at or above it districts appear and dragging is allowed.
    pub fn on_zoom_end(&mut self) {
        let threshold = self.default_zoom() + DISTRICT_ZOOM_OFFSET;
        if self.map.zoom() < threshold {
            self.map.set_dragging(false);
            if self.map.has_layer(OverlayLayer::Districts) {
                self.map.remove_layer(OverlayLayer::Districts);
            }
        } else {
            self.map.set_dragging(true);
            if !self.map.has_layer(OverlayLayer::Districts) {
                self.map.add_layer(OverlayLayer::Districts);
            }
        }
    }

    pub fn on_state_click(&mut self, bounds: LngLatBounds) {
        self.map.fit_bounds(bounds);
    }

    pub fn on_district_click(&mut self) {
        self.set_default_zoom();
    }
}

#[cfg(test)]
impl<M: SlippyMap> LeafletMap<M> {
    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn state_style(&self, name: &str) -> PathStyle {
        style::state_style(records_for(self.pledgers.as_deref(), name).len())
    }

    pub fn state_tooltip(&self, name: &str) -> String {
        style::state_tooltip(name, records_for(self.pledgers.as_deref(), name))
    }
}

/// Raw records for the state a boundary feature is named after.
fn records_for<'a>(pledgers: Option<&'a PledgerStore>, name: &str) -> &'a [PledgerRecord] {
    state_abbr(name)
        .and_then(|abbr| pledgers?.get(abbr))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use pledge_map_shared::Status;

    use super::*;
    use crate::geo::CONTINENTAL_US;

    /// Minimal Leaflet stand-in: a zoom level, a layer set and the last
    /// styles handed to each state.
    #[derive(Default)]
    struct MemorySlippyMap {
        zoom: f64,
        center: Option<LngLat>,
        fitted: Option<LngLatBounds>,
        dragging: bool,
        layers: HashSet<OverlayLayer>,
        state_names: Vec<&'static str>,
        state_styles: HashMap<&'static str, PathStyle>,
        district_style: Option<PathStyle>,
        tooltips: HashMap<&'static str, String>,
        layer_toggles: usize,
    }

    impl SlippyMap for MemorySlippyMap {
        fn zoom(&self) -> f64 {
            self.zoom
        }
        fn set_view(&mut self, center: LngLat, zoom: f64) {
            self.center = Some(center);
            self.zoom = zoom;
        }
        fn fit_bounds(&mut self, bounds: LngLatBounds) {
            self.fitted = Some(bounds);
            self.zoom = 6.5;
        }
        fn set_dragging(&mut self, enabled: bool) {
            self.dragging = enabled;
        }
        fn has_layer(&self, layer: OverlayLayer) -> bool {
            self.layers.contains(&layer)
        }
        fn add_layer(&mut self, layer: OverlayLayer) {
            self.layers.insert(layer);
            self.layer_toggles += 1;
        }
        fn remove_layer(&mut self, layer: OverlayLayer) {
            self.layers.remove(&layer);
            self.layer_toggles += 1;
        }
        fn style_states(&mut self, style: &dyn Fn(&str) -> PathStyle) {
            for name in &self.state_names {
                self.state_styles.insert(*name, style(name));
            }
        }
        fn style_districts(&mut self, style: &PathStyle) {
            self.district_style = Some(style.clone());
        }
        fn bind_state_tooltips(&mut self, tooltip: &dyn Fn(&str) -> String) {
            for name in &self.state_names {
                self.tooltips.insert(*name, tooltip(name));
            }
        }
    }

    fn engine() -> MemorySlippyMap {
        MemorySlippyMap {
            state_names: vec!["Ohio", "Texas", "Atlantis"],
            ..MemorySlippyMap::default()
        }
    }

    fn pledger(state: &str, district: u32) -> PledgerRecord {
        PledgerRecord {
            name: format!("P{district}"),
            state: state.into(),
            district: Some(district),
            role: "Rep".into(),
            status: Status::Nominee,
            pledged: true,
            incumbent: false,
        }
    }

    #[test]
    fn default_zoom_buckets_by_screen_width() {
        assert_eq!(default_zoom(1920.0), 4.7);
        assert_eq!(default_zoom(1700.0), 4.7);
        assert_eq!(default_zoom(1650.0), 4.3);
        assert_eq!(default_zoom(1600.0), 4.3);
        assert_eq!(default_zoom(1280.0), 4.5);
    }

    #[test]
    fn starts_pinned_at_default_view() {
        let map = LeafletMap::new(engine(), 1280.0);
        assert_eq!(map.map().zoom, 4.5);
        assert_eq!(map.map().center, Some(US_CENTER));
        assert!(!map.map().dragging);
        assert!(map.map().has_layer(OverlayLayer::States));
        assert!(!map.map().has_layer(OverlayLayer::Districts));
    }

    #[test]
    fn district_layer_follows_zoom_threshold() {
        let mut map = LeafletMap::new(engine(), 1280.0);

        map.map_mut().zoom = 5.4;
        map.on_zoom_end();
        assert!(!map.map().has_layer(OverlayLayer::Districts));
        assert!(!map.map().dragging);

        map.map_mut().zoom = 5.5;
        map.on_zoom_end();
        assert!(map.map().has_layer(OverlayLayer::Districts));
        assert!(map.map().dragging);

        // Re-running at the same zoom does not re-add.
        let toggles = map.map().layer_toggles;
        map.on_zoom_end();
        assert_eq!(map.map().layer_toggles, toggles);

        map.map_mut().zoom = 4.5;
        map.on_zoom_end();
        assert!(!map.map().has_layer(OverlayLayer::Districts));
        assert!(!map.map().dragging);
    }

    #[test]
    fn clicks_zoom_in_and_reset() {
        let mut map = LeafletMap::new(engine(), 1800.0);
        map.on_state_click(CONTINENTAL_US);
        assert_eq!(map.map().fitted, Some(CONTINENTAL_US));
        map.on_district_click();
        assert_eq!(map.map().zoom, 4.7);
    }

    #[test]
    fn styles_count_raw_pledgers_per_state() {
        let mut store = PledgerStore::new();
        store.insert("OH".into(), vec![pledger("OH", 1), pledger("OH", 2)]);
        store.insert(
            "TX".into(),
            (1..=6).map(|d| pledger("TX", d)).collect(),
        );
        let mut map = LeafletMap::new(engine(), 1280.0);
        map.set_pledgers(Arc::new(store));

        let styles = &map.map().state_styles;
        assert_eq!(styles["Ohio"].fill_color, Some("#9e9ac8"));
        assert_eq!(styles["Texas"].fill_color, Some("#54278f"));
        assert_eq!(styles["Atlantis"].fill_color, Some("#f2f0f7"));
        assert_eq!(map.map().district_style, Some(style::district_style()));
        assert_eq!(map.state_style("Ohio"), styles["Ohio"]);

        let tooltip = &map.map().tooltips["Ohio"];
        assert!(tooltip.contains("P1 (OH-1, candidate) has taken"));
        assert_eq!(map.state_tooltip("Ohio"), *tooltip);
        assert!(map.map().tooltips["Atlantis"].starts_with("<h4>Atlantis</h4><h6><em>"));
    }
}
