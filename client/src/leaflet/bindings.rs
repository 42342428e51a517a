#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::style::PathStyle;
use super::{MAX_ZOOM, MIN_ZOOM, OverlayLayer, SlippyMap, TILE_ATTRIBUTION, TILE_URL, ZOOM_SNAP};
use crate::geo::{LngLat, LngLatBounds};
use crate::mapbox::bindings::to_js;

#[wasm_bindgen]
extern "C" {
    pub type RawMap;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    fn create_map(container: &str, options: &JsValue) -> RawMap;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &RawMap) -> f64;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &RawMap, center: &JsValue, zoom: f64);

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &RawMap, bounds: &JsValue);

    #[wasm_bindgen(method, js_name = hasLayer)]
    fn has_layer(this: &RawMap, layer: &Layer) -> bool;

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer(this: &RawMap, layer: &Layer);

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &RawMap, layer: &Layer);

    #[wasm_bindgen(method, getter)]
    fn dragging(this: &RawMap) -> Handler;

    #[wasm_bindgen(method, getter, js_name = doubleClickZoom)]
    fn double_click_zoom(this: &RawMap) -> Handler;

    #[wasm_bindgen(method)]
    fn on(this: &RawMap, event: &str, callback: &Function);

    #[wasm_bindgen(method)]
    fn remove(this: &RawMap);

    pub type Handler;

    #[wasm_bindgen(method)]
    fn enable(this: &Handler);

    #[wasm_bindgen(method)]
    fn disable(this: &Handler);

    pub type Layer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer(url: &str, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = geoJSON)]
    fn geo_json(data: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = ["L", "control"], js_name = zoom)]
    fn zoom_control(options: &JsValue) -> Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Layer, map: &RawMap);

    #[wasm_bindgen(method, js_name = getLayers)]
    fn get_layers(this: &Layer) -> Array;

    #[wasm_bindgen(method, js_name = setStyle)]
    fn set_style(this: &Layer, style: &JsValue);

    #[wasm_bindgen(method, js_name = bindTooltip)]
    fn bind_tooltip(this: &Layer, content: &str);

    #[wasm_bindgen(method, js_name = getBounds)]
    fn get_bounds(this: &Layer) -> LatLngBounds;

    #[wasm_bindgen(method, js_name = on)]
    fn on_layer(this: &Layer, event: &str, callback: &Function);

    pub type LatLngBounds;

    #[wasm_bindgen(method, js_name = getSouthWest)]
    fn south_west(this: &LatLngBounds) -> LatLng;

    #[wasm_bindgen(method, js_name = getNorthEast)]
    fn north_east(this: &LatLngBounds) -> LatLng;

    pub type LatLng;

    #[wasm_bindgen(method, getter)]
    fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    fn lng(this: &LatLng) -> f64;
}

fn feature_name(layer: &JsValue) -> Option<String> {
    let feature = Reflect::get(layer, &"feature".into()).ok()?;
    let properties = Reflect::get(&feature, &"properties".into()).ok()?;
    Reflect::get(&properties, &"name".into()).ok()?.as_string()
}

/// Bounds of the polygon a click event landed on.
pub fn event_layer_bounds(event: &JsValue) -> Option<LngLatBounds> {
    let layer = Reflect::get(event, &"layer".into()).ok()?;
    if layer.is_undefined() || layer.is_null() {
        return None;
    }
    let bounds = layer.unchecked_into::<Layer>().get_bounds();
    let (sw, ne) = (bounds.south_west(), bounds.north_east());
    Some(LngLatBounds::new(
        LngLat::new(sw.lng(), sw.lat()),
        LngLat::new(ne.lng(), ne.lat()),
    ))
}

/// Owned handle on an `L.map` with its three overlay layers.
pub struct JsLeafletMap {
    raw: RawMap,
    tiles: Layer,
    states: Layer,
    districts: Layer,
    listeners: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl JsLeafletMap {
    /// `states` and `districts` are parsed GeoJSON feature collections.
    pub fn new(container: &str, states: &JsValue, districts: &JsValue) -> Self {
        let options = to_js(&serde_json::json!({ "zoomSnap": ZOOM_SNAP, "zoomControl": false }));
        let raw = create_map(container, &options);
        raw.double_click_zoom().disable();
        zoom_control(&to_js(&serde_json::json!({ "position": "topright" }))).add_to(&raw);

        let tiles = tile_layer(
            TILE_URL,
            &to_js(&serde_json::json!({
                "attribution": TILE_ATTRIBUTION,
                "minZoom": MIN_ZOOM,
                "maxZoom": MAX_ZOOM,
            })),
        );
        Self {
            raw,
            tiles,
            states: geo_json(states),
            districts: geo_json(districts),
            listeners: Vec::new(),
        }
    }

    fn layer(&self, layer: OverlayLayer) -> &Layer {
        match layer {
            OverlayLayer::Tiles => &self.tiles,
            OverlayLayer::States => &self.states,
            OverlayLayer::Districts => &self.districts,
        }
    }

    pub fn on_map(&mut self, event: &str, callback: impl FnMut(JsValue) + 'static) {
        let closure = Closure::<dyn FnMut(JsValue)>::new(callback);
        self.raw.on(event, closure.as_ref().unchecked_ref());
        self.listeners.push(closure);
    }

    pub fn on_layer(
        &mut self,
        layer: OverlayLayer,
        event: &str,
        callback: impl FnMut(JsValue) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(JsValue)>::new(callback);
        self.layer(layer)
            .on_layer(event, closure.as_ref().unchecked_ref());
        self.listeners.push(closure);
    }

    fn each_state(&self, mut apply: impl FnMut(&Layer, &str)) {
        for sublayer in self.states.get_layers().iter() {
            if let Some(name) = feature_name(&sublayer) {
                apply(sublayer.unchecked_ref::<Layer>(), &name);
            }
        }
    }
}

impl Drop for JsLeafletMap {
    fn drop(&mut self) {
        self.raw.remove();
    }
}

impl SlippyMap for JsLeafletMap {
    fn zoom(&self) -> f64 {
        self.raw.get_zoom()
    }

    fn set_view(&mut self, center: LngLat, zoom: f64) {
        self.raw.set_view(&to_js(&[center.lat, center.lng]), zoom);
    }

    fn fit_bounds(&mut self, bounds: LngLatBounds) {
        let corners = [[bounds.sw.lat, bounds.sw.lng], [bounds.ne.lat, bounds.ne.lng]];
        self.raw.fit_bounds(&to_js(&corners));
    }

    fn set_dragging(&mut self, enabled: bool) {
        if enabled {
            self.raw.dragging().enable();
        } else {
            self.raw.dragging().disable();
        }
    }

    fn has_layer(&self, layer: OverlayLayer) -> bool {
        self.raw.has_layer(self.layer(layer))
    }

    fn add_layer(&mut self, layer: OverlayLayer) {
        self.raw.add_layer(self.layer(layer));
    }

    fn remove_layer(&mut self, layer: OverlayLayer) {
        self.raw.remove_layer(self.layer(layer));
    }

    fn style_states(&mut self, style: &dyn Fn(&str) -> PathStyle) {
        self.each_state(|layer, name| layer.set_style(&to_js(&style(name))));
    }

    fn style_districts(&mut self, style: &PathStyle) {
        self.districts.set_style(&to_js(style));
    }

    fn bind_state_tooltips(&mut self, tooltip: &dyn Fn(&str) -> String) {
        self.each_state(|layer, name| layer.bind_tooltip(&tooltip(name)));
    }
}
