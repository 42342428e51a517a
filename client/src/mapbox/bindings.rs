#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::engine::{FeatureRef, FeatureState, GeoJsonSource, LayerSpec, MapEngine};
use crate::geo::LngLatBounds;

const STYLE_URL: &str = "mapbox://styles/mapbox/light-v11";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = mapboxgl, js_name = Map)]
    pub type RawMap;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "Map")]
    fn new(options: &JsValue) -> RawMap;

    #[wasm_bindgen(method, js_name = getLayer)]
    fn get_layer(this: &RawMap, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = getSource)]
    fn get_source(this: &RawMap, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = addSource)]
    fn add_source(this: &RawMap, id: &str, source: &JsValue);

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer(this: &RawMap, layer: &JsValue);

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer_before(this: &RawMap, layer: &JsValue, before: &str);

    #[wasm_bindgen(method, js_name = setPaintProperty)]
    fn set_paint_property(this: &RawMap, layer: &str, property: &str, value: &JsValue);

    #[wasm_bindgen(method, js_name = setFeatureState)]
    fn set_feature_state(this: &RawMap, feature: &JsValue, state: &JsValue);

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &RawMap, bounds: &JsValue, options: &JsValue);

    #[wasm_bindgen(method, js_name = queryRenderedFeatures)]
    fn query_rendered_features(this: &RawMap, point: &JsValue, options: &JsValue) -> Array;

    #[wasm_bindgen(method)]
    fn on(this: &RawMap, event: &str, callback: &Function);

    #[wasm_bindgen(method)]
    fn remove(this: &RawMap);

    #[wasm_bindgen(method, js_name = addControl)]
    fn add_control(this: &RawMap, control: &JsValue, position: &str);

    #[wasm_bindgen(method, js_name = addControl)]
    fn add_control_default(this: &RawMap, control: &JsValue);

    #[wasm_bindgen(method, getter, js_name = scrollZoom)]
    fn scroll_zoom(this: &RawMap) -> Handler;

    #[wasm_bindgen(method, getter, js_name = dragRotate)]
    fn drag_rotate(this: &RawMap) -> Handler;

    #[wasm_bindgen(method, getter, js_name = touchZoomRotate)]
    fn touch_zoom_rotate(this: &RawMap) -> Handler;

    pub type Handler;

    #[wasm_bindgen(method)]
    fn disable(this: &Handler);

    #[wasm_bindgen(method, js_name = disableRotation)]
    fn disable_rotation(this: &Handler);

    #[wasm_bindgen(js_namespace = mapboxgl, js_name = AttributionControl)]
    type AttributionControl;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "AttributionControl")]
    fn new() -> AttributionControl;

    #[wasm_bindgen(js_namespace = mapboxgl, js_name = NavigationControl)]
    type NavigationControl;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "NavigationControl")]
    fn new() -> NavigationControl;
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn is_present(value: &JsValue) -> bool {
    !(value.is_undefined() || value.is_null())
}

/// Owned handle on a `mapboxgl.Map`. Event closures live as long as the
/// handle does.
pub struct JsMapboxMap {
    raw: RawMap,
    listeners: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl JsMapboxMap {
    /// Sets the access token from `MAPBOX_ACCESS_TOKEN` at build time, then
    /// creates the map inside `container`.
    pub fn new(container: &str) -> Result<Self, String> {
        let global = js_sys::global();
        let mapboxgl = Reflect::get(&global, &JsValue::from_str("mapboxgl"))
            .ok()
            .filter(is_present)
            .ok_or_else(|| "mapboxgl is not loaded".to_string())?;
        if let Some(token) = option_env!("MAPBOX_ACCESS_TOKEN") {
            Reflect::set(&mapboxgl, &"accessToken".into(), &token.into())
                .map_err(|_| "failed to set mapbox access token".to_string())?;
        }

        let options = to_js(&serde_json::json!({
            "container": container,
            "style": STYLE_URL,
            "attributionControl": false,
        }));
        Ok(Self {
            raw: RawMap::new(&options),
            listeners: Vec::new(),
        })
    }

    /// Controls and gesture locks for the full-page map.
    pub fn configure_main_map(&self) {
        self.raw
            .add_control(&AttributionControl::new().into(), "top-left");
        self.raw.add_control_default(&NavigationControl::new().into());
        self.raw.scroll_zoom().disable();
        self.raw.drag_rotate().disable();
        self.raw.touch_zoom_rotate().disable_rotation();
    }

    pub fn on(&mut self, event: &str, callback: impl FnMut(JsValue) + 'static) {
        let closure = Closure::<dyn FnMut(JsValue)>::new(callback);
        self.raw.on(event, closure.as_ref().unchecked_ref());
        self.listeners.push(closure);
    }

    /// Name property of the state polygon under a click event, if any.
    pub fn clicked_state_name(&self, event: &JsValue, layer: &str) -> Option<String> {
        let point = Reflect::get(event, &"point".into()).ok()?;
        let options = to_js(&serde_json::json!({ "layers": [layer] }));
        let feature = self.raw.query_rendered_features(&point, &options).get(0);
        let properties = Reflect::get(&feature, &"properties".into()).ok()?;
        Reflect::get(&properties, &"name".into()).ok()?.as_string()
    }
}

impl Drop for JsMapboxMap {
    fn drop(&mut self) {
        self.raw.remove();
    }
}

impl MapEngine for JsMapboxMap {
    fn has_source(&self, id: &str) -> bool {
        is_present(&self.raw.get_source(id))
    }

    fn add_source(&mut self, id: &str, source: &GeoJsonSource) {
        self.raw.add_source(id, &to_js(source));
    }

    fn has_layer(&self, id: &str) -> bool {
        is_present(&self.raw.get_layer(id))
    }

    fn add_layer(&mut self, layer: &LayerSpec, before: Option<&str>) {
        let spec = to_js(layer);
        match before.filter(|id| self.has_layer(id)) {
            Some(before) => self.raw.add_layer_before(&spec, before),
            None => self.raw.add_layer(&spec),
        }
    }

    fn set_paint_property(&mut self, layer: &str, property: &str, value: &Value) {
        self.raw.set_paint_property(layer, property, &to_js(value));
    }

    fn set_feature_state(&mut self, feature: FeatureRef<'_>, state: &FeatureState) {
        self.raw.set_feature_state(&to_js(&feature), &to_js(state));
    }

    fn fit_bounds(&mut self, bounds: LngLatBounds, padding: f64) {
        let options = to_js(&serde_json::json!({ "padding": padding, "animate": false }));
        self.raw.fit_bounds(&to_js(&bounds.to_array()), &options);
    }
}
