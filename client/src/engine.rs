//! The slice of a vector-map engine the Mapbox adapter drives.
//!
//! Styling without reloading geometry goes through feature state: a feature
//! is addressed by `{id, source}` and carries an open key/value map that paint
//! expressions read back at render time.

#[cfg(test)]
use std::collections::HashMap;

use pledge_map_shared::FeatureId;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::geo::LngLatBounds;

pub type FeatureState = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FeatureRef<'a> {
    pub id: FeatureId,
    pub source: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoJsonSource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: String,
}

impl GeoJsonSource {
    pub fn url(data: impl Into<String>) -> Self {
        Self {
            kind: "geojson",
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Fill,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub source: String,
    pub paint: Map<String, Value>,
}

impl LayerSpec {
    pub fn new(id: &str, kind: LayerKind, source: &str) -> Self {
        Self {
            id: id.to_owned(),
            kind,
            source: source.to_owned(),
            paint: Map::new(),
        }
    }

    pub fn paint(mut self, property: &str, value: Value) -> Self {
        self.paint.insert(property.to_owned(), value);
        self
    }
}

pub trait MapEngine {
    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &str, source: &GeoJsonSource);
    fn has_layer(&self, id: &str) -> bool;
    /// Insert below `before` when that layer exists, otherwise on top.
    fn add_layer(&mut self, layer: &LayerSpec, before: Option<&str>);
    fn set_paint_property(&mut self, layer: &str, property: &str, value: &Value);
    /// Merge `state` into the feature's existing state.
    fn set_feature_state(&mut self, feature: FeatureRef<'_>, state: &FeatureState);
    fn fit_bounds(&mut self, bounds: LngLatBounds, padding: f64);
}

/// Engine that only records what it was asked to do.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryEngine {
    pub sources: HashMap<String, GeoJsonSource>,
    /// Bottom to top.
    pub layers: Vec<LayerSpec>,
    pub feature_states: HashMap<(String, FeatureId), FeatureState>,
    pub fitted: Option<(LngLatBounds, f64)>,
}

#[cfg(test)]
impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a base-style layer such as `state border`.
    pub fn with_base_layer(mut self, id: &str, source: &str) -> Self {
        self.layers.push(LayerSpec::new(id, LayerKind::Line, source));
        self
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn layer_position(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    pub fn feature_state(&self, source: &str, id: FeatureId) -> Option<&FeatureState> {
        self.feature_states.get(&(source.to_owned(), id))
    }

    pub fn flag(&self, source: &str, id: FeatureId, key: &str) -> Option<&Value> {
        self.feature_state(source, id).and_then(|state| state.get(key))
    }
}

#[cfg(test)]
impl MapEngine for MemoryEngine {
    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, id: &str, source: &GeoJsonSource) {
        self.sources.insert(id.to_owned(), source.clone());
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layer(id).is_some()
    }

    fn add_layer(&mut self, layer: &LayerSpec, before: Option<&str>) {
        match before.and_then(|id| self.layer_position(id)) {
            Some(index) => self.layers.insert(index, layer.clone()),
            None => self.layers.push(layer.clone()),
        }
    }

    fn set_paint_property(&mut self, layer: &str, property: &str, value: &Value) {
        if let Some(spec) = self.layers.iter_mut().find(|spec| spec.id == layer) {
            spec.paint.insert(property.to_owned(), value.clone());
        }
    }

    fn set_feature_state(&mut self, feature: FeatureRef<'_>, state: &FeatureState) {
        let entry = self
            .feature_states
            .entry((feature.source.to_owned(), feature.id))
            .or_default();
        for (key, value) in state {
            entry.insert(key.clone(), value.clone());
        }
    }

    fn fit_bounds(&mut self, bounds: LngLatBounds, padding: f64) {
        self.fitted = Some((bounds, padding));
    }
}
