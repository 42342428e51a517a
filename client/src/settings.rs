use serde::{Deserialize, Serialize};

pub const SETTINGS_KEY: &str = "pledge_map_settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Leaflet,
    Mapbox,
}

impl EngineKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "leaflet" => Some(Self::Leaflet),
            "mapbox" => Some(Self::Mapbox),
            _ => None,
        }
    }

    /// `engine=` parameter of a `location.search` string.
    pub fn from_query(search: &str) -> Option<Self> {
        search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "engine")
            .and_then(|(_, value)| Self::parse(value))
    }

    /// Vector tiles need a token baked in at build time.
    pub fn build_default() -> Self {
        if option_env!("MAPBOX_ACCESS_TOKEN").is_some() {
            Self::Mapbox
        } else {
            Self::Leaflet
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Leaflet => "Leaflet",
            Self::Mapbox => "Mapbox GL",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: Option<EngineKind>,
}

/// Query string beats the saved choice, which beats the build default.
pub fn resolve_engine(query: Option<EngineKind>, saved: &Settings) -> EngineKind {
    query
        .or(saved.engine)
        .unwrap_or_else(EngineKind::build_default)
}
