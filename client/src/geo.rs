use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// South-west / north-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    pub sw: LngLat,
    pub ne: LngLat,
}

impl LngLatBounds {
    pub const fn new(sw: LngLat, ne: LngLat) -> Self {
        Self { sw, ne }
    }

    /// `[[west, south], [east, north]]`, the array form Mapbox accepts.
    pub fn to_array(self) -> [[f64; 2]; 2] {
        [[self.sw.lng, self.sw.lat], [self.ne.lng, self.ne.lat]]
    }
}

/// Lower 48 plus a little margin.
pub const CONTINENTAL_US: LngLatBounds = LngLatBounds::new(
    LngLat::new(-128.8, 23.6),
    LngLat::new(-65.4, 50.2),
);

/// Leaflet's default view centre.
pub const US_CENTER: LngLat = LngLat::new(-96.0, 37.8);
