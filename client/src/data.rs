use pledge_map_shared::dataset::{parse_do_your_job_districts, parse_pledgers};
use pledge_map_shared::{DoYourJobDistricts, PledgerStore};

pub const PLEDGERS_URL: &str = "/data/pledgers.json";
pub const DYJ_URL: &str = "/data/do_your_job_districts.json";

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }

    resp.binary()
        .await
        .map_err(|e| format!("read error: {e}"))
}

/// Fetch and validate the pledger dataset.
pub async fn fetch_pledgers() -> Result<PledgerStore, String> {
    let bytes = fetch_bytes(PLEDGERS_URL).await?;
    parse_pledgers(&bytes).map_err(|e| e.to_string())
}

/// Fetch the set of "Do Your Job" district codes.
pub async fn fetch_do_your_job_districts() -> Result<DoYourJobDistricts, String> {
    let bytes = fetch_bytes(DYJ_URL).await?;
    parse_do_your_job_districts(&bytes).map_err(|e| e.to_string())
}

/// Boundary GeoJSON as a JS value, ready to hand to a map engine.
pub async fn fetch_geojson(url: &str) -> Result<wasm_bindgen::JsValue, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }

    let value = resp
        .json::<serde_json::Value>()
        .await
        .map_err(|e| format!("parse error: {e}"))?;
    Ok(crate::mapbox::bindings::to_js(&value))
}
