use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::config::DATASET_CACHE_CONTROL;
use crate::state::{AppState, CachedJson};

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let datasets = &state.datasets;
    Json(serde_json::json!({
        "status": "ok",
        "states": datasets.summary.states,
        "records": datasets.summary.records,
        "pledged": datasets.summary.pledged,
        "unknown_states": datasets.summary.unknown_states,
        "dyj_codes": datasets.dyj_codes,
        "loaded_at": datasets.loaded_at.to_rfc3339(),
    }))
}

/// Pledger dataset exactly as loaded; no re-serialization per request.
pub async fn get_pledgers(State(state): State<AppState>, headers: HeaderMap) -> Response {
    cached_json_response(&state.datasets.pledgers, &headers)
}

pub async fn get_do_your_job_districts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    cached_json_response(&state.datasets.do_your_job_districts, &headers)
}

fn cached_json_response(cached: &CachedJson, headers: &HeaderMap) -> Response {
    let etag = cached.etag.as_str();
    if if_none_match_matches(headers, etag) {
        return not_modified_response(DATASET_CACHE_CONTROL, Some(etag));
    }
    json_bytes_response(cached.body.clone(), DATASET_CACHE_CONTROL, Some(etag))
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
    use reqwest::header::{ETAG, IF_NONE_MATCH};

    use super::if_none_match_matches;
    use crate::state::AppState;
    use crate::state::tests::{PLEDGERS, datasets};

    fn test_state() -> AppState {
        AppState::new(
            datasets(),
            PathBuf::from("does-not-exist/data"),
            PathBuf::from("does-not-exist/dist"),
        )
    }

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    #[test]
    fn if_none_match_accepts_lists_weak_tags_and_wildcards() {
        let etag = "\"pledgers-0badf00d\"";
        let mut headers = HeaderMap::new();
        assert!(!if_none_match_matches(&headers, etag));

        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_static("\"other\", W/\"pledgers-0badf00d\""),
        );
        assert!(if_none_match_matches(&headers, etag));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(if_none_match_matches(&headers, etag));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"stale\""));
        assert!(!if_none_match_matches(&headers, etag));
    }

    #[tokio::test]
    async fn pledgers_served_with_etag_and_revalidated() {
        let (addr, server_handle) = spawn_test_server(test_state()).await;
        let url = format!("http://{addr}/data/pledgers.json");
        let client = reqwest::Client::new();

        let first = client.get(&url).send().await.expect("pledgers request");
        assert_eq!(first.status().as_u16(), StatusCode::OK.as_u16());
        assert_eq!(
            first
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("public, max-age=3600")
        );
        let etag = first
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .expect("etag header");
        let body = first.text().await.expect("pledgers body");
        assert_eq!(body, PLEDGERS);

        let revalidated = client
            .get(&url)
            .header(IF_NONE_MATCH, etag.as_str())
            .send()
            .await
            .expect("conditional request");
        assert_eq!(revalidated.status().as_u16(), StatusCode::NOT_MODIFIED.as_u16());
        assert_eq!(
            revalidated.headers().get(ETAG).and_then(|v| v.to_str().ok()),
            Some(etag.as_str())
        );

        let stale = client
            .get(&url)
            .header(IF_NONE_MATCH, "\"pledgers-00000000\"")
            .send()
            .await
            .expect("stale conditional request");
        assert_eq!(stale.status().as_u16(), StatusCode::OK.as_u16());

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn dyjd_and_health_expose_expected_contract() {
        let (addr, server_handle) = spawn_test_server(test_state()).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let codes = client
            .get(format!("{base_url}/data/do_your_job_districts.json"))
            .send()
            .await
            .expect("dyjd request")
            .error_for_status()
            .expect("dyjd status")
            .json::<serde_json::Value>()
            .await
            .expect("parse dyjd");
        assert!(codes.get("OH-3").is_some());

        let health = client
            .get(format!("{base_url}/api/health"))
            .send()
            .await
            .expect("health request")
            .error_for_status()
            .expect("health status")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");
        assert_eq!(health["status"], "ok");
        assert_eq!(health["states"], 2);
        assert_eq!(health["records"], 3);
        assert_eq!(health["pledged"], 2);
        assert_eq!(health["dyj_codes"], 2);
        assert!(health["loaded_at"].is_string());

        server_handle.abort();
        let _ = server_handle.await;
    }
}
