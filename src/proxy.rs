use crate::errors::AppError;
use crate::models::Endpoint;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

/// Header the browser client uses to hand the credential to the proxy.
pub const TOKEN_HEADER: &str = "x-oura-token";
/// Versioned collection root on the upstream host.
pub const COLLECTION_ROOT: &str = "/v2/usercollection";

pub const DEFAULT_UPSTREAM_BASE: &str = "https://api.ouraring.com";
pub const USER_AGENT: &str = concat!("oura-dash/", env!("CARGO_PKG_VERSION"));

pub fn resolve_upstream_base() -> String {
    std::env::var("OURA_UPSTREAM_BASE").unwrap_or_else(|_| DEFAULT_UPSTREAM_BASE.to_string())
}

/// `OPTIONS /api/oura` — preflight always succeeds with an empty body,
/// before any credential or selector validation.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// `GET /api/oura?endpoint={selector}&...` — attach the stored-side
/// bearer credential and forward a single GET to the upstream
/// collection. No retries, no caching.
pub async fn forward(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing X-Oura-Token header"))?;

    let selector = params
        .iter()
        .find(|(key, _)| key == "endpoint")
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| AppError::bad_request("Missing endpoint parameter"))?;

    let endpoint = Endpoint::parse(selector)
        .ok_or_else(|| AppError::bad_request(format!("Unknown endpoint: {selector}")))?;

    let url = build_upstream_url(&state.upstream.base_url, endpoint, &params)?;
    debug!(url = %url, token = %redact(token), "proxying request to upstream");

    let response = state
        .upstream
        .http
        .get(url)
        .bearer_auth(token)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|err| AppError::upstream("Proxy request failed", err.to_string()))?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(AppError::unauthorized("Invalid API token"));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(AppError::rate_limited("Rate limit exceeded"));
    }
    if !status.is_success() {
        let detail = upstream_detail(status, response.text().await.ok());
        warn!(%status, "upstream request failed");
        return Err(AppError::upstream("Proxy request failed", detail));
    }

    let body: Value = response.json().await.map_err(|err| {
        AppError::upstream(
            "Proxy request failed",
            format!("Failed to parse response: {err}"),
        )
    })?;
    Ok(Json(body))
}

/// Upstream URL: `{base}/v2/usercollection/{selector}` with every
/// pass-through parameter kept in its original order and the selector
/// key excluded from the query string.
pub fn build_upstream_url(
    base: &str,
    endpoint: Endpoint,
    params: &[(String, String)],
) -> Result<Url, AppError> {
    let mut url = Url::parse(base).map_err(AppError::internal)?;
    url.set_path(&format!("{COLLECTION_ROOT}/{}", endpoint.as_str()));
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            if key != "endpoint" {
                pairs.append_pair(key, value);
            }
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok(url)
}

fn upstream_detail(status: reqwest::StatusCode, body: Option<String>) -> String {
    let mut detail = format!("HTTP {status}");
    if let Some(body) = body {
        let trimmed = body.trim();
        if !trimmed.is_empty() {
            let snippet: String = trimmed.chars().take(200).collect();
            detail.push_str(": ");
            detail.push_str(&snippet);
        }
    }
    detail
}

/// Only a short prefix of the credential ever reaches the logs.
fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}...")
}
