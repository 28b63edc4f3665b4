use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::Value;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Stand-in for the Oura cloud API. Runs on its own runtime thread so
/// it outlives any single test's runtime; the spawned server binary is
/// pointed at it via OURA_UPSTREAM_BASE.
mod upstream {
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static HITS: AtomicUsize = AtomicUsize::new(0);

    pub fn hits() -> usize {
        HITS.load(Ordering::SeqCst)
    }

    async fn collection(
        Path(collection): Path<String>,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> axum::response::Response {
        HITS.fetch_add(1, Ordering::SeqCst);

        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        if auth == "Bearer throttled-token" {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "request rate exceeded" })),
            )
                .into_response();
        }
        if auth != "Bearer good-token" {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid token" })),
            )
                .into_response();
        }

        match collection.as_str() {
            "personal_info" => {
                Json(json!({ "id": "user-1", "email": "user@example.com" })).into_response()
            }
            // This account has no heart-rate collection; the client is
            // expected to absorb the failure.
            "heartrate" => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "collection unavailable" })),
            )
                .into_response(),
            "daily_sleep" | "daily_readiness" | "daily_activity" => {
                let days = window(&params);
                let mut data = Vec::new();
                for (index, day) in days.iter().enumerate() {
                    // Readiness skips the middle day of multi-day
                    // windows so trend tests see an upstream gap.
                    if collection == "daily_readiness" && days.len() >= 3 && index == 1 {
                        continue;
                    }
                    data.push(json!({ "day": day.to_string(), "score": 80 + index as i64 }));
                }
                Json(json!({ "data": data })).into_response()
            }
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "unknown collection" })),
            )
                .into_response(),
        }
    }

    fn window(params: &HashMap<String, String>) -> Vec<NaiveDate> {
        let parse = |key: &str| {
            params
                .get(key)
                .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        };
        let (Some(start), Some(end)) = (parse("start_date"), parse("end_date")) else {
            return Vec::new();
        };
        let mut days = Vec::new();
        let mut day = start;
        while day <= end {
            days.push(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        days
    }

    pub fn router() -> Router {
        Router::new().route("/v2/usercollection/:collection", get(collection))
    }
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "oura_dash_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    path.to_string_lossy().to_string()
}

fn spawn_upstream() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind upstream port");
    let port = listener.local_addr().unwrap().port();
    listener
        .set_nonblocking(true)
        .expect("nonblocking upstream listener");
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("upstream runtime");
        rt.block_on(async move {
            let listener =
                tokio::net::TcpListener::from_std(listener).expect("adopt upstream listener");
            axum::serve(listener, upstream::router())
                .await
                .expect("upstream server");
        });
    });
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/token")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let upstream_port = spawn_upstream();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_oura_dash"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env(
            "OURA_UPSTREAM_BASE",
            format!("http://127.0.0.1:{upstream_port}"),
        )
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_options_preflight_always_succeeds() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/api/oura", server.base_url),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn http_proxy_without_token_never_reaches_upstream() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = upstream::hits();
    let response = client
        .get(format!(
            "{}/api/oura?endpoint=daily_sleep&start_date=2026-08-01&end_date=2026-08-01",
            server.base_url
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing X-Oura-Token header");
    assert_eq!(upstream::hits(), before);
}

#[tokio::test]
async fn http_proxy_without_endpoint_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = upstream::hits();
    let response = client
        .get(format!(
            "{}/api/oura?start_date=2026-08-01",
            server.base_url
        ))
        .header("x-oura-token", "good-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing endpoint parameter");
    assert_eq!(upstream::hits(), before);
}

#[tokio::test]
async fn http_proxy_rejects_unknown_selector() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = upstream::hits();
    let response = client
        .get(format!("{}/api/oura?endpoint=workout", server.base_url))
        .header("x-oura-token", "good-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unknown endpoint: workout");
    assert_eq!(upstream::hits(), before);
}

#[tokio::test]
async fn http_proxy_forwards_range_and_relays_envelope() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/api/oura?endpoint=daily_sleep&start_date=2026-08-01&end_date=2026-08-03",
            server.base_url
        ))
        .header("x-oura-token", "good-token")
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    let body: Value = response.json().await.unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["day"], "2026-08-01");
    assert_eq!(data[2]["day"], "2026-08-03");
}

#[tokio::test]
async fn http_proxy_translates_unauthorized() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/api/oura?endpoint=personal_info",
            server.base_url
        ))
        .header("x-oura-token", "bad-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid API token");
}

#[tokio::test]
async fn http_proxy_translates_rate_limit() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/api/oura?endpoint=personal_info",
            server.base_url
        ))
        .header("x-oura-token", "throttled-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 429);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Rate limit exceeded");
}

#[tokio::test]
async fn http_proxy_collapses_other_upstream_failures() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/api/oura?endpoint=heartrate&start_datetime=2026-08-01T00:00:00&end_datetime=2026-08-01T23:59:59",
            server.base_url
        ))
        .header("x-oura-token", "good-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Proxy request failed");
    assert!(body["details"].as_str().unwrap().contains("HTTP 500"));
}

#[tokio::test]
async fn http_missing_static_asset_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/assets/no-such-file.css", server.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "File not found");
}

#[tokio::test]
async fn http_index_serves_dashboard_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client.get(&server.base_url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let page = response.text().await.unwrap();
    assert!(page.contains("Oura Dashboard"));
}

#[tokio::test]
async fn http_token_lifecycle_and_bundles() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let token_url = format!("{}/api/token", server.base_url);

    // Start from a clean slate.
    client.delete(&token_url).send().await.unwrap();
    let status: Value = client
        .get(&token_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["has_token"], false);

    // Without a credential the bundle call fails fast.
    let response = client
        .get(format!("{}/api/daily", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "no API token available");

    // A credential the upstream rejects is discarded again.
    let response = client
        .post(&token_url)
        .json(&serde_json::json!({ "token": "bad-token" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let status: Value = client
        .get(&token_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["has_token"], false);

    // Blank tokens never reach storage or the network.
    let response = client
        .post(&token_url)
        .json(&serde_json::json!({ "token": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // A good credential verifies and sticks.
    let response = client
        .post(&token_url)
        .json(&serde_json::json!({ "token": "good-token" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let status: Value = response.json().await.unwrap();
    assert_eq!(status["has_token"], true);

    // Single-day bundle: all three categories populated, heart-rate
    // failure absorbed into an empty sample list.
    let response = client
        .get(format!("{}/api/daily?date=2026-08-01", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let bundle: Value = response.json().await.unwrap();
    assert_eq!(bundle["date"], "2026-08-01");
    assert_eq!(bundle["sleep"]["score"], 80.0);
    assert_eq!(bundle["readiness"]["day"], "2026-08-01");
    assert_eq!(bundle["activity"]["score"], 80.0);
    assert_eq!(bundle["hrv"].as_array().unwrap().len(), 0);

    let response = client
        .get(format!("{}/api/daily?date=not-a-date", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Trend bundle: the readiness gap on the middle day does not drop
    // the day, and the series keeps the slot as null.
    let response = client
        .get(format!("{}/api/trends?days=3", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let trends: Value = response.json().await.unwrap();
    let days = trends["days"].as_object().unwrap();
    assert_eq!(days.len(), 3);
    let labels = trends["series"]["labels"].as_array().unwrap();
    assert_eq!(labels.len(), 3);
    let middle = labels[1].as_str().unwrap();
    assert!(days[middle].get("readiness").is_none());
    assert!(days[middle].get("sleep").is_some());
    assert!(trends["series"]["readiness"][1].is_null());
    assert!(trends["series"]["sleep"][1].is_number());

    // Clearing the credential returns the app to the unauthenticated
    // state.
    client.delete(&token_url).send().await.unwrap();
    let response = client
        .get(format!("{}/api/daily", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
