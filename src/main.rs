use oura_dash::client::{ClientConfig, OuraClient};
use oura_dash::state::{AppState, UpstreamConfig};
use oura_dash::storage::{resolve_data_path, CredentialStore};
use oura_dash::{proxy, static_files};
use std::{env, net::SocketAddr};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path()?;
    let store = CredentialStore::new(data_path);
    let static_root = static_files::resolve_static_root();
    let upstream = UpstreamConfig::new(proxy::resolve_upstream_base())?;

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    // The controller's client goes through the same forwarding proxy
    // the browser uses; default to our own bound address.
    let proxy_base = env::var("OURA_PROXY_BASE")
        .unwrap_or_else(|_| format!("http://127.0.0.1:{}", local_addr.port()));
    let client = OuraClient::new(ClientConfig::new(proxy_base), store.clone())?;

    let state = AppState::new(upstream, client, store, static_root);
    let app = oura_dash::router(state);

    info!("listening on http://{local_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
