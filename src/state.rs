use crate::client::OuraClient;
use crate::storage::CredentialStore;
use std::path::PathBuf;

/// Fixed upstream host plus the shared outbound HTTP client the proxy
/// forwards through.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub http: reqwest::Client,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(crate::proxy::USER_AGENT)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }
}

/// Per-process services, explicitly constructed in `main` and handed
/// to the router. Requests share these handles and nothing else.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamConfig,
    pub client: OuraClient,
    pub store: CredentialStore,
    pub static_root: PathBuf,
}

impl AppState {
    pub fn new(
        upstream: UpstreamConfig,
        client: OuraClient,
        store: CredentialStore,
        static_root: PathBuf,
    ) -> Self {
        Self {
            upstream,
            client,
            store,
            static_root,
        }
    }
}
