pub mod aggregate;
pub mod app;
pub mod chart;
pub mod client;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod proxy;
pub mod static_files;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use client::{ClientConfig, OuraClient};
pub use state::{AppState, UpstreamConfig};
pub use storage::{resolve_data_path, CredentialStore};
