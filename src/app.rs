use crate::handlers;
use crate::proxy;
use crate::state::AppState;
use crate::static_files;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    // Every response, success or failure, must stay readable from the
    // browser client.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/oura", get(proxy::forward).options(proxy::preflight))
        .route(
            "/api/token",
            get(handlers::token_status)
                .post(handlers::token_save)
                .delete(handlers::token_clear),
        )
        .route("/api/daily", get(handlers::get_daily))
        .route("/api/trends", get(handlers::get_trends))
        .fallback(static_files::serve)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
