use crate::aggregate;
use crate::chart;
use crate::client::cancel_pair;
use crate::errors::AppError;
use crate::models::{DayBundle, TokenRequest, TokenStatus, TrendsResponse};
use crate::state::AppState;
use crate::ui::render_index;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Deserialize;

const DEFAULT_TREND_DAYS: u32 = 7;
const MAX_TREND_DAYS: u32 = 93;

pub async fn index() -> Html<&'static str> {
    Html(render_index())
}

pub async fn token_status(State(state): State<AppState>) -> Json<TokenStatus> {
    Json(TokenStatus {
        has_token: state.store.has_token().await,
    })
}

pub async fn token_save(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenStatus>, AppError> {
    let token = payload.token.trim();
    if token.is_empty() {
        return Err(AppError::bad_request("token must not be empty"));
    }
    state.store.store(token).await?;

    // Verify before reporting success; a rejected credential is
    // discarded so the UI falls back to the token prompt.
    if let Err(err) = state.client.personal_info().await {
        let _ = state.store.clear().await;
        return Err(err.into());
    }

    Ok(Json(TokenStatus { has_token: true }))
}

pub async fn token_clear(State(state): State<AppState>) -> Result<Json<TokenStatus>, AppError> {
    state.store.clear().await?;
    Ok(Json(TokenStatus { has_token: false }))
}

#[derive(Debug, Deserialize)]
pub struct DailyParams {
    pub date: Option<String>,
}

pub async fn get_daily(
    State(state): State<AppState>,
    Query(params): Query<DailyParams>,
) -> Result<Json<DayBundle>, AppError> {
    let date = match params.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))?,
        _ => Local::now().date_naive(),
    };

    let (_handle, cancel) = cancel_pair();
    let bundle = state.client.day_bundle(date, &cancel).await?;
    Ok(Json(bundle))
}

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub days: Option<u32>,
}

pub async fn get_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendsResponse>, AppError> {
    let days = params
        .days
        .unwrap_or(DEFAULT_TREND_DAYS)
        .clamp(1, MAX_TREND_DAYS);
    let today = Local::now().date_naive();
    let (start, end) = aggregate::trend_window(today, days);

    let (_handle, cancel) = cancel_pair();
    let bundle = state.client.trend_bundle_at(today, days, &cancel).await?;
    let series = chart::trend_series(&bundle);

    Ok(Json(TrendsResponse {
        start_date: start.to_string(),
        end_date: end.to_string(),
        days: bundle.days,
        series,
    }))
}
