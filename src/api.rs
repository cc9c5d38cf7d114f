use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::db;
use crate::error::ApiError;
use crate::models::CampaignResponse;
use crate::params::{CampaignQuery, ReportWindow};
use crate::report;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/campaigns/", get(get_campaign_data))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_campaign_data(
    State(state): State<AppState>,
    query: Result<Query<CampaignQuery>, QueryRejection>,
) -> Result<Json<CampaignResponse>, ApiError> {
    let Query(query) =
        query.map_err(|rejection| ApiError::invalid("query", rejection.body_text()))?;
    let window = ReportWindow::from_query(query)?;
    campaign_report(&state.pool, &window).await.map(Json)
}

#[tracing::instrument(
    skip_all,
    fields(
        campaign_id = window.campaign_id.as_deref().unwrap_or("all"),
        start_date = %window.start_date,
        end_date = %window.end_date,
    )
)]
async fn campaign_report(
    pool: &PgPool,
    window: &ReportWindow,
) -> Result<CampaignResponse, ApiError> {
    let rows = db::fetch_campaign_rows(
        pool,
        window.start_date,
        window.end_date,
        window.campaign_id.as_deref(),
    )
    .await?;
    tracing::debug!(rows = rows.len(), "loaded joined campaign rows");

    report::build_response(window, &rows).inspect_err(|err| {
        if let ApiError::NoData { .. } = err {
            tracing::warn!("{err}");
        }
    })
}
