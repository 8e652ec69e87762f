use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::Html,
    routing::{get, post},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{models::RankingEntry, services};
use crate::web::models::{AckResponse, SubmitRecordRequest, Submission};
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn submit_record_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SubmitRecordRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, AppError> {
    let Json(payload) = payload?;

    match payload.validate(&app_state.config)? {
        Submission::Reset => {
            // Legacy control channel; `/clear` is the explicit route.
            warn!("Reset keyword submitted as a name. Clearing leaderboard.");
            clear_leaderboard(&app_state).await
        }
        Submission::Record(new_record) => {
            let id = services::insert_record(
                &app_state.db_pool,
                new_record,
                app_state.config.retention(),
            )
            .await?;
            info!(record_id = id, "Record stored.");
            Ok(Json(AckResponse::saved(id)))
        }
    }
}

async fn clear_all_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<AckResponse>, AppError> {
    clear_leaderboard(&app_state).await
}

async fn clear_leaderboard(app_state: &AppState) -> Result<Json<AckResponse>, AppError> {
    let removed = services::clear_all_records(&app_state.db_pool).await?;
    info!(removed, "Leaderboard cleared.");
    Ok(Json(AckResponse::cleared()))
}

async fn top_entries(app_state: &AppState) -> Result<Vec<RankingEntry>, AppError> {
    let records = services::get_top_records(&app_state.db_pool, app_state.config.top_limit).await?;
    Ok(records.into_iter().map(RankingEntry::from).collect())
}

async fn leaderboard_json_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<RankingEntry>>, AppError> {
    Ok(Json(top_entries(&app_state).await?))
}

async fn leaderboard_html_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    let entries = top_entries(&app_state).await?;
    let page = app_state
        .renderer
        .render(&entries, app_state.config.top_limit)?;
    Ok(Html(page))
}

// --- Router ---

pub fn create_ranking_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/submit", post(submit_record_handler))
        // path used by the school-less clients
        .route("/ranking", post(submit_record_handler))
        .route("/clear", post(clear_all_handler))
        .route("/leaderboard", get(leaderboard_html_handler))
        .route("/api/leaderboard", get(leaderboard_json_handler))
}
