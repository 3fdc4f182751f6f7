//! Survey and weekly draw handlers

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use fynehub_common::types::Actor;
use fynehub_storage::models::{DrawWin, SurveyResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AppState;
use crate::error::ApiError;

/// Request body for a survey response
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyResponseRequest {
    pub answers: serde_json::Value,
}

/// Request body for running a draw
#[derive(Debug, Clone, Deserialize)]
pub struct RunDrawRequest {
    pub prize: String,
}

/// Draw result; `win` absent when the pool was empty
#[derive(Debug, Clone, Serialize)]
pub struct DrawResult {
    pub win: Option<DrawWin>,
}

/// Query parameters for listing wins
#[derive(Debug, Clone, Deserialize)]
pub struct ListWinsQuery {
    #[serde(default = "default_wins_days")]
    pub days: i64,
}

fn default_wins_days() -> i64 {
    90
}

pub async fn submit_survey(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<SurveyResponseRequest>,
) -> Result<(StatusCode, Json<SurveyResponse>), ApiError> {
    let response = state.draw.submit_response(actor, body.answers).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn run_draw(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<RunDrawRequest>,
) -> Result<Json<DrawResult>, ApiError> {
    let win = state.draw.run(actor, &body.prize).await?;
    Ok(Json(DrawResult { win }))
}

pub async fn list_wins(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListWinsQuery>,
) -> Result<Json<Vec<DrawWin>>, ApiError> {
    Ok(Json(state.draw.recent_wins(query.days).await?))
}
