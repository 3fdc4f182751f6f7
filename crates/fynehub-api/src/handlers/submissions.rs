//! Content submission handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use fynehub_common::types::Actor;
use fynehub_core::{ApprovalOutcome, SubmitContentInput};
use fynehub_storage::models::{ContentSubmission, ContentReward};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

/// Request body for submitting content
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitContentRequest {
    pub reward_id: Uuid,
    pub video_url: String,
    pub ad_code: String,
}

/// Request body for approving a submission
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveRequest {
    pub tracked_views: i64,
}

/// Request body for rejecting a submission
#[derive(Debug, Clone, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// Request body for resubmitting after a rejection
#[derive(Debug, Clone, Deserialize)]
pub struct ResubmitRequest {
    pub video_url: String,
    pub ad_code: String,
}

/// Approval response carrying the budget flag
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalResponse {
    pub submission: ContentSubmission,
    pub reward: ContentReward,
    pub payout_amount: Decimal,
    pub budget_exceeded: bool,
}

impl From<ApprovalOutcome> for ApprovalResponse {
    fn from(outcome: ApprovalOutcome) -> Self {
        Self {
            submission: outcome.submission,
            reward: outcome.reward,
            payout_amount: outcome.payout_amount,
            budget_exceeded: outcome.budget_exceeded,
        }
    }
}

pub async fn submit_content(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<SubmitContentRequest>,
) -> Result<(StatusCode, Json<ContentSubmission>), ApiError> {
    let submission = state
        .content
        .submit(
            actor,
            SubmitContentInput {
                reward_id: body.reward_id,
                video_url: body.video_url,
                ad_code: body.ad_code,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn my_submissions(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ContentSubmission>>, ApiError> {
    Ok(Json(state.content.my_submissions(actor).await?))
}

pub async fn pending_submissions(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ContentSubmission>>, ApiError> {
    Ok(Json(state.content.pending(actor).await?))
}

pub async fn approve_submission(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApproveRequest>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let outcome = state.content.approve(actor, id, body.tracked_views).await?;
    Ok(Json(outcome.into()))
}

pub async fn reject_submission(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<ContentSubmission>, ApiError> {
    Ok(Json(state.content.reject(actor, id, body.reason).await?))
}

pub async fn resubmit(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResubmitRequest>,
) -> Result<(StatusCode, Json<ContentSubmission>), ApiError> {
    let replacement = state
        .content
        .resubmit(actor, id, body.video_url, body.ad_code)
        .await?;
    Ok((StatusCode::CREATED, Json(replacement)))
}

pub async fn mark_seen(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.content.mark_seen(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
