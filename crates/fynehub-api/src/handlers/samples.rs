//! Sample request handlers
//!
//! Transition verbs are separate POST routes; the workflow decides who may
//! perform each one and from which stage.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use fynehub_common::types::{Actor, SampleRequestStatus};
use fynehub_core::CreateSampleRequestInput;
use fynehub_storage::models::SampleRequest;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

/// Request body for creating a sample request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSampleRequestBody {
    pub campaign_id: Uuid,
    pub video_url: String,
    pub ad_code: String,
}

/// Request body for the showcase confirmation
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmShowcaseBody {
    /// Attestation that the sample showcase is placed
    pub confirmed: bool,
}

/// Query parameters for the admin status listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListByStatusQuery {
    pub status: String,
}

pub async fn create_sample_request(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateSampleRequestBody>,
) -> Result<(StatusCode, Json<SampleRequest>), ApiError> {
    let request = state
        .samples
        .create(
            actor,
            CreateSampleRequestInput {
                campaign_id: body.campaign_id,
                video_url: body.video_url,
                ad_code: body.ad_code,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn my_sample_requests(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<SampleRequest>>, ApiError> {
    Ok(Json(state.samples.my_requests(actor).await?))
}

pub async fn list_by_status(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListByStatusQuery>,
) -> Result<Json<Vec<SampleRequest>>, ApiError> {
    let status = SampleRequestStatus::from_str(&query.status)?;
    Ok(Json(state.samples.list_by_status(actor, status).await?))
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<SampleRequest>, ApiError> {
    Ok(Json(state.samples.approve(actor, id).await?))
}

pub async fn reject(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<SampleRequest>, ApiError> {
    Ok(Json(state.samples.reject(actor, id).await?))
}

pub async fn confirm_showcase(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<ConfirmShowcaseBody>,
) -> Result<Json<SampleRequest>, ApiError> {
    Ok(Json(
        state
            .samples
            .confirm_showcase(actor, id, body.confirmed)
            .await?,
    ))
}

pub async fn ship(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<SampleRequest>, ApiError> {
    Ok(Json(state.samples.ship(actor, id).await?))
}
