//! Incentive campaign handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use fynehub_common::types::Actor;
use fynehub_storage::models::IncentiveCampaign;
use fynehub_storage::repository::incentives::{CreateIncentiveCampaign, JoinOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

/// Request body for creating an incentive campaign
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIncentiveRequest {
    pub name: String,
    pub description: Option<String>,
    pub min_affiliates: i32,
}

/// Join response
#[derive(Debug, Clone, Serialize)]
pub struct JoinResponse {
    pub campaign: IncentiveCampaign,
    pub newly_joined: bool,
    pub activated: bool,
}

impl From<JoinOutcome> for JoinResponse {
    fn from(outcome: JoinOutcome) -> Self {
        Self {
            campaign: outcome.campaign,
            newly_joined: outcome.newly_joined,
            activated: outcome.activated,
        }
    }
}

pub async fn list_incentives(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<IncentiveCampaign>>, ApiError> {
    Ok(Json(state.incentives.list().await?))
}

pub async fn get_incentive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<IncentiveCampaign>, ApiError> {
    Ok(Json(state.incentives.get(id).await?))
}

pub async fn create_incentive(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<CreateIncentiveRequest>,
) -> Result<(StatusCode, Json<IncentiveCampaign>), ApiError> {
    let campaign = state
        .incentives
        .create(
            actor,
            CreateIncentiveCampaign {
                name: body.name,
                description: body.description,
                min_affiliates: body.min_affiliates,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn join_incentive(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<JoinResponse>, ApiError> {
    let outcome = state.incentives.join(actor, id).await?;
    Ok(Json(outcome.into()))
}
