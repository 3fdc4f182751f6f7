//! Campaign handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use fynehub_common::types::Actor;
use fynehub_common::Error;
use fynehub_storage::models::Campaign;
use fynehub_storage::repository::campaigns::{
    CampaignRepository as CampaignRepositoryTrait, CreateCampaign,
};
use fynehub_storage::repository::CampaignRepository;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

/// Query parameters for listing campaigns
#[derive(Debug, Clone, Deserialize)]
pub struct ListCampaignsQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// Request body for creating a campaign
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub product_name: Option<String>,
}

/// Request body for toggling a campaign
#[derive(Debug, Clone, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<Json<Vec<Campaign>>, ApiError> {
    let repo = CampaignRepository::new(state.db_pool.clone());
    Ok(Json(repo.list(query.active_only).await?))
}

pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError> {
    let repo = CampaignRepository::new(state.db_pool.clone());
    let campaign = repo
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Campaign {}", id)))?;
    Ok(Json(campaign))
}

pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    if !actor.is_admin() {
        return Err(Error::PermissionDenied("Only admins create campaigns".to_string()).into());
    }
    if input.name.trim().is_empty() {
        return Err(Error::Validation("Campaign name is required".to_string()).into());
    }

    let repo = CampaignRepository::new(state.db_pool.clone());
    let campaign = repo
        .create(CreateCampaign {
            name: input.name,
            description: input.description,
            brand: input.brand,
            product_name: input.product_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn set_campaign_active(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<SetActiveRequest>,
) -> Result<Json<Campaign>, ApiError> {
    if !actor.is_admin() {
        return Err(Error::PermissionDenied("Only admins manage campaigns".to_string()).into());
    }

    let repo = CampaignRepository::new(state.db_pool.clone());
    let campaign = repo
        .set_active(id, input.active)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Campaign {}", id)))?;
    Ok(Json(campaign))
}
