//! Content reward handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use fynehub_common::types::{Actor, Platform, RewardTier};
use fynehub_common::Error;
use fynehub_core::LeaderboardEntry;
use fynehub_storage::models::ContentReward;
use fynehub_storage::repository::content_rewards::{
    ContentRewardRepository as ContentRewardRepositoryTrait, CreateContentReward,
};
use fynehub_storage::repository::ContentRewardRepository;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

/// Query parameters for listing rewards
#[derive(Debug, Clone, Deserialize)]
pub struct ListRewardsQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// Request body for creating a reward
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRewardRequest {
    pub name: String,
    pub description: Option<String>,
    pub total_budget: Decimal,
    pub base_rate: Decimal,
    #[serde(default = "default_rate_unit")]
    pub rate_unit_views: i64,
    #[serde(default)]
    pub tiers: Vec<RewardTier>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub leaderboard_enabled: bool,
}

fn default_rate_unit() -> i64 {
    1000
}

/// One leaderboard row in the response
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub affiliate_handle: String,
    pub approved_count: usize,
    pub total_views: i64,
    pub total_payout: Decimal,
}

impl From<LeaderboardEntry> for LeaderboardRow {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            rank: entry.rank,
            affiliate_handle: entry.affiliate_handle,
            approved_count: entry.approved_count,
            total_views: entry.total_views,
            total_payout: entry.total_payout,
        }
    }
}

pub async fn list_rewards(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListRewardsQuery>,
) -> Result<Json<Vec<ContentReward>>, ApiError> {
    let repo = ContentRewardRepository::new(state.db_pool.clone());
    Ok(Json(repo.list(query.active_only).await?))
}

pub async fn get_reward(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentReward>, ApiError> {
    let repo = ContentRewardRepository::new(state.db_pool.clone());
    let reward = repo
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Content reward {}", id)))?;
    Ok(Json(reward))
}

pub async fn create_reward(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateRewardRequest>,
) -> Result<(StatusCode, Json<ContentReward>), ApiError> {
    if !actor.is_admin() {
        return Err(Error::PermissionDenied("Only admins create rewards".to_string()).into());
    }
    if input.name.trim().is_empty() {
        return Err(Error::Validation("Reward name is required".to_string()).into());
    }
    if input.total_budget <= Decimal::ZERO {
        return Err(Error::Validation("Budget must be positive".to_string()).into());
    }
    if input.rate_unit_views <= 0 {
        return Err(Error::Validation("Rate unit must be positive".to_string()).into());
    }

    let repo = ContentRewardRepository::new(state.db_pool.clone());
    let reward = repo
        .create(CreateContentReward {
            name: input.name,
            description: input.description,
            total_budget: input.total_budget,
            base_rate: input.base_rate,
            rate_unit_views: input.rate_unit_views,
            tiers: input.tiers,
            platforms: input.platforms,
            leaderboard_enabled: input.leaderboard_enabled,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(reward)))
}

pub async fn reward_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LeaderboardRow>>, ApiError> {
    let entries = state.leaderboard.for_reward(id).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
