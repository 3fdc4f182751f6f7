//! Content reward repository

use async_trait::async_trait;
use fynehub_common::types::{Platform, RewardId, RewardTier};
use fynehub_common::{Error, Result};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::DatabasePool;
use crate::models::ContentReward;

/// Content reward repository trait
#[async_trait]
pub trait ContentRewardRepository: Send + Sync {
    async fn create(&self, input: CreateContentReward) -> Result<ContentReward>;
    async fn get(&self, id: RewardId) -> Result<Option<ContentReward>>;
    async fn list(&self, active_only: bool) -> Result<Vec<ContentReward>>;
    async fn set_active(&self, id: RewardId, active: bool) -> Result<Option<ContentReward>>;
}

/// Create content reward input
#[derive(Debug, Clone)]
pub struct CreateContentReward {
    pub name: String,
    pub description: Option<String>,
    pub total_budget: Decimal,
    pub base_rate: Decimal,
    pub rate_unit_views: i64,
    pub tiers: Vec<RewardTier>,
    pub platforms: Vec<Platform>,
    pub leaderboard_enabled: bool,
}

/// Database content reward repository
pub struct DbContentRewardRepository {
    pool: DatabasePool,
}

impl DbContentRewardRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRewardRepository for DbContentRewardRepository {
    async fn create(&self, input: CreateContentReward) -> Result<ContentReward> {
        let id = Uuid::now_v7();
        let now = chrono::Utc::now();
        let tiers = serde_json::to_value(&input.tiers).unwrap_or_default();
        let platforms = serde_json::to_value(&input.platforms).unwrap_or_default();

        sqlx::query_as::<_, ContentReward>(
            r#"
            INSERT INTO content_rewards (
                id, name, description, total_budget, paid_out, base_rate,
                rate_unit_views, tiers, platforms, leaderboard_enabled, active,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, 0, $5, $6, $7, $8, $9, true, $10, $10)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.total_budget)
        .bind(input.base_rate)
        .bind(input.rate_unit_views)
        .bind(&tiers)
        .bind(&platforms)
        .bind(input.leaderboard_enabled)
        .bind(now)
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn get(&self, id: RewardId) -> Result<Option<ContentReward>> {
        sqlx::query_as::<_, ContentReward>("SELECT * FROM content_rewards WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list(&self, active_only: bool) -> Result<Vec<ContentReward>> {
        if active_only {
            sqlx::query_as::<_, ContentReward>(
                "SELECT * FROM content_rewards WHERE active ORDER BY created_at DESC",
            )
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
        } else {
            sqlx::query_as::<_, ContentReward>(
                "SELECT * FROM content_rewards ORDER BY created_at DESC",
            )
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
        }
    }

    async fn set_active(&self, id: RewardId, active: bool) -> Result<Option<ContentReward>> {
        sqlx::query_as::<_, ContentReward>(
            "UPDATE content_rewards SET active = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .bind(chrono::Utc::now())
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }
}
