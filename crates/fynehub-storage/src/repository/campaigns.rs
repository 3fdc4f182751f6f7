//! Campaign repository

use async_trait::async_trait;
use fynehub_common::types::CampaignId;
use fynehub_common::{Error, Result};
use uuid::Uuid;

use crate::db::DatabasePool;
use crate::models::Campaign;

/// Campaign repository trait
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn create(&self, input: CreateCampaign) -> Result<Campaign>;
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>>;
    async fn list(&self, active_only: bool) -> Result<Vec<Campaign>>;
    async fn set_active(&self, id: CampaignId, active: bool) -> Result<Option<Campaign>>;
}

/// Create campaign input
#[derive(Debug, Clone)]
pub struct CreateCampaign {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub product_name: Option<String>,
}

/// Database campaign repository
pub struct DbCampaignRepository {
    pool: DatabasePool,
}

impl DbCampaignRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for DbCampaignRepository {
    async fn create(&self, input: CreateCampaign) -> Result<Campaign> {
        let id = Uuid::now_v7();
        let now = chrono::Utc::now();

        sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (id, name, description, brand, product_name, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, true, $6, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.brand)
        .bind(&input.product_name)
        .bind(now)
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>> {
        sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Campaign>> {
        if active_only {
            sqlx::query_as::<_, Campaign>(
                "SELECT * FROM campaigns WHERE active ORDER BY created_at DESC",
            )
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
        } else {
            sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns ORDER BY created_at DESC")
                .fetch_all(self.pool.pool())
                .await
                .map_err(|e| Error::Database(e.to_string()))
        }
    }

    async fn set_active(&self, id: CampaignId, active: bool) -> Result<Option<Campaign>> {
        sqlx::query_as::<_, Campaign>(
            "UPDATE campaigns SET active = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .bind(chrono::Utc::now())
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }
}
