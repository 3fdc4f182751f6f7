//! Affiliate repository

use async_trait::async_trait;
use fynehub_common::types::{Platform, Role, UserId};
use fynehub_common::{Error, Result};
use uuid::Uuid;

use crate::db::DatabasePool;
use crate::models::Affiliate;

/// Affiliate repository trait
#[async_trait]
pub trait AffiliateRepository: Send + Sync {
    async fn create(&self, input: CreateAffiliate) -> Result<Affiliate>;
    async fn get(&self, id: UserId) -> Result<Option<Affiliate>>;
    async fn get_by_handle(&self, handle: &str) -> Result<Option<Affiliate>>;
    async fn list(&self) -> Result<Vec<Affiliate>>;
}

/// Create affiliate input
#[derive(Debug, Clone)]
pub struct CreateAffiliate {
    pub handle: String,
    pub display_name: Option<String>,
    pub email: String,
    pub platform: Platform,
    pub role: Role,
}

/// Database affiliate repository
pub struct DbAffiliateRepository {
    pool: DatabasePool,
}

impl DbAffiliateRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AffiliateRepository for DbAffiliateRepository {
    async fn create(&self, input: CreateAffiliate) -> Result<Affiliate> {
        let id = Uuid::now_v7();
        let now = chrono::Utc::now();

        sqlx::query_as::<_, Affiliate>(
            r#"
            INSERT INTO affiliates (id, handle, display_name, email, platform, role, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, true, $7, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.handle)
        .bind(&input.display_name)
        .bind(&input.email)
        .bind(input.platform.to_string())
        .bind(input.role.to_string())
        .bind(now)
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn get(&self, id: UserId) -> Result<Option<Affiliate>> {
        sqlx::query_as::<_, Affiliate>("SELECT * FROM affiliates WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn get_by_handle(&self, handle: &str) -> Result<Option<Affiliate>> {
        sqlx::query_as::<_, Affiliate>("SELECT * FROM affiliates WHERE handle = $1")
            .bind(handle)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list(&self) -> Result<Vec<Affiliate>> {
        sqlx::query_as::<_, Affiliate>("SELECT * FROM affiliates ORDER BY handle ASC")
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}
