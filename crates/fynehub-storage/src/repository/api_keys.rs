//! API key repository

use async_trait::async_trait;
use fynehub_common::types::{ApiKeyId, Role, UserId};
use fynehub_common::{Error, Result};
use uuid::Uuid;

use crate::db::DatabasePool;
use crate::models::ApiKey;

/// API key repository trait
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn create(&self, input: CreateApiKey) -> Result<ApiKey>;
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>>;
    async fn revoke(&self, id: ApiKeyId) -> Result<()>;
}

/// Create API key input
#[derive(Debug, Clone)]
pub struct CreateApiKey {
    pub user_id: UserId,
    pub role: Role,
    pub key_hash: String,
    pub label: Option<String>,
}

/// Database API key repository
pub struct DbApiKeyRepository {
    pool: DatabasePool,
}

impl DbApiKeyRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for DbApiKeyRepository {
    async fn create(&self, input: CreateApiKey) -> Result<ApiKey> {
        sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (id, user_id, role, key_hash, label, active, created_at)
            VALUES ($1, $2, $3, $4, $5, true, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.user_id)
        .bind(input.role.to_string())
        .bind(&input.key_hash)
        .bind(&input.label)
        .bind(chrono::Utc::now())
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE key_hash = $1 AND active")
            .bind(key_hash)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn revoke(&self, id: ApiKeyId) -> Result<()> {
        sqlx::query("UPDATE api_keys SET active = false WHERE id = $1")
            .bind(id)
            .execute(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }
}
