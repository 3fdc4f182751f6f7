//! Sample request repository
//!
//! Creation runs the duplicate video-URL / ad-code check and the insert in
//! a single transaction; unique indexes on `(affiliate_id, video_url)` and
//! `(affiliate_id, ad_code)` are the race-proof backstop. Status changes
//! are compare-and-set updates guarded on the expected status.

use async_trait::async_trait;
use fynehub_common::types::{SampleRequestId, SampleRequestStatus, UserId};
use fynehub_common::{Error, Result};
use uuid::Uuid;

use crate::db::DatabasePool;
use crate::models::SampleRequest;

/// Sample request repository trait
#[async_trait]
pub trait SampleRequestRepository: Send + Sync {
    /// Insert a new request in `pending_approval`, rejecting before any
    /// write if the affiliate already used the video URL or ad code.
    async fn create(&self, input: CreateSampleRequest) -> Result<SampleRequest>;
    async fn get(&self, id: SampleRequestId) -> Result<Option<SampleRequest>>;
    async fn list_by_affiliate(&self, affiliate_id: UserId) -> Result<Vec<SampleRequest>>;
    async fn list_by_status(&self, status: SampleRequestStatus) -> Result<Vec<SampleRequest>>;
    /// Compare-and-set status change; `None` means the request was not in
    /// `from` (or does not exist) and nothing was written.
    async fn transition(
        &self,
        id: SampleRequestId,
        from: SampleRequestStatus,
        to: SampleRequestStatus,
    ) -> Result<Option<SampleRequest>>;
}

/// Create sample request input
#[derive(Debug, Clone)]
pub struct CreateSampleRequest {
    pub campaign_id: Uuid,
    pub campaign_name: String,
    pub affiliate_id: UserId,
    pub affiliate_handle: String,
    pub video_url: String,
    pub ad_code: String,
}

/// Database sample request repository
pub struct DbSampleRequestRepository {
    pool: DatabasePool,
}

impl DbSampleRequestRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(e: sqlx::Error) -> Error {
    if let Some(db_err) = e.as_database_error() {
        if db_err.code().as_deref() == Some("23505") {
            return Error::Validation(
                "Video URL or ad code already used by this affiliate".to_string(),
            );
        }
    }
    Error::Database(e.to_string())
}

#[async_trait]
impl SampleRequestRepository for DbSampleRequestRepository {
    async fn create(&self, input: CreateSampleRequest) -> Result<SampleRequest> {
        let id = Uuid::now_v7();
        let now = chrono::Utc::now();

        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let duplicate: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT video_url FROM sample_requests
            WHERE affiliate_id = $1 AND (video_url = $2 OR ad_code = $3)
            LIMIT 1
            "#,
        )
        .bind(input.affiliate_id)
        .bind(&input.video_url)
        .bind(&input.ad_code)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if duplicate.is_some() {
            return Err(Error::Validation(
                "Video URL or ad code already used by this affiliate".to_string(),
            ));
        }

        let request = sqlx::query_as::<_, SampleRequest>(
            r#"
            INSERT INTO sample_requests (
                id, campaign_id, campaign_name, affiliate_id, affiliate_handle,
                video_url, ad_code, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.campaign_id)
        .bind(&input.campaign_name)
        .bind(input.affiliate_id)
        .bind(&input.affiliate_handle)
        .bind(&input.video_url)
        .bind(&input.ad_code)
        .bind(SampleRequestStatus::PendingApproval.to_string())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(request)
    }

    async fn get(&self, id: SampleRequestId) -> Result<Option<SampleRequest>> {
        sqlx::query_as::<_, SampleRequest>("SELECT * FROM sample_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list_by_affiliate(&self, affiliate_id: UserId) -> Result<Vec<SampleRequest>> {
        sqlx::query_as::<_, SampleRequest>(
            "SELECT * FROM sample_requests WHERE affiliate_id = $1 ORDER BY created_at DESC",
        )
        .bind(affiliate_id)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list_by_status(&self, status: SampleRequestStatus) -> Result<Vec<SampleRequest>> {
        sqlx::query_as::<_, SampleRequest>(
            "SELECT * FROM sample_requests WHERE status = $1 ORDER BY created_at ASC",
        )
        .bind(status.to_string())
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn transition(
        &self,
        id: SampleRequestId,
        from: SampleRequestStatus,
        to: SampleRequestStatus,
    ) -> Result<Option<SampleRequest>> {
        sqlx::query_as::<_, SampleRequest>(
            r#"
            UPDATE sample_requests SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from.to_string())
        .bind(to.to_string())
        .bind(chrono::Utc::now())
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }
}
