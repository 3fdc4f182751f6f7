//! Content submission repository
//!
//! Review decisions are compare-and-set updates guarded on
//! `pending_review`; approval additionally increments the parent reward's
//! `paid_out` inside the same transaction so the running-sum pair never
//! drifts from the submission record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fynehub_common::types::{RewardId, SubmissionId, SubmissionStatus, UserId};
use fynehub_common::{Error, Result};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::DatabasePool;
use crate::models::{ContentReward, ContentSubmission};

/// Content submission repository trait
#[async_trait]
pub trait ContentSubmissionRepository: Send + Sync {
    /// Insert a new submission in `pending_review`, rejecting before any
    /// write if the affiliate already used the video URL or ad code.
    async fn create(&self, input: CreateSubmission) -> Result<ContentSubmission>;
    async fn get(&self, id: SubmissionId) -> Result<Option<ContentSubmission>>;
    /// Submissions by one affiliate, newest first; superseded
    /// (`resubmitted`) records are excluded unless asked for.
    async fn list_by_affiliate(
        &self,
        affiliate_id: UserId,
        include_superseded: bool,
    ) -> Result<Vec<ContentSubmission>>;
    async fn list_by_reward(
        &self,
        reward_id: RewardId,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<ContentSubmission>>;
    async fn list_pending(&self) -> Result<Vec<ContentSubmission>>;
    /// Approve a pending submission and add `payout` to the reward's
    /// `paid_out` atomically; `None` means the submission was not pending.
    async fn approve(
        &self,
        id: SubmissionId,
        tracked_views: i64,
        payout: Decimal,
    ) -> Result<Option<(ContentSubmission, ContentReward)>>;
    /// Reject a pending submission; `None` means it was not pending.
    async fn reject(
        &self,
        id: SubmissionId,
        reason: Option<String>,
    ) -> Result<Option<ContentSubmission>>;
    /// Retire a rejected submission owned by `input.affiliate_id` to
    /// `resubmitted` and insert its replacement, linked via
    /// `original_submission_id`, in one transaction. `None` means the
    /// original was not in `rejected` or is not owned by the affiliate.
    async fn resubmit(
        &self,
        original_id: SubmissionId,
        input: CreateSubmission,
    ) -> Result<Option<ContentSubmission>>;
    /// Flag a reviewed outcome as read by its owner
    async fn mark_seen(&self, id: SubmissionId, affiliate_id: UserId) -> Result<bool>;
}

/// Create submission input
#[derive(Debug, Clone)]
pub struct CreateSubmission {
    pub reward_id: RewardId,
    pub affiliate_id: UserId,
    pub affiliate_handle: String,
    pub video_url: String,
    pub ad_code: String,
}

/// Database content submission repository
pub struct DbContentSubmissionRepository {
    pool: DatabasePool,
}

impl DbContentSubmissionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn insert_pending(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateSubmission,
        original_submission_id: Option<SubmissionId>,
        now: DateTime<Utc>,
    ) -> Result<ContentSubmission> {
        let duplicate: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT video_url FROM content_submissions
            WHERE affiliate_id = $1 AND (video_url = $2 OR ad_code = $3)
            LIMIT 1
            "#,
        )
        .bind(input.affiliate_id)
        .bind(&input.video_url)
        .bind(&input.ad_code)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if duplicate.is_some() {
            return Err(Error::Validation(
                "Video URL or ad code already used by this affiliate".to_string(),
            ));
        }

        sqlx::query_as::<_, ContentSubmission>(
            r#"
            INSERT INTO content_submissions (
                id, reward_id, affiliate_id, affiliate_handle, video_url, ad_code,
                status, seen_by_affiliate, original_submission_id, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, false, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.reward_id)
        .bind(input.affiliate_id)
        .bind(&input.affiliate_handle)
        .bind(&input.video_url)
        .bind(&input.ad_code)
        .bind(SubmissionStatus::PendingReview.to_string())
        .bind(original_submission_id)
        .bind(now)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.code().as_deref() == Some("23505") {
                    return Error::Validation(
                        "Video URL or ad code already used by this affiliate".to_string(),
                    );
                }
            }
            Error::Database(e.to_string())
        })
    }
}

#[async_trait]
impl ContentSubmissionRepository for DbContentSubmissionRepository {
    async fn create(&self, input: CreateSubmission) -> Result<ContentSubmission> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let submission = Self::insert_pending(&mut tx, &input, None, Utc::now()).await?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(submission)
    }

    async fn get(&self, id: SubmissionId) -> Result<Option<ContentSubmission>> {
        sqlx::query_as::<_, ContentSubmission>("SELECT * FROM content_submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list_by_affiliate(
        &self,
        affiliate_id: UserId,
        include_superseded: bool,
    ) -> Result<Vec<ContentSubmission>> {
        if include_superseded {
            sqlx::query_as::<_, ContentSubmission>(
                "SELECT * FROM content_submissions WHERE affiliate_id = $1 ORDER BY submitted_at DESC",
            )
            .bind(affiliate_id)
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
        } else {
            sqlx::query_as::<_, ContentSubmission>(
                r#"
                SELECT * FROM content_submissions
                WHERE affiliate_id = $1 AND status <> $2
                ORDER BY submitted_at DESC
                "#,
            )
            .bind(affiliate_id)
            .bind(SubmissionStatus::Resubmitted.to_string())
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
        }
    }

    async fn list_by_reward(
        &self,
        reward_id: RewardId,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<ContentSubmission>> {
        if let Some(status) = status {
            sqlx::query_as::<_, ContentSubmission>(
                r#"
                SELECT * FROM content_submissions
                WHERE reward_id = $1 AND status = $2
                ORDER BY submitted_at DESC
                "#,
            )
            .bind(reward_id)
            .bind(status.to_string())
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
        } else {
            sqlx::query_as::<_, ContentSubmission>(
                r#"
                SELECT * FROM content_submissions
                WHERE reward_id = $1 AND status <> $2
                ORDER BY submitted_at DESC
                "#,
            )
            .bind(reward_id)
            .bind(SubmissionStatus::Resubmitted.to_string())
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
        }
    }

    async fn list_pending(&self) -> Result<Vec<ContentSubmission>> {
        sqlx::query_as::<_, ContentSubmission>(
            "SELECT * FROM content_submissions WHERE status = $1 ORDER BY submitted_at ASC",
        )
        .bind(SubmissionStatus::PendingReview.to_string())
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn approve(
        &self,
        id: SubmissionId,
        tracked_views: i64,
        payout: Decimal,
    ) -> Result<Option<(ContentSubmission, ContentReward)>> {
        let now = Utc::now();

        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let submission = sqlx::query_as::<_, ContentSubmission>(
            r#"
            UPDATE content_submissions
            SET status = $2, tracked_views = $3, payout_amount = $4, reviewed_at = $5
            WHERE id = $1 AND status = $6
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(SubmissionStatus::Approved.to_string())
        .bind(tracked_views)
        .bind(payout)
        .bind(now)
        .bind(SubmissionStatus::PendingReview.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        let Some(submission) = submission else {
            return Ok(None);
        };

        let reward = sqlx::query_as::<_, ContentReward>(
            r#"
            UPDATE content_rewards
            SET paid_out = paid_out + $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(submission.reward_id)
        .bind(payout)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?
        .ok_or_else(|| Error::Internal("Submission references a missing reward".to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(Some((submission, reward)))
    }

    async fn reject(
        &self,
        id: SubmissionId,
        reason: Option<String>,
    ) -> Result<Option<ContentSubmission>> {
        sqlx::query_as::<_, ContentSubmission>(
            r#"
            UPDATE content_submissions
            SET status = $2, rejection_reason = $3, reviewed_at = $4
            WHERE id = $1 AND status = $5
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(SubmissionStatus::Rejected.to_string())
        .bind(reason)
        .bind(Utc::now())
        .bind(SubmissionStatus::PendingReview.to_string())
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn resubmit(
        &self,
        original_id: SubmissionId,
        input: CreateSubmission,
    ) -> Result<Option<ContentSubmission>> {
        let now = Utc::now();

        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let retired = sqlx::query_as::<_, ContentSubmission>(
            r#"
            UPDATE content_submissions
            SET status = $2
            WHERE id = $1 AND status = $3 AND affiliate_id = $4
            RETURNING *
            "#,
        )
        .bind(original_id)
        .bind(SubmissionStatus::Resubmitted.to_string())
        .bind(SubmissionStatus::Rejected.to_string())
        .bind(input.affiliate_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if retired.is_none() {
            return Ok(None);
        }

        let replacement = Self::insert_pending(&mut tx, &input, Some(original_id), now).await?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(Some(replacement))
    }

    async fn mark_seen(&self, id: SubmissionId, affiliate_id: UserId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE content_submissions SET seen_by_affiliate = true WHERE id = $1 AND affiliate_id = $2",
        )
        .bind(id)
        .bind(affiliate_id)
        .execute(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
