//! Survey response and draw-win repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fynehub_common::types::UserId;
use fynehub_common::{Error, Result};
use uuid::Uuid;

use crate::db::DatabasePool;
use crate::models::{DrawWin, SurveyResponse};

/// Survey repository trait
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    async fn create_response(&self, input: CreateSurveyResponse) -> Result<SurveyResponse>;
    /// Responses created after `since` (all responses when `None`)
    async fn responses_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SurveyResponse>>;
    async fn record_win(&self, affiliate_id: UserId, prize: &str) -> Result<DrawWin>;
    async fn wins_since(&self, since: DateTime<Utc>) -> Result<Vec<DrawWin>>;
    /// Timestamp of the most recent draw, if any
    async fn latest_win_at(&self) -> Result<Option<DateTime<Utc>>>;
}

/// Create survey response input
#[derive(Debug, Clone)]
pub struct CreateSurveyResponse {
    pub affiliate_id: UserId,
    pub answers: serde_json::Value,
}

/// Database survey repository
pub struct DbSurveyRepository {
    pool: DatabasePool,
}

impl DbSurveyRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurveyRepository for DbSurveyRepository {
    async fn create_response(&self, input: CreateSurveyResponse) -> Result<SurveyResponse> {
        sqlx::query_as::<_, SurveyResponse>(
            r#"
            INSERT INTO survey_responses (id, affiliate_id, answers, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.affiliate_id)
        .bind(&input.answers)
        .bind(Utc::now())
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn responses_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SurveyResponse>> {
        if let Some(since) = since {
            sqlx::query_as::<_, SurveyResponse>(
                "SELECT * FROM survey_responses WHERE created_at > $1 ORDER BY created_at ASC",
            )
            .bind(since)
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
        } else {
            sqlx::query_as::<_, SurveyResponse>(
                "SELECT * FROM survey_responses ORDER BY created_at ASC",
            )
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
        }
    }

    async fn record_win(&self, affiliate_id: UserId, prize: &str) -> Result<DrawWin> {
        sqlx::query_as::<_, DrawWin>(
            r#"
            INSERT INTO draw_wins (id, affiliate_id, prize, drawn_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(affiliate_id)
        .bind(prize)
        .bind(Utc::now())
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn wins_since(&self, since: DateTime<Utc>) -> Result<Vec<DrawWin>> {
        sqlx::query_as::<_, DrawWin>(
            "SELECT * FROM draw_wins WHERE drawn_at > $1 ORDER BY drawn_at DESC",
        )
        .bind(since)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn latest_win_at(&self) -> Result<Option<DateTime<Utc>>> {
        let (latest,): (Option<DateTime<Utc>>,) =
            sqlx::query_as("SELECT MAX(drawn_at) FROM draw_wins")
                .fetch_one(self.pool.pool())
                .await
                .map_err(|e| Error::Database(e.to_string()))?;

        Ok(latest)
    }
}
