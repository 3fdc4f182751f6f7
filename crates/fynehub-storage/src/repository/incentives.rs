//! Incentive campaign repository
//!
//! `join` is the one place a counter and a status flip must move together:
//! the row is locked for the duration of the transaction, the membership
//! insert makes repeat joins a no-op, and `pending → active` happens in
//! the same unit as the increment so no two concurrent joins can both
//! observe a pre-threshold count and both skip the flip.

use async_trait::async_trait;
use fynehub_common::types::{IncentiveCampaignId, IncentiveStatus, UserId};
use fynehub_common::{Error, Result};
use uuid::Uuid;

use crate::db::DatabasePool;
use crate::models::IncentiveCampaign;

/// Outcome of a join attempt
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// Campaign state after the join
    pub campaign: IncentiveCampaign,
    /// False when this affiliate had already joined (no-op)
    pub newly_joined: bool,
    /// True only for the join whose increment crossed the threshold
    pub activated: bool,
}

/// Incentive campaign repository trait
#[async_trait]
pub trait IncentiveRepository: Send + Sync {
    async fn create(&self, input: CreateIncentiveCampaign) -> Result<IncentiveCampaign>;
    async fn get(&self, id: IncentiveCampaignId) -> Result<Option<IncentiveCampaign>>;
    async fn list(&self) -> Result<Vec<IncentiveCampaign>>;
    /// Atomic read-modify-write join; see module docs.
    async fn join(&self, id: IncentiveCampaignId, affiliate_id: UserId) -> Result<JoinOutcome>;
}

/// Create incentive campaign input
#[derive(Debug, Clone)]
pub struct CreateIncentiveCampaign {
    pub name: String,
    pub description: Option<String>,
    pub min_affiliates: i32,
}

/// Database incentive campaign repository
pub struct DbIncentiveRepository {
    pool: DatabasePool,
}

impl DbIncentiveRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncentiveRepository for DbIncentiveRepository {
    async fn create(&self, input: CreateIncentiveCampaign) -> Result<IncentiveCampaign> {
        let id = Uuid::now_v7();
        let now = chrono::Utc::now();

        sqlx::query_as::<_, IncentiveCampaign>(
            r#"
            INSERT INTO incentive_campaigns (
                id, name, description, min_affiliates, joined_affiliates, status,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, 0, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.min_affiliates)
        .bind(IncentiveStatus::Pending.to_string())
        .bind(now)
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn get(&self, id: IncentiveCampaignId) -> Result<Option<IncentiveCampaign>> {
        sqlx::query_as::<_, IncentiveCampaign>("SELECT * FROM incentive_campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list(&self) -> Result<Vec<IncentiveCampaign>> {
        sqlx::query_as::<_, IncentiveCampaign>(
            "SELECT * FROM incentive_campaigns ORDER BY created_at DESC",
        )
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn join(&self, id: IncentiveCampaignId, affiliate_id: UserId) -> Result<JoinOutcome> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let campaign = sqlx::query_as::<_, IncentiveCampaign>(
            "SELECT * FROM incentive_campaigns WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?
        .ok_or_else(|| Error::NotFound(format!("Incentive campaign {}", id)))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO incentive_joins (campaign_id, affiliate_id, joined_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (campaign_id, affiliate_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(affiliate_id)
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?
        .rows_affected();

        if inserted == 0 {
            tx.commit()
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
            return Ok(JoinOutcome {
                campaign,
                newly_joined: false,
                activated: false,
            });
        }

        let new_count = campaign.joined_affiliates + 1;
        let status = campaign
            .status_enum()
            .ok_or_else(|| Error::Internal(format!("Corrupt status: {}", campaign.status)))?;
        let activated = status == IncentiveStatus::Pending && new_count >= campaign.min_affiliates;
        let new_status = if activated {
            IncentiveStatus::Active
        } else {
            status
        };

        let campaign = sqlx::query_as::<_, IncentiveCampaign>(
            r#"
            UPDATE incentive_campaigns
            SET joined_affiliates = $2, status = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_count)
        .bind(new_status.to_string())
        .bind(chrono::Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(JoinOutcome {
            campaign,
            newly_joined: true,
            activated,
        })
    }
}
