//! Database models

use chrono::{DateTime, Utc};
use fynehub_common::types::{
    ApiKeyId, CampaignId, DrawWinId, IncentiveCampaignId, IncentiveStatus, Platform, RewardId,
    RewardTier, SampleRequestId, SampleRequestStatus, SubmissionId, SubmissionStatus,
    SurveyResponseId, TicketId, TicketStatus, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Campaign model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub product_name: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Affiliate (or admin user) model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Affiliate {
    pub id: UserId,
    pub handle: String,
    pub display_name: Option<String>,
    pub email: String,
    pub platform: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sample request model
///
/// Campaign name and affiliate handle are denormalized at creation time
/// for display and are not re-derived later.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SampleRequest {
    pub id: SampleRequestId,
    pub campaign_id: CampaignId,
    pub campaign_name: String,
    pub affiliate_id: UserId,
    pub affiliate_handle: String,
    pub video_url: String,
    pub ad_code: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SampleRequest {
    /// Get status enum
    pub fn status_enum(&self) -> Option<SampleRequestStatus> {
        self.status.parse().ok()
    }
}

/// Content reward model (budget envelope and rate rules)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContentReward {
    pub id: RewardId,
    pub name: String,
    pub description: Option<String>,
    pub total_budget: Decimal,
    pub paid_out: Decimal,
    pub base_rate: Decimal,
    pub rate_unit_views: i64,
    pub tiers: serde_json::Value,
    pub platforms: serde_json::Value,
    pub leaderboard_enabled: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentReward {
    /// Get the tier table as a vector
    pub fn tiers_vec(&self) -> Vec<RewardTier> {
        serde_json::from_value(self.tiers.clone()).unwrap_or_default()
    }

    /// Get eligible platforms as a vector
    pub fn platforms_vec(&self) -> Vec<Platform> {
        serde_json::from_value(self.platforms.clone()).unwrap_or_default()
    }

    /// Budget left before payouts exceed the envelope (may be negative)
    pub fn remaining_budget(&self) -> Decimal {
        self.total_budget - self.paid_out
    }
}

/// Content submission model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContentSubmission {
    pub id: SubmissionId,
    pub reward_id: RewardId,
    pub affiliate_id: UserId,
    pub affiliate_handle: String,
    pub video_url: String,
    pub ad_code: String,
    pub status: String,
    pub tracked_views: Option<i64>,
    pub payout_amount: Option<Decimal>,
    pub rejection_reason: Option<String>,
    pub seen_by_affiliate: bool,
    pub original_submission_id: Option<SubmissionId>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ContentSubmission {
    /// Get status enum
    pub fn status_enum(&self) -> Option<SubmissionStatus> {
        self.status.parse().ok()
    }
}

/// Incentive campaign model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct IncentiveCampaign {
    pub id: IncentiveCampaignId,
    pub name: String,
    pub description: Option<String>,
    pub min_affiliates: i32,
    pub joined_affiliates: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IncentiveCampaign {
    /// Get status enum
    pub fn status_enum(&self) -> Option<IncentiveStatus> {
        self.status.parse().ok()
    }
}

/// Survey response model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: SurveyResponseId,
    pub affiliate_id: UserId,
    pub answers: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Weekly draw win record
///
/// Kept as a history snapshot; the non-repeat window is evaluated
/// against `drawn_at`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DrawWin {
    pub id: DrawWinId,
    pub affiliate_id: UserId,
    pub prize: String,
    pub drawn_at: DateTime<Utc>,
}

/// Support ticket model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: TicketId,
    pub affiliate_id: UserId,
    pub subject: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupportTicket {
    /// Get status enum
    pub fn status_enum(&self) -> Option<TicketStatus> {
        self.status.parse().ok()
    }
}

/// Ticket message model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TicketMessage {
    pub id: uuid::Uuid,
    pub ticket_id: TicketId,
    pub author_id: UserId,
    pub author_role: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// API key model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub user_id: UserId,
    pub role: String,
    pub key_hash: String,
    pub label: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fynehub_common::types::SampleRequestStatus;

    #[test]
    fn test_reward_tiers_vec() {
        let reward = ContentReward {
            id: uuid::Uuid::new_v4(),
            name: "Spring push".to_string(),
            description: None,
            total_budget: Decimal::new(10000, 2),
            paid_out: Decimal::ZERO,
            base_rate: Decimal::new(150, 2),
            rate_unit_views: 1000,
            tiers: serde_json::json!([{ "min_views": 10000, "rate": "3.00" }]),
            platforms: serde_json::json!(["tiktok"]),
            leaderboard_enabled: true,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let tiers = reward.tiers_vec();
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].min_views, 10000);
        assert_eq!(tiers[0].rate, Decimal::new(300, 2));
        assert_eq!(reward.remaining_budget(), Decimal::new(10000, 2));
    }

    #[test]
    fn test_malformed_tiers_default_empty() {
        let mut reward_tiers = serde_json::json!({"not": "a list"});
        let parsed: Vec<RewardTier> =
            serde_json::from_value(std::mem::take(&mut reward_tiers)).unwrap_or_default();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_sample_request_status_enum() {
        let request = SampleRequest {
            id: uuid::Uuid::new_v4(),
            campaign_id: uuid::Uuid::new_v4(),
            campaign_name: "Glow serum".to_string(),
            affiliate_id: uuid::Uuid::new_v4(),
            affiliate_handle: "@mia".to_string(),
            video_url: "https://fyne.example/v/1".to_string(),
            ad_code: "AD-1".to_string(),
            status: "pending_approval".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(
            request.status_enum(),
            Some(SampleRequestStatus::PendingApproval)
        );
    }
}
