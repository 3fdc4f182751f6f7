//! In-memory store
//!
//! Implements the repository traits against process-local state behind a
//! single mutex, giving the same serialization guarantees the database
//! implementation gets from transactions. Backs the workflow engine tests
//! and any deployment that wants to run without PostgreSQL.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fynehub_common::types::{
    CampaignId, IncentiveCampaignId, IncentiveStatus, RewardId, Role, SampleRequestId,
    SampleRequestStatus, SubmissionId, SubmissionStatus, TicketId, TicketStatus, UserId,
};
use fynehub_common::{Error, Result};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    Affiliate, Campaign, ContentReward, ContentSubmission, DrawWin, IncentiveCampaign,
    SampleRequest, SupportTicket, SurveyResponse, TicketMessage,
};
use crate::repository::affiliates::{AffiliateRepository, CreateAffiliate};
use crate::repository::campaigns::{CampaignRepository, CreateCampaign};
use crate::repository::content_rewards::{ContentRewardRepository, CreateContentReward};
use crate::repository::content_submissions::{ContentSubmissionRepository, CreateSubmission};
use crate::repository::incentives::{CreateIncentiveCampaign, IncentiveRepository, JoinOutcome};
use crate::repository::sample_requests::{CreateSampleRequest, SampleRequestRepository};
use crate::repository::surveys::{CreateSurveyResponse, SurveyRepository};
use crate::repository::tickets::{CreateTicket, TicketRepository};

#[derive(Default)]
struct Inner {
    campaigns: Vec<Campaign>,
    affiliates: Vec<Affiliate>,
    sample_requests: Vec<SampleRequest>,
    rewards: Vec<ContentReward>,
    submissions: Vec<ContentSubmission>,
    incentives: Vec<IncentiveCampaign>,
    incentive_joins: HashSet<(IncentiveCampaignId, UserId)>,
    survey_responses: Vec<SurveyResponse>,
    draw_wins: Vec<DrawWin>,
    tickets: Vec<SupportTicket>,
    ticket_messages: Vec<TicketMessage>,
}

/// In-memory implementation of the repository traits
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignRepository for MemoryStore {
    async fn create(&self, input: CreateCampaign) -> Result<Campaign> {
        let now = Utc::now();
        let campaign = Campaign {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            brand: input.brand,
            product_name: input.product_name,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.campaigns.push(campaign.clone());
        Ok(campaign)
    }

    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>> {
        let inner = self.inner.lock().await;
        Ok(inner.campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Campaign>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .campaigns
            .iter()
            .filter(|c| !active_only || c.active)
            .cloned()
            .collect())
    }

    async fn set_active(&self, id: CampaignId, active: bool) -> Result<Option<Campaign>> {
        let mut inner = self.inner.lock().await;
        let Some(campaign) = inner.campaigns.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        campaign.active = active;
        campaign.updated_at = Utc::now();
        Ok(Some(campaign.clone()))
    }
}

#[async_trait]
impl AffiliateRepository for MemoryStore {
    async fn create(&self, input: CreateAffiliate) -> Result<Affiliate> {
        let now = Utc::now();
        let affiliate = Affiliate {
            id: Uuid::now_v7(),
            handle: input.handle,
            display_name: input.display_name,
            email: input.email,
            platform: input.platform.to_string(),
            role: input.role.to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.affiliates.push(affiliate.clone());
        Ok(affiliate)
    }

    async fn get(&self, id: UserId) -> Result<Option<Affiliate>> {
        let inner = self.inner.lock().await;
        Ok(inner.affiliates.iter().find(|a| a.id == id).cloned())
    }

    async fn get_by_handle(&self, handle: &str) -> Result<Option<Affiliate>> {
        let inner = self.inner.lock().await;
        Ok(inner.affiliates.iter().find(|a| a.handle == handle).cloned())
    }

    async fn list(&self) -> Result<Vec<Affiliate>> {
        let inner = self.inner.lock().await;
        Ok(inner.affiliates.clone())
    }
}

#[async_trait]
impl SampleRequestRepository for MemoryStore {
    async fn create(&self, input: CreateSampleRequest) -> Result<SampleRequest> {
        let mut inner = self.inner.lock().await;

        let duplicate = inner.sample_requests.iter().any(|r| {
            r.affiliate_id == input.affiliate_id
                && (r.video_url == input.video_url || r.ad_code == input.ad_code)
        });
        if duplicate {
            return Err(Error::Validation(
                "Video URL or ad code already used by this affiliate".to_string(),
            ));
        }

        let now = Utc::now();
        let request = SampleRequest {
            id: Uuid::now_v7(),
            campaign_id: input.campaign_id,
            campaign_name: input.campaign_name,
            affiliate_id: input.affiliate_id,
            affiliate_handle: input.affiliate_handle,
            video_url: input.video_url,
            ad_code: input.ad_code,
            status: SampleRequestStatus::PendingApproval.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.sample_requests.push(request.clone());
        Ok(request)
    }

    async fn get(&self, id: SampleRequestId) -> Result<Option<SampleRequest>> {
        let inner = self.inner.lock().await;
        Ok(inner.sample_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_affiliate(&self, affiliate_id: UserId) -> Result<Vec<SampleRequest>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sample_requests
            .iter()
            .filter(|r| r.affiliate_id == affiliate_id)
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status: SampleRequestStatus) -> Result<Vec<SampleRequest>> {
        let inner = self.inner.lock().await;
        let status = status.to_string();
        Ok(inner
            .sample_requests
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn transition(
        &self,
        id: SampleRequestId,
        from: SampleRequestStatus,
        to: SampleRequestStatus,
    ) -> Result<Option<SampleRequest>> {
        let mut inner = self.inner.lock().await;
        let Some(request) = inner
            .sample_requests
            .iter_mut()
            .find(|r| r.id == id && r.status == from.to_string())
        else {
            return Ok(None);
        };
        request.status = to.to_string();
        request.updated_at = Utc::now();
        Ok(Some(request.clone()))
    }
}

#[async_trait]
impl ContentRewardRepository for MemoryStore {
    async fn create(&self, input: CreateContentReward) -> Result<ContentReward> {
        let now = Utc::now();
        let reward = ContentReward {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            total_budget: input.total_budget,
            paid_out: Decimal::ZERO,
            base_rate: input.base_rate,
            rate_unit_views: input.rate_unit_views,
            tiers: serde_json::to_value(&input.tiers).unwrap_or_default(),
            platforms: serde_json::to_value(&input.platforms).unwrap_or_default(),
            leaderboard_enabled: input.leaderboard_enabled,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.rewards.push(reward.clone());
        Ok(reward)
    }

    async fn get(&self, id: RewardId) -> Result<Option<ContentReward>> {
        let inner = self.inner.lock().await;
        Ok(inner.rewards.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<ContentReward>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rewards
            .iter()
            .filter(|r| !active_only || r.active)
            .cloned()
            .collect())
    }

    async fn set_active(&self, id: RewardId, active: bool) -> Result<Option<ContentReward>> {
        let mut inner = self.inner.lock().await;
        let Some(reward) = inner.rewards.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        reward.active = active;
        reward.updated_at = Utc::now();
        Ok(Some(reward.clone()))
    }
}

fn insert_pending_submission(
    inner: &mut Inner,
    input: &CreateSubmission,
    original_submission_id: Option<SubmissionId>,
) -> Result<ContentSubmission> {
    let duplicate = inner.submissions.iter().any(|s| {
        s.affiliate_id == input.affiliate_id
            && (s.video_url == input.video_url || s.ad_code == input.ad_code)
    });
    if duplicate {
        return Err(Error::Validation(
            "Video URL or ad code already used by this affiliate".to_string(),
        ));
    }

    let submission = ContentSubmission {
        id: Uuid::now_v7(),
        reward_id: input.reward_id,
        affiliate_id: input.affiliate_id,
        affiliate_handle: input.affiliate_handle.clone(),
        video_url: input.video_url.clone(),
        ad_code: input.ad_code.clone(),
        status: SubmissionStatus::PendingReview.to_string(),
        tracked_views: None,
        payout_amount: None,
        rejection_reason: None,
        seen_by_affiliate: false,
        original_submission_id,
        submitted_at: Utc::now(),
        reviewed_at: None,
    };
    inner.submissions.push(submission.clone());
    Ok(submission)
}

#[async_trait]
impl ContentSubmissionRepository for MemoryStore {
    async fn create(&self, input: CreateSubmission) -> Result<ContentSubmission> {
        let mut inner = self.inner.lock().await;
        insert_pending_submission(&mut inner, &input, None)
    }

    async fn get(&self, id: SubmissionId) -> Result<Option<ContentSubmission>> {
        let inner = self.inner.lock().await;
        Ok(inner.submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn list_by_affiliate(
        &self,
        affiliate_id: UserId,
        include_superseded: bool,
    ) -> Result<Vec<ContentSubmission>> {
        let inner = self.inner.lock().await;
        let superseded = SubmissionStatus::Resubmitted.to_string();
        Ok(inner
            .submissions
            .iter()
            .filter(|s| s.affiliate_id == affiliate_id)
            .filter(|s| include_superseded || s.status != superseded)
            .cloned()
            .collect())
    }

    async fn list_by_reward(
        &self,
        reward_id: RewardId,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<ContentSubmission>> {
        let inner = self.inner.lock().await;
        let superseded = SubmissionStatus::Resubmitted.to_string();
        Ok(inner
            .submissions
            .iter()
            .filter(|s| s.reward_id == reward_id)
            .filter(|s| match status {
                Some(status) => s.status == status.to_string(),
                None => s.status != superseded,
            })
            .cloned()
            .collect())
    }

    async fn list_pending(&self) -> Result<Vec<ContentSubmission>> {
        let inner = self.inner.lock().await;
        let pending = SubmissionStatus::PendingReview.to_string();
        Ok(inner
            .submissions
            .iter()
            .filter(|s| s.status == pending)
            .cloned()
            .collect())
    }

    async fn approve(
        &self,
        id: SubmissionId,
        tracked_views: i64,
        payout: Decimal,
    ) -> Result<Option<(ContentSubmission, ContentReward)>> {
        let mut inner = self.inner.lock().await;
        let pending = SubmissionStatus::PendingReview.to_string();

        let Some(submission) = inner
            .submissions
            .iter_mut()
            .find(|s| s.id == id && s.status == pending)
        else {
            return Ok(None);
        };
        submission.status = SubmissionStatus::Approved.to_string();
        submission.tracked_views = Some(tracked_views);
        submission.payout_amount = Some(payout);
        submission.reviewed_at = Some(Utc::now());
        let submission = submission.clone();

        let reward = inner
            .rewards
            .iter_mut()
            .find(|r| r.id == submission.reward_id)
            .ok_or_else(|| Error::Internal("Submission references a missing reward".to_string()))?;
        reward.paid_out += payout;
        reward.updated_at = Utc::now();

        Ok(Some((submission, reward.clone())))
    }

    async fn reject(
        &self,
        id: SubmissionId,
        reason: Option<String>,
    ) -> Result<Option<ContentSubmission>> {
        let mut inner = self.inner.lock().await;
        let pending = SubmissionStatus::PendingReview.to_string();
        let Some(submission) = inner
            .submissions
            .iter_mut()
            .find(|s| s.id == id && s.status == pending)
        else {
            return Ok(None);
        };
        submission.status = SubmissionStatus::Rejected.to_string();
        submission.rejection_reason = reason;
        submission.reviewed_at = Some(Utc::now());
        Ok(Some(submission.clone()))
    }

    async fn resubmit(
        &self,
        original_id: SubmissionId,
        input: CreateSubmission,
    ) -> Result<Option<ContentSubmission>> {
        let mut inner = self.inner.lock().await;
        let rejected = SubmissionStatus::Rejected.to_string();

        let Some(original) = inner.submissions.iter_mut().find(|s| {
            s.id == original_id && s.status == rejected && s.affiliate_id == input.affiliate_id
        }) else {
            return Ok(None);
        };
        original.status = SubmissionStatus::Resubmitted.to_string();

        insert_pending_submission(&mut inner, &input, Some(original_id)).map(Some)
    }

    async fn mark_seen(&self, id: SubmissionId, affiliate_id: UserId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let Some(submission) = inner
            .submissions
            .iter_mut()
            .find(|s| s.id == id && s.affiliate_id == affiliate_id)
        else {
            return Ok(false);
        };
        submission.seen_by_affiliate = true;
        Ok(true)
    }
}

#[async_trait]
impl IncentiveRepository for MemoryStore {
    async fn create(&self, input: CreateIncentiveCampaign) -> Result<IncentiveCampaign> {
        let now = Utc::now();
        let campaign = IncentiveCampaign {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            min_affiliates: input.min_affiliates,
            joined_affiliates: 0,
            status: IncentiveStatus::Pending.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.incentives.push(campaign.clone());
        Ok(campaign)
    }

    async fn get(&self, id: IncentiveCampaignId) -> Result<Option<IncentiveCampaign>> {
        let inner = self.inner.lock().await;
        Ok(inner.incentives.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<IncentiveCampaign>> {
        let inner = self.inner.lock().await;
        Ok(inner.incentives.clone())
    }

    async fn join(&self, id: IncentiveCampaignId, affiliate_id: UserId) -> Result<JoinOutcome> {
        // The whole read-modify-write happens under one lock acquisition;
        // concurrent joins serialize here exactly as they do on the
        // database row lock.
        let mut inner = self.inner.lock().await;

        if !inner.incentives.iter().any(|c| c.id == id) {
            return Err(Error::NotFound(format!("Incentive campaign {}", id)));
        }

        if !inner.incentive_joins.insert((id, affiliate_id)) {
            let campaign = inner
                .incentives
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| Error::Internal("Campaign vanished".to_string()))?;
            return Ok(JoinOutcome {
                campaign,
                newly_joined: false,
                activated: false,
            });
        }

        let campaign = inner
            .incentives
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::Internal("Campaign vanished".to_string()))?;

        campaign.joined_affiliates += 1;
        let activated = campaign.status == IncentiveStatus::Pending.to_string()
            && campaign.joined_affiliates >= campaign.min_affiliates;
        if activated {
            campaign.status = IncentiveStatus::Active.to_string();
        }
        campaign.updated_at = Utc::now();

        Ok(JoinOutcome {
            campaign: campaign.clone(),
            newly_joined: true,
            activated,
        })
    }
}

#[async_trait]
impl SurveyRepository for MemoryStore {
    async fn create_response(&self, input: CreateSurveyResponse) -> Result<SurveyResponse> {
        let response = SurveyResponse {
            id: Uuid::now_v7(),
            affiliate_id: input.affiliate_id,
            answers: input.answers,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .await
            .survey_responses
            .push(response.clone());
        Ok(response)
    }

    async fn responses_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SurveyResponse>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .survey_responses
            .iter()
            .filter(|r| since.map_or(true, |s| r.created_at > s))
            .cloned()
            .collect())
    }

    async fn record_win(&self, affiliate_id: UserId, prize: &str) -> Result<DrawWin> {
        let win = DrawWin {
            id: Uuid::now_v7(),
            affiliate_id,
            prize: prize.to_string(),
            drawn_at: Utc::now(),
        };
        self.inner.lock().await.draw_wins.push(win.clone());
        Ok(win)
    }

    async fn wins_since(&self, since: DateTime<Utc>) -> Result<Vec<DrawWin>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .draw_wins
            .iter()
            .filter(|w| w.drawn_at > since)
            .cloned()
            .collect())
    }

    async fn latest_win_at(&self) -> Result<Option<DateTime<Utc>>> {
        let inner = self.inner.lock().await;
        Ok(inner.draw_wins.iter().map(|w| w.drawn_at).max())
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn create(&self, input: CreateTicket) -> Result<SupportTicket> {
        let now = Utc::now();
        let mut inner = self.inner.lock().await;
        let ticket = SupportTicket {
            id: Uuid::now_v7(),
            affiliate_id: input.affiliate_id,
            subject: input.subject,
            status: TicketStatus::Open.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.tickets.push(ticket.clone());
        inner.ticket_messages.push(TicketMessage {
            id: Uuid::now_v7(),
            ticket_id: ticket.id,
            author_id: input.affiliate_id,
            author_role: Role::Affiliate.to_string(),
            body: input.body,
            created_at: now,
        });
        Ok(ticket)
    }

    async fn get(&self, id: TicketId) -> Result<Option<SupportTicket>> {
        let inner = self.inner.lock().await;
        Ok(inner.tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn list(
        &self,
        affiliate_id: Option<UserId>,
        status: Option<TicketStatus>,
    ) -> Result<Vec<SupportTicket>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .iter()
            .filter(|t| affiliate_id.map_or(true, |a| t.affiliate_id == a))
            .filter(|t| status.map_or(true, |s| t.status == s.to_string()))
            .cloned()
            .collect())
    }

    async fn messages(&self, ticket_id: TicketId) -> Result<Vec<TicketMessage>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .ticket_messages
            .iter()
            .filter(|m| m.ticket_id == ticket_id)
            .cloned()
            .collect())
    }

    async fn add_message(
        &self,
        ticket_id: TicketId,
        author_id: UserId,
        author_role: Role,
        body: String,
        new_status: TicketStatus,
    ) -> Result<Option<TicketMessage>> {
        let now = Utc::now();
        let mut inner = self.inner.lock().await;
        let closed = TicketStatus::Closed.to_string();

        let Some(ticket) = inner
            .tickets
            .iter_mut()
            .find(|t| t.id == ticket_id && t.status != closed)
        else {
            return Ok(None);
        };
        ticket.status = new_status.to_string();
        ticket.updated_at = now;

        let message = TicketMessage {
            id: Uuid::now_v7(),
            ticket_id,
            author_id,
            author_role: author_role.to_string(),
            body,
            created_at: now,
        };
        inner.ticket_messages.push(message.clone());
        Ok(Some(message))
    }

    async fn transition(
        &self,
        id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<Option<SupportTicket>> {
        let mut inner = self.inner.lock().await;
        let Some(ticket) = inner
            .tickets
            .iter_mut()
            .find(|t| t.id == id && t.status == from.to_string())
        else {
            return Ok(None);
        };
        ticket.status = to.to_string();
        ticket.updated_at = Utc::now();
        Ok(Some(ticket.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(affiliate_id: UserId, url: &str, code: &str) -> CreateSampleRequest {
        CreateSampleRequest {
            campaign_id: Uuid::new_v4(),
            campaign_name: "Glow serum".to_string(),
            affiliate_id,
            affiliate_handle: "@mia".to_string(),
            video_url: url.to_string(),
            ad_code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_video_url_rejected_before_write() {
        let store = MemoryStore::new();
        let affiliate = Uuid::new_v4();

        SampleRequestRepository::create(&store, sample_input(affiliate, "https://v/1", "AD-1"))
            .await
            .unwrap();
        let err = SampleRequestRepository::create(
            &store,
            sample_input(affiliate, "https://v/1", "AD-2"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        let all = SampleRequestRepository::list_by_affiliate(&store, affiliate)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_same_url_different_affiliate_allowed() {
        let store = MemoryStore::new();

        SampleRequestRepository::create(
            &store,
            sample_input(Uuid::new_v4(), "https://v/1", "AD-1"),
        )
        .await
        .unwrap();
        SampleRequestRepository::create(
            &store,
            sample_input(Uuid::new_v4(), "https://v/1", "AD-1"),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_transition_compare_and_set() {
        let store = MemoryStore::new();
        let affiliate = Uuid::new_v4();
        let request = SampleRequestRepository::create(
            &store,
            sample_input(affiliate, "https://v/1", "AD-1"),
        )
        .await
        .unwrap();

        let updated = SampleRequestRepository::transition(
            &store,
            request.id,
            SampleRequestStatus::PendingApproval,
            SampleRequestStatus::Rejected,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.status, "rejected");

        // Terminal state: the approval path must no longer apply
        let stale = SampleRequestRepository::transition(
            &store,
            request.id,
            SampleRequestStatus::PendingApproval,
            SampleRequestStatus::PendingShowcase,
        )
        .await
        .unwrap();
        assert!(stale.is_none());
    }
}
