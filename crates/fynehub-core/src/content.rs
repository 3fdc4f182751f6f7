//! Content submission workflow
//!
//! `pending_review → {approved, rejected}`; a resubmission retires the
//! rejected record to `resubmitted` and spawns a linked replacement.
//! Approval computes the payout from the reward's rate rules at that
//! moment and adds it to the reward's running total in the same atomic
//! unit; exceeding the budget is flagged, never blocked.

use std::sync::Arc;

use fynehub_common::types::{Actor, SubmissionId, SubmissionStatus};
use fynehub_common::{Error, Result};
use fynehub_storage::models::{ContentReward, ContentSubmission};
use fynehub_storage::repository::affiliates::AffiliateRepository;
use fynehub_storage::repository::content_rewards::ContentRewardRepository;
use fynehub_storage::repository::content_submissions::{
    ContentSubmissionRepository, CreateSubmission,
};
use fynehub_storage::{ChangeEvent, ChangeFeed, ChangeFilter, ChangeSubscription, EntityKind};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::payout;

/// Input for submitting content against a reward
#[derive(Debug, Clone)]
pub struct SubmitContentInput {
    pub reward_id: Uuid,
    pub video_url: String,
    pub ad_code: String,
}

/// Result of an approval
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub submission: ContentSubmission,
    /// Reward state after the payout increment
    pub reward: ContentReward,
    pub payout_amount: Decimal,
    /// True when this approval pushed `paid_out` past `total_budget`;
    /// an operational concern for the admin, not a failure.
    pub budget_exceeded: bool,
}

/// Content submission workflow service
#[derive(Clone)]
pub struct ContentWorkflow {
    submissions: Arc<dyn ContentSubmissionRepository>,
    rewards: Arc<dyn ContentRewardRepository>,
    affiliates: Arc<dyn AffiliateRepository>,
    feed: ChangeFeed,
}

impl ContentWorkflow {
    pub fn new(
        submissions: Arc<dyn ContentSubmissionRepository>,
        rewards: Arc<dyn ContentRewardRepository>,
        affiliates: Arc<dyn AffiliateRepository>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            submissions,
            rewards,
            affiliates,
            feed,
        }
    }

    /// Affiliate: create a submission in `pending_review`
    pub async fn submit(
        &self,
        actor: Actor,
        input: SubmitContentInput,
    ) -> Result<ContentSubmission> {
        if !actor.is_affiliate() {
            return Err(Error::PermissionDenied(
                "Only affiliates submit content".to_string(),
            ));
        }
        if input.video_url.trim().is_empty() {
            return Err(Error::Validation("Video URL is required".to_string()));
        }
        if input.ad_code.trim().is_empty() {
            return Err(Error::Validation("Ad code is required".to_string()));
        }

        let reward = self
            .rewards
            .get(input.reward_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Content reward {}", input.reward_id)))?;
        if !reward.active {
            return Err(Error::Validation("Reward is not active".to_string()));
        }

        let affiliate = self
            .affiliates
            .get(actor.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Affiliate {}", actor.user_id)))?;

        let eligible = reward.platforms_vec();
        if !eligible.is_empty()
            && !eligible.iter().any(|p| p.to_string() == affiliate.platform)
        {
            return Err(Error::Validation(format!(
                "Reward is not open to {} creators",
                affiliate.platform
            )));
        }

        let submission = self
            .submissions
            .create(CreateSubmission {
                reward_id: reward.id,
                affiliate_id: affiliate.id,
                affiliate_handle: affiliate.handle,
                video_url: input.video_url,
                ad_code: input.ad_code,
            })
            .await?;

        info!(submission_id = %submission.id, reward_id = %reward.id, "Content submitted");
        self.publish(&submission);
        Ok(submission)
    }

    /// Admin: approve a pending submission.
    ///
    /// The rate is tier-selected from the tracked view count, the payout
    /// fixed and written together with the reward's `paid_out` increment.
    pub async fn approve(
        &self,
        actor: Actor,
        id: SubmissionId,
        tracked_views: i64,
    ) -> Result<ApprovalOutcome> {
        if !actor.is_admin() {
            return Err(Error::PermissionDenied(
                "Only admins review submissions".to_string(),
            ));
        }
        if tracked_views <= 0 {
            return Err(Error::Validation(
                "Tracked views must be greater than zero".to_string(),
            ));
        }

        let submission = self
            .submissions
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Submission {}", id)))?;
        let reward = self
            .rewards
            .get(submission.reward_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Content reward {}", submission.reward_id)))?;

        let rate = payout::select_rate(reward.base_rate, &reward.tiers_vec(), tracked_views);
        let amount = payout::compute_payout(rate, tracked_views, reward.rate_unit_views);

        let Some((submission, reward)) =
            self.submissions.approve(id, tracked_views, amount).await?
        else {
            return Err(self.review_precondition(id).await);
        };

        let budget_exceeded = reward.paid_out > reward.total_budget;
        if budget_exceeded {
            warn!(
                reward_id = %reward.id,
                paid_out = %reward.paid_out,
                total_budget = %reward.total_budget,
                "Reward budget exceeded by approval"
            );
        }
        info!(submission_id = %id, payout = %amount, "Submission approved");
        self.publish(&submission);

        Ok(ApprovalOutcome {
            submission,
            reward,
            payout_amount: amount,
            budget_exceeded,
        })
    }

    /// Admin: reject a pending submission; never sets a payout
    pub async fn reject(
        &self,
        actor: Actor,
        id: SubmissionId,
        reason: Option<String>,
    ) -> Result<ContentSubmission> {
        if !actor.is_admin() {
            return Err(Error::PermissionDenied(
                "Only admins review submissions".to_string(),
            ));
        }

        let Some(submission) = self.submissions.reject(id, reason).await? else {
            return Err(self.review_precondition(id).await);
        };

        info!(submission_id = %id, "Submission rejected");
        self.publish(&submission);
        Ok(submission)
    }

    /// Owning affiliate: replace a rejected submission.
    ///
    /// The old record flips to `resubmitted` and drops out of operational
    /// views; the new one starts over in `pending_review`, linked back via
    /// `original_submission_id`.
    pub async fn resubmit(
        &self,
        actor: Actor,
        original_id: SubmissionId,
        video_url: String,
        ad_code: String,
    ) -> Result<ContentSubmission> {
        if !actor.is_affiliate() {
            return Err(Error::PermissionDenied(
                "Only affiliates resubmit content".to_string(),
            ));
        }
        if video_url.trim().is_empty() {
            return Err(Error::Validation("Video URL is required".to_string()));
        }
        if ad_code.trim().is_empty() {
            return Err(Error::Validation("Ad code is required".to_string()));
        }

        let original = self
            .submissions
            .get(original_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Submission {}", original_id)))?;
        if original.affiliate_id != actor.user_id {
            return Err(Error::PermissionDenied(
                "Submission belongs to another affiliate".to_string(),
            ));
        }
        if original.status_enum() != Some(SubmissionStatus::Rejected) {
            return Err(Error::Precondition(format!(
                "Only rejected submissions can be resubmitted, this one is {}",
                original.status
            )));
        }

        let replacement = self
            .submissions
            .resubmit(
                original_id,
                CreateSubmission {
                    reward_id: original.reward_id,
                    affiliate_id: original.affiliate_id,
                    affiliate_handle: original.affiliate_handle,
                    video_url,
                    ad_code,
                },
            )
            .await?
            .ok_or_else(|| {
                Error::Precondition("Submission is no longer in rejected state".to_string())
            })?;

        info!(
            submission_id = %replacement.id,
            original_id = %original_id,
            "Submission resubmitted"
        );
        self.publish(&replacement);
        Ok(replacement)
    }

    /// Owning affiliate: flag a reviewed outcome as read
    pub async fn mark_seen(&self, actor: Actor, id: SubmissionId) -> Result<()> {
        if !self.submissions.mark_seen(id, actor.user_id).await? {
            return Err(Error::NotFound(format!("Submission {}", id)));
        }
        Ok(())
    }

    /// Submissions owned by the acting affiliate, superseded ones excluded
    pub async fn my_submissions(&self, actor: Actor) -> Result<Vec<ContentSubmission>> {
        self.submissions
            .list_by_affiliate(actor.user_id, false)
            .await
    }

    /// Admin: the review queue
    pub async fn pending(&self, actor: Actor) -> Result<Vec<ContentSubmission>> {
        if !actor.is_admin() {
            return Err(Error::PermissionDenied(
                "Only admins see the review queue".to_string(),
            ));
        }
        self.submissions.list_pending().await
    }

    /// Observe submission changes for one affiliate
    pub fn subscribe(&self, actor: Actor) -> ChangeSubscription {
        self.feed.subscribe(ChangeFilter {
            kind: Some(EntityKind::ContentSubmission),
            affiliate_id: actor.is_affiliate().then_some(actor.user_id),
        })
    }

    async fn review_precondition(&self, id: SubmissionId) -> Error {
        match self.submissions.get(id).await {
            Ok(Some(current)) => Error::Precondition(format!(
                "Submission is {}, expected pending_review",
                current.status
            )),
            Ok(None) => Error::NotFound(format!("Submission {}", id)),
            Err(e) => e,
        }
    }

    fn publish(&self, submission: &ContentSubmission) {
        self.feed.publish(ChangeEvent {
            kind: EntityKind::ContentSubmission,
            id: submission.id,
            affiliate_id: Some(submission.affiliate_id),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fynehub_common::types::{Platform, RewardTier, Role};
    use fynehub_storage::repository::affiliates::CreateAffiliate;
    use fynehub_storage::repository::content_rewards::CreateContentReward;
    use fynehub_storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    struct Fixture {
        workflow: ContentWorkflow,
        store: MemoryStore,
        affiliate: Actor,
        admin: Actor,
        reward_id: Uuid,
    }

    async fn fixture_with_reward(reward: CreateContentReward) -> Fixture {
        let store = MemoryStore::new();
        let reward = ContentRewardRepository::create(&store, reward).await.unwrap();
        let affiliate = AffiliateRepository::create(
            &store,
            CreateAffiliate {
                handle: "@mia".to_string(),
                display_name: None,
                email: "mia@example.com".to_string(),
                platform: Platform::Tiktok,
                role: Role::Affiliate,
            },
        )
        .await
        .unwrap();

        let workflow = ContentWorkflow::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            ChangeFeed::default(),
        );

        Fixture {
            workflow,
            store,
            affiliate: Actor::affiliate(affiliate.id),
            admin: Actor::admin(Uuid::new_v4()),
            reward_id: reward.id,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_reward(CreateContentReward {
            name: "Spring push".to_string(),
            description: None,
            total_budget: dec("100.00"),
            base_rate: dec("1.50"),
            rate_unit_views: 1000,
            tiers: vec![RewardTier {
                min_views: 10_000,
                rate: dec("3.00"),
            }],
            platforms: vec![Platform::Tiktok],
            leaderboard_enabled: true,
        })
        .await
    }

    fn submit_input(reward_id: Uuid, url: &str, code: &str) -> SubmitContentInput {
        SubmitContentInput {
            reward_id,
            video_url: url.to_string(),
            ad_code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_spec_payout_scenario() {
        let f = fixture().await;
        let submission = f
            .workflow
            .submit(f.affiliate, submit_input(f.reward_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        let outcome = f
            .workflow
            .approve(f.admin, submission.id, 15_000)
            .await
            .unwrap();

        assert_eq!(outcome.payout_amount, dec("45.00"));
        assert_eq!(outcome.submission.payout_amount, Some(dec("45.00")));
        assert_eq!(outcome.reward.paid_out, dec("45.00"));
        assert!(!outcome.budget_exceeded);
    }

    #[tokio::test]
    async fn test_budget_overrun_is_flagged_not_blocked() {
        let f = fixture().await;
        let submission = f
            .workflow
            .submit(f.affiliate, submit_input(f.reward_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        // 50000 views at the $3.00 tier = $150.00 against a $100 budget
        let outcome = f
            .workflow
            .approve(f.admin, submission.id, 50_000)
            .await
            .unwrap();

        assert_eq!(outcome.payout_amount, dec("150.00"));
        assert!(outcome.budget_exceeded);
        assert_eq!(outcome.reward.remaining_budget(), dec("-50.00"));
    }

    #[tokio::test]
    async fn test_reject_never_sets_payout() {
        let f = fixture().await;
        let submission = f
            .workflow
            .submit(f.affiliate, submit_input(f.reward_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        let rejected = f
            .workflow
            .reject(f.admin, submission.id, Some("Wrong product shown".to_string()))
            .await
            .unwrap();

        assert_eq!(rejected.status, "rejected");
        assert_eq!(rejected.payout_amount, None);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Wrong product shown")
        );
    }

    #[tokio::test]
    async fn test_double_approve_rejected_without_double_payout() {
        let f = fixture().await;
        let submission = f
            .workflow
            .submit(f.affiliate, submit_input(f.reward_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        f.workflow
            .approve(f.admin, submission.id, 15_000)
            .await
            .unwrap();
        let err = f
            .workflow
            .approve(f.admin, submission.id, 15_000)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));

        let reward = ContentRewardRepository::get(&f.store, f.reward_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reward.paid_out, dec("45.00"));
    }

    #[tokio::test]
    async fn test_zero_views_fails_validation() {
        let f = fixture().await;
        let submission = f
            .workflow
            .submit(f.affiliate, submit_input(f.reward_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        let err = f
            .workflow
            .approve(f.admin, submission.id, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_resubmission_links_and_retires_original() {
        let f = fixture().await;
        let submission = f
            .workflow
            .submit(f.affiliate, submit_input(f.reward_id, "https://v/1", "AD-1"))
            .await
            .unwrap();
        f.workflow
            .reject(f.admin, submission.id, None)
            .await
            .unwrap();

        let replacement = f
            .workflow
            .resubmit(
                f.affiliate,
                submission.id,
                "https://v/2".to_string(),
                "AD-2".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(replacement.status, "pending_review");
        assert_eq!(replacement.original_submission_id, Some(submission.id));

        // The retired record drops out of the affiliate's active view
        let mine = f.workflow.my_submissions(f.affiliate).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, replacement.id);
    }

    #[tokio::test]
    async fn test_resubmit_requires_rejected_state() {
        let f = fixture().await;
        let submission = f
            .workflow
            .submit(f.affiliate, submit_input(f.reward_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        let err = f
            .workflow
            .resubmit(
                f.affiliate,
                submission.id,
                "https://v/2".to_string(),
                "AD-2".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[tokio::test]
    async fn test_platform_eligibility() {
        let f = fixture_with_reward(CreateContentReward {
            name: "IG only".to_string(),
            description: None,
            total_budget: dec("100.00"),
            base_rate: dec("1.00"),
            rate_unit_views: 1000,
            tiers: vec![],
            platforms: vec![Platform::Instagram],
            leaderboard_enabled: false,
        })
        .await;

        let err = f
            .workflow
            .submit(f.affiliate, submit_input(f.reward_id, "https://v/1", "AD-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_mark_seen_requires_ownership() {
        let f = fixture().await;
        let submission = f
            .workflow
            .submit(f.affiliate, submit_input(f.reward_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        let stranger = Actor::affiliate(Uuid::new_v4());
        let err = f
            .workflow
            .mark_seen(stranger, submission.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        f.workflow.mark_seen(f.affiliate, submission.id).await.unwrap();
    }
}
