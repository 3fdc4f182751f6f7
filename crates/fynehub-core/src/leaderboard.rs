//! Per-reward leaderboard
//!
//! Aggregates approved submissions per affiliate and ranks by total
//! tracked views, tie-broken by total payout. Only rewards that opted in
//! expose a board.

use std::collections::HashMap;
use std::sync::Arc;

use fynehub_common::types::{RewardId, SubmissionStatus, UserId};
use fynehub_common::{Error, Result};
use fynehub_storage::repository::content_rewards::ContentRewardRepository;
use fynehub_storage::repository::content_submissions::ContentSubmissionRepository;
use rust_decimal::Decimal;

/// One ranked row
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub affiliate_id: UserId,
    pub affiliate_handle: String,
    pub approved_count: usize,
    pub total_views: i64,
    pub total_payout: Decimal,
}

/// Leaderboard read model
#[derive(Clone)]
pub struct Leaderboard {
    rewards: Arc<dyn ContentRewardRepository>,
    submissions: Arc<dyn ContentSubmissionRepository>,
}

impl Leaderboard {
    pub fn new(
        rewards: Arc<dyn ContentRewardRepository>,
        submissions: Arc<dyn ContentSubmissionRepository>,
    ) -> Self {
        Self {
            rewards,
            submissions,
        }
    }

    pub async fn for_reward(&self, reward_id: RewardId) -> Result<Vec<LeaderboardEntry>> {
        let reward = self
            .rewards
            .get(reward_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Content reward {}", reward_id)))?;
        if !reward.leaderboard_enabled {
            return Err(Error::Validation(
                "Reward has no leaderboard".to_string(),
            ));
        }

        let approved = self
            .submissions
            .list_by_reward(reward_id, Some(SubmissionStatus::Approved))
            .await?;

        let mut totals: HashMap<UserId, LeaderboardEntry> = HashMap::new();
        for submission in approved {
            let entry = totals
                .entry(submission.affiliate_id)
                .or_insert_with(|| LeaderboardEntry {
                    rank: 0,
                    affiliate_id: submission.affiliate_id,
                    affiliate_handle: submission.affiliate_handle.clone(),
                    approved_count: 0,
                    total_views: 0,
                    total_payout: Decimal::ZERO,
                });
            entry.approved_count += 1;
            entry.total_views += submission.tracked_views.unwrap_or(0);
            entry.total_payout += submission.payout_amount.unwrap_or(Decimal::ZERO);
        }

        let mut entries: Vec<LeaderboardEntry> = totals.into_values().collect();
        entries.sort_by(|a, b| {
            b.total_views
                .cmp(&a.total_views)
                .then(b.total_payout.cmp(&a.total_payout))
        });
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = i + 1;
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentWorkflow, SubmitContentInput};
    use fynehub_common::types::{Actor, Platform, Role};
    use fynehub_storage::repository::affiliates::{AffiliateRepository, CreateAffiliate};
    use fynehub_storage::repository::content_rewards::CreateContentReward;
    use fynehub_storage::{ChangeFeed, MemoryStore};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    async fn affiliate(store: &MemoryStore, handle: &str) -> Actor {
        let row = AffiliateRepository::create(
            store,
            CreateAffiliate {
                handle: handle.to_string(),
                display_name: None,
                email: format!("{}@example.com", handle.trim_start_matches('@')),
                platform: Platform::Tiktok,
                role: Role::Affiliate,
            },
        )
        .await
        .unwrap();
        Actor::affiliate(row.id)
    }

    async fn approved_submission(
        wf: &ContentWorkflow,
        admin: Actor,
        affiliate: Actor,
        reward_id: Uuid,
        url: &str,
        code: &str,
        views: i64,
    ) {
        let submission = wf
            .submit(
                affiliate,
                SubmitContentInput {
                    reward_id,
                    video_url: url.to_string(),
                    ad_code: code.to_string(),
                },
            )
            .await
            .unwrap();
        wf.approve(admin, submission.id, views).await.unwrap();
    }

    #[tokio::test]
    async fn test_ranks_by_total_views() {
        let store = MemoryStore::new();
        let reward = ContentRewardRepository::create(
            &store,
            CreateContentReward {
                name: "Board".to_string(),
                description: None,
                total_budget: dec("1000.00"),
                base_rate: dec("1.00"),
                rate_unit_views: 1000,
                tiers: vec![],
                platforms: vec![],
                leaderboard_enabled: true,
            },
        )
        .await
        .unwrap();

        let wf = ContentWorkflow::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            ChangeFeed::default(),
        );
        let admin = Actor::admin(Uuid::new_v4());
        let a = affiliate(&store, "@a").await;
        let b = affiliate(&store, "@b").await;

        // a: two approved videos for 5000 views total, b: one for 8000
        approved_submission(&wf, admin, a, reward.id, "https://v/1", "A-1", 2_000).await;
        approved_submission(&wf, admin, a, reward.id, "https://v/2", "A-2", 3_000).await;
        approved_submission(&wf, admin, b, reward.id, "https://v/3", "B-1", 8_000).await;

        let board = Leaderboard::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let entries = board.for_reward(reward.id).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].affiliate_handle, "@b");
        assert_eq!(entries[0].total_views, 8_000);
        assert_eq!(entries[0].total_payout, dec("8.00"));
        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[1].affiliate_handle, "@a");
        assert_eq!(entries[1].approved_count, 2);
        assert_eq!(entries[1].total_views, 5_000);
    }

    #[tokio::test]
    async fn test_pending_and_rejected_excluded() {
        let store = MemoryStore::new();
        let reward = ContentRewardRepository::create(
            &store,
            CreateContentReward {
                name: "Board".to_string(),
                description: None,
                total_budget: dec("1000.00"),
                base_rate: dec("1.00"),
                rate_unit_views: 1000,
                tiers: vec![],
                platforms: vec![],
                leaderboard_enabled: true,
            },
        )
        .await
        .unwrap();

        let wf = ContentWorkflow::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            ChangeFeed::default(),
        );
        let admin = Actor::admin(Uuid::new_v4());
        let a = affiliate(&store, "@a").await;

        let pending = wf
            .submit(
                a,
                SubmitContentInput {
                    reward_id: reward.id,
                    video_url: "https://v/1".to_string(),
                    ad_code: "A-1".to_string(),
                },
            )
            .await
            .unwrap();
        let rejected = wf
            .submit(
                a,
                SubmitContentInput {
                    reward_id: reward.id,
                    video_url: "https://v/2".to_string(),
                    ad_code: "A-2".to_string(),
                },
            )
            .await
            .unwrap();
        wf.reject(admin, rejected.id, None).await.unwrap();
        let _ = pending;

        let board = Leaderboard::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let entries = board.for_reward(reward.id).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_board_is_rejected() {
        let store = MemoryStore::new();
        let reward = ContentRewardRepository::create(
            &store,
            CreateContentReward {
                name: "No board".to_string(),
                description: None,
                total_budget: dec("1000.00"),
                base_rate: dec("1.00"),
                rate_unit_views: 1000,
                tiers: vec![],
                platforms: vec![],
                leaderboard_enabled: false,
            },
        )
        .await
        .unwrap();

        let board = Leaderboard::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let err = board.for_reward(reward.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
