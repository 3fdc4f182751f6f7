//! Incentive campaign workflow
//!
//! Campaigns start `pending` and flip to `active` the moment the join
//! count reaches the configured minimum. The flip is monotonic; it is
//! never undone, and exactly one join observes `activated = true` no
//! matter how many run concurrently.

use std::sync::Arc;

use fynehub_common::types::{Actor, IncentiveCampaignId};
use fynehub_common::{Error, Result};
use fynehub_storage::models::IncentiveCampaign;
use fynehub_storage::repository::incentives::{
    CreateIncentiveCampaign, IncentiveRepository, JoinOutcome,
};
use fynehub_storage::{ChangeEvent, ChangeFeed, EntityKind};
use tracing::info;

/// Incentive campaign workflow service
#[derive(Clone)]
pub struct IncentiveWorkflow {
    incentives: Arc<dyn IncentiveRepository>,
    feed: ChangeFeed,
}

impl IncentiveWorkflow {
    pub fn new(incentives: Arc<dyn IncentiveRepository>, feed: ChangeFeed) -> Self {
        Self { incentives, feed }
    }

    /// Admin: create a campaign in `pending`
    pub async fn create(
        &self,
        actor: Actor,
        input: CreateIncentiveCampaign,
    ) -> Result<IncentiveCampaign> {
        if !actor.is_admin() {
            return Err(Error::PermissionDenied(
                "Only admins create incentive campaigns".to_string(),
            ));
        }
        if input.name.trim().is_empty() {
            return Err(Error::Validation("Campaign name is required".to_string()));
        }
        if input.min_affiliates <= 0 {
            return Err(Error::Validation(
                "Minimum affiliate count must be greater than zero".to_string(),
            ));
        }

        let campaign = self.incentives.create(input).await?;
        info!(campaign_id = %campaign.id, "Incentive campaign created");
        Ok(campaign)
    }

    /// Affiliate: join a campaign. Repeat joins are a harmless no-op.
    pub async fn join(&self, actor: Actor, id: IncentiveCampaignId) -> Result<JoinOutcome> {
        if !actor.is_affiliate() {
            return Err(Error::PermissionDenied(
                "Only affiliates join incentive campaigns".to_string(),
            ));
        }

        let outcome = self.incentives.join(id, actor.user_id).await?;
        if outcome.activated {
            info!(campaign_id = %id, "Incentive campaign reached threshold, now active");
            self.feed.publish(ChangeEvent {
                kind: EntityKind::IncentiveCampaign,
                id,
                affiliate_id: None,
            });
        }
        Ok(outcome)
    }

    pub async fn get(&self, id: IncentiveCampaignId) -> Result<IncentiveCampaign> {
        self.incentives
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Incentive campaign {}", id)))
    }

    pub async fn list(&self) -> Result<Vec<IncentiveCampaign>> {
        self.incentives.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fynehub_common::types::IncentiveStatus;
    use fynehub_storage::{ChangeFilter, MemoryStore};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn workflow(store: &MemoryStore) -> IncentiveWorkflow {
        IncentiveWorkflow::new(Arc::new(store.clone()), ChangeFeed::default())
    }

    fn create_input(min: i32) -> CreateIncentiveCampaign {
        CreateIncentiveCampaign {
            name: "Summer kickoff".to_string(),
            description: None,
            min_affiliates: min,
        }
    }

    #[tokio::test]
    async fn test_activates_exactly_at_threshold() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let admin = Actor::admin(Uuid::new_v4());
        let campaign = wf.create(admin, create_input(2)).await.unwrap();

        let first = wf
            .join(Actor::affiliate(Uuid::new_v4()), campaign.id)
            .await
            .unwrap();
        assert!(first.newly_joined);
        assert!(!first.activated);
        assert_eq!(first.campaign.status_enum(), Some(IncentiveStatus::Pending));

        let second = wf
            .join(Actor::affiliate(Uuid::new_v4()), campaign.id)
            .await
            .unwrap();
        assert!(second.activated);
        assert_eq!(second.campaign.status_enum(), Some(IncentiveStatus::Active));
        assert_eq!(second.campaign.joined_affiliates, 2);
    }

    #[tokio::test]
    async fn test_repeat_join_is_noop() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let campaign = wf
            .create(Actor::admin(Uuid::new_v4()), create_input(3))
            .await
            .unwrap();

        let affiliate = Actor::affiliate(Uuid::new_v4());
        let first = wf.join(affiliate, campaign.id).await.unwrap();
        assert!(first.newly_joined);

        let again = wf.join(affiliate, campaign.id).await.unwrap();
        assert!(!again.newly_joined);
        assert!(!again.activated);
        assert_eq!(again.campaign.joined_affiliates, 1);
    }

    #[tokio::test]
    async fn test_join_past_threshold_never_reactivates() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let campaign = wf
            .create(Actor::admin(Uuid::new_v4()), create_input(1))
            .await
            .unwrap();

        let first = wf
            .join(Actor::affiliate(Uuid::new_v4()), campaign.id)
            .await
            .unwrap();
        assert!(first.activated);

        let late = wf
            .join(Actor::affiliate(Uuid::new_v4()), campaign.id)
            .await
            .unwrap();
        assert!(late.newly_joined);
        assert!(!late.activated);
        assert_eq!(late.campaign.joined_affiliates, 2);
        assert_eq!(late.campaign.status_enum(), Some(IncentiveStatus::Active));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_count_every_affiliate_and_activate_once() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let campaign = wf
            .create(Actor::admin(Uuid::new_v4()), create_input(5))
            .await
            .unwrap();

        // Start one short of the threshold
        for _ in 0..4 {
            wf.join(Actor::affiliate(Uuid::new_v4()), campaign.id)
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..8 {
            let wf = wf.clone();
            let id = campaign.id;
            handles.push(tokio::spawn(async move {
                wf.join(Actor::affiliate(Uuid::new_v4()), id).await
            }));
        }

        let mut activations = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if outcome.activated {
                activations += 1;
            }
        }
        assert_eq!(activations, 1);

        let final_state = wf.get(campaign.id).await.unwrap();
        assert_eq!(final_state.joined_affiliates, 12);
        assert_eq!(final_state.status_enum(), Some(IncentiveStatus::Active));
    }

    #[tokio::test]
    async fn test_admin_cannot_join_and_affiliate_cannot_create() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let admin = Actor::admin(Uuid::new_v4());
        let affiliate = Actor::affiliate(Uuid::new_v4());

        let err = wf.create(affiliate, create_input(2)).await.unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));

        let campaign = wf.create(admin, create_input(2)).await.unwrap();
        let err = wf.join(admin, campaign.id).await.unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_zero_minimum_rejected() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let err = wf
            .create(Actor::admin(Uuid::new_v4()), create_input(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_activation_is_published() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let campaign = wf
            .create(Actor::admin(Uuid::new_v4()), create_input(1))
            .await
            .unwrap();

        let mut sub = wf.feed.subscribe(ChangeFilter {
            kind: Some(EntityKind::IncentiveCampaign),
            affiliate_id: None,
        });
        wf.join(Actor::affiliate(Uuid::new_v4()), campaign.id)
            .await
            .unwrap();

        let event = sub.next().await.unwrap();
        assert_eq!(event.id, campaign.id);
    }
}
