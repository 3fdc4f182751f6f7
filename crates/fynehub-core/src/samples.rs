//! Sample request workflow
//!
//! `pending_approval → {pending_showcase, rejected}`,
//! `pending_showcase → pending_order → shipped`. Mutation rights are
//! stage-dependent: the affiliate creates and confirms showcase placement,
//! the admin approves, rejects, and ships.

use std::sync::Arc;

use fynehub_common::types::{Actor, SampleRequestId, SampleRequestStatus};
use fynehub_common::{Error, Result};
use fynehub_storage::models::SampleRequest;
use fynehub_storage::repository::affiliates::AffiliateRepository;
use fynehub_storage::repository::campaigns::CampaignRepository;
use fynehub_storage::repository::sample_requests::{
    CreateSampleRequest, SampleRequestRepository,
};
use fynehub_storage::{ChangeEvent, ChangeFeed, ChangeFilter, ChangeSubscription, EntityKind};
use tracing::info;
use uuid::Uuid;

/// Input for creating a sample request
#[derive(Debug, Clone)]
pub struct CreateSampleRequestInput {
    pub campaign_id: Uuid,
    pub video_url: String,
    pub ad_code: String,
}

/// Sample request workflow service
#[derive(Clone)]
pub struct SampleWorkflow {
    requests: Arc<dyn SampleRequestRepository>,
    campaigns: Arc<dyn CampaignRepository>,
    affiliates: Arc<dyn AffiliateRepository>,
    feed: ChangeFeed,
}

impl SampleWorkflow {
    pub fn new(
        requests: Arc<dyn SampleRequestRepository>,
        campaigns: Arc<dyn CampaignRepository>,
        affiliates: Arc<dyn AffiliateRepository>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            requests,
            campaigns,
            affiliates,
            feed,
        }
    }

    /// Create a request in `pending_approval`.
    ///
    /// Campaign name and affiliate handle are denormalized onto the record
    /// here. The duplicate video-URL / ad-code guard rejects before any
    /// write occurs.
    pub async fn create(
        &self,
        actor: Actor,
        input: CreateSampleRequestInput,
    ) -> Result<SampleRequest> {
        if !actor.is_affiliate() {
            return Err(Error::PermissionDenied(
                "Only affiliates create sample requests".to_string(),
            ));
        }
        if input.video_url.trim().is_empty() {
            return Err(Error::Validation("Video URL is required".to_string()));
        }
        if input.ad_code.trim().is_empty() {
            return Err(Error::Validation("Ad code is required".to_string()));
        }

        let campaign = self
            .campaigns
            .get(input.campaign_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Campaign {}", input.campaign_id)))?;
        if !campaign.active {
            return Err(Error::Validation("Campaign is not active".to_string()));
        }

        let affiliate = self
            .affiliates
            .get(actor.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Affiliate {}", actor.user_id)))?;

        let request = self
            .requests
            .create(CreateSampleRequest {
                campaign_id: campaign.id,
                campaign_name: campaign.name,
                affiliate_id: affiliate.id,
                affiliate_handle: affiliate.handle,
                video_url: input.video_url,
                ad_code: input.ad_code,
            })
            .await?;

        info!(request_id = %request.id, campaign_id = %request.campaign_id, "Sample request created");
        self.publish(&request);
        Ok(request)
    }

    /// Admin: `pending_approval → pending_showcase`
    pub async fn approve(&self, actor: Actor, id: SampleRequestId) -> Result<SampleRequest> {
        self.admin_transition(
            actor,
            id,
            SampleRequestStatus::PendingApproval,
            SampleRequestStatus::PendingShowcase,
        )
        .await
    }

    /// Admin: `pending_approval → rejected` (terminal)
    pub async fn reject(&self, actor: Actor, id: SampleRequestId) -> Result<SampleRequest> {
        self.admin_transition(
            actor,
            id,
            SampleRequestStatus::PendingApproval,
            SampleRequestStatus::Rejected,
        )
        .await
    }

    /// Owning affiliate: `pending_showcase → pending_order`.
    ///
    /// `confirmed` is the affiliate's attestation of having placed the
    /// product on their showcase via the share link.
    pub async fn confirm_showcase(
        &self,
        actor: Actor,
        id: SampleRequestId,
        confirmed: bool,
    ) -> Result<SampleRequest> {
        if !actor.is_affiliate() {
            return Err(Error::PermissionDenied(
                "Only the owning affiliate confirms showcase placement".to_string(),
            ));
        }
        if !confirmed {
            return Err(Error::Validation(
                "Showcase placement must be confirmed".to_string(),
            ));
        }

        let request = self
            .requests
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Sample request {}", id)))?;
        if request.affiliate_id != actor.user_id {
            return Err(Error::PermissionDenied(
                "Sample request belongs to another affiliate".to_string(),
            ));
        }

        self.apply_transition(
            id,
            SampleRequestStatus::PendingShowcase,
            SampleRequestStatus::PendingOrder,
        )
        .await
    }

    /// Admin: `pending_order → shipped` (terminal)
    pub async fn ship(&self, actor: Actor, id: SampleRequestId) -> Result<SampleRequest> {
        self.admin_transition(
            actor,
            id,
            SampleRequestStatus::PendingOrder,
            SampleRequestStatus::Shipped,
        )
        .await
    }

    pub async fn get(&self, id: SampleRequestId) -> Result<Option<SampleRequest>> {
        self.requests.get(id).await
    }

    /// Requests owned by the acting affiliate
    pub async fn my_requests(&self, actor: Actor) -> Result<Vec<SampleRequest>> {
        self.requests.list_by_affiliate(actor.user_id).await
    }

    /// Admin: requests in a given status
    pub async fn list_by_status(
        &self,
        actor: Actor,
        status: SampleRequestStatus,
    ) -> Result<Vec<SampleRequest>> {
        if !actor.is_admin() {
            return Err(Error::PermissionDenied(
                "Only admins list requests across affiliates".to_string(),
            ));
        }
        self.requests.list_by_status(status).await
    }

    /// Observe sample request changes for one affiliate
    pub fn subscribe(&self, actor: Actor) -> ChangeSubscription {
        self.feed.subscribe(ChangeFilter {
            kind: Some(EntityKind::SampleRequest),
            affiliate_id: actor.is_affiliate().then_some(actor.user_id),
        })
    }

    async fn admin_transition(
        &self,
        actor: Actor,
        id: SampleRequestId,
        from: SampleRequestStatus,
        to: SampleRequestStatus,
    ) -> Result<SampleRequest> {
        if !actor.is_admin() {
            return Err(Error::PermissionDenied(
                "Only admins decide sample requests".to_string(),
            ));
        }
        self.apply_transition(id, from, to).await
    }

    async fn apply_transition(
        &self,
        id: SampleRequestId,
        from: SampleRequestStatus,
        to: SampleRequestStatus,
    ) -> Result<SampleRequest> {
        match self.requests.transition(id, from, to).await? {
            Some(request) => {
                info!(request_id = %id, from = %from, to = %to, "Sample request transitioned");
                self.publish(&request);
                Ok(request)
            }
            None => match self.requests.get(id).await? {
                Some(current) => Err(Error::Precondition(format!(
                    "Sample request is {}, expected {}",
                    current.status, from
                ))),
                None => Err(Error::NotFound(format!("Sample request {}", id))),
            },
        }
    }

    fn publish(&self, request: &SampleRequest) {
        self.feed.publish(ChangeEvent {
            kind: EntityKind::SampleRequest,
            id: request.id,
            affiliate_id: Some(request.affiliate_id),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fynehub_common::types::{Platform, Role};
    use fynehub_storage::repository::affiliates::CreateAffiliate;
    use fynehub_storage::repository::campaigns::CreateCampaign;
    use fynehub_storage::MemoryStore;

    struct Fixture {
        workflow: SampleWorkflow,
        affiliate: Actor,
        admin: Actor,
        campaign_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let campaign = CampaignRepository::create(
            &store,
            CreateCampaign {
                name: "Glow serum".to_string(),
                description: None,
                brand: Some("Fyne".to_string()),
                product_name: Some("Serum 30ml".to_string()),
            },
        )
        .await
        .unwrap();
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

        let workflow = SampleWorkflow::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            ChangeFeed::default(),
        );

        Fixture {
            workflow,
            affiliate: Actor::affiliate(affiliate.id),
            admin: Actor::admin(Uuid::new_v4()),
            campaign_id: campaign.id,
        }
    }

    fn input(campaign_id: Uuid, url: &str, code: &str) -> CreateSampleRequestInput {
        CreateSampleRequestInput {
            campaign_id,
            video_url: url.to_string(),
            ad_code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_full_fulfillment_path() {
        let f = fixture().await;

        let request = f
            .workflow
            .create(f.affiliate, input(f.campaign_id, "https://v/1", "AD-1"))
            .await
            .unwrap();
        assert_eq!(request.status, "pending_approval");
        assert_eq!(request.campaign_name, "Glow serum");
        assert_eq!(request.affiliate_handle, "@mia");

        let request = f.workflow.approve(f.admin, request.id).await.unwrap();
        assert_eq!(request.status, "pending_showcase");

        let request = f
            .workflow
            .confirm_showcase(f.affiliate, request.id, true)
            .await
            .unwrap();
        assert_eq!(request.status, "pending_order");

        let request = f.workflow.ship(f.admin, request.id).await.unwrap();
        assert_eq!(request.status, "shipped");
    }

    #[tokio::test]
    async fn test_rejected_is_terminal() {
        let f = fixture().await;
        let request = f
            .workflow
            .create(f.affiliate, input(f.campaign_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        f.workflow.reject(f.admin, request.id).await.unwrap();

        let err = f.workflow.approve(f.admin, request.id).await.unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[tokio::test]
    async fn test_duplicate_video_url_fails_validation() {
        let f = fixture().await;
        f.workflow
            .create(f.affiliate, input(f.campaign_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        let err = f
            .workflow
            .create(f.affiliate, input(f.campaign_id, "https://v/1", "AD-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(f.workflow.my_requests(f.affiliate).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_actor_checks() {
        let f = fixture().await;
        let request = f
            .workflow
            .create(f.affiliate, input(f.campaign_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        // Affiliate cannot approve
        let err = f
            .workflow
            .approve(f.affiliate, request.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));

        // A different affiliate cannot confirm showcase
        f.workflow.approve(f.admin, request.id).await.unwrap();
        let stranger = Actor::affiliate(Uuid::new_v4());
        let err = f
            .workflow
            .confirm_showcase(stranger, request.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_showcase_requires_attestation() {
        let f = fixture().await;
        let request = f
            .workflow
            .create(f.affiliate, input(f.campaign_id, "https://v/1", "AD-1"))
            .await
            .unwrap();
        f.workflow.approve(f.admin, request.id).await.unwrap();

        let err = f
            .workflow
            .confirm_showcase(f.affiliate, request.id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_skipping_a_stage_is_rejected() {
        let f = fixture().await;
        let request = f
            .workflow
            .create(f.affiliate, input(f.campaign_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        // Cannot ship straight from pending_approval
        let err = f.workflow.ship(f.admin, request.id).await.unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[tokio::test]
    async fn test_subscriber_notified_on_create() {
        let f = fixture().await;
        let mut sub = f.workflow.subscribe(f.affiliate);

        let request = f
            .workflow
            .create(f.affiliate, input(f.campaign_id, "https://v/1", "AD-1"))
            .await
            .unwrap();

        let event = sub.next().await.unwrap();
        assert_eq!(event.id, request.id);
        assert_eq!(event.kind, EntityKind::SampleRequest);
    }
}
