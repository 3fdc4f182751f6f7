//! Repository layer for data access

pub mod affiliates;
pub mod api_keys;
pub mod campaigns;
pub mod content_rewards;
pub mod content_submissions;
pub mod incentives;
pub mod sample_requests;
pub mod surveys;
pub mod tickets;

// Re-export concrete repository implementations with simple names
pub use affiliates::DbAffiliateRepository as AffiliateRepository;
pub use api_keys::DbApiKeyRepository as ApiKeyRepository;
pub use campaigns::DbCampaignRepository as CampaignRepository;
pub use content_rewards::DbContentRewardRepository as ContentRewardRepository;
pub use content_submissions::DbContentSubmissionRepository as ContentSubmissionRepository;
pub use incentives::DbIncentiveRepository as IncentiveRepository;
pub use sample_requests::DbSampleRequestRepository as SampleRequestRepository;
pub use surveys::DbSurveyRepository as SurveyRepository;
pub use tickets::DbTicketRepository as TicketRepository;

// Re-export repository traits
pub use affiliates::AffiliateRepository as AffiliateRepositoryTrait;
pub use api_keys::ApiKeyRepository as ApiKeyRepositoryTrait;
pub use campaigns::CampaignRepository as CampaignRepositoryTrait;
pub use content_rewards::ContentRewardRepository as ContentRewardRepositoryTrait;
pub use content_submissions::ContentSubmissionRepository as ContentSubmissionRepositoryTrait;
pub use incentives::IncentiveRepository as IncentiveRepositoryTrait;
pub use sample_requests::SampleRequestRepository as SampleRequestRepositoryTrait;
pub use surveys::SurveyRepository as SurveyRepositoryTrait;
pub use tickets::TicketRepository as TicketRepositoryTrait;
