//! Common types for Fyne Creator Hub

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for campaigns
pub type CampaignId = Uuid;

/// Unique identifier for affiliates (and admin users)
pub type UserId = Uuid;

/// Unique identifier for sample requests
pub type SampleRequestId = Uuid;

/// Unique identifier for content rewards
pub type RewardId = Uuid;

/// Unique identifier for content submissions
pub type SubmissionId = Uuid;

/// Unique identifier for incentive campaigns
pub type IncentiveCampaignId = Uuid;

/// Unique identifier for survey responses
pub type SurveyResponseId = Uuid;

/// Unique identifier for draw wins
pub type DrawWinId = Uuid;

/// Unique identifier for support tickets
pub type TicketId = Uuid;

/// Unique identifier for API keys
pub type ApiKeyId = Uuid;

/// Role claim attached to an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Affiliate,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Affiliate => write!(f, "affiliate"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "affiliate" => Ok(Role::Affiliate),
            other => Err(crate::Error::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Identity of the user performing a workflow operation.
///
/// Every workflow call takes an explicit actor rather than reading an
/// ambient authenticated-user global; mutation rights are stage-dependent
/// and checked per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    /// Create an admin actor
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    /// Create an affiliate actor
    pub fn affiliate(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Affiliate,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_affiliate(&self) -> bool {
        self.role == Role::Affiliate
    }
}

/// Sample request lifecycle status
///
/// `pending_approval → {pending_showcase, rejected}`,
/// `pending_showcase → pending_order → shipped`.
/// `rejected` and `shipped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRequestStatus {
    PendingApproval,
    PendingShowcase,
    PendingOrder,
    Shipped,
    Rejected,
}

impl SampleRequestStatus {
    /// Whether no further transition is permitted from this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, SampleRequestStatus::Shipped | SampleRequestStatus::Rejected)
    }
}

impl std::fmt::Display for SampleRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleRequestStatus::PendingApproval => write!(f, "pending_approval"),
            SampleRequestStatus::PendingShowcase => write!(f, "pending_showcase"),
            SampleRequestStatus::PendingOrder => write!(f, "pending_order"),
            SampleRequestStatus::Shipped => write!(f, "shipped"),
            SampleRequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for SampleRequestStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_approval" => Ok(SampleRequestStatus::PendingApproval),
            "pending_showcase" => Ok(SampleRequestStatus::PendingShowcase),
            "pending_order" => Ok(SampleRequestStatus::PendingOrder),
            "shipped" => Ok(SampleRequestStatus::Shipped),
            "rejected" => Ok(SampleRequestStatus::Rejected),
            other => Err(crate::Error::Validation(format!(
                "Unknown sample request status: {}",
                other
            ))),
        }
    }
}

/// Content submission lifecycle status
///
/// `pending_review → {approved, rejected}`; a resubmission retires the
/// rejected record to `resubmitted` and spawns a new `pending_review` one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    PendingReview,
    Approved,
    Rejected,
    Resubmitted,
}

impl SubmissionStatus {
    /// Whether the submission can still be acted on by an admin
    pub fn is_actionable(&self) -> bool {
        matches!(self, SubmissionStatus::PendingReview)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::PendingReview => write!(f, "pending_review"),
            SubmissionStatus::Approved => write!(f, "approved"),
            SubmissionStatus::Rejected => write!(f, "rejected"),
            SubmissionStatus::Resubmitted => write!(f, "resubmitted"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_review" => Ok(SubmissionStatus::PendingReview),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            "resubmitted" => Ok(SubmissionStatus::Resubmitted),
            other => Err(crate::Error::Validation(format!(
                "Unknown submission status: {}",
                other
            ))),
        }
    }
}

/// Incentive campaign status
///
/// `pending → active` exactly when the joined count reaches the minimum;
/// the flip is monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveStatus {
    Pending,
    Active,
    Completed,
}

impl std::fmt::Display for IncentiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncentiveStatus::Pending => write!(f, "pending"),
            IncentiveStatus::Active => write!(f, "active"),
            IncentiveStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for IncentiveStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IncentiveStatus::Pending),
            "active" => Ok(IncentiveStatus::Active),
            "completed" => Ok(IncentiveStatus::Completed),
            other => Err(crate::Error::Validation(format!(
                "Unknown incentive status: {}",
                other
            ))),
        }
    }
}

/// Support ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Answered,
    Closed,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "open"),
            TicketStatus::Answered => write!(f, "answered"),
            TicketStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "answered" => Ok(TicketStatus::Answered),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(crate::Error::Validation(format!(
                "Unknown ticket status: {}",
                other
            ))),
        }
    }
}

/// Content platform an affiliate publishes on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Tiktok,
    Instagram,
    Youtube,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Tiktok => write!(f, "tiktok"),
            Platform::Instagram => write!(f, "instagram"),
            Platform::Youtube => write!(f, "youtube"),
        }
    }
}

/// One row of a tiered reward table: submissions with at least `min_views`
/// tracked views earn `rate` per rate unit instead of the base rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTier {
    pub min_views: i64,
    pub rate: Decimal,
}
