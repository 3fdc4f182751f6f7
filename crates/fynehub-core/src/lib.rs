//! Fyne Creator Hub Core - workflow engine
//!
//! This crate enforces the status-transition workflows of the creator hub:
//! sample-request fulfillment, content-reward submission review with payout
//! computation, incentive-campaign activation, the weekly survey draw, and
//! support ticket threads. Every operation takes an explicit [`Actor`] and
//! returns a typed outcome; presentation layers never assume success.
//!
//! [`Actor`]: fynehub_common::types::Actor

pub mod content;
pub mod draw;
pub mod incentives;
pub mod leaderboard;
pub mod payout;
pub mod samples;
pub mod tickets;

pub use content::{ApprovalOutcome, ContentWorkflow, SubmitContentInput};
pub use draw::DrawWorkflow;
pub use incentives::IncentiveWorkflow;
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use payout::{compute_payout, select_rate};
pub use samples::{CreateSampleRequestInput, SampleWorkflow};
pub use tickets::TicketWorkflow;
