//! API routes

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use fynehub_common::Config;
use fynehub_core::{
    ContentWorkflow, DrawWorkflow, IncentiveWorkflow, Leaderboard, SampleWorkflow, TicketWorkflow,
};
use fynehub_storage::repository::{
    AffiliateRepository, CampaignRepository, ContentRewardRepository,
    ContentSubmissionRepository, IncentiveRepository, SampleRequestRepository, SurveyRepository,
    TicketRepository,
};
use fynehub_storage::{ChangeFeed, DatabasePool};
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AppState};
use crate::handlers::{campaigns, draw, health, incentives, rewards, samples, submissions, tickets};

/// Wire the workflow services over the database repositories
pub fn build_state(db_pool: DatabasePool, config: Config) -> AppState {
    let feed = ChangeFeed::default();

    let campaigns = Arc::new(CampaignRepository::new(db_pool.clone()));
    let affiliates = Arc::new(AffiliateRepository::new(db_pool.clone()));
    let sample_requests = Arc::new(SampleRequestRepository::new(db_pool.clone()));
    let reward_repo = Arc::new(ContentRewardRepository::new(db_pool.clone()));
    let submission_repo = Arc::new(ContentSubmissionRepository::new(db_pool.clone()));
    let incentive_repo = Arc::new(IncentiveRepository::new(db_pool.clone()));
    let survey_repo = Arc::new(SurveyRepository::new(db_pool.clone()));
    let ticket_repo = Arc::new(TicketRepository::new(db_pool.clone()));

    AppState {
        samples: SampleWorkflow::new(
            sample_requests,
            campaigns,
            affiliates.clone(),
            feed.clone(),
        ),
        content: ContentWorkflow::new(
            submission_repo.clone(),
            reward_repo.clone(),
            affiliates,
            feed.clone(),
        ),
        incentives: IncentiveWorkflow::new(incentive_repo, feed.clone()),
        draw: DrawWorkflow::new(survey_repo, config.draw.clone()),
        leaderboard: Leaderboard::new(reward_repo, submission_repo),
        tickets: TicketWorkflow::new(ticket_repo, feed),
        db_pool,
        config,
    }
}

/// Create the API router
pub fn create_router(db_pool: DatabasePool, config: Config) -> Router {
    let state = Arc::new(build_state(db_pool, config));

    // Health check routes (no auth required)
    let health_routes = Router::new()
        .route("/", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .with_state(state.clone());

    let campaign_routes = Router::new()
        .route("/", get(campaigns::list_campaigns))
        .route("/", post(campaigns::create_campaign))
        .route("/:id", get(campaigns::get_campaign))
        .route("/:id/active", patch(campaigns::set_campaign_active));

    let sample_routes = Router::new()
        .route("/", post(samples::create_sample_request))
        .route("/mine", get(samples::my_sample_requests))
        .route("/", get(samples::list_by_status))
        .route("/:id/approve", post(samples::approve))
        .route("/:id/reject", post(samples::reject))
        .route("/:id/confirm-showcase", post(samples::confirm_showcase))
        .route("/:id/ship", post(samples::ship));

    let reward_routes = Router::new()
        .route("/", get(rewards::list_rewards))
        .route("/", post(rewards::create_reward))
        .route("/:id", get(rewards::get_reward))
        .route("/:id/leaderboard", get(rewards::reward_leaderboard));

    let submission_routes = Router::new()
        .route("/", post(submissions::submit_content))
        .route("/mine", get(submissions::my_submissions))
        .route("/pending", get(submissions::pending_submissions))
        .route("/:id/approve", post(submissions::approve_submission))
        .route("/:id/reject", post(submissions::reject_submission))
        .route("/:id/resubmit", post(submissions::resubmit))
        .route("/:id/seen", post(submissions::mark_seen));

    let incentive_routes = Router::new()
        .route("/", get(incentives::list_incentives))
        .route("/", post(incentives::create_incentive))
        .route("/:id", get(incentives::get_incentive))
        .route("/:id/join", post(incentives::join_incentive));

    let draw_routes = Router::new()
        .route("/responses", post(draw::submit_survey))
        .route("/run", post(draw::run_draw))
        .route("/wins", get(draw::list_wins));

    let ticket_routes = Router::new()
        .route("/", get(tickets::list_tickets))
        .route("/", post(tickets::open_ticket))
        .route("/:id", get(tickets::get_ticket))
        .route("/:id/messages", get(tickets::ticket_messages))
        .route("/:id/messages", post(tickets::reply_to_ticket))
        .route("/:id/close", post(tickets::close_ticket));

    // API v1 routes with authentication
    let api_v1 = Router::new()
        .nest("/campaigns", campaign_routes)
        .nest("/sample-requests", sample_routes)
        .nest("/rewards", reward_routes)
        .nest("/submissions", submission_routes)
        .nest("/incentives", incentive_routes)
        .nest("/draw", draw_routes)
        .nest("/tickets", ticket_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    Router::new()
        .nest("/health", health_routes)
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
}
