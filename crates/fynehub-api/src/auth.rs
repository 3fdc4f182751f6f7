//! Bearer-token authentication
//!
//! Tokens are opaque strings hashed with SHA-256 and looked up in the
//! `api_keys` table; the matching row carries the user id and role claim
//! from which the request's [`Actor`] is built and stored in the request
//! extensions for handlers to pass into workflow calls.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use fynehub_common::types::{Actor, Role};
use fynehub_common::Config;
use fynehub_core::{
    ContentWorkflow, DrawWorkflow, IncentiveWorkflow, Leaderboard, SampleWorkflow, TicketWorkflow,
};
use fynehub_storage::repository::api_keys::ApiKeyRepository as ApiKeyRepositoryTrait;
use fynehub_storage::repository::ApiKeyRepository;
use fynehub_storage::DatabasePool;
use sha2::{Digest, Sha256};
use tracing::{error, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabasePool,
    pub config: Config,
    pub samples: SampleWorkflow,
    pub content: ContentWorkflow,
    pub incentives: IncentiveWorkflow,
    pub draw: DrawWorkflow,
    pub leaderboard: Leaderboard,
    pub tickets: TicketWorkflow,
}

/// Extract the token from `Authorization: Bearer` or `X-API-Key`
pub fn extract_token(req: &Request) -> Option<&str> {
    if let Some(auth) = req.headers().get("authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token);
            }
        }
    }

    if let Some(key) = req.headers().get("x-api-key") {
        if let Ok(key_str) = key.to_str() {
            return Some(key_str);
        }
    }

    None
}

/// Hash a token for storage lookup
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Resolve a token to an actor against the database
async fn resolve_actor(db_pool: &DatabasePool, token: &str) -> Result<Actor, StatusCode> {
    let repo = ApiKeyRepository::new(db_pool.clone());

    let key = repo
        .find_by_hash(&hash_token(token))
        .await
        .map_err(|e| {
            error!("Database error while looking up API key: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            warn!("Unknown or revoked API key");
            StatusCode::UNAUTHORIZED
        })?;

    let role = Role::from_str(&key.role).map_err(|_| {
        error!("API key {} carries unknown role {}", key.id, key.role);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Actor {
        user_id: key.user_id,
        role,
    })
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_token(&request).ok_or_else(|| {
        warn!("Missing bearer token in request to {}", request.uri().path());
        StatusCode::UNAUTHORIZED
    })?;

    let actor = resolve_actor(&state.db_pool, token).await?;
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}
