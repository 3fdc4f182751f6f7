//! Fyne Creator Hub API - REST layer
//!
//! Thin axum layer over the workflow engine. The auth middleware resolves
//! each request's bearer token to an explicit [`Actor`] which is passed
//! into every workflow call; handlers never consult ambient identity.
//!
//! [`Actor`]: fynehub_common::types::Actor

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;

pub use auth::AppState;
pub use routes::create_router;
