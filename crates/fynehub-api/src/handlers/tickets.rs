//! Support ticket handlers

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use fynehub_common::types::{Actor, TicketStatus};
use fynehub_storage::models::{SupportTicket, TicketMessage};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

/// Request body for opening a ticket
#[derive(Debug, Clone, Deserialize)]
pub struct OpenTicketRequest {
    pub subject: String,
    pub body: String,
}

/// Request body for a reply
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRequest {
    pub body: String,
}

/// Query parameters for listing tickets
#[derive(Debug, Clone, Deserialize)]
pub struct ListTicketsQuery {
    pub status: Option<String>,
}

pub async fn open_ticket(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<OpenTicketRequest>,
) -> Result<(StatusCode, Json<SupportTicket>), ApiError> {
    let ticket = state.tickets.open(actor, body.subject, body.body).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Json<Vec<SupportTicket>>, ApiError> {
    let status = match query.status {
        Some(s) => Some(TicketStatus::from_str(&s)?),
        None => None,
    };
    Ok(Json(state.tickets.list(actor, status).await?))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupportTicket>, ApiError> {
    Ok(Json(state.tickets.get(actor, id).await?))
}

pub async fn ticket_messages(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TicketMessage>>, ApiError> {
    Ok(Json(state.tickets.messages(actor, id).await?))
}

pub async fn reply_to_ticket(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<TicketMessage>), ApiError> {
    let message = state.tickets.reply(actor, id, body.body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn close_ticket(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupportTicket>, ApiError> {
    Ok(Json(state.tickets.close(actor, id).await?))
}
