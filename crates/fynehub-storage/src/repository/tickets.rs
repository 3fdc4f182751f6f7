//! Support ticket repository

use async_trait::async_trait;
use chrono::Utc;
use fynehub_common::types::{Role, TicketId, TicketStatus, UserId};
use fynehub_common::{Error, Result};
use uuid::Uuid;

use crate::db::DatabasePool;
use crate::models::{SupportTicket, TicketMessage};

/// Support ticket repository trait
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Open a ticket with its first message, in one transaction
    async fn create(&self, input: CreateTicket) -> Result<SupportTicket>;
    async fn get(&self, id: TicketId) -> Result<Option<SupportTicket>>;
    async fn list(
        &self,
        affiliate_id: Option<UserId>,
        status: Option<TicketStatus>,
    ) -> Result<Vec<SupportTicket>>;
    async fn messages(&self, ticket_id: TicketId) -> Result<Vec<TicketMessage>>;
    /// Append a message and move the ticket to `new_status` atomically;
    /// `None` means the ticket does not exist or is closed.
    async fn add_message(
        &self,
        ticket_id: TicketId,
        author_id: UserId,
        author_role: Role,
        body: String,
        new_status: TicketStatus,
    ) -> Result<Option<TicketMessage>>;
    /// Compare-and-set status change; `None` means the ticket was not in
    /// `from`.
    async fn transition(
        &self,
        id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<Option<SupportTicket>>;
}

/// Create ticket input
#[derive(Debug, Clone)]
pub struct CreateTicket {
    pub affiliate_id: UserId,
    pub subject: String,
    pub body: String,
}

/// Database ticket repository
pub struct DbTicketRepository {
    pool: DatabasePool,
}

impl DbTicketRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for DbTicketRepository {
    async fn create(&self, input: CreateTicket) -> Result<SupportTicket> {
        let now = Utc::now();

        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let ticket = sqlx::query_as::<_, SupportTicket>(
            r#"
            INSERT INTO support_tickets (id, affiliate_id, subject, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.affiliate_id)
        .bind(&input.subject)
        .bind(TicketStatus::Open.to_string())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO ticket_messages (id, ticket_id, author_id, author_role, body, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(ticket.id)
        .bind(input.affiliate_id)
        .bind(Role::Affiliate.to_string())
        .bind(&input.body)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(ticket)
    }

    async fn get(&self, id: TicketId) -> Result<Option<SupportTicket>> {
        sqlx::query_as::<_, SupportTicket>("SELECT * FROM support_tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn list(
        &self,
        affiliate_id: Option<UserId>,
        status: Option<TicketStatus>,
    ) -> Result<Vec<SupportTicket>> {
        match (affiliate_id, status) {
            (Some(affiliate_id), Some(status)) => sqlx::query_as::<_, SupportTicket>(
                r#"
                SELECT * FROM support_tickets
                WHERE affiliate_id = $1 AND status = $2
                ORDER BY updated_at DESC
                "#,
            )
            .bind(affiliate_id)
            .bind(status.to_string())
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string())),
            (Some(affiliate_id), None) => sqlx::query_as::<_, SupportTicket>(
                "SELECT * FROM support_tickets WHERE affiliate_id = $1 ORDER BY updated_at DESC",
            )
            .bind(affiliate_id)
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string())),
            (None, Some(status)) => sqlx::query_as::<_, SupportTicket>(
                "SELECT * FROM support_tickets WHERE status = $1 ORDER BY updated_at DESC",
            )
            .bind(status.to_string())
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string())),
            (None, None) => sqlx::query_as::<_, SupportTicket>(
                "SELECT * FROM support_tickets ORDER BY updated_at DESC",
            )
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| Error::Database(e.to_string())),
        }
    }

    async fn messages(&self, ticket_id: TicketId) -> Result<Vec<TicketMessage>> {
        sqlx::query_as::<_, TicketMessage>(
            "SELECT * FROM ticket_messages WHERE ticket_id = $1 ORDER BY created_at ASC",
        )
        .bind(ticket_id)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn add_message(
        &self,
        ticket_id: TicketId,
        author_id: UserId,
        author_role: Role,
        body: String,
        new_status: TicketStatus,
    ) -> Result<Option<TicketMessage>> {
        let now = Utc::now();

        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let updated = sqlx::query(
            r#"
            UPDATE support_tickets SET status = $2, updated_at = $3
            WHERE id = $1 AND status <> $4
            "#,
        )
        .bind(ticket_id)
        .bind(new_status.to_string())
        .bind(now)
        .bind(TicketStatus::Closed.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?
        .rows_affected();

        if updated == 0 {
            return Ok(None);
        }

        let message = sqlx::query_as::<_, TicketMessage>(
            r#"
            INSERT INTO ticket_messages (id, ticket_id, author_id, author_role, body, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(ticket_id)
        .bind(author_id)
        .bind(author_role.to_string())
        .bind(&body)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(Some(message))
    }

    async fn transition(
        &self,
        id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<Option<SupportTicket>> {
        sqlx::query_as::<_, SupportTicket>(
            r#"
            UPDATE support_tickets SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from.to_string())
        .bind(to.to_string())
        .bind(Utc::now())
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }
}
