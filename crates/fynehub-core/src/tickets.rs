//! Support ticket workflow
//!
//! Threaded tickets with a small status machine: an admin reply moves the
//! ticket to `answered`, an affiliate reply back to `open`, and a closed
//! ticket takes no further messages.

use std::sync::Arc;

use fynehub_common::types::{Actor, TicketId, TicketStatus};
use fynehub_common::{Error, Result};
use fynehub_storage::models::{SupportTicket, TicketMessage};
use fynehub_storage::repository::tickets::{CreateTicket, TicketRepository};
use fynehub_storage::{ChangeEvent, ChangeFeed, EntityKind};
use tracing::info;

/// Support ticket workflow service
#[derive(Clone)]
pub struct TicketWorkflow {
    tickets: Arc<dyn TicketRepository>,
    feed: ChangeFeed,
}

impl TicketWorkflow {
    pub fn new(tickets: Arc<dyn TicketRepository>, feed: ChangeFeed) -> Self {
        Self { tickets, feed }
    }

    /// Affiliate: open a ticket with its first message
    pub async fn open(&self, actor: Actor, subject: String, body: String) -> Result<SupportTicket> {
        if !actor.is_affiliate() {
            return Err(Error::PermissionDenied(
                "Only affiliates open support tickets".to_string(),
            ));
        }
        if subject.trim().is_empty() {
            return Err(Error::Validation("Subject is required".to_string()));
        }
        if body.trim().is_empty() {
            return Err(Error::Validation("Message body is required".to_string()));
        }

        let ticket = self
            .tickets
            .create(CreateTicket {
                affiliate_id: actor.user_id,
                subject,
                body,
            })
            .await?;

        info!(ticket_id = %ticket.id, "Support ticket opened");
        self.publish(&ticket);
        Ok(ticket)
    }

    /// Append a reply. Admin replies mark the ticket `answered`, affiliate
    /// replies reopen it.
    pub async fn reply(&self, actor: Actor, id: TicketId, body: String) -> Result<TicketMessage> {
        if body.trim().is_empty() {
            return Err(Error::Validation("Message body is required".to_string()));
        }

        let ticket = self.get(actor, id).await?;

        let new_status = if actor.is_admin() {
            TicketStatus::Answered
        } else {
            TicketStatus::Open
        };

        let message = self
            .tickets
            .add_message(id, actor.user_id, actor.role, body, new_status)
            .await?
            .ok_or_else(|| Error::Precondition("Ticket is closed".to_string()))?;

        self.publish(&ticket);
        Ok(message)
    }

    /// Close a ticket; idempotent for an already-closed one
    pub async fn close(&self, actor: Actor, id: TicketId) -> Result<SupportTicket> {
        let ticket = self.get(actor, id).await?;
        let current = ticket
            .status_enum()
            .ok_or_else(|| Error::Internal(format!("Corrupt status: {}", ticket.status)))?;
        if current == TicketStatus::Closed {
            return Ok(ticket);
        }

        let closed = self
            .tickets
            .transition(id, current, TicketStatus::Closed)
            .await?
            .ok_or_else(|| {
                Error::Precondition("Ticket changed while closing, retry".to_string())
            })?;

        info!(ticket_id = %id, "Support ticket closed");
        self.publish(&closed);
        Ok(closed)
    }

    /// One ticket, visible to admins and its owner
    pub async fn get(&self, actor: Actor, id: TicketId) -> Result<SupportTicket> {
        let ticket = self
            .tickets
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Ticket {}", id)))?;
        if !actor.is_admin() && ticket.affiliate_id != actor.user_id {
            return Err(Error::PermissionDenied(
                "Ticket belongs to another affiliate".to_string(),
            ));
        }
        Ok(ticket)
    }

    /// Admins see every ticket; affiliates only their own
    pub async fn list(
        &self,
        actor: Actor,
        status: Option<TicketStatus>,
    ) -> Result<Vec<SupportTicket>> {
        let affiliate_id = if actor.is_admin() {
            None
        } else {
            Some(actor.user_id)
        };
        self.tickets.list(affiliate_id, status).await
    }

    pub async fn messages(&self, actor: Actor, id: TicketId) -> Result<Vec<TicketMessage>> {
        self.get(actor, id).await?;
        self.tickets.messages(id).await
    }

    fn publish(&self, ticket: &SupportTicket) {
        self.feed.publish(ChangeEvent {
            kind: EntityKind::SupportTicket,
            id: ticket.id,
            affiliate_id: Some(ticket.affiliate_id),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fynehub_storage::MemoryStore;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn workflow(store: &MemoryStore) -> TicketWorkflow {
        TicketWorkflow::new(Arc::new(store.clone()), ChangeFeed::default())
    }

    async fn open_ticket(wf: &TicketWorkflow, affiliate: Actor) -> SupportTicket {
        wf.open(
            affiliate,
            "Missing sample".to_string(),
            "My sample never arrived".to_string(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_reply_flips_status_by_role() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let affiliate = Actor::affiliate(Uuid::new_v4());
        let admin = Actor::admin(Uuid::new_v4());

        let ticket = open_ticket(&wf, affiliate).await;
        assert_eq!(ticket.status, "open");

        wf.reply(admin, ticket.id, "Checking with the warehouse".to_string())
            .await
            .unwrap();
        let ticket = wf.get(admin, ticket.id).await.unwrap();
        assert_eq!(ticket.status, "answered");

        wf.reply(affiliate, ticket.id, "Any update?".to_string())
            .await
            .unwrap();
        let ticket = wf.get(admin, ticket.id).await.unwrap();
        assert_eq!(ticket.status, "open");
    }

    #[tokio::test]
    async fn test_closed_ticket_takes_no_replies() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let affiliate = Actor::affiliate(Uuid::new_v4());

        let ticket = open_ticket(&wf, affiliate).await;
        wf.close(affiliate, ticket.id).await.unwrap();

        let err = wf
            .reply(affiliate, ticket.id, "One more thing".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));

        // The opening message is still the only one
        let messages = wf.messages(affiliate, ticket.id).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let affiliate = Actor::affiliate(Uuid::new_v4());

        let ticket = open_ticket(&wf, affiliate).await;
        wf.close(affiliate, ticket.id).await.unwrap();
        let again = wf.close(affiliate, ticket.id).await.unwrap();
        assert_eq!(again.status, "closed");
    }

    #[tokio::test]
    async fn test_ownership_enforced() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let owner = Actor::affiliate(Uuid::new_v4());
        let stranger = Actor::affiliate(Uuid::new_v4());

        let ticket = open_ticket(&wf, owner).await;

        let err = wf.get(stranger, ticket.id).await.unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
        let err = wf
            .reply(stranger, ticket.id, "Me too".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_list_scoping() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let a = Actor::affiliate(Uuid::new_v4());
        let b = Actor::affiliate(Uuid::new_v4());
        let admin = Actor::admin(Uuid::new_v4());

        open_ticket(&wf, a).await;
        open_ticket(&wf, b).await;

        assert_eq!(wf.list(admin, None).await.unwrap().len(), 2);
        assert_eq!(wf.list(a, None).await.unwrap().len(), 1);
        assert_eq!(
            wf.list(admin, Some(TicketStatus::Closed))
                .await
                .unwrap()
                .len(),
            0
        );
    }

    #[tokio::test]
    async fn test_admins_do_not_open_tickets() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let err = wf
            .open(
                Actor::admin(Uuid::new_v4()),
                "subject".to_string(),
                "body".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
    }
}
