//! Change-notification feed
//!
//! Push-based observer registration over workflow mutations. Subscribers
//! register a filter and receive matching events until they drop or
//! explicitly unsubscribe. The backing transport here is an in-process
//! broadcast channel; implementers may swap in polling or a native store
//! change-feed without touching subscribers.

use fynehub_common::types::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Entity kinds observable through the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    SampleRequest,
    ContentSubmission,
    ContentReward,
    IncentiveCampaign,
    SupportTicket,
}

/// One mutation notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: EntityKind,
    pub id: Uuid,
    /// Affiliate the entity belongs to, when it has a single owner
    pub affiliate_id: Option<UserId>,
}

/// Subscription filter; `None` fields match everything
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeFilter {
    pub kind: Option<EntityKind>,
    pub affiliate_id: Option<UserId>,
}

impl ChangeFilter {
    /// Whether an event passes this filter
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if let Some(kind) = self.kind {
            if event.kind != kind {
                return false;
            }
        }
        if let Some(affiliate_id) = self.affiliate_id {
            if event.affiliate_id != Some(affiliate_id) {
                return false;
            }
        }
        true
    }
}

/// Broadcast hub for change events
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ChangeFeed {
    /// Create a feed with the given per-subscriber buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers
    pub fn publish(&self, event: ChangeEvent) {
        // No subscribers is not an error
        let _ = self.tx.send(event);
    }

    /// Register an observer; dropping the handle unsubscribes
    pub fn subscribe(&self, filter: ChangeFilter) -> ChangeSubscription {
        ChangeSubscription {
            rx: self.tx.subscribe(),
            filter,
        }
    }
}

/// Handle for a registered observer
pub struct ChangeSubscription {
    rx: broadcast::Receiver<ChangeEvent>,
    filter: ChangeFilter,
}

impl ChangeSubscription {
    /// Wait for the next event matching this subscription's filter.
    ///
    /// Returns `None` once the feed is closed. A slow subscriber that
    /// lags behind the buffer skips the missed events and keeps going.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Deregister the observer
    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EntityKind, affiliate_id: Option<UserId>) -> ChangeEvent {
        ChangeEvent {
            kind,
            id: Uuid::new_v4(),
            affiliate_id,
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_matching_events() {
        let feed = ChangeFeed::new(16);
        let affiliate = Uuid::new_v4();
        let mut sub = feed.subscribe(ChangeFilter {
            kind: Some(EntityKind::SampleRequest),
            affiliate_id: Some(affiliate),
        });

        feed.publish(event(EntityKind::ContentSubmission, Some(affiliate)));
        feed.publish(event(EntityKind::SampleRequest, Some(Uuid::new_v4())));
        feed.publish(event(EntityKind::SampleRequest, Some(affiliate)));

        let received = sub.next().await.unwrap();
        assert_eq!(received.kind, EntityKind::SampleRequest);
        assert_eq!(received.affiliate_id, Some(affiliate));
    }

    #[tokio::test]
    async fn test_unfiltered_subscriber_sees_everything() {
        let feed = ChangeFeed::new(16);
        let mut sub = feed.subscribe(ChangeFilter::default());

        feed.publish(event(EntityKind::IncentiveCampaign, None));
        assert_eq!(sub.next().await.unwrap().kind, EntityKind::IncentiveCampaign);
    }

    #[tokio::test]
    async fn test_unsubscribed_observer_is_dropped() {
        let feed = ChangeFeed::new(16);
        let sub = feed.subscribe(ChangeFilter::default());
        sub.unsubscribe();

        // Publishing after the only subscriber left must not error
        feed.publish(event(EntityKind::SupportTicket, None));
    }
}
