//! Weekly survey draw
//!
//! Every survey response since the previous draw is an entry. Affiliates
//! who won inside the configured no-repeat window are excluded, one
//! entrant is picked uniformly at random, and the win is recorded so the
//! next draw starts from a fresh pool.

use std::sync::Arc;

use chrono::{Duration, Utc};
use fynehub_common::config::DrawConfig;
use fynehub_common::types::{Actor, UserId};
use fynehub_common::{Error, Result};
use fynehub_storage::models::{DrawWin, SurveyResponse};
use fynehub_storage::repository::surveys::{CreateSurveyResponse, SurveyRepository};
use rand::Rng;
use tracing::info;

/// Survey draw workflow service
#[derive(Clone)]
pub struct DrawWorkflow {
    surveys: Arc<dyn SurveyRepository>,
    config: DrawConfig,
}

impl DrawWorkflow {
    pub fn new(surveys: Arc<dyn SurveyRepository>, config: DrawConfig) -> Self {
        Self { surveys, config }
    }

    /// Affiliate: record a survey response, entering the next draw
    pub async fn submit_response(
        &self,
        actor: Actor,
        answers: serde_json::Value,
    ) -> Result<SurveyResponse> {
        if !actor.is_affiliate() {
            return Err(Error::PermissionDenied(
                "Only affiliates enter the survey draw".to_string(),
            ));
        }

        self.surveys
            .create_response(CreateSurveyResponse {
                affiliate_id: actor.user_id,
                answers,
            })
            .await
    }

    /// Admin: run a draw.
    ///
    /// Returns `Ok(None)` when no eligible entrant exists; an empty pool
    /// is a normal weekly outcome, not an error.
    pub async fn run(&self, actor: Actor, prize: &str) -> Result<Option<DrawWin>> {
        if !actor.is_admin() {
            return Err(Error::PermissionDenied(
                "Only admins run the draw".to_string(),
            ));
        }
        if prize.trim().is_empty() {
            return Err(Error::Validation("Prize is required".to_string()));
        }

        let since = self.surveys.latest_win_at().await?;
        let responses = self.surveys.responses_since(since).await?;

        let window_start = Utc::now() - Duration::days(self.config.no_repeat_days);
        let recent_winners: Vec<UserId> = self
            .surveys
            .wins_since(window_start)
            .await?
            .into_iter()
            .map(|w| w.affiliate_id)
            .collect();

        let mut pool: Vec<UserId> = Vec::new();
        for response in responses {
            if recent_winners.contains(&response.affiliate_id) {
                continue;
            }
            if !pool.contains(&response.affiliate_id) {
                pool.push(response.affiliate_id);
            }
        }

        if pool.is_empty() {
            info!("Draw skipped, no eligible entrants");
            return Ok(None);
        }

        let winner = pool[rand::thread_rng().gen_range(0..pool.len())];
        let win = self.surveys.record_win(winner, prize).await?;
        info!(affiliate_id = %winner, prize = %prize, "Draw winner recorded");
        Ok(Some(win))
    }

    /// Wins recorded in the trailing `days` days, newest first
    pub async fn recent_wins(&self, days: i64) -> Result<Vec<DrawWin>> {
        self.surveys.wins_since(Utc::now() - Duration::days(days)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fynehub_storage::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use uuid::Uuid;

    fn workflow(store: &MemoryStore) -> DrawWorkflow {
        DrawWorkflow::new(Arc::new(store.clone()), DrawConfig::default())
    }

    #[tokio::test]
    async fn test_empty_pool_is_not_an_error() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let result = wf.run(Actor::admin(Uuid::new_v4()), "Gift card").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_single_entrant_wins() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let affiliate = Actor::affiliate(Uuid::new_v4());
        wf.submit_response(affiliate, json!({"q1": "weekly"}))
            .await
            .unwrap();

        let win = wf
            .run(Actor::admin(Uuid::new_v4()), "Gift card")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(win.affiliate_id, affiliate.user_id);
        assert_eq!(win.prize, "Gift card");
    }

    #[tokio::test]
    async fn test_duplicate_responses_count_once() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let a = Actor::affiliate(Uuid::new_v4());
        let b = Actor::affiliate(Uuid::new_v4());
        for _ in 0..10 {
            wf.submit_response(a, json!({})).await.unwrap();
        }
        wf.submit_response(b, json!({})).await.unwrap();

        // a is a recent winner after the first draw, so a second run can
        // only pick b regardless of how many entries a stacked up
        let first = wf
            .run(Actor::admin(Uuid::new_v4()), "Round 1")
            .await
            .unwrap()
            .unwrap();
        wf.submit_response(a, json!({})).await.unwrap();
        wf.submit_response(b, json!({})).await.unwrap();
        let second = wf
            .run(Actor::admin(Uuid::new_v4()), "Round 2")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(first.affiliate_id, second.affiliate_id);
    }

    #[tokio::test]
    async fn test_recent_winner_excluded() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let affiliate = Actor::affiliate(Uuid::new_v4());
        let admin = Actor::admin(Uuid::new_v4());

        wf.submit_response(affiliate, json!({})).await.unwrap();
        wf.run(admin, "Round 1").await.unwrap().unwrap();

        // New response, but the win is inside the no-repeat window
        wf.submit_response(affiliate, json!({})).await.unwrap();
        let result = wf.run(admin, "Round 2").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_only_responses_since_last_draw_enter() {
        let store = MemoryStore::new();
        // Zero-day window so past winners stay eligible
        let wf = DrawWorkflow::new(
            Arc::new(store.clone()),
            DrawConfig { no_repeat_days: 0 },
        );
        let affiliate = Actor::affiliate(Uuid::new_v4());
        let admin = Actor::admin(Uuid::new_v4());

        wf.submit_response(affiliate, json!({})).await.unwrap();
        wf.run(admin, "Round 1").await.unwrap().unwrap();

        // No new response after the draw: the pool is empty
        let result = wf.run(admin, "Round 2").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_affiliates_cannot_run_the_draw() {
        let store = MemoryStore::new();
        let wf = workflow(&store);
        let err = wf
            .run(Actor::affiliate(Uuid::new_v4()), "Gift card")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
    }
}
