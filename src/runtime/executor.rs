//! Turn executor

use super::nodes;
use super::traits::{Collaborator, SessionStore};
use super::TurnError;
use crate::state_machine::{merge, route, SessionState, StateUpdate};
use std::time::Instant;

/// Runs one turn of a session: load, merge input, route, execute exactly
/// one node, merge its output, persist.
pub struct TurnExecutor<S, C>
where
    S: SessionStore,
    C: Collaborator,
{
    store: S,
    collaborator: C,
}

impl<S, C> TurnExecutor<S, C>
where
    S: SessionStore,
    C: Collaborator,
{
    pub fn new(store: S, collaborator: C) -> Self {
        Self {
            store,
            collaborator,
        }
    }

    /// Apply `input` to the session and run the node it routes to.
    ///
    /// Nothing is persisted unless the whole turn succeeds, so a failed turn
    /// can be retried against the same stored state.
    pub async fn handle(
        &self,
        session_id: &str,
        input: StateUpdate,
    ) -> Result<SessionState, TurnError> {
        let start = Instant::now();
        let result = self.run_turn(session_id, input).await;

        if let Err(e) = &result {
            tracing::error!(
                session_id,
                error = %e,
                duration_ms = %start.elapsed().as_millis(),
                "Turn failed"
            );
        }
        result
    }

    async fn run_turn(
        &self,
        session_id: &str,
        input: StateUpdate,
    ) -> Result<SessionState, TurnError> {
        let current = self.store.get(session_id).await.map_err(TurnError::Store)?;
        if current == SessionState::default() {
            tracing::debug!(session_id, "Starting new session");
        }
        let merged = merge(&current, input);

        let node = route(&merged);
        tracing::info!(
            session_id,
            node = %node,
            llm = node.calls_collaborator(),
            step = ?merged.current_step,
            messages = merged.messages.len(),
            "Executing turn"
        );

        let update = nodes::run(node, &merged, &self.collaborator).await?;
        let next = merge(&merged, update);

        self.store
            .put(session_id, next.clone())
            .await
            .map_err(TurnError::Store)?;

        tracing::debug!(session_id, status = ?next.status(), "Turn complete");
        Ok(next)
    }
}
