//! Per-session state ownership.
//!
//! Each session holds its state behind an `Arc` that is replaced in one
//! assignment when a turn completes. Readers clone the `Arc` and never see a
//! half-merged state. Turns on the same session are serialized by an async
//! mutex; turns on different sessions run independently.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use uuid::Uuid;

use super::error::SessionError;
use super::extractor::CandidateExtractor;
use super::runner::{Coordinator, TurnOutcome};
use crate::models::SessionState;

// ═══════════════════════════════════════════════════════════
// SessionSlot: one conversation
// ═══════════════════════════════════════════════════════════

struct SessionSlot {
    state: RwLock<Arc<SessionState>>,
    turn: tokio::sync::Mutex<()>,
}

impl SessionSlot {
    fn new(state: SessionState) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
            turn: tokio::sync::Mutex::new(()),
        }
    }

    fn snapshot(&self) -> Result<Arc<SessionState>, SessionError> {
        let guard = self.state.read().map_err(|_| SessionError::LockPoisoned)?;
        Ok(Arc::clone(&guard))
    }

    fn publish(&self, next: Arc<SessionState>) -> Result<(), SessionError> {
        let mut guard = self.state.write().map_err(|_| SessionError::LockPoisoned)?;
        *guard = next;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// SessionRegistry
// ═══════════════════════════════════════════════════════════

/// All open sessions, keyed by id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<SessionSlot>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an empty session.
    pub fn open(&self) -> Result<Uuid, SessionError> {
        self.open_with(SessionState::default())
    }

    /// Open a session seeded with existing state.
    pub fn open_with(&self, state: SessionState) -> Result<Uuid, SessionError> {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().map_err(|_| SessionError::LockPoisoned)?;
        sessions.insert(id, Arc::new(SessionSlot::new(state)));
        tracing::info!(session_id = %id, "Session opened");
        Ok(id)
    }

    /// Close a session, returning its final state.
    pub fn close(&self, id: Uuid) -> Result<Arc<SessionState>, SessionError> {
        let slot = {
            let mut sessions = self.sessions.write().map_err(|_| SessionError::LockPoisoned)?;
            sessions.remove(&id).ok_or(SessionError::UnknownSession(id))?
        };
        tracing::info!(session_id = %id, "Session closed");
        slot.snapshot()
    }

    /// Current published state of a session.
    pub fn snapshot(&self, id: Uuid) -> Result<Arc<SessionState>, SessionError> {
        self.slot(id)?.snapshot()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: Uuid) -> Result<Arc<SessionSlot>, SessionError> {
        let sessions = self.sessions.read().map_err(|_| SessionError::LockPoisoned)?;
        sessions
            .get(&id)
            .cloned()
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Run one turn for a session and publish the resulting state.
    ///
    /// Concurrent turns on the same session queue behind each other, so each
    /// one starts from the state the previous one published.
    pub async fn run_turn<E: CandidateExtractor>(
        &self,
        id: Uuid,
        coordinator: &Coordinator<E>,
        utterance: &str,
        today: NaiveDate,
    ) -> Result<TurnOutcome, SessionError> {
        let slot = self.slot(id)?;
        let _turn = slot.turn.lock().await;

        let current = slot.snapshot()?;
        let outcome = coordinator.run_turn(&current, utterance, today).await;

        if !Arc::ptr_eq(&current, &outcome.state) {
            slot.publish(Arc::clone(&outcome.state))?;
            tracing::debug!(session_id = %id, "Published new session state");
        }
        Ok(outcome)
    }
}
