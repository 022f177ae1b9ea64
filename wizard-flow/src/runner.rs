//! FlowRunner – loads a session, dispatches exactly **one** event to it and saves
//! the updated session back to storage.
//!
//! Use it from request handlers where every request carries one user event.
//! Events for the same session are applied one at a time; a second event waits
//! until the first one has been saved. When you need to inspect the session
//! between dispatch and save, call [`Wizard::dispatch`] directly and persist it
//! yourself.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::{FlowError, Result},
    notify::Notifier,
    storage::{Session, SessionStorage},
    wizard::{Event, ExecutionResult, Wizard},
};

/// High-level helper that orchestrates the common _load → dispatch → save_ pattern.
#[derive(Clone)]
pub struct FlowRunner {
    wizard: Arc<Wizard>,
    storage: Arc<dyn SessionStorage>,
    session_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl FlowRunner {
    pub fn new(wizard: Arc<Wizard>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            wizard,
            storage,
            session_locks: Arc::new(DashMap::new()),
        }
    }

    fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.session_locks
            .entry(session_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Create a session on the landing step and persist it.
    pub async fn create_session(&self) -> Result<Session> {
        let session = self.wizard.new_session()?;
        self.storage.save(session.clone()).await?;
        debug!(session_id = %session.id, wizard = %self.wizard.id, "session created");
        Ok(session)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        self.storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))
    }

    /// Dispatch one event and persist the new state.
    pub async fn run(
        &self,
        session_id: &str,
        event: Event,
        notifier: &dyn Notifier,
    ) -> Result<(ExecutionResult, Session)> {
        let lock = self.session_lock(session_id);
        let _serialized = lock.lock().await;

        let mut session = match self.get_session(session_id).await {
            Ok(session) => session,
            Err(e @ FlowError::SessionNotFound(_)) => {
                self.session_locks.remove(session_id);
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        let result = self.wizard.dispatch(&mut session, event, notifier).await?;
        self.storage.save(session.clone()).await?;
        Ok((result, session))
    }
}
