use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    context::Context,
    error::Result,
    notify::{Notification, Notifier},
};

/// Result of a step handling one action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Response to send to the user
    pub response: Option<String>,
    /// Navigation the step is asking for
    pub next_action: NextAction,
    /// Optional status for the session
    pub status_message: Option<String>,
}

impl StepResult {
    pub fn new(response: Option<String>, next_action: NextAction) -> Self {
        Self {
            response,
            next_action,
            status_message: None,
        }
    }

    pub fn new_with_status(
        response: Option<String>,
        next_action: NextAction,
        status_message: Option<String>,
    ) -> Self {
        Self {
            response,
            next_action,
            status_message,
        }
    }

    /// Stay on the current step with a message for the user
    pub fn stay(response: impl Into<String>) -> Self {
        Self::new(Some(response.into()), NextAction::Stay)
    }
}

/// Navigation requested by a step after handling an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    /// Remain on this step and wait for more input
    Stay,
    /// Move to the next step
    Advance,
    /// Move to the previous step
    Retreat,
    /// Finish the flow and go back to the landing step
    Complete,
}

/// What a step gets to work with while it runs.
///
/// The shared payload is owned by the session; steps only borrow it.
pub struct StepContext<'a> {
    pub session_id: &'a str,
    pub context: &'a Context,
    payload: &'a mut Option<Value>,
    notifier: &'a dyn Notifier,
}

impl<'a> StepContext<'a> {
    pub fn new(
        session_id: &'a str,
        context: &'a Context,
        payload: &'a mut Option<Value>,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            session_id,
            context,
            payload,
            notifier,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn set_payload(&mut self, payload: Value) {
        *self.payload = Some(payload);
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }
}

/// One screen of the wizard.
///
/// A step keeps its local state in the session [`Context`] under its own
/// [`id`](Step::id); the wizard relies on that when it resets state on
/// completion or backtracking.
#[async_trait]
pub trait Step: Send + Sync {
    /// Unique identifier, also the context key of the step-local state
    fn id(&self) -> &str;

    /// Human readable label
    fn label(&self) -> &str;

    /// Readiness gate for forward navigation
    fn is_ready(&self, _context: &Context) -> bool {
        true
    }

    /// Called every time the flow lands on this step
    async fn on_enter(&self, _cx: &mut StepContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Handle a step-specific action
    async fn handle(&self, input: Value, cx: &mut StepContext<'_>) -> Result<StepResult>;
}

/// Static description of a step, as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub index: usize,
    pub id: String,
    pub label: String,
}
