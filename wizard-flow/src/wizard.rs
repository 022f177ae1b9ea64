use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{FlowError, Result},
    notify::{Notification, Notifier},
    sequencer::{Sequencer, Transition},
    step::{NextAction, Step, StepContext, StepDescriptor, StepResult},
    storage::Session,
};

/// What happens to a step's local state when the user navigates back past it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BacktrackPolicy {
    /// Keep whatever the step held; returning to it shows the same state
    #[default]
    Sticky,
    /// Drop the local state of the step being left
    Reset,
}

/// Input from the environment driving a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "input", rename_all = "snake_case")]
pub enum Event {
    GetStarted,
    Next,
    Prev,
    /// Step-specific action, interpreted by the current step
    Action(Value),
}

/// A linear wizard: an ordered list of steps, the first being the landing step.
pub struct Wizard {
    pub id: String,
    steps: Vec<Arc<dyn Step>>,
    backtrack: BacktrackPolicy,
    completion_notice: Option<Notification>,
}

impl Wizard {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn backtrack_policy(&self) -> BacktrackPolicy {
        self.backtrack
    }

    pub fn get_step(&self, index: usize) -> Option<Arc<dyn Step>> {
        self.steps.get(index).cloned()
    }

    pub fn descriptors(&self) -> Vec<StepDescriptor> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepDescriptor {
                index,
                id: step.id().to_string(),
                label: step.label().to_string(),
            })
            .collect()
    }

    /// Fresh session on the landing step with an empty payload
    pub fn new_session(&self) -> Result<Session> {
        let cursor = Sequencer::new(self.steps.len())
            .ok_or_else(|| FlowError::InvalidWizard("fewer than two steps".to_string()))?;
        Ok(Session::new(Uuid::new_v4().to_string(), &self.id, cursor))
    }

    /// Readiness of the step the session is on
    pub fn is_ready(&self, session: &Session) -> bool {
        self.steps
            .get(session.current_step())
            .is_some_and(|step| step.is_ready(&session.context))
    }

    /// Apply one event to the session.
    ///
    /// Navigation that is not allowed from the current position is a no-op.
    /// `Next` only advances when the current step reports ready.
    pub async fn dispatch(
        &self,
        session: &mut Session,
        event: Event,
        notifier: &dyn Notifier,
    ) -> Result<ExecutionResult> {
        let current = session.current_step();
        debug!(session_id = %session.id, step = current, event = ?event, "dispatching event");

        match event {
            Event::GetStarted => {
                let transition = session.cursor.start();
                self.land(session, transition, notifier).await?;
                Ok(ExecutionResult::waiting(None, transition))
            }
            Event::Prev => self.navigate(session, NextAction::Retreat, None, notifier).await,
            Event::Next => {
                if !self.is_ready(session) {
                    info!(session_id = %session.id, step = current, "step not ready, staying");
                    return Ok(ExecutionResult {
                        response: Some("This step is not complete yet".to_string()),
                        status: ExecutionStatus::NotReady,
                        transition: None,
                    });
                }
                self.navigate(session, NextAction::Advance, None, notifier).await
            }
            Event::Action(input) => {
                let step = self
                    .get_step(current)
                    .ok_or(FlowError::StepNotFound(current))?;
                let result = {
                    let mut cx = StepContext::new(
                        &session.id,
                        &session.context,
                        &mut session.payload,
                        notifier,
                    );
                    step.handle(input, &mut cx).await?
                };
                let StepResult {
                    response,
                    next_action,
                    status_message,
                } = result;
                if status_message.is_some() {
                    session.status_message = status_message;
                }
                self.navigate(session, next_action, response, notifier).await
            }
        }
    }

    async fn navigate(
        &self,
        session: &mut Session,
        action: NextAction,
        response: Option<String>,
        notifier: &dyn Notifier,
    ) -> Result<ExecutionResult> {
        match action {
            NextAction::Stay => Ok(ExecutionResult::waiting(response, None)),
            NextAction::Advance => {
                let transition = session.cursor.advance();
                self.land(session, transition, notifier).await?;
                Ok(ExecutionResult::waiting(response, transition))
            }
            NextAction::Retreat => {
                let transition = session.cursor.retreat();
                if let Some(t) = transition {
                    if self.backtrack == BacktrackPolicy::Reset {
                        if let Some(left) = self.steps.get(t.from) {
                            debug!(session_id = %session.id, step = %left.id(), "dropping local state");
                            session.context.remove(left.id()).await;
                        }
                    }
                }
                self.land(session, transition, notifier).await?;
                Ok(ExecutionResult::waiting(response, transition))
            }
            NextAction::Complete => {
                let transition = session.cursor.complete();
                if transition.is_none() {
                    return Ok(ExecutionResult::waiting(response, None));
                }
                // payload intentionally survives completion
                session.context.clear().await;
                info!(session_id = %session.id, wizard = %self.id, "flow completed");
                if let Some(notice) = &self.completion_notice {
                    notifier.notify(Notification {
                        issued_at: chrono::Utc::now(),
                        ..notice.clone()
                    });
                }
                Ok(ExecutionResult {
                    response,
                    status: ExecutionStatus::Completed,
                    transition,
                })
            }
        }
    }

    async fn land(
        &self,
        session: &mut Session,
        transition: Option<Transition>,
        notifier: &dyn Notifier,
    ) -> Result<()> {
        let Some(transition) = transition else {
            return Ok(());
        };
        let step = self
            .get_step(transition.to)
            .ok_or(FlowError::StepNotFound(transition.to))?;
        info!(
            session_id = %session.id,
            from = transition.from,
            to = transition.to,
            step = %step.id(),
            "step transition"
        );
        let mut cx = StepContext::new(
            &session.id,
            &session.context,
            &mut session.payload,
            notifier,
        );
        step.on_enter(&mut cx).await
    }
}

/// Builder for creating wizards
pub struct WizardBuilder {
    id: String,
    steps: Vec<Arc<dyn Step>>,
    backtrack: BacktrackPolicy,
    completion_notice: Option<Notification>,
}

impl WizardBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
            backtrack: BacktrackPolicy::default(),
            completion_notice: None,
        }
    }

    /// Append a step. The first one added is the landing step.
    pub fn add_step(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn backtrack_policy(mut self, policy: BacktrackPolicy) -> Self {
        self.backtrack = policy;
        self
    }

    /// Notification emitted whenever the flow completes
    pub fn completion_notice(mut self, notice: Notification) -> Self {
        self.completion_notice = Some(notice);
        self
    }

    pub fn build(self) -> Result<Wizard> {
        if self.steps.len() < 2 {
            return Err(FlowError::InvalidWizard(format!(
                "wizard '{}' needs a landing step and at least one more step",
                self.id
            )));
        }
        for (i, step) in self.steps.iter().enumerate() {
            if self.steps[..i].iter().any(|other| other.id() == step.id()) {
                return Err(FlowError::InvalidWizard(format!(
                    "duplicate step id '{}'",
                    step.id()
                )));
            }
        }
        Ok(Wizard {
            id: self.id,
            steps: self.steps,
            backtrack: self.backtrack,
            completion_notice: self.completion_notice,
        })
    }
}

/// Outcome of dispatching one event
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub response: Option<String>,
    pub status: ExecutionStatus,
    pub transition: Option<Transition>,
}

impl ExecutionResult {
    fn waiting(response: Option<String>, transition: Option<Transition>) -> Self {
        Self {
            response,
            status: ExecutionStatus::WaitingForInput,
            transition,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Waiting for the next event
    WaitingForInput,
    /// `Next` was refused because the step's readiness gate is closed
    NotReady,
    /// The flow finished and went back to the landing step
    Completed,
}
