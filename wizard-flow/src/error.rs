use thiserror::Error;

/// Errors raised by the wizard engine.
///
/// Navigation requests that make no sense for the current step are never errors;
/// the sequencer treats them as no-ops. These variants cover lookups, malformed
/// step input and collaborator plumbing.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Step not found at index {0}")]
    StepNotFound(usize),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Context error: {0}")]
    ContextError(String),

    #[error("Invalid input for step '{step}': {reason}")]
    InvalidInput { step: String, reason: String },

    #[error("Operation '{0}' was cancelled")]
    OperationCancelled(String),

    #[error("Operation '{operation}' failed: {reason}")]
    OperationFailed { operation: String, reason: String },

    #[error("Invalid wizard: {0}")]
    InvalidWizard(String),
}

impl FlowError {
    pub fn invalid_input(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            step: step.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
