pub mod context;
pub mod error;
pub mod notify;
pub mod operation;
pub mod runner;
pub mod sequencer;
pub mod step;
pub mod storage;
pub mod wizard;

// Re-export commonly used types
pub use context::{Context, ScopedEntry};
pub use error::{FlowError, Result};
pub use notify::{Notification, Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use operation::{PendingOperation, simulate};
pub use runner::FlowRunner;
pub use sequencer::{Sequencer, Transition};
pub use step::{NextAction, Step, StepContext, StepDescriptor, StepResult};
pub use storage::{InMemorySessionStorage, Session, SessionStorage};
pub use wizard::{BacktrackPolicy, Event, ExecutionResult, ExecutionStatus, Wizard, WizardBuilder};
