// Claim wizard steps, in flow order
pub mod welcome;
pub mod upload;
pub mod personal_info;
pub mod bill_review;
pub mod eligibility;
pub mod documents;

pub use bill_review::{BillReviewStep, ReviewMode, ReviewState};
pub use documents::{DocumentsStep, DocumentsState, FormState};
pub use eligibility::{EligibilityState, EligibilityStep, ProgressRamp};
pub use personal_info::PersonalInfoStep;
pub use upload::{UploadState, UploadStep};
pub use welcome::WelcomeStep;

use serde::de::DeserializeOwned;
use serde_json::Value;
use wizard_flow::{FlowError, Result};

/// Decode a step action, reporting bad input against the step id.
pub(crate) fn parse_action<T: DeserializeOwned>(step: &str, input: Value) -> Result<T> {
    serde_json::from_value(input).map_err(|e| FlowError::invalid_input(step, e.to_string()))
}
