use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use wizard_flow::{Context, NextAction, Result, Step, StepContext, StepResult};

use super::parse_action;
use crate::error::ClaimError;
use crate::models::{BillField, BillRecord, step_ids};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReviewMode {
    Viewing,
    Editing { field: BillField, draft: String },
}

/// Bill details under review, plus the payload they were loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    pub record: BillRecord,
    pub mode: ReviewMode,
    source: Option<Value>,
}

impl ReviewState {
    fn load(payload: Option<&Value>) -> (Self, Option<ClaimError>) {
        let (record, failure) = match payload {
            None => (BillRecord::default(), None),
            Some(value) => match serde_json::from_value::<BillRecord>(value.clone()) {
                Ok(record) => (record, None),
                Err(e) => (
                    BillRecord::default(),
                    Some(ClaimError::PayloadParseFailure(e.to_string())),
                ),
            },
        };
        let state = Self {
            record,
            mode: ReviewMode::Viewing,
            source: payload.cloned(),
        };
        (state, failure)
    }
}

const NOT_EDITING: &str = "Nothing is being edited";

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ReviewAction {
    Edit { field: BillField },
    UpdateDraft { value: String },
    Save,
    Cancel,
}

/// Lets the user check and correct the extracted bill details.
///
/// The shared payload is never rewritten; later steps read the reviewed record
/// through [`BillReviewStep::reviewed_bill`].
pub struct BillReviewStep;

impl BillReviewStep {
    pub fn state(context: &Context) -> Option<ReviewState> {
        context.get_sync(step_ids::BILL_REVIEW)
    }

    /// The reviewed record, or the raw payload when review never happened.
    pub fn reviewed_bill(context: &Context, payload: Option<&Value>) -> BillRecord {
        match Self::state(context) {
            Some(state) => state.record,
            None => ReviewState::load(payload).0.record,
        }
    }
}

#[async_trait]
impl Step for BillReviewStep {
    fn id(&self) -> &str {
        step_ids::BILL_REVIEW
    }

    fn label(&self) -> &str {
        "Bill Details"
    }

    fn is_ready(&self, context: &Context) -> bool {
        Self::state(context).is_some_and(|state| state.mode == ReviewMode::Viewing)
    }

    async fn on_enter(&self, cx: &mut StepContext<'_>) -> Result<()> {
        let current = Self::state(cx.context);
        if current.as_ref().is_some_and(|state| state.source.as_ref() == cx.payload()) {
            debug!(session_id = %cx.session_id, "keeping reviewed bill");
            return Ok(());
        }

        let (state, failure) = ReviewState::load(cx.payload());
        if let Some(e) = failure {
            warn!(session_id = %cx.session_id, error = %e, "falling back to empty bill details");
        }
        cx.context.set(self.id(), state).await;
        Ok(())
    }

    async fn handle(&self, input: Value, cx: &mut StepContext<'_>) -> Result<StepResult> {
        let action = parse_action::<ReviewAction>(self.id(), input)?;
        let mut state = match Self::state(cx.context) {
            Some(state) => state,
            None => ReviewState::load(cx.payload()).0,
        };

        let response = match action {
            ReviewAction::Edit { field } => {
                // switching fields drops the previous draft
                state.mode = ReviewMode::Editing {
                    field,
                    draft: state.record.get(field).to_string(),
                };
                format!("Editing {}", field.label())
            }
            ReviewAction::UpdateDraft { value } => match &mut state.mode {
                ReviewMode::Editing { draft, .. } => {
                    *draft = value;
                    "Draft updated".to_string()
                }
                ReviewMode::Viewing => NOT_EDITING.to_string(),
            },
            ReviewAction::Save => match std::mem::replace(&mut state.mode, ReviewMode::Viewing) {
                ReviewMode::Editing { field, draft } => {
                    info!(session_id = %cx.session_id, field = field.label(), "bill field corrected");
                    state.record.set(field, draft);
                    format!("{} saved", field.label())
                }
                ReviewMode::Viewing => NOT_EDITING.to_string(),
            },
            ReviewAction::Cancel => match std::mem::replace(&mut state.mode, ReviewMode::Viewing) {
                ReviewMode::Editing { .. } => "Edit cancelled".to_string(),
                ReviewMode::Viewing => NOT_EDITING.to_string(),
            },
        };

        cx.context.set(self.id(), &state).await;
        Ok(StepResult::new(Some(response), NextAction::Stay))
    }
}
