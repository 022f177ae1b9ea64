use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use wizard_flow::{
    Context, FlowError, NextAction, Notification, PendingOperation, Result, Step, StepContext,
    StepResult,
};

use super::{BillReviewStep, PersonalInfoStep, parse_action};
use crate::catalog::{ChecklistState, find_document};
use crate::error::ClaimError;
use crate::models::step_ids;
use crate::services::{ClaimFormRequest, FormService, GeneratedForm};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormState {
    #[default]
    NotGenerated,
    Generating,
    Generated {
        form: GeneratedForm,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsState {
    pub checklist: ChecklistState,
    pub form: FormState,
}

impl DocumentsState {
    pub fn generate_enabled(&self) -> bool {
        self.checklist.all_required_checked()
            && matches!(self.form, FormState::NotGenerated | FormState::Failed { .. })
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum DocumentsAction {
    Check { document: String, checked: bool },
    Generate,
    Download,
    Submit,
}

/// Document checklist, claim form generation and final submission.
pub struct DocumentsStep {
    forms: Arc<dyn FormService>,
}

impl DocumentsStep {
    pub fn new(forms: Arc<dyn FormService>) -> Self {
        Self { forms }
    }

    pub fn state(context: &Context) -> DocumentsState {
        context.get_sync(step_ids::DOCUMENTS).unwrap_or_default()
    }

    async fn save(&self, cx: &StepContext<'_>, state: &DocumentsState) {
        cx.context.set(self.id(), state).await;
    }

    async fn check(
        &self,
        document: String,
        checked: bool,
        cx: &mut StepContext<'_>,
    ) -> Result<StepResult> {
        let mut state = Self::state(cx.context);
        if !state.checklist.set(&document, checked) {
            return Err(FlowError::invalid_input(
                self.id(),
                format!("unknown document '{}'", document),
            ));
        }
        self.save(cx, &state).await;

        let missing = state.checklist.missing_required();
        let response = if missing.is_empty() {
            "All required documents ready, the claim form can be generated".to_string()
        } else {
            format!("Still missing: {}", missing.join(", "))
        };
        Ok(StepResult::stay(response))
    }

    async fn generate(&self, cx: &mut StepContext<'_>) -> Result<StepResult> {
        let mut state = Self::state(cx.context);
        match &state.form {
            FormState::Generating => return Ok(StepResult::stay("The claim form is being generated")),
            FormState::Generated { form } => {
                return Ok(StepResult::stay(format!("Form {} is already generated", form.reference)));
            }
            FormState::NotGenerated | FormState::Failed { .. } => {}
        }
        if !state.checklist.all_required_checked() {
            return Ok(StepResult::stay(format!(
                "Check all required documents first: {}",
                state.checklist.missing_required().join(", ")
            )));
        }

        let in_flight = cx.context.set_scoped(
            self.id(),
            DocumentsState {
                form: FormState::Generating,
                ..state.clone()
            },
        );

        let request = ClaimFormRequest {
            profile: PersonalInfoStep::profile(cx.context),
            bill: BillReviewStep::reviewed_bill(cx.context, cx.payload()),
            documents: state
                .checklist
                .checked_ids()
                .into_iter()
                .filter_map(find_document)
                .map(|doc| doc.name.to_string())
                .collect(),
        };
        let forms = self.forms.clone();
        let outcome = PendingOperation::start("form_generation", async move {
            forms.generate(&request).await
        })
        .resolve()
        .await
        .unwrap_or_else(|e| Err(ClaimError::FormGenerationFailed(e.to_string())));

        let response = match outcome {
            Ok(form) => {
                info!(session_id = %cx.session_id, reference = %form.reference, "claim form generated");
                cx.notify(Notification::new(
                    "Form Generated Successfully",
                    "Your claim form has been generated. You can download it now.",
                ));
                let response = format!("Claim form {} generated", form.reference);
                state.form = FormState::Generated { form };
                response
            }
            Err(e) => {
                error!(session_id = %cx.session_id, error = %e, "claim form generation failed");
                cx.notify(e.to_notification());
                state.form = FormState::Failed {
                    reason: e.to_string(),
                };
                e.to_string()
            }
        };
        self.save(cx, &state).await;
        in_flight.disarm();
        Ok(StepResult::stay(response))
    }

    async fn download(&self, cx: &mut StepContext<'_>) -> Result<StepResult> {
        let FormState::Generated { form } = Self::state(cx.context).form else {
            return Ok(StepResult::stay("Generate the claim form first"));
        };

        cx.notify(Notification::new(
            "Download Started",
            "Your claim form is being downloaded.",
        ));
        let forms = self.forms.clone();
        let job_form = form.clone();
        let outcome = PendingOperation::start("form_download", async move {
            forms.download(&job_form).await
        })
        .resolve()
        .await
        .unwrap_or_else(|e| Err(ClaimError::DownloadFailed(e.to_string())));

        match outcome {
            Ok(()) => {
                cx.notify(Notification::new(
                    "Download Complete",
                    "Form downloaded successfully!",
                ));
                Ok(StepResult::stay(format!("Downloaded {}", form.file_name)))
            }
            Err(e) => {
                error!(session_id = %cx.session_id, error = %e, "claim form download failed");
                cx.notify(e.to_notification());
                Ok(StepResult::stay(e.to_string()))
            }
        }
    }

    fn submit(&self, cx: &mut StepContext<'_>) -> Result<StepResult> {
        let FormState::Generated { form } = Self::state(cx.context).form else {
            return Ok(StepResult::stay("Generate the claim form first"));
        };

        info!(session_id = %cx.session_id, reference = %form.reference, "claim submitted");
        cx.notify(Notification::new(
            "Claim Submitted",
            "Your claim has been submitted for processing.",
        ));
        Ok(StepResult::new_with_status(
            Some(format!("Claim {} submitted", form.reference)),
            NextAction::Complete,
            Some(format!("Claim {} submitted", form.reference)),
        ))
    }
}

#[async_trait]
impl Step for DocumentsStep {
    fn id(&self) -> &str {
        step_ids::DOCUMENTS
    }

    fn label(&self) -> &str {
        "Documents & Submission"
    }

    fn is_ready(&self, context: &Context) -> bool {
        Self::state(context).checklist.all_required_checked()
    }

    async fn handle(&self, input: Value, cx: &mut StepContext<'_>) -> Result<StepResult> {
        match parse_action::<DocumentsAction>(self.id(), input)? {
            DocumentsAction::Check { document, checked } => self.check(document, checked, cx).await,
            DocumentsAction::Generate => self.generate(cx).await,
            DocumentsAction::Download => self.download(cx).await,
            DocumentsAction::Submit => self.submit(cx),
        }
    }
}
