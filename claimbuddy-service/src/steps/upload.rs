use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use wizard_flow::{
    Context, FlowError, Notification, PendingOperation, Result, Step, StepContext, StepResult,
};

use super::parse_action;
use crate::error::ClaimError;
use crate::models::{UploadedFile, step_ids};
use crate::services::BillExtractor;
use crate::validation::validate_upload;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadState {
    Idle { drag_active: bool },
    Processing { file: UploadedFile },
    Extracted { file: UploadedFile },
    Failed { reason: String },
}

impl Default for UploadState {
    fn default() -> Self {
        UploadState::Idle { drag_active: false }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum UploadAction {
    DragEnter,
    DragLeave,
    Upload { file: UploadedFile },
}

/// Accepts a bill, validates it and hands it to the extractor.
pub struct UploadStep {
    extractor: Arc<dyn BillExtractor>,
}

impl UploadStep {
    pub fn new(extractor: Arc<dyn BillExtractor>) -> Self {
        Self { extractor }
    }

    fn state(&self, context: &Context) -> UploadState {
        context.get_sync(self.id()).unwrap_or_default()
    }

    async fn upload(&self, file: UploadedFile, cx: &mut StepContext<'_>) -> Result<StepResult> {
        if matches!(self.state(cx.context), UploadState::Processing { .. }) {
            return Ok(StepResult::stay("A bill is already being processed"));
        }

        if let Err(e) = validate_upload(&file) {
            warn!(session_id = %cx.session_id, file = %file.name, error = %e, "upload rejected");
            cx.notify(e.to_notification());
            // an earlier successful upload stays usable
            if !matches!(self.state(cx.context), UploadState::Extracted { .. }) {
                cx.context.set(self.id(), UploadState::default()).await;
            }
            return Ok(StepResult::stay(e.to_string()));
        }

        info!(session_id = %cx.session_id, file = %file.name, "processing bill");
        let in_flight = cx
            .context
            .set_scoped(self.id(), UploadState::Processing { file: file.clone() });

        let extractor = self.extractor.clone();
        let job_file = file.clone();
        let outcome = PendingOperation::start("bill_extraction", async move {
            extractor.extract(&job_file).await
        })
        .resolve()
        .await
        .unwrap_or_else(|e| Err(ClaimError::ExtractionFailed(e.to_string())));

        match outcome {
            Ok(record) => {
                let payload = serde_json::to_value(&record)
                    .map_err(|e| FlowError::ContextError(e.to_string()))?;
                cx.set_payload(payload);
                cx.context
                    .set(self.id(), UploadState::Extracted { file })
                    .await;
                in_flight.disarm();
                cx.notify(Notification::new(
                    "Upload successful",
                    "Your hospital bill has been processed successfully.",
                ));
                Ok(StepResult::new_with_status(
                    Some("Bill processed, continue to the next step".to_string()),
                    wizard_flow::NextAction::Stay,
                    Some(format!("Bill '{}' extracted", record.hospital_name)),
                ))
            }
            Err(e) => {
                error!(session_id = %cx.session_id, error = %e, "bill extraction failed");
                cx.notify(e.to_notification());
                cx.context
                    .set(
                        self.id(),
                        UploadState::Failed {
                            reason: e.to_string(),
                        },
                    )
                    .await;
                in_flight.disarm();
                Ok(StepResult::stay(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl Step for UploadStep {
    fn id(&self) -> &str {
        step_ids::UPLOAD
    }

    fn label(&self) -> &str {
        "Upload Bill"
    }

    fn is_ready(&self, context: &Context) -> bool {
        matches!(self.state(context), UploadState::Extracted { .. })
    }

    async fn handle(&self, input: Value, cx: &mut StepContext<'_>) -> Result<StepResult> {
        match parse_action::<UploadAction>(self.id(), input)? {
            UploadAction::Upload { file } => self.upload(file, cx).await,
            action @ (UploadAction::DragEnter | UploadAction::DragLeave) => {
                let drag_active = matches!(action, UploadAction::DragEnter);
                if let UploadState::Idle { .. } = self.state(cx.context) {
                    cx.context
                        .set(self.id(), UploadState::Idle { drag_active })
                        .await;
                }
                Ok(StepResult::new(None, wizard_flow::NextAction::Stay))
            }
        }
    }
}
