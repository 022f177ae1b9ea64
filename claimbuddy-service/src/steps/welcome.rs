use async_trait::async_trait;
use serde_json::Value;
use wizard_flow::{FlowError, Result, Step, StepContext, StepResult};

use crate::models::step_ids;

/// Landing page. Leaving it goes through the `get_started` event.
pub struct WelcomeStep;

#[async_trait]
impl Step for WelcomeStep {
    fn id(&self) -> &str {
        step_ids::WELCOME
    }

    fn label(&self) -> &str {
        "Welcome"
    }

    async fn handle(&self, _input: Value, _cx: &mut StepContext<'_>) -> Result<StepResult> {
        Err(FlowError::invalid_input(
            self.id(),
            "no actions here, send get_started to begin",
        ))
    }
}
