use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use wizard_flow::{Context, NextAction, Result, Step, StepContext, StepResult};

use super::parse_action;
use crate::models::{UserProfile, step_ids};
use crate::validation::ProfileForm;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum PersonalInfoAction {
    Submit { profile: ProfileForm },
}

/// Personal and insurance details. Local state is the validated profile.
pub struct PersonalInfoStep;

impl PersonalInfoStep {
    pub fn profile(context: &Context) -> Option<UserProfile> {
        context.get_sync(step_ids::PERSONAL_INFO)
    }
}

#[async_trait]
impl Step for PersonalInfoStep {
    fn id(&self) -> &str {
        step_ids::PERSONAL_INFO
    }

    fn label(&self) -> &str {
        "Personal Info"
    }

    fn is_ready(&self, context: &Context) -> bool {
        Self::profile(context).is_some()
    }

    async fn handle(&self, input: Value, cx: &mut StepContext<'_>) -> Result<StepResult> {
        let PersonalInfoAction::Submit { profile } = parse_action(self.id(), input)?;

        match profile.validate() {
            Ok(profile) => {
                info!(
                    session_id = %cx.session_id,
                    insurance_type = ?profile.insurance_type,
                    "personal details accepted"
                );
                cx.context.set(self.id(), &profile).await;
                Ok(StepResult::new_with_status(
                    None,
                    NextAction::Advance,
                    Some(format!("Details saved for {}", profile.full_name)),
                ))
            }
            Err(e) => {
                warn!(session_id = %cx.session_id, error = %e, "personal details rejected");
                cx.notify(e.to_notification());
                Ok(StepResult::stay(e.to_string()))
            }
        }
    }
}
