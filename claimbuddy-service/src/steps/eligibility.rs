use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use wizard_flow::{Context, NextAction, PendingOperation, Result, Step, StepContext, StepResult};

use super::{BillReviewStep, PersonalInfoStep, parse_action};
use crate::error::ClaimError;
use crate::models::step_ids;
use crate::services::{EligibilityEvaluator, SchemeResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EligibilityState {
    #[default]
    NotStarted,
    Checking {
        progress: u8,
    },
    Completed {
        results: Vec<SchemeResult>,
    },
    Failed {
        reason: String,
    },
}

/// Cosmetic progress values: random steps of 5 to 14, ending exactly at 100.
#[derive(Debug, Clone, Default)]
pub struct ProgressRamp {
    progress: u8,
}

impl ProgressRamp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for ProgressRamp {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.progress >= 100 {
            return None;
        }
        let increment: u8 = rand::rng().random_range(5..=14);
        self.progress = (self.progress + increment).min(100);
        Some(self.progress)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum EligibilityAction {
    Retry,
}

/// Runs the scheme eligibility check as soon as the flow lands here.
pub struct EligibilityStep {
    evaluator: Arc<dyn EligibilityEvaluator>,
    tick: Duration,
}

impl EligibilityStep {
    pub fn new(evaluator: Arc<dyn EligibilityEvaluator>, tick: Duration) -> Self {
        Self { evaluator, tick }
    }

    pub fn state(context: &Context) -> EligibilityState {
        context.get_sync(step_ids::ELIGIBILITY).unwrap_or_default()
    }

    async fn run_check(&self, cx: &mut StepContext<'_>) -> EligibilityState {
        info!(session_id = %cx.session_id, "checking eligibility");
        for progress in ProgressRamp::new() {
            if !self.tick.is_zero() {
                tokio::time::sleep(self.tick).await;
            }
            cx.context
                .set(self.id(), EligibilityState::Checking { progress })
                .await;
        }

        let profile = PersonalInfoStep::profile(cx.context);
        let bill = BillReviewStep::reviewed_bill(cx.context, cx.payload());
        let evaluator = self.evaluator.clone();
        let outcome = PendingOperation::start("eligibility_check", async move {
            evaluator.evaluate(profile.as_ref(), &bill).await
        })
        .resolve()
        .await
        .unwrap_or_else(|e| Err(ClaimError::EligibilityFailed(e.to_string())));

        let state = match outcome {
            Ok(results) => {
                info!(session_id = %cx.session_id, schemes = results.len(), "eligibility checked");
                EligibilityState::Completed { results }
            }
            Err(e) => {
                error!(session_id = %cx.session_id, error = %e, "eligibility check failed");
                cx.notify(e.to_notification());
                EligibilityState::Failed {
                    reason: e.to_string(),
                }
            }
        };
        cx.context.set(self.id(), &state).await;
        state
    }
}

#[async_trait]
impl Step for EligibilityStep {
    fn id(&self) -> &str {
        step_ids::ELIGIBILITY
    }

    fn label(&self) -> &str {
        "Check Eligibility"
    }

    fn is_ready(&self, context: &Context) -> bool {
        matches!(Self::state(context), EligibilityState::Completed { .. })
    }

    async fn on_enter(&self, cx: &mut StepContext<'_>) -> Result<()> {
        match Self::state(cx.context) {
            EligibilityState::NotStarted | EligibilityState::Checking { .. } => {
                self.run_check(cx).await;
            }
            EligibilityState::Completed { .. } | EligibilityState::Failed { .. } => {}
        }
        Ok(())
    }

    async fn handle(&self, input: Value, cx: &mut StepContext<'_>) -> Result<StepResult> {
        let EligibilityAction::Retry = parse_action(self.id(), input)?;

        if let EligibilityState::Completed { .. } = Self::state(cx.context) {
            return Ok(StepResult::stay("Eligibility already checked"));
        }
        let response = match self.run_check(cx).await {
            EligibilityState::Completed { results } => {
                format!("Checked {} schemes", results.len())
            }
            _ => "Eligibility check failed, please retry".to_string(),
        };
        Ok(StepResult::new(Some(response), NextAction::Stay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillRecord, UserProfile};
    use crate::services::{CannedEvaluator, SchemeOutcome};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wizard_flow::RecordingNotifier;

    /// Fails on the first call, then answers like the canned evaluator.
    #[derive(Default)]
    struct FlakyEvaluator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EligibilityEvaluator for FlakyEvaluator {
        async fn evaluate(
            &self,
            _profile: Option<&UserProfile>,
            _bill: &BillRecord,
        ) -> crate::error::ClaimResult<Vec<SchemeResult>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ClaimError::EligibilityFailed("rules engine timeout".to_string()))
            } else {
                Ok(CannedEvaluator::sample_results())
            }
        }
    }

    #[test]
    fn ramp_is_monotonic_and_ends_at_100() {
        for _ in 0..50 {
            let values: Vec<u8> = ProgressRamp::new().collect();
            assert_eq!(values.last(), Some(&100));
            let mut previous = 0;
            for value in values {
                let step = value - previous;
                assert!(step >= 1 && step <= 14, "step {step}");
                assert!(value == 100 || step >= 5);
                previous = value;
            }
        }
    }

    #[tokio::test]
    async fn entering_runs_the_check_once() {
        let step = EligibilityStep::new(Arc::new(CannedEvaluator::new(Duration::ZERO)), Duration::ZERO);
        let context = Context::new();
        let mut payload = None;
        let notifier = RecordingNotifier::new();
        let mut cx = StepContext::new("s", &context, &mut payload, &notifier);

        step.on_enter(&mut cx).await.unwrap();

        let EligibilityState::Completed { results } = EligibilityStep::state(&context) else {
            panic!("check did not complete");
        };
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0].outcome, SchemeOutcome::Eligible { .. }));
        assert!(matches!(results[1].outcome, SchemeOutcome::NotEligible { .. }));
        assert!(matches!(results[2].outcome, SchemeOutcome::NeedsVerification { .. }));
        assert!(step.is_ready(&context));

        let result = step.handle(json!({"action": "retry"}), &mut cx).await.unwrap();
        assert_eq!(result.response.as_deref(), Some("Eligibility already checked"));
    }

    #[tokio::test]
    async fn failure_is_notified_and_retry_recovers() {
        let step = EligibilityStep::new(Arc::new(FlakyEvaluator::default()), Duration::ZERO);
        let context = Context::new();
        let mut payload = None;
        let notifier = RecordingNotifier::new();
        let mut cx = StepContext::new("s", &context, &mut payload, &notifier);

        step.on_enter(&mut cx).await.unwrap();
        assert!(matches!(
            EligibilityStep::state(&context),
            EligibilityState::Failed { .. }
        ));
        assert!(!step.is_ready(&context));
        assert_eq!(notifier.titles(), vec!["Eligibility check failed"]);

        // re-entering does not retry on its own
        step.on_enter(&mut cx).await.unwrap();
        assert!(!step.is_ready(&context));

        let result = step.handle(json!({"action": "retry"}), &mut cx).await.unwrap();
        assert_eq!(result.response.as_deref(), Some("Checked 3 schemes"));
        assert!(step.is_ready(&context));
    }
}
