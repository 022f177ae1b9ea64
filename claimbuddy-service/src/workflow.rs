use std::sync::Arc;
use wizard_flow::{
    BacktrackPolicy, FlowRunner, InMemorySessionStorage, Notification, Result, SessionStorage,
    Wizard, WizardBuilder,
};

use crate::config::SimulationConfig;
use crate::services::Collaborators;
use crate::steps::{
    BillReviewStep, DocumentsStep, EligibilityStep, PersonalInfoStep, UploadStep, WelcomeStep,
};

pub const WIZARD_ID: &str = "claim_wizard";

pub fn completion_notice() -> Notification {
    Notification::new(
        "Claim Process Complete",
        "Your claim has been submitted successfully! You can track its status in your dashboard.",
    )
}

/// Shown on request from any step; never changes the session.
pub fn help_notification() -> Notification {
    Notification::new(
        "Help & Support",
        "Need assistance with your claim? Call our helpline at 1800-XXX-XXXX or email support@claimbuddy.in",
    )
}

/// Welcome, upload, personal info, bill review, eligibility, documents.
pub fn build_claim_wizard(
    collaborators: &Collaborators,
    simulation: SimulationConfig,
    backtrack: BacktrackPolicy,
) -> Result<Wizard> {
    WizardBuilder::new(WIZARD_ID)
        .add_step(Arc::new(WelcomeStep))
        .add_step(Arc::new(UploadStep::new(collaborators.extractor.clone())))
        .add_step(Arc::new(PersonalInfoStep))
        .add_step(Arc::new(BillReviewStep))
        .add_step(Arc::new(EligibilityStep::new(
            collaborators.evaluator.clone(),
            simulation.eligibility_tick,
        )))
        .add_step(Arc::new(DocumentsStep::new(collaborators.forms.clone())))
        .backtrack_policy(backtrack)
        .completion_notice(completion_notice())
        .build()
}

pub fn create_flow_runner(
    collaborators: &Collaborators,
    simulation: SimulationConfig,
    backtrack: BacktrackPolicy,
) -> Result<FlowRunner> {
    let wizard = Arc::new(build_claim_wizard(collaborators, simulation, backtrack)?);
    let storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
    Ok(FlowRunner::new(wizard, storage))
}
