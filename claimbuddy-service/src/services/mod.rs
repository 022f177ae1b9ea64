// External collaborators: extraction, eligibility rules, claim forms.
// The canned implementations stand in for real services.
pub mod eligibility;
pub mod extraction;
pub mod forms;

pub use eligibility::{CannedEvaluator, EligibilityEvaluator, SchemeOutcome, SchemeResult};
pub use extraction::{BillExtractor, CannedExtractor};
pub use forms::{CannedFormService, ClaimFormRequest, FormService, GeneratedForm};

use std::sync::Arc;

/// Everything the claim steps call out to.
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn BillExtractor>,
    pub evaluator: Arc<dyn EligibilityEvaluator>,
    pub forms: Arc<dyn FormService>,
}

impl Collaborators {
    pub fn canned(simulation: crate::config::SimulationConfig) -> Self {
        Self {
            extractor: Arc::new(CannedExtractor::new(simulation.extraction_delay)),
            evaluator: Arc::new(CannedEvaluator::new(simulation.eligibility_settle)),
            forms: Arc::new(CannedFormService::new(
                simulation.form_generation_delay,
                simulation.download_delay,
            )),
        }
    }
}
