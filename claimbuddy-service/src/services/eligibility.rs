use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;
use wizard_flow::simulate;

use crate::error::{ClaimError, ClaimResult};
use crate::models::{BillRecord, UserProfile};

/// Outcome for one insurance scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SchemeOutcome {
    Eligible {
        coverage: String,
        documents: Vec<String>,
    },
    NotEligible {
        reason: String,
    },
    NeedsVerification {
        reason: String,
    },
}

impl SchemeOutcome {
    pub fn tag(&self) -> &'static str {
        match self {
            SchemeOutcome::Eligible { .. } => "Eligible",
            SchemeOutcome::NotEligible { .. } => "Not Eligible",
            SchemeOutcome::NeedsVerification { .. } => "Verification Needed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeResult {
    pub scheme: String,
    #[serde(flatten)]
    pub outcome: SchemeOutcome,
}

/// Rules engine deciding which schemes a claimant qualifies for.
#[async_trait]
pub trait EligibilityEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        profile: Option<&UserProfile>,
        bill: &BillRecord,
    ) -> ClaimResult<Vec<SchemeResult>>;
}

/// Fixed answer for every claimant.
pub struct CannedEvaluator {
    delay: Duration,
}

impl CannedEvaluator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn sample_results() -> Vec<SchemeResult> {
        vec![
            SchemeResult {
                scheme: "Ayushman Bharat (PMJAY)".to_string(),
                outcome: SchemeOutcome::Eligible {
                    coverage: "Up to ₹5,00,000 per family per year".to_string(),
                    documents: vec![
                        "Aadhar Card".to_string(),
                        "Hospital Discharge Summary".to_string(),
                        "Original Bills".to_string(),
                        "PMJAY Card".to_string(),
                    ],
                },
            },
            SchemeResult {
                scheme: "ESI (Employee State Insurance)".to_string(),
                outcome: SchemeOutcome::NotEligible {
                    reason: "Not registered under ESI scheme".to_string(),
                },
            },
            SchemeResult {
                scheme: "State Health Scheme".to_string(),
                outcome: SchemeOutcome::NeedsVerification {
                    reason: "Additional verification required. Please visit your nearest health center."
                        .to_string(),
                },
            },
        ]
    }
}

#[async_trait]
impl EligibilityEvaluator for CannedEvaluator {
    async fn evaluate(
        &self,
        profile: Option<&UserProfile>,
        bill: &BillRecord,
    ) -> ClaimResult<Vec<SchemeResult>> {
        info!(
            insurance_type = ?profile.map(|p| p.insurance_type),
            hospital = %bill.hospital_name,
            "evaluating scheme eligibility"
        );
        simulate("eligibility_check", self.delay, Self::sample_results())
            .resolve()
            .await
            .map_err(|e| ClaimError::EligibilityFailed(e.to_string()))
    }
}
