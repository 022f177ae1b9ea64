use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;
use wizard_flow::simulate;

use crate::error::{ClaimError, ClaimResult};
use crate::models::{BillField, BillRecord, UserProfile};

/// Data pre-filled into the claim form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimFormRequest {
    pub profile: Option<UserProfile>,
    pub bill: BillRecord,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedForm {
    pub reference: String,
    pub file_name: String,
    pub generated_at: DateTime<Utc>,
    pub fields: BTreeMap<String, String>,
}

/// Produces the printable claim form and delivers it to the user.
#[async_trait]
pub trait FormService: Send + Sync {
    async fn generate(&self, request: &ClaimFormRequest) -> ClaimResult<GeneratedForm>;

    async fn download(&self, form: &GeneratedForm) -> ClaimResult<()>;
}

pub struct CannedFormService {
    generation_delay: Duration,
    download_delay: Duration,
}

impl CannedFormService {
    pub fn new(generation_delay: Duration, download_delay: Duration) -> Self {
        Self {
            generation_delay,
            download_delay,
        }
    }
}

fn prefill(request: &ClaimFormRequest) -> BTreeMap<String, String> {
    let mut fields: BTreeMap<String, String> = BillField::ALL
        .iter()
        .map(|field| (field.label().to_string(), request.bill.get(*field).to_string()))
        .collect();

    if let Some(profile) = &request.profile {
        fields.insert("Claimant".to_string(), profile.full_name.clone());
        fields.insert("Aadhar Number".to_string(), profile.aadhar_number.clone());
        fields.insert("Mobile Number".to_string(), profile.mobile_number.clone());
        fields.insert("Email".to_string(), profile.email.clone());
        fields.insert("Insurance".to_string(), profile.insurance_type.to_string());
        if let Some(policy) = &profile.policy_number {
            fields.insert("Policy Number".to_string(), policy.clone());
        }
    }
    fields.insert("Documents Enclosed".to_string(), request.documents.join(", "));
    fields
}

#[async_trait]
impl FormService for CannedFormService {
    async fn generate(&self, request: &ClaimFormRequest) -> ClaimResult<GeneratedForm> {
        let reference = format!("CLM-{:08X}", rand::random::<u32>());
        let form = GeneratedForm {
            file_name: format!("{}.pdf", reference.to_lowercase()),
            reference,
            generated_at: Utc::now(),
            fields: prefill(request),
        };
        info!(reference = %form.reference, fields = form.fields.len(), "generating claim form");

        simulate("form_generation", self.generation_delay, form)
            .resolve()
            .await
            .map_err(|e| ClaimError::FormGenerationFailed(e.to_string()))
    }

    async fn download(&self, form: &GeneratedForm) -> ClaimResult<()> {
        info!(file = %form.file_name, "downloading claim form");
        simulate("form_download", self.download_delay, ())
            .resolve()
            .await
            .map_err(|e| ClaimError::DownloadFailed(e.to_string()))
    }
}
