use async_trait::async_trait;
use std::time::Duration;
use tracing::info;
use wizard_flow::simulate;

use crate::error::{ClaimError, ClaimResult};
use crate::models::{BillRecord, UploadedFile};
use crate::validation::validate_upload;

/// Turns an uploaded bill into structured bill details.
#[async_trait]
pub trait BillExtractor: Send + Sync {
    async fn extract(&self, file: &UploadedFile) -> ClaimResult<BillRecord>;
}

/// Always returns the same sample bill after a fixed delay.
pub struct CannedExtractor {
    delay: Duration,
}

impl CannedExtractor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn sample_record() -> BillRecord {
        BillRecord {
            patient_name: "Sharma, Priya".to_string(),
            hospital_name: "Apollo Hospitals".to_string(),
            admission_date: "2023-11-10".to_string(),
            discharge_date: "2023-11-15".to_string(),
            total_amount: "₹45,750".to_string(),
            diagnosis: "Acute Appendicitis".to_string(),
            procedure_type: "Surgery - Appendectomy".to_string(),
            payment_method: "Insurance".to_string(),
        }
    }
}

#[async_trait]
impl BillExtractor for CannedExtractor {
    async fn extract(&self, file: &UploadedFile) -> ClaimResult<BillRecord> {
        // a real OCR backend would refuse these too
        validate_upload(file)?;
        info!(file = %file.name, size = file.size_bytes, "extracting bill details");

        simulate("bill_extraction", self.delay, Self::sample_record())
            .resolve()
            .await
            .map_err(|e| ClaimError::ExtractionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn canned_extractor_returns_sample_bill() {
        let extractor = CannedExtractor::new(Duration::ZERO);
        let file = UploadedFile {
            name: "bill.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes: 1024 * 1024,
        };

        let record = extractor.extract(&file).await.unwrap();
        assert_eq!(record, CannedExtractor::sample_record());
        assert_eq!(record.patient_name, "Sharma, Priya");
    }

    #[tokio::test]
    async fn canned_extractor_reports_unsupported_format() {
        let extractor = CannedExtractor::new(Duration::ZERO);
        let file = UploadedFile {
            name: "bill.gif".to_string(),
            mime_type: "image/gif".to_string(),
            size_bytes: 10,
        };

        let err = extractor.extract(&file).await.unwrap_err();
        assert_eq!(err, ClaimError::InvalidFileType("image/gif".to_string()));
    }
}
