//! Claim domain errors.
//!
//! None of these end a session. Steps turn them into notifications and stay put.

use thiserror::Error;
use wizard_flow::Notification;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("Unsupported file type: {0}")]
    InvalidFileType(String),

    #[error("File is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    /// Log-only: the review step falls back to an empty record and does not
    /// notify the user.
    #[error("Bill data could not be read: {0}")]
    PayloadParseFailure(String),

    #[error("Invalid personal details: {}", .0.join(", "))]
    InvalidProfile(Vec<String>),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Eligibility check failed: {0}")]
    EligibilityFailed(String),

    #[error("Form generation failed: {0}")]
    FormGenerationFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),
}

impl ClaimError {
    /// Destructive notification describing this error
    pub fn to_notification(&self) -> Notification {
        match self {
            ClaimError::InvalidFileType(_) => Notification::destructive(
                "Invalid file format",
                "Please upload a PDF or image file (JPEG, PNG)",
            ),
            ClaimError::FileTooLarge { .. } => Notification::destructive(
                "File too large",
                "Please upload a file smaller than 5MB",
            ),
            // not raised to the user today, see the variant docs
            ClaimError::PayloadParseFailure(_) => {
                Notification::destructive("Bill details unavailable", self.to_string())
            }
            ClaimError::InvalidProfile(fields) => Notification::destructive(
                "Please check your details",
                format!("Invalid or missing: {}", fields.join(", ")),
            ),
            ClaimError::ExtractionFailed(_) => {
                Notification::destructive("Upload failed", self.to_string())
            }
            ClaimError::EligibilityFailed(_) => {
                Notification::destructive("Eligibility check failed", self.to_string())
            }
            ClaimError::FormGenerationFailed(_) => {
                Notification::destructive("Form generation failed", self.to_string())
            }
            ClaimError::DownloadFailed(_) => {
                Notification::destructive("Download failed", self.to_string())
            }
        }
    }
}

pub type ClaimResult<T> = std::result::Result<T, ClaimError>;
