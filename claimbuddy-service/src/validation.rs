use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{ClaimError, ClaimResult};
use crate::models::{Gender, IndianState, InsuranceType, UploadedFile, UserProfile};

pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// 5 MiB
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const MAX_AGE: u8 = 120;

static AADHAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{12}$").unwrap());
static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Checks type before size, like the upload widget does.
pub fn validate_upload(file: &UploadedFile) -> ClaimResult<()> {
    if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return Err(ClaimError::InvalidFileType(file.mime_type.clone()));
    }
    if file.size_bytes > MAX_UPLOAD_BYTES {
        return Err(ClaimError::FileTooLarge {
            size: file.size_bytes,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Raw personal-info form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileForm {
    pub full_name: String,
    pub age: String,
    pub gender: String,
    pub aadhar_number: String,
    pub mobile_number: String,
    pub email: String,
    pub state: String,
    pub insurance_type: String,
    pub policy_number: String,
}

impl ProfileForm {
    /// Validate every field, reporting all offending field names at once.
    pub fn validate(&self) -> ClaimResult<UserProfile> {
        let mut invalid = Vec::new();

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            invalid.push("fullName");
        }

        let age = self.age.trim().parse::<u8>().ok().filter(|age| *age <= MAX_AGE);
        if age.is_none() {
            invalid.push("age");
        }

        let gender = parse_choice::<Gender>(&self.gender);
        if gender.is_none() {
            invalid.push("gender");
        }

        let aadhar_number = self.aadhar_number.trim();
        if !AADHAR_RE.is_match(aadhar_number) {
            invalid.push("aadharNumber");
        }

        let mobile_number = self.mobile_number.trim();
        if !MOBILE_RE.is_match(mobile_number) {
            invalid.push("mobileNumber");
        }

        let email = self.email.trim();
        if !EMAIL_RE.is_match(email) {
            invalid.push("email");
        }

        let state = parse_choice::<IndianState>(&self.state);
        if state.is_none() {
            invalid.push("state");
        }

        let insurance_type = parse_choice::<InsuranceType>(&self.insurance_type);
        if insurance_type.is_none() {
            invalid.push("insuranceType");
        }

        match (age, gender, state, insurance_type) {
            (Some(age), Some(gender), Some(state), Some(insurance_type)) if invalid.is_empty() => {
                let policy_number = self.policy_number.trim();
                // only asked for private insurance
                let policy_number = (insurance_type == InsuranceType::PrivateInsurance
                    && !policy_number.is_empty())
                .then(|| policy_number.to_string());

                Ok(UserProfile {
                    full_name: full_name.to_string(),
                    age,
                    gender,
                    aadhar_number: aadhar_number.to_string(),
                    mobile_number: mobile_number.to_string(),
                    email: email.to_string(),
                    state,
                    insurance_type,
                    policy_number,
                })
            }
            _ => Err(ClaimError::InvalidProfile(
                invalid.into_iter().map(String::from).collect(),
            )),
        }
    }
}

/// Select/radio values are the serde names of the enum variants.
fn parse_choice<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string())).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn file(name: &str, mime: &str, size_bytes: u64) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            mime_type: mime.to_string(),
            size_bytes,
        }
    }

    fn valid_form() -> ProfileForm {
        ProfileForm {
            full_name: "Priya Sharma".to_string(),
            age: "34".to_string(),
            gender: "female".to_string(),
            aadhar_number: "123456789012".to_string(),
            mobile_number: "9876543210".to_string(),
            email: "priya@example.in".to_string(),
            state: "maharashtra".to_string(),
            insurance_type: "ayushman-bharat".to_string(),
            policy_number: String::new(),
        }
    }

    #[test]
    fn oversized_pdf_is_rejected() {
        let err = validate_upload(&file("bill.pdf", "application/pdf", 6 * MB)).unwrap_err();
        assert_eq!(
            err,
            ClaimError::FileTooLarge {
                size: 6 * MB,
                limit: MAX_UPLOAD_BYTES
            }
        );
    }

    #[test]
    fn docx_is_rejected_by_type() {
        let docx = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
        let err = validate_upload(&file("bill.docx", docx, MB)).unwrap_err();
        assert!(matches!(err, ClaimError::InvalidFileType(_)));
    }

    #[test]
    fn small_png_and_limit_sized_jpeg_are_accepted() {
        assert!(validate_upload(&file("bill.png", "image/png", 2 * MB)).is_ok());
        assert!(validate_upload(&file("bill.jpg", "image/jpeg", MAX_UPLOAD_BYTES)).is_ok());
        assert!(validate_upload(&file("bill.jpg", "image/jpeg", MAX_UPLOAD_BYTES + 1)).is_err());
    }

    #[test]
    fn valid_form_becomes_profile() {
        let profile = valid_form().validate().unwrap();
        assert_eq!(profile.age, 34);
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.state, IndianState::Maharashtra);
        assert_eq!(profile.insurance_type, InsuranceType::AyushmanBharat);
        assert_eq!(profile.policy_number, None);
    }

    #[test]
    fn policy_number_kept_only_for_private_insurance() {
        let mut form = valid_form();
        form.policy_number = "POL-1".to_string();
        assert_eq!(form.validate().unwrap().policy_number, None);

        form.insurance_type = "private-insurance".to_string();
        assert_eq!(form.validate().unwrap().policy_number.as_deref(), Some("POL-1"));
    }

    #[test]
    fn every_bad_field_is_reported() {
        let form = ProfileForm {
            age: "121".to_string(),
            aadhar_number: "12345".to_string(),
            mobile_number: "98765abcde".to_string(),
            email: "not-an-email".to_string(),
            state: "atlantis".to_string(),
            ..valid_form()
        };
        let ClaimError::InvalidProfile(fields) = form.validate().unwrap_err() else {
            panic!("expected InvalidProfile");
        };
        assert_eq!(
            fields,
            vec!["age", "aadharNumber", "mobileNumber", "email", "state"]
        );

        let ClaimError::InvalidProfile(fields) = ProfileForm::default().validate().unwrap_err()
        else {
            panic!("expected InvalidProfile");
        };
        assert_eq!(fields.len(), 8);
    }
}
