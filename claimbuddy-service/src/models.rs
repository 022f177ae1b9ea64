use serde::{Deserialize, Serialize};
use std::fmt;

/// Ids of the claim steps. Each one is also the context key of that step's state.
pub mod step_ids {
    pub const WELCOME: &str = "welcome";
    pub const UPLOAD: &str = "upload";
    pub const PERSONAL_INFO: &str = "personal_info";
    pub const BILL_REVIEW: &str = "bill_review";
    pub const ELIGIBILITY: &str = "eligibility";
    pub const DOCUMENTS: &str = "documents";
}

/// Details extracted from a hospital bill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    pub patient_name: String,
    pub hospital_name: String,
    pub admission_date: String,
    pub discharge_date: String,
    pub total_amount: String,
    pub diagnosis: String,
    pub procedure_type: String,
    pub payment_method: String,
}

impl BillRecord {
    pub fn get(&self, field: BillField) -> &str {
        match field {
            BillField::PatientName => &self.patient_name,
            BillField::HospitalName => &self.hospital_name,
            BillField::AdmissionDate => &self.admission_date,
            BillField::DischargeDate => &self.discharge_date,
            BillField::TotalAmount => &self.total_amount,
            BillField::Diagnosis => &self.diagnosis,
            BillField::ProcedureType => &self.procedure_type,
            BillField::PaymentMethod => &self.payment_method,
        }
    }

    pub fn set(&mut self, field: BillField, value: String) {
        let slot = match field {
            BillField::PatientName => &mut self.patient_name,
            BillField::HospitalName => &mut self.hospital_name,
            BillField::AdmissionDate => &mut self.admission_date,
            BillField::DischargeDate => &mut self.discharge_date,
            BillField::TotalAmount => &mut self.total_amount,
            BillField::Diagnosis => &mut self.diagnosis,
            BillField::ProcedureType => &mut self.procedure_type,
            BillField::PaymentMethod => &mut self.payment_method,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BillField {
    PatientName,
    HospitalName,
    AdmissionDate,
    DischargeDate,
    TotalAmount,
    Diagnosis,
    ProcedureType,
    PaymentMethod,
}

impl BillField {
    pub const ALL: [BillField; 8] = [
        BillField::PatientName,
        BillField::HospitalName,
        BillField::AdmissionDate,
        BillField::DischargeDate,
        BillField::TotalAmount,
        BillField::Diagnosis,
        BillField::ProcedureType,
        BillField::PaymentMethod,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BillField::PatientName => "Patient Name",
            BillField::HospitalName => "Hospital Name",
            BillField::AdmissionDate => "Admission Date",
            BillField::DischargeDate => "Discharge Date",
            BillField::TotalAmount => "Total Amount",
            BillField::Diagnosis => "Diagnosis",
            BillField::ProcedureType => "Procedure Type",
            BillField::PaymentMethod => "Payment Method",
        }
    }
}

/// Reference to a file the user picked; the bytes stay with the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndianState {
    AndhraPradesh,
    Delhi,
    Gujarat,
    Karnataka,
    Kerala,
    Maharashtra,
    TamilNadu,
    Telangana,
    UttarPradesh,
    WestBengal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsuranceType {
    AyushmanBharat,
    Esi,
    StateInsurance,
    PrivateInsurance,
    None,
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InsuranceType::AyushmanBharat => "Ayushman Bharat (PMJAY)",
            InsuranceType::Esi => "ESI (Employee State Insurance)",
            InsuranceType::StateInsurance => "State Government Scheme",
            InsuranceType::PrivateInsurance => "Private Health Insurance",
            InsuranceType::None => "No Insurance",
        };
        f.write_str(name)
    }
}

/// Validated personal and insurance details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: String,
    pub age: u8,
    pub gender: Gender,
    pub aadhar_number: String,
    pub mobile_number: String,
    pub email: String,
    pub state: IndianState,
    pub insurance_type: InsuranceType,
    pub policy_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bill_record_uses_camel_case_keys() {
        let record: BillRecord = serde_json::from_value(json!({
            "patientName": "Sharma, Priya",
            "hospitalName": "Apollo Hospitals",
            "admissionDate": "2023-11-10",
            "dischargeDate": "2023-11-15",
            "totalAmount": "₹45,750",
            "diagnosis": "Acute Appendicitis",
            "procedureType": "Surgery - Appendectomy",
            "paymentMethod": "Insurance"
        }))
        .unwrap();

        assert_eq!(record.get(BillField::TotalAmount), "₹45,750");
        assert_eq!(record.get(BillField::HospitalName), "Apollo Hospitals");
    }

    #[test]
    fn set_touches_only_the_named_field() {
        let mut record = BillRecord::default();
        record.set(BillField::Diagnosis, "Fracture".to_string());

        for field in BillField::ALL {
            let expected = if field == BillField::Diagnosis { "Fracture" } else { "" };
            assert_eq!(record.get(field), expected, "{}", field.label());
        }
    }
}
