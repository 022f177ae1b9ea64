use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A document the claim may need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

pub const DOCUMENTS: [DocumentSpec; 7] = [
    DocumentSpec {
        id: "aadhar",
        name: "Aadhar Card",
        required: true,
        description: "Primary identity proof required for all schemes",
    },
    DocumentSpec {
        id: "discharge",
        name: "Hospital Discharge Summary",
        required: true,
        description: "Medical document showing treatment details",
    },
    DocumentSpec {
        id: "bills",
        name: "Original Medical Bills",
        required: true,
        description: "All itemized bills and payment receipts",
    },
    DocumentSpec {
        id: "prescription",
        name: "Doctor's Prescription",
        required: true,
        description: "All prescriptions related to treatment",
    },
    DocumentSpec {
        id: "reports",
        name: "Medical Investigation Reports",
        required: false,
        description: "Lab reports, scans, X-rays as applicable",
    },
    DocumentSpec {
        id: "insurance",
        name: "Insurance Card",
        required: true,
        description: "PMJAY card or other insurance ID",
    },
    DocumentSpec {
        id: "photo",
        name: "Passport Size Photos",
        required: true,
        description: "2 recent passport size photographs",
    },
];

pub fn find_document(id: &str) -> Option<&'static DocumentSpec> {
    DOCUMENTS.iter().find(|doc| doc.id == id)
}

pub fn required_documents() -> impl Iterator<Item = &'static DocumentSpec> {
    DOCUMENTS.iter().filter(|doc| doc.required)
}

/// Which catalog documents the user has ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistState {
    checked: BTreeMap<String, bool>,
}

impl ChecklistState {
    /// Returns false for ids that are not in the catalog.
    pub fn set(&mut self, id: &str, checked: bool) -> bool {
        match find_document(id) {
            Some(doc) => {
                self.checked.insert(doc.id.to_string(), checked);
                true
            }
            None => false,
        }
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked.get(id).copied().unwrap_or(false)
    }

    /// Gate for form generation
    pub fn all_required_checked(&self) -> bool {
        required_documents().all(|doc| self.is_checked(doc.id))
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        required_documents()
            .filter(|doc| !self.is_checked(doc.id))
            .map(|doc| doc.name)
            .collect()
    }

    pub fn checked_ids(&self) -> Vec<&'static str> {
        DOCUMENTS
            .iter()
            .filter(|doc| self.is_checked(doc.id))
            .map(|doc| doc.id)
            .collect()
    }
}
