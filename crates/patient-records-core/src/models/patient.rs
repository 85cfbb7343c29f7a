//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned patient identifier.
pub type PatientId = u64;

/// Care status of a patient.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    #[default]
    Active,
    Inactive,
    Critical,
}

impl PatientStatus {
    /// Wire name, as used in seed data and filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::Inactive => "inactive",
            PatientStatus::Critical => "critical",
        }
    }

    /// Human-readable badge label.
    pub fn label(&self) -> &'static str {
        match self {
            PatientStatus::Active => "Active",
            PatientStatus::Inactive => "Inactive",
            PatientStatus::Critical => "Critical",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown patient status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for PatientStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(PatientStatus::Active),
            "inactive" => Ok(PatientStatus::Inactive),
            "critical" => Ok(PatientStatus::Critical),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Person to contact in an emergency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

/// A patient record held by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Store-assigned ID, immutable once set
    pub id: PatientId,
    pub name: String,
    pub age: u32,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Conditions in the order they were recorded
    pub medical_history: Vec<String>,
    pub last_visit: NaiveDate,
    /// None means nothing is scheduled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_appointment: Option<NaiveDate>,
    pub status: PatientStatus,
    pub blood_type: String,
    pub allergies: Vec<String>,
    pub emergency_contact: EmergencyContact,
}

impl Patient {
    /// Attach a store-assigned ID to a new record.
    pub fn from_new(id: PatientId, new: NewPatient) -> Self {
        Self {
            id,
            name: new.name,
            age: new.age,
            email: new.email,
            phone: new.phone,
            address: new.address,
            medical_history: new.medical_history,
            last_visit: new.last_visit,
            next_appointment: new.next_appointment,
            status: new.status,
            blood_type: new.blood_type,
            allergies: new.allergies,
            emergency_contact: new.emergency_contact,
        }
    }
}

/// A patient record that has not been assigned an ID yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub medical_history: Vec<String>,
    pub last_visit: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_appointment: Option<NaiveDate>,
    pub status: PatientStatus,
    pub blood_type: String,
    pub allergies: Vec<String>,
    pub emergency_contact: EmergencyContact,
}

/// Partial set of fields to merge into an existing patient.
///
/// `None` leaves the field as is. `next_appointment` is doubly optional so an
/// update can clear a scheduled appointment with `Some(None)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<Vec<String>>,
    pub last_visit: Option<NaiveDate>,
    pub next_appointment: Option<Option<NaiveDate>>,
    pub status: Option<PatientStatus>,
    pub blood_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub emergency_contact: Option<EmergencyContact>,
}

impl PatientUpdate {
    /// Update that only changes the status.
    pub fn status(status: PatientStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Merge the present fields into `patient`. The ID is never touched.
    pub fn apply_to(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(age) = self.age {
            patient.age = age;
        }
        if let Some(email) = self.email {
            patient.email = email;
        }
        if let Some(phone) = self.phone {
            patient.phone = phone;
        }
        if let Some(address) = self.address {
            patient.address = address;
        }
        if let Some(history) = self.medical_history {
            patient.medical_history = history;
        }
        if let Some(last_visit) = self.last_visit {
            patient.last_visit = last_visit;
        }
        if let Some(next) = self.next_appointment {
            patient.next_appointment = next;
        }
        if let Some(status) = self.status {
            patient.status = status;
        }
        if let Some(blood_type) = self.blood_type {
            patient.blood_type = blood_type;
        }
        if let Some(allergies) = self.allergies {
            patient.allergies = allergies;
        }
        if let Some(contact) = self.emergency_contact {
            patient.emergency_contact = contact;
        }
    }
}
