//! Add-patient form state.
//!
//! Holds the raw text the user typed and turns it into a [`NewPatient`] once
//! submitted. Coercion (age) and required-field checks happen here so the
//! store only ever receives typed values. Text is stored as entered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{EmergencyContact, NewPatient, PatientStatus};

pub const MAX_AGE: u32 = 150;

/// Form errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid age: {0:?}")]
    InvalidAge(String),
}

pub type FormResult<T> = Result<T, FormError>;

/// Draft of a new patient as entered in the add-patient dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDraft {
    pub name: String,
    /// Raw age text, parsed on build
    pub age: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub blood_type: String,
    pub status: PatientStatus,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub emergency_contact_relationship: String,
    medical_history: Vec<String>,
    allergies: Vec<String>,
}

impl PatientDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn medical_history(&self) -> &[String] {
        &self.medical_history
    }

    pub fn allergies(&self) -> &[String] {
        &self.allergies
    }

    /// Append a condition. Blank input is ignored and returns false.
    pub fn add_medical_condition(&mut self, condition: &str) -> bool {
        push_trimmed(&mut self.medical_history, condition)
    }

    pub fn remove_medical_condition(&mut self, index: usize) -> Option<String> {
        remove_at(&mut self.medical_history, index)
    }

    /// Append an allergy. Blank input is ignored and returns false.
    pub fn add_allergy(&mut self, allergy: &str) -> bool {
        push_trimmed(&mut self.allergies, allergy)
    }

    pub fn remove_allergy(&mut self, index: usize) -> Option<String> {
        remove_at(&mut self.allergies, index)
    }

    /// Clear every field back to a fresh form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validate the draft and produce a record dated `today`.
    pub fn build(&self, today: NaiveDate) -> FormResult<NewPatient> {
        let name = required("name", &self.name)?;
        let age = parse_age(required("age", &self.age)?)?;
        let blood_type = required("bloodType", &self.blood_type)?;
        let email = required("email", &self.email)?;
        let phone = required("phone", &self.phone)?;
        let address = required("address", &self.address)?;
        let emergency_contact = EmergencyContact {
            name: required("emergencyContact.name", &self.emergency_contact_name)?.to_string(),
            phone: required("emergencyContact.phone", &self.emergency_contact_phone)?.to_string(),
            relationship: required(
                "emergencyContact.relationship",
                &self.emergency_contact_relationship,
            )?
            .to_string(),
        };

        Ok(NewPatient {
            name: name.to_string(),
            age,
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            medical_history: self.medical_history.clone(),
            last_visit: today,
            next_appointment: None,
            status: self.status,
            blood_type: blood_type.to_string(),
            allergies: self.allergies.clone(),
            emergency_contact,
        })
    }

    /// Build using the current local date as the visit date.
    pub fn build_today(&self) -> FormResult<NewPatient> {
        self.build(chrono::Local::now().date_naive())
    }
}

fn push_trimmed(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_at(list: &mut Vec<String>, index: usize) -> Option<String> {
    (index < list.len()).then(|| list.remove(index))
}

/// Reject blank input; the value itself is passed through untouched.
fn required<'a>(field: &'static str, value: &'a str) -> FormResult<&'a str> {
    if value.trim().is_empty() {
        Err(FormError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn parse_age(raw: &str) -> FormResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(age) if age <= MAX_AGE => Ok(age),
        _ => Err(FormError::InvalidAge(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> PatientDraft {
        PatientDraft {
            name: "Jane Doe".into(),
            age: "34".into(),
            email: "jane@example.com".into(),
            phone: "(555) 111-2222".into(),
            address: "12 Elm St".into(),
            blood_type: "AB-".into(),
            emergency_contact_name: "John Doe".into(),
            emergency_contact_phone: "(555) 333-4444".into(),
            emergency_contact_relationship: "Spouse".into(),
            ..PatientDraft::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_build_complete_draft() {
        let mut draft = filled();
        draft.add_medical_condition("Asthma");
        draft.add_allergy("Peanuts");

        let patient = draft.build(today()).unwrap();

        assert_eq!(patient.name, "Jane Doe");
        assert_eq!(patient.age, 34);
        assert_eq!(patient.status, PatientStatus::Active);
        assert_eq!(patient.last_visit, today());
        assert!(patient.next_appointment.is_none());
        assert_eq!(patient.medical_history, vec!["Asthma"]);
        assert_eq!(patient.allergies, vec!["Peanuts"]);
        assert_eq!(patient.emergency_contact.relationship, "Spouse");
    }

    #[test]
    fn test_list_editing() {
        let mut draft = PatientDraft::new();
        assert!(draft.add_medical_condition("  Hypertension "));
        assert!(!draft.add_medical_condition("   "));
        assert!(draft.add_medical_condition("Hypertension"));
        assert_eq!(draft.medical_history(), ["Hypertension", "Hypertension"]);

        assert_eq!(draft.remove_medical_condition(0).as_deref(), Some("Hypertension"));
        assert_eq!(draft.remove_medical_condition(5), None);
        assert_eq!(draft.medical_history().len(), 1);

        assert!(draft.add_allergy("Latex"));
        assert_eq!(draft.remove_allergy(0).as_deref(), Some("Latex"));
        assert!(draft.allergies().is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let mut draft = filled();
        draft.name = "  ".into();
        assert_eq!(draft.build(today()), Err(FormError::MissingField("name")));

        let mut draft = filled();
        draft.emergency_contact_relationship.clear();
        assert_eq!(
            draft.build(today()),
            Err(FormError::MissingField("emergencyContact.relationship"))
        );
    }

    #[test]
    fn test_invalid_age() {
        let mut draft = filled();
        draft.age = "abc".into();
        assert_eq!(draft.build(today()), Err(FormError::InvalidAge("abc".into())));

        draft.age = "-3".into();
        assert!(matches!(draft.build(today()), Err(FormError::InvalidAge(_))));

        draft.age = "151".into();
        assert!(matches!(draft.build(today()), Err(FormError::InvalidAge(_))));

        draft.age = " 0 ".into();
        assert_eq!(draft.build(today()).unwrap().age, 0);
    }

    #[test]
    fn test_text_kept_as_entered() {
        let mut draft = filled();
        draft.name = " Jane Doe ".into();
        draft.blood_type = "unknown".into();
        draft.address = "12 Elm St\nApt 4".into();

        let patient = draft.build(today()).unwrap();

        assert_eq!(patient.name, " Jane Doe ");
        assert_eq!(patient.blood_type, "unknown");
        assert_eq!(patient.address, "12 Elm St\nApt 4");
    }

    #[test]
    fn test_reset() {
        let mut draft = filled();
        draft.status = PatientStatus::Critical;
        draft.add_allergy("Dust");
        draft.reset();
        assert_eq!(draft, PatientDraft::new());
        assert_eq!(draft.status, PatientStatus::Active);
    }
}
