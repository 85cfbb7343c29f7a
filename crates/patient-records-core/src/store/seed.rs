//! Hardcoded mock patient data.
//!
//! Stands in for a clinical records backend until a real API exists.

use crate::models::Patient;

const MOCK_PATIENTS_JSON: &str = include_str!("../../data/mock_patients.json");

/// Parse the bundled mock patient list.
pub fn mock_patients() -> Result<Vec<Patient>, serde_json::Error> {
    serde_json::from_str(MOCK_PATIENTS_JSON)
}
