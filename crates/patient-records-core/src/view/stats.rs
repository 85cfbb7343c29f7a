//! Summary counts over the full patient list.

use serde::{Deserialize, Serialize};

use crate::models::{Patient, PatientStatus};

/// Per-status counts. Always computed over the unfiltered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientStats {
    pub total: usize,
    pub active: usize,
    pub critical: usize,
    pub inactive: usize,
}

impl PatientStats {
    pub fn from_patients(patients: &[Patient]) -> Self {
        patients.iter().fold(Self::default(), |mut stats, patient| {
            stats.total += 1;
            match patient.status {
                PatientStatus::Active => stats.active += 1,
                PatientStatus::Critical => stats.critical += 1,
                PatientStatus::Inactive => stats.inactive += 1,
            }
            stats
        })
    }
}
