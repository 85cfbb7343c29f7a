//! Derived views over the store's patient list.
//!
//! Everything here is a pure function of its inputs: the list is never
//! mutated and results are recomputed on every call, so a view can never be
//! stale relative to the store.

mod format;
mod stats;

pub use format::*;
pub use stats::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{ParseStatusError, Patient, PatientStatus};

/// Status filter applied on top of the free-text search.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
    Critical,
}

impl StatusFilter {
    /// Check whether a status passes this filter.
    pub fn accepts(&self, status: PatientStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == PatientStatus::Active,
            StatusFilter::Inactive => status == PatientStatus::Inactive,
            StatusFilter::Critical => status == PatientStatus::Critical,
        }
    }
}

impl From<PatientStatus> for StatusFilter {
    fn from(status: PatientStatus) -> Self {
        match status {
            PatientStatus::Active => StatusFilter::Active,
            PatientStatus::Inactive => StatusFilter::Inactive,
            PatientStatus::Critical => StatusFilter::Critical,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<PatientStatus>().map(StatusFilter::from)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
            StatusFilter::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Search text plus status filter, as entered in the list toolbar.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientQuery {
    pub search: String,
    pub status: StatusFilter,
}

impl PatientQuery {
    pub fn new(search: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    /// Check whether a patient belongs in the filtered view.
    ///
    /// Name and email match case-insensitively; phone is matched as typed.
    pub fn matches(&self, patient: &Patient) -> bool {
        self.status.accepts(patient.status) && self.matches_search(patient)
    }

    fn matches_search(&self, patient: &Patient) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        patient.name.to_lowercase().contains(&needle)
            || patient.email.to_lowercase().contains(&needle)
            || patient.phone.contains(&self.search)
    }

    /// Project `patients` onto the matching records, keeping their order.
    pub fn apply<'a>(&self, patients: &'a [Patient]) -> Vec<&'a Patient> {
        patients.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Filter `patients` by search text and status.
pub fn filter_patients<'a>(
    patients: &'a [Patient],
    search: &str,
    status: StatusFilter,
) -> Vec<&'a Patient> {
    PatientQuery::new(search, status).apply(patients)
}

/// Count line shown above the filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub shown: usize,
    pub total: usize,
}

impl ResultSummary {
    pub fn new(shown: usize, total: usize) -> Self {
        Self { shown, total }
    }

    /// True when the filter left nothing to show.
    pub fn is_empty(&self) -> bool {
        self.shown == 0
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} of {} patients", self.shown, self.total)
    }
}
