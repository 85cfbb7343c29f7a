//! Patient Records Core Library
//!
//! In-memory patient record browsing and creation, seeded from mock data.
//!
//! # Architecture
//!
//! ```text
//!   PatientSource (mock, simulated delay)
//!                 │
//!                 ▼
//!   ┌──────────────────────────────┐
//!   │         PatientStore         │   Pending → Ready | Failed
//!   │  create / update / delete    │
//!   └──────────────┬───────────────┘
//!                  │ &[Patient]
//!        ┌─────────┴──────────┐
//!        ▼                    ▼
//!   PatientQuery         PatientStats
//!   (search + status)    (full-list counts)
//!        │                    │
//!        └─────────┬──────────┘
//!                  ▼
//!          Presentation layer
//!      (native app via UniFFI)
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, PatientStatus, PatientUpdate, etc.)
//! - [`store`]: Record store, load lifecycle and patient sources
//! - [`view`]: Filtering, summary statistics and display formatting
//! - [`form`]: Add-patient form draft and validation
//! - [`config`]: Store configuration

pub mod config;
pub mod form;
pub mod models;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use crate::config::StoreConfig;
pub use form::{FormError, PatientDraft};
pub use models::{EmergencyContact, NewPatient, Patient, PatientId, PatientStatus, PatientUpdate};
pub use store::{LoadError, LoadState, MockPatientSource, PatientSource, PatientStore, StoreError};
pub use view::{
    filter_patients, format_date_long, format_date_short, PatientQuery, PatientStats,
    ResultSummary, StatusFilter,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PatientRecordsError {
    #[error("Store not ready: {0}")]
    NotReady(String),

    #[error("Store full: {0}")]
    StoreFull(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<StoreError> for PatientRecordsError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotReady(_) => PatientRecordsError::NotReady(e.to_string()),
            StoreError::IdsExhausted(_) => PatientRecordsError::StoreFull(e.to_string()),
        }
    }
}

impl From<FormError> for PatientRecordsError {
    fn from(e: FormError) -> Self {
        PatientRecordsError::InvalidInput(e.to_string())
    }
}

impl From<models::ParseStatusError> for PatientRecordsError {
    fn from(e: models::ParseStatusError) -> Self {
        PatientRecordsError::InvalidInput(e.to_string())
    }
}

impl From<crate::config::ConfigError> for PatientRecordsError {
    fn from(e: crate::config::ConfigError) -> Self {
        PatientRecordsError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PatientRecordsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PatientRecordsError::LockPoisoned(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a store backed by mock data, configured from the environment.
#[uniffi::export]
pub fn open_patient_records() -> Result<Arc<PatientRecordsCore>, PatientRecordsError> {
    let config = StoreConfig::from_env()?;
    Ok(PatientRecordsCore::from_config(&config))
}

/// Format an ISO `YYYY-MM-DD` date for display: "Jan 15, 2024", or
/// "January 15, 2024" when `long` is set.
#[uniffi::export]
pub fn format_display_date(iso_date: String, long: bool) -> Result<String, PatientRecordsError> {
    let date = parse_date("date", &iso_date)?;
    Ok(if long {
        format_date_long(date)
    } else {
        format_date_short(date)
    })
}

/// Open a store backed by mock data with an explicit load delay.
#[uniffi::export]
pub fn open_patient_records_with_delay(load_delay_ms: u64) -> Arc<PatientRecordsCore> {
    let config = StoreConfig {
        load_delay_ms,
        ..StoreConfig::default()
    };
    PatientRecordsCore::from_config(&config)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
///
/// The lock is released while the source is being fetched, so reads and
/// rejected mutations stay responsive during a pending load.
#[derive(uniffi::Object)]
pub struct PatientRecordsCore {
    store: Arc<Mutex<PatientStore>>,
    source: Arc<dyn PatientSource>,
}

impl PatientRecordsCore {
    /// Wrap a fresh pending store around `source`.
    pub fn new(source: Arc<dyn PatientSource>) -> Arc<Self> {
        Arc::new(Self {
            store: Arc::new(Mutex::new(PatientStore::new())),
            source,
        })
    }

    pub fn from_config(config: &StoreConfig) -> Arc<Self> {
        Self::new(Arc::new(MockPatientSource::from_config(config)))
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl PatientRecordsCore {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Run the initial load and return the resulting state.
    pub async fn load(&self) -> Result<FfiLoadState, PatientRecordsError> {
        let ticket = {
            let mut store = self.store.lock()?;
            store.begin_load()
        };

        let result = self.source.fetch().await;

        let mut store = self.store.lock()?;
        store.finish_load(ticket, result);
        Ok(store.state().into())
    }

    /// Discard all records and load again.
    pub async fn reload(&self) -> Result<FfiLoadState, PatientRecordsError> {
        log::info!("Reload requested");
        self.load().await
    }

    pub fn state(&self) -> Result<FfiLoadState, PatientRecordsError> {
        let store = self.store.lock()?;
        Ok(store.state().into())
    }

    /// Error message from the last failed load.
    pub fn error_message(&self) -> Result<Option<String>, PatientRecordsError> {
        let store = self.store.lock()?;
        Ok(store.error().map(str::to_string))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All patients, most recent first.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, PatientRecordsError> {
        let store = self.store.lock()?;
        Ok(store.patients().iter().cloned().map(Into::into).collect())
    }

    pub fn get_patient(&self, id: u64) -> Result<Option<FfiPatient>, PatientRecordsError> {
        let store = self.store.lock()?;
        Ok(store.get(id).cloned().map(Into::into))
    }

    /// Patients matching the search text and a status of
    /// "all", "active", "inactive" or "critical".
    pub fn filter_patients(
        &self,
        search: String,
        status: String,
    ) -> Result<Vec<FfiPatient>, PatientRecordsError> {
        let query = PatientQuery::new(search, status.parse()?);
        let store = self.store.lock()?;
        Ok(store
            .filtered(&query)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// "Showing N of M patients" for the given filter.
    pub fn result_summary(
        &self,
        search: String,
        status: String,
    ) -> Result<String, PatientRecordsError> {
        let query = PatientQuery::new(search, status.parse()?);
        let store = self.store.lock()?;
        let summary = ResultSummary::new(store.filtered(&query).len(), store.len());
        Ok(summary.to_string())
    }

    pub fn stats(&self) -> Result<FfiPatientStats, PatientRecordsError> {
        let store = self.store.lock()?;
        Ok(store.stats().into())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a patient and return its assigned ID.
    pub fn add_patient(&self, patient: FfiNewPatient) -> Result<u64, PatientRecordsError> {
        let new_patient = NewPatient::try_from(patient)?;
        let mut store = self.store.lock()?;
        Ok(store.create(new_patient)?)
    }

    /// Validate raw form input and add the patient, dated today.
    pub fn submit_form(&self, form: FfiPatientForm) -> Result<u64, PatientRecordsError> {
        let new_patient = PatientDraft::try_from(form)?.build_today()?;
        let mut store = self.store.lock()?;
        Ok(store.create(new_patient)?)
    }

    /// Merge fields into a patient. Returns false if the ID is unknown.
    pub fn update_patient(
        &self,
        id: u64,
        update: FfiPatientUpdate,
    ) -> Result<bool, PatientRecordsError> {
        let update = PatientUpdate::try_from(update)?;
        let mut store = self.store.lock()?;
        Ok(store.update(id, update)?)
    }

    /// Remove a patient. Returns false if the ID is unknown.
    pub fn delete_patient(&self, id: u64) -> Result<bool, PatientRecordsError> {
        let mut store = self.store.lock()?;
        Ok(store.delete(id)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, PatientRecordsError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        PatientRecordsError::InvalidInput(format!("{}: {:?} ({})", field, value, e))
    })
}

/// FFI-safe load state.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiLoadState {
    Pending,
    Ready,
    Failed { message: String },
}

impl From<&LoadState> for FfiLoadState {
    fn from(state: &LoadState) -> Self {
        match state {
            LoadState::Pending => FfiLoadState::Pending,
            LoadState::Ready => FfiLoadState::Ready,
            LoadState::Failed(message) => FfiLoadState::Failed {
                message: message.clone(),
            },
        }
    }
}

/// FFI-safe patient status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiPatientStatus {
    Active,
    Inactive,
    Critical,
}

impl From<PatientStatus> for FfiPatientStatus {
    fn from(status: PatientStatus) -> Self {
        match status {
            PatientStatus::Active => FfiPatientStatus::Active,
            PatientStatus::Inactive => FfiPatientStatus::Inactive,
            PatientStatus::Critical => FfiPatientStatus::Critical,
        }
    }
}

impl From<FfiPatientStatus> for PatientStatus {
    fn from(status: FfiPatientStatus) -> Self {
        match status {
            FfiPatientStatus::Active => PatientStatus::Active,
            FfiPatientStatus::Inactive => PatientStatus::Inactive,
            FfiPatientStatus::Critical => PatientStatus::Critical,
        }
    }
}

/// FFI-safe emergency contact.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiEmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

impl From<EmergencyContact> for FfiEmergencyContact {
    fn from(contact: EmergencyContact) -> Self {
        Self {
            name: contact.name,
            phone: contact.phone,
            relationship: contact.relationship,
        }
    }
}

impl From<FfiEmergencyContact> for EmergencyContact {
    fn from(contact: FfiEmergencyContact) -> Self {
        Self {
            name: contact.name,
            phone: contact.phone,
            relationship: contact.relationship,
        }
    }
}

/// FFI-safe patient. Dates are ISO `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiPatient {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub medical_history: Vec<String>,
    pub last_visit: String,
    /// Card style, e.g. "Jan 15, 2024"
    pub last_visit_display: String,
    pub next_appointment: Option<String>,
    pub next_appointment_display: Option<String>,
    pub status: FfiPatientStatus,
    pub status_label: String,
    pub blood_type: String,
    pub allergies: Vec<String>,
    pub emergency_contact: FfiEmergencyContact,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            email: patient.email,
            phone: patient.phone,
            address: patient.address,
            medical_history: patient.medical_history,
            last_visit: patient.last_visit.to_string(),
            last_visit_display: format_date_short(patient.last_visit),
            next_appointment: patient.next_appointment.map(|d| d.to_string()),
            next_appointment_display: patient.next_appointment.map(format_date_short),
            status: patient.status.into(),
            status_label: patient.status.label().to_string(),
            blood_type: patient.blood_type,
            allergies: patient.allergies,
            emergency_contact: patient.emergency_contact.into(),
        }
    }
}

/// FFI-safe patient without an ID.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub medical_history: Vec<String>,
    pub last_visit: String,
    pub next_appointment: Option<String>,
    pub status: FfiPatientStatus,
    pub blood_type: String,
    pub allergies: Vec<String>,
    pub emergency_contact: FfiEmergencyContact,
}

impl TryFrom<FfiNewPatient> for NewPatient {
    type Error = PatientRecordsError;

    fn try_from(patient: FfiNewPatient) -> Result<Self, Self::Error> {
        Ok(NewPatient {
            last_visit: parse_date("lastVisit", &patient.last_visit)?,
            next_appointment: patient
                .next_appointment
                .as_deref()
                .map(|d| parse_date("nextAppointment", d))
                .transpose()?,
            name: patient.name,
            age: patient.age,
            email: patient.email,
            phone: patient.phone,
            address: patient.address,
            medical_history: patient.medical_history,
            status: patient.status.into(),
            blood_type: patient.blood_type,
            allergies: patient.allergies,
            emergency_contact: patient.emergency_contact.into(),
        })
    }
}

/// FFI-safe partial update.
///
/// `clear_next_appointment` removes a scheduled appointment; it wins over
/// `next_appointment` when both are set.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<Vec<String>>,
    pub last_visit: Option<String>,
    pub next_appointment: Option<String>,
    pub clear_next_appointment: bool,
    pub status: Option<FfiPatientStatus>,
    pub blood_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub emergency_contact: Option<FfiEmergencyContact>,
}

impl TryFrom<FfiPatientUpdate> for PatientUpdate {
    type Error = PatientRecordsError;

    fn try_from(update: FfiPatientUpdate) -> Result<Self, Self::Error> {
        let next_appointment = if update.clear_next_appointment {
            Some(None)
        } else {
            update
                .next_appointment
                .as_deref()
                .map(|d| parse_date("nextAppointment", d).map(Some))
                .transpose()?
        };

        Ok(PatientUpdate {
            name: update.name,
            age: update.age,
            email: update.email,
            phone: update.phone,
            address: update.address,
            medical_history: update.medical_history,
            last_visit: update
                .last_visit
                .as_deref()
                .map(|d| parse_date("lastVisit", d))
                .transpose()?,
            next_appointment,
            status: update.status.map(Into::into),
            blood_type: update.blood_type,
            allergies: update.allergies,
            emergency_contact: update.emergency_contact.map(Into::into),
        })
    }
}

/// FFI-safe raw form input, validated on submit.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientForm {
    pub name: String,
    pub age: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub blood_type: String,
    pub status: String,
    pub medical_history: Vec<String>,
    pub allergies: Vec<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub emergency_contact_relationship: String,
}

impl TryFrom<FfiPatientForm> for PatientDraft {
    type Error = PatientRecordsError;

    fn try_from(form: FfiPatientForm) -> Result<Self, Self::Error> {
        let mut draft = PatientDraft::new();
        if !form.status.trim().is_empty() {
            draft.status = form.status.parse()?;
        }
        draft.name = form.name;
        draft.age = form.age;
        draft.email = form.email;
        draft.phone = form.phone;
        draft.address = form.address;
        draft.blood_type = form.blood_type;
        draft.emergency_contact_name = form.emergency_contact_name;
        draft.emergency_contact_phone = form.emergency_contact_phone;
        draft.emergency_contact_relationship = form.emergency_contact_relationship;
        for condition in &form.medical_history {
            draft.add_medical_condition(condition);
        }
        for allergy in &form.allergies {
            draft.add_allergy(allergy);
        }
        Ok(draft)
    }
}

/// FFI-safe summary statistics.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiPatientStats {
    pub total: u64,
    pub active: u64,
    pub critical: u64,
    pub inactive: u64,
}

impl From<PatientStats> for FfiPatientStats {
    fn from(stats: PatientStats) -> Self {
        Self {
            total: stats.total as u64,
            active: stats.active as u64,
            critical: stats.critical as u64,
            inactive: stats.inactive as u64,
        }
    }
}
