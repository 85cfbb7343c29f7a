//! In-memory patient store with a simulated load lifecycle.
//!
//! ```text
//!            begin_load / reload
//!   ┌───────────────────────────────────┐
//!   ▼                                   │
//! Pending ──finish_load(Ok)──▶ Ready ───┤
//!   │                                   │
//!   └────finish_load(Err)──▶ Failed ────┘
//! ```
//!
//! Mutations are only accepted in `Ready`. While a load is pending or after
//! it failed they are rejected with [`StoreError::NotReady`].

mod seed;
mod source;

pub use seed::*;
pub use source::*;

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::models::{NewPatient, Patient, PatientId, PatientUpdate};
use crate::view::{PatientQuery, PatientStats};

/// Errors raised while loading the initial patient list.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{0}")]
    Fetch(String),

    #[error("Invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("Duplicate patient id in seed data: {0}")]
    DuplicateId(PatientId),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store is not ready ({0})")]
    NotReady(LoadPhase),

    #[error("No patient id left after {0}")]
    IdsExhausted(PatientId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Lifecycle of the initial load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Load in progress, no records available
    Pending,
    /// Records loaded and mutable
    Ready,
    /// Load failed with a human-readable message
    Failed(String),
}

impl LoadState {
    pub fn phase(&self) -> LoadPhase {
        match self {
            LoadState::Pending => LoadPhase::Pending,
            LoadState::Ready => LoadPhase::Ready,
            LoadState::Failed(_) => LoadPhase::Failed,
        }
    }
}

/// `LoadState` without the error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Pending,
    Ready,
    Failed,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadPhase::Pending => "pending",
            LoadPhase::Ready => "ready",
            LoadPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Handle for one load attempt. Only the most recent ticket can finish a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Authoritative holder of the patient list for one session.
///
/// The list is most-recent-first: created records go to the front, seed
/// records keep their original order behind them.
#[derive(Debug)]
pub struct PatientStore {
    state: LoadState,
    patients: Vec<Patient>,
    generation: u64,
}

impl Default for PatientStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientStore {
    /// Create an empty store in the `Pending` state.
    pub fn new() -> Self {
        Self {
            state: LoadState::Pending,
            patients: Vec::new(),
            generation: 0,
        }
    }

    /// Create a store that is already `Ready` with the given records.
    pub fn with_patients(patients: Vec<Patient>) -> LoadResult<Self> {
        if let Some(id) = first_duplicate(&patients) {
            return Err(LoadError::DuplicateId(id));
        }
        let mut store = Self::new();
        let ticket = store.begin_load();
        store.finish_load(ticket, Ok(patients));
        Ok(store)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Enter `Pending` and drop the current records.
    ///
    /// Any ticket handed out earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Pending;
        self.patients.clear();
        log::debug!("Patient load {} started", self.generation);
        LoadTicket(self.generation)
    }

    /// Complete the load identified by `ticket`.
    ///
    /// Returns false if the ticket was superseded by a later `begin_load`, in
    /// which case the result is discarded.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: LoadResult<Vec<Patient>>) -> bool {
        if ticket.0 != self.generation || self.state != LoadState::Pending {
            log::warn!(
                "Discarding result of stale patient load {} (current {})",
                ticket.0,
                self.generation
            );
            return false;
        }

        let result = result.and_then(|patients| match first_duplicate(&patients) {
            Some(id) => Err(LoadError::DuplicateId(id)),
            None => Ok(patients),
        });

        match result {
            Ok(patients) => {
                log::info!("Patient store ready with {} records", patients.len());
                self.patients = patients;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                log::warn!("Patient load failed: {}", e);
                self.state = LoadState::Failed(e.to_string());
            }
        }
        true
    }

    /// Run a full load against `source`.
    pub async fn load(&mut self, source: &dyn PatientSource) -> &LoadState {
        let ticket = self.begin_load();
        let result = source.fetch().await;
        self.finish_load(ticket, result);
        &self.state
    }

    /// Discard the current records and load again.
    pub async fn reload(&mut self, source: &dyn PatientSource) -> &LoadState {
        log::info!("Reloading patient store");
        self.load(source).await
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// Load error message, if the last load failed.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current records, most recent first. Empty unless `Ready`.
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn get(&self, id: PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Records matching `query`, in store order.
    pub fn filtered(&self, query: &PatientQuery) -> Vec<&Patient> {
        query.apply(&self.patients)
    }

    /// Counts over all records, ignoring any filter.
    pub fn stats(&self) -> PatientStats {
        PatientStats::from_patients(&self.patients)
    }

    /// ID the next created record will receive.
    ///
    /// One past the largest existing ID, or 1 for an empty store. Fails if
    /// the largest ID is already `PatientId::MAX`.
    pub fn next_id(&self) -> StoreResult<PatientId> {
        match self.patients.iter().map(|p| p.id).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted(max)),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a record at the front of the list and return its assigned ID.
    pub fn create(&mut self, new: NewPatient) -> StoreResult<PatientId> {
        self.ensure_ready()?;
        let id = self.next_id()?;
        self.patients.insert(0, Patient::from_new(id, new));
        log::debug!("Created patient {}", id);
        Ok(id)
    }

    /// Merge `update` into the record with `id`.
    ///
    /// Returns false, leaving the list unchanged, if no record has that ID.
    pub fn update(&mut self, id: PatientId, update: PatientUpdate) -> StoreResult<bool> {
        self.ensure_ready()?;
        match self.patients.iter_mut().find(|p| p.id == id) {
            Some(patient) => {
                update.apply_to(patient);
                log::debug!("Updated patient {}", id);
                Ok(true)
            }
            None => {
                log::debug!("Update ignored, no patient {}", id);
                Ok(false)
            }
        }
    }

    /// Remove the record with `id`. Returns false if there was none.
    pub fn delete(&mut self, id: PatientId) -> StoreResult<bool> {
        self.ensure_ready()?;
        let before = self.patients.len();
        self.patients.retain(|p| p.id != id);
        let removed = self.patients.len() < before;
        if removed {
            log::debug!("Deleted patient {}", id);
        } else {
            log::debug!("Delete ignored, no patient {}", id);
        }
        Ok(removed)
    }

    fn ensure_ready(&self) -> StoreResult<()> {
        match self.state {
            LoadState::Ready => Ok(()),
            ref other => {
                log::warn!("Rejecting mutation while store is {}", other.phase());
                Err(StoreError::NotReady(other.phase()))
            }
        }
    }
}

fn first_duplicate(patients: &[Patient]) -> Option<PatientId> {
    let mut seen = HashSet::with_capacity(patients.len());
    patients.iter().map(|p| p.id).find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmergencyContact, PatientStatus};
    use crate::view::StatusFilter;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn new_patient(name: &str, status: PatientStatus) -> NewPatient {
        NewPatient {
            name: name.into(),
            age: 30,
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: "(555) 000-1111".into(),
            address: "1 Main St".into(),
            medical_history: vec![],
            last_visit: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            next_appointment: None,
            status,
            blood_type: "O+".into(),
            allergies: vec![],
            emergency_contact: EmergencyContact {
                name: "Kin".into(),
                phone: "(555) 000-2222".into(),
                relationship: "Parent".into(),
            },
        }
    }

    fn seeded() -> PatientStore {
        PatientStore::with_patients(vec![
            Patient::from_new(1, new_patient("Alice Active", PatientStatus::Active)),
            Patient::from_new(2, new_patient("Carl Critical", PatientStatus::Critical)),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_store_is_pending() {
        let store = PatientStore::new();
        assert_eq!(store.state(), &LoadState::Pending);
        assert!(store.is_empty());
        assert!(store.error().is_none());
    }

    #[test]
    fn test_mutations_rejected_while_pending() {
        let mut store = PatientStore::new();
        let err = store.create(new_patient("Early Bird", PatientStatus::Active)).unwrap_err();
        assert_eq!(err, StoreError::NotReady(LoadPhase::Pending));
        assert_eq!(store.delete(1), Err(StoreError::NotReady(LoadPhase::Pending)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_mutations_rejected_after_failure() {
        let mut store = PatientStore::new();
        let ticket = store.begin_load();
        store.finish_load(ticket, Err(LoadError::Fetch("Failed to fetch patients".into())));

        assert_eq!(store.error(), Some("Failed to fetch patients"));
        assert!(store.patients().is_empty());
        assert_eq!(
            store.update(1, PatientUpdate::default()),
            Err(StoreError::NotReady(LoadPhase::Failed))
        );
    }

    #[test]
    fn test_create_prepends_with_next_id() {
        let mut store = seeded();
        let id = store.create(new_patient("Jane Doe", PatientStatus::Active)).unwrap();

        assert_eq!(id, 3);
        assert_eq!(store.patients()[0].id, 3);
        assert_eq!(store.patients()[0].name, "Jane Doe");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_create_on_empty_store_starts_at_one() {
        let mut store = PatientStore::with_patients(Vec::new()).unwrap();
        assert_eq!(store.create(new_patient("First", PatientStatus::Active)).unwrap(), 1);
        assert_eq!(store.create(new_patient("Second", PatientStatus::Active)).unwrap(), 2);
    }

    #[test]
    fn test_create_when_ids_exhausted() {
        let mut store = PatientStore::with_patients(vec![Patient::from_new(
            PatientId::MAX,
            new_patient("Last Id", PatientStatus::Active),
        )])
        .unwrap();
        let before = store.patients().to_vec();

        let err = store.create(new_patient("Overflow", PatientStatus::Active)).unwrap_err();

        assert_eq!(err, StoreError::IdsExhausted(PatientId::MAX));
        assert_eq!(store.patients(), before.as_slice());
    }

    #[test]
    fn test_create_after_delete_of_max() {
        let mut store = seeded();
        store.delete(2).unwrap();
        // max+1 over what remains, so 2 is handed out again
        assert_eq!(store.create(new_patient("Reuse", PatientStatus::Active)).unwrap(), 2);
    }

    #[test]
    fn test_update_status() {
        let mut store = seeded();
        let untouched = store.get(1).cloned();

        let matched = store.update(2, PatientUpdate::status(PatientStatus::Inactive)).unwrap();

        assert!(matched);
        assert_eq!(store.get(2).unwrap().status, PatientStatus::Inactive);
        assert_eq!(store.get(2).unwrap().name, "Carl Critical");
        assert_eq!(store.get(1).cloned(), untouched);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = seeded();
        let before = store.patients().to_vec();
        assert!(!store.update(42, PatientUpdate::status(PatientStatus::Critical)).unwrap());
        assert_eq!(store.patients(), before.as_slice());
    }

    #[test]
    fn test_delete_idempotent() {
        let mut store = seeded();
        assert!(store.delete(1).unwrap());
        assert!(store.get(1).is_none());
        assert!(!store.delete(1).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut store = seeded();
        let before = store.patients().to_vec();
        assert!(!store.delete(999).unwrap());
        assert_eq!(store.patients(), before.as_slice());
    }

    #[test]
    fn test_duplicate_seed_ids_fail_load() {
        let mut store = PatientStore::new();
        let ticket = store.begin_load();
        store.finish_load(
            ticket,
            Ok(vec![
                Patient::from_new(4, new_patient("One", PatientStatus::Active)),
                Patient::from_new(4, new_patient("Two", PatientStatus::Active)),
            ]),
        );
        assert_eq!(store.state().phase(), LoadPhase::Failed);
        assert!(store.error().unwrap().contains('4'));
        assert!(store.is_empty());

        let err = PatientStore::with_patients(vec![
            Patient::from_new(9, new_patient("One", PatientStatus::Active)),
            Patient::from_new(9, new_patient("Two", PatientStatus::Active)),
        ])
        .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateId(9)));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut store = PatientStore::new();
        let first = store.begin_load();
        let second = store.begin_load();

        assert!(!store.finish_load(first, Err(LoadError::Fetch("late".into()))));
        assert_eq!(store.state(), &LoadState::Pending);

        assert!(store.finish_load(second, Ok(Vec::new())));
        assert!(store.is_ready());
    }

    #[test]
    fn test_ticket_cannot_finish_twice() {
        let mut store = PatientStore::new();
        let ticket = store.begin_load();
        assert!(store.finish_load(ticket, Ok(Vec::new())));
        assert!(!store.finish_load(ticket, Err(LoadError::Fetch("again".into()))));
        assert!(store.is_ready());
    }

    #[test]
    fn test_filtered_and_stats() {
        let store = seeded();
        let query = PatientQuery::new("", StatusFilter::Active);
        let view = store.filtered(&query);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, 1);

        let stats = store.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.critical, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_from_mock_source() {
        let mut store = PatientStore::new();
        let source = MockPatientSource::new(Duration::from_millis(1500));

        let state = store.load(&source).await;

        assert_eq!(state, &LoadState::Ready);
        assert_eq!(store.len(), mock_patients().unwrap().len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_after_failure() {
        let mut store = PatientStore::new();
        let failing = MockPatientSource::failing(Duration::from_millis(10), "Network down");
        assert_eq!(store.load(&failing).await.phase(), LoadPhase::Failed);

        let working = MockPatientSource::new(Duration::from_millis(10));
        assert_eq!(store.reload(&working).await, &LoadState::Ready);
        assert!(store.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_discards_local_changes() {
        let source = MockPatientSource::new(Duration::ZERO);
        let mut store = PatientStore::new();
        store.load(&source).await;
        let seeded_len = store.len();

        store.create(new_patient("Temp", PatientStatus::Active)).unwrap();
        assert_eq!(store.len(), seeded_len + 1);

        store.reload(&source).await;
        assert_eq!(store.len(), seeded_len);
    }
}
