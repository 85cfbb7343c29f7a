//! Sources that supply the initial patient list.

use std::time::Duration;

use async_trait::async_trait;

use super::{mock_patients, LoadError, LoadResult};
use crate::config::StoreConfig;
use crate::models::Patient;

/// Supplies the full patient list for a store load.
#[async_trait]
pub trait PatientSource: Send + Sync {
    async fn fetch(&self) -> LoadResult<Vec<Patient>>;
}

/// Mock source that waits a fixed delay, then returns canned data.
#[derive(Debug, Clone)]
pub struct MockPatientSource {
    delay: Duration,
    patients: Option<Vec<Patient>>,
    failure: Option<String>,
}

impl MockPatientSource {
    /// Source backed by the bundled seed data.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            patients: None,
            failure: None,
        }
    }

    /// Source that returns the given patients instead of the seed.
    pub fn with_patients(delay: Duration, patients: Vec<Patient>) -> Self {
        Self {
            delay,
            patients: Some(patients),
            failure: None,
        }
    }

    /// Source whose fetch always fails with `message`.
    pub fn failing(delay: Duration, message: impl Into<String>) -> Self {
        Self {
            delay,
            patients: None,
            failure: Some(message.into()),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            delay: config.load_delay(),
            patients: None,
            failure: config.simulate_failure.clone(),
        }
    }
}

#[async_trait]
impl PatientSource for MockPatientSource {
    async fn fetch(&self) -> LoadResult<Vec<Patient>> {
        log::debug!("Fetching patients (simulated delay {:?})", self.delay);
        tokio::time::sleep(self.delay).await;

        if let Some(message) = &self.failure {
            return Err(LoadError::Fetch(message.clone()));
        }

        match &self.patients {
            Some(patients) => Ok(patients.clone()),
            None => Ok(mock_patients()?),
        }
    }
}
