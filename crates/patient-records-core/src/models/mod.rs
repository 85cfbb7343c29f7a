//! Domain models for the patient records system.

mod patient;

pub use patient::*;
