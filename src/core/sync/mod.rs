//! Per-patient sync orchestration
//!
//! - [`coordinator`] - Lock, assemble, submit and resolve for each patient
//! - [`submitter`] - The [`BundleSubmitter`] and [`PatientReader`] seams implemented by the FHIR client
//! - [`summary`] - Per-patient reports and run totals

pub mod coordinator;
pub mod submitter;
pub mod summary;

pub use coordinator::SyncCoordinator;
pub use submitter::{BundleSubmitter, PatientReader};
pub use summary::{SyncReport, SyncSummary};
