//! Sync reports and run summaries

use crate::core::bundle::Resolution;
use crate::domain::ids::LocalId;
use crate::domain::Result;
use std::time::Duration;

/// Result of syncing one patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// `transaction` or `batch`
    pub bundle_type: &'static str,
    /// Observations included in the bundle
    pub observations_sent: usize,
    pub resolution: Resolution,
}

impl SyncReport {
    pub fn local_id(&self) -> &LocalId {
        &self.resolution.local_id
    }

    pub fn is_complete(&self) -> bool {
        self.resolution.is_complete()
    }
}

/// Totals over a multi-patient sync
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// Patients attempted
    pub patients: usize,

    /// Patients registered by this run
    pub patients_created: usize,

    /// Observations included in bundles
    pub observations_sent: usize,

    /// Observations the server created
    pub observations_created: usize,

    /// Entries the server declined
    pub entry_failures: usize,

    /// Duration of the run
    pub duration: Duration,

    /// Patients whose sync failed outright
    pub errors: Vec<(LocalId, String)>,
}

impl SyncSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Fold one patient's result into the totals
    pub fn add(&mut self, local_id: &LocalId, result: &Result<SyncReport>) {
        self.patients += 1;
        match result {
            Ok(report) => {
                self.observations_sent += report.observations_sent;
                self.observations_created += report.resolution.created_observations();
                self.entry_failures += report.resolution.failures.len();
                if report.resolution.patient_remote_id.is_some() {
                    self.patients_created += 1;
                }
            }
            Err(e) => self.errors.push((local_id.clone(), e.to_string())),
        }
    }

    pub fn from_results(results: &[(LocalId, Result<SyncReport>)]) -> Self {
        let mut summary = Self::new();
        for (local_id, result) in results {
            summary.add(local_id, result);
        }
        summary
    }

    /// No patient errored and no entry was declined
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty() && self.entry_failures == 0
    }

    pub fn log_summary(&self) {
        tracing::info!(
            patients = self.patients,
            patients_created = self.patients_created,
            observations_sent = self.observations_sent,
            observations_created = self.observations_created,
            entry_failures = self.entry_failures,
            duration_ms = self.duration.as_millis() as u64,
            "Sync completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Sync completed with errors");
            for (local_id, message) in &self.errors {
                tracing::warn!(local_id = %local_id, message = %message, "Sync error");
            }
        }
    }
}
