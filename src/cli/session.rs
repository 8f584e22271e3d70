//! Shared state for commands that talk to the FHIR server

use crate::adapters::fhir::FhirClient;
use crate::adapters::observations::{SeriesSource, SyntheticSource};
use crate::adapters::roster::load_roster;
use crate::config::EdgeConfig;
use crate::core::identity::IdentityStore;
use crate::core::sync::{BundleSubmitter, PatientReader, SyncCoordinator, SyncReport};
use crate::domain::ids::LocalId;
use crate::domain::{EdgeError, ObservationRecord, PatientRecord, Result, SubmissionError};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;

/// Where a command takes its observations from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationSource {
    Synthetic(usize),
    Series,
}

/// Roster, identity store and submitter for one process run
///
/// Remote ids recorded by one sync are visible to every later sync on the
/// same session.
pub struct Session {
    config: EdgeConfig,
    coordinator: SyncCoordinator,
    synthetic: SyntheticSource,
    series: SeriesSource,
    reader: Option<Arc<dyn PatientReader>>,
}

impl Session {
    /// Load the roster and connect a FHIR client from configuration
    pub fn open(config: EdgeConfig) -> Result<Self> {
        let patients = load_roster(&config.roster.path)?;
        let client = Arc::new(FhirClient::new(config.fhir.clone())?);
        tracing::info!(
            patients = patients.len(),
            base_url = %client.base_url(),
            "Session opened"
        );
        Ok(Self::with_submitter(config, patients, client.clone())?.with_reader(client))
    }

    pub fn with_submitter(
        config: EdgeConfig,
        patients: Vec<PatientRecord>,
        submitter: Arc<dyn BundleSubmitter>,
    ) -> Result<Self> {
        let store = Arc::new(IdentityStore::new(patients)?);
        Ok(Self {
            synthetic: SyntheticSource::new(config.observations.max_count),
            series: SeriesSource::new(&config.observations.series_dir),
            coordinator: SyncCoordinator::new(store, submitter),
            config,
            reader: None,
        })
    }

    pub fn with_reader(mut self, reader: Arc<dyn PatientReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    pub fn store(&self) -> &Arc<IdentityStore> {
        self.coordinator.store()
    }

    /// Local id at a 1-based roster position, as users pick patients
    pub fn patient_at(&self, position: usize) -> Result<LocalId> {
        self.store().local_id_at(position).cloned().ok_or_else(|| {
            EdgeError::Validation(format!(
                "patient number {position} is out of range 1..={}",
                self.store().len()
            ))
        })
    }

    pub fn observations(
        &mut self,
        local_id: &LocalId,
        source: ObservationSource,
    ) -> Result<Vec<ObservationRecord>> {
        match source {
            ObservationSource::Synthetic(count) => self.synthetic.generate(
                local_id,
                count,
                self.config.observations.low_value,
                self.config.observations.high_value,
            ),
            ObservationSource::Series => self.series.read_from_series(local_id),
        }
    }

    pub fn max_count(&self) -> usize {
        self.synthetic.max_count()
    }

    /// The server's copy of a patient registered during this session
    ///
    /// # Errors
    ///
    /// `Validation` if no remote id is recorded for the patient yet, and
    /// whatever the reader reports for the read itself
    pub async fn remote_patient(&self, local_id: &LocalId) -> Result<Value> {
        let Some(remote_id) = self.store().remote_id_of(local_id)? else {
            return Err(EdgeError::Validation(format!(
                "patient {local_id} has not been registered on the server yet"
            )));
        };
        let reader = self.reader.as_ref().ok_or_else(|| {
            EdgeError::Configuration("no FHIR server to read patients from".to_string())
        })?;
        reader.read_patient(&remote_id).await
    }
}

/// Process exit code for an error that ended a command
pub fn exit_code_for(error: &EdgeError) -> i32 {
    match error {
        EdgeError::Configuration(_) | EdgeError::Roster(_) | EdgeError::Validation(_) => 2,
        EdgeError::Submission(SubmissionError::Transport(_)) => 4,
        EdgeError::Observation(_) | EdgeError::Submission(_) => 1,
        _ => 5,
    }
}

/// Print what the server assigned for one patient
pub fn write_report(out: &mut impl Write, report: &SyncReport) -> std::io::Result<()> {
    writeln!(
        out,
        "📤 {} bundle for {}: {} observation(s) sent",
        report.bundle_type,
        report.local_id(),
        report.observations_sent
    )?;
    if let Some(patient_id) = &report.resolution.patient_remote_id {
        writeln!(out, "  Patient registered as {patient_id}")?;
    }
    let ids: Vec<&str> = report
        .resolution
        .observation_ids
        .iter()
        .map(|id| id.as_str())
        .collect();
    writeln!(out, "  Observation ids: {}", ids.join(", "))?;
    for failure in &report.resolution.failures {
        writeln!(
            out,
            "  ⚠️  Entry {} ({}) failed with status {}: {}",
            failure.index,
            failure.resource_type.as_str(),
            failure.status,
            failure.diagnostics.as_deref().unwrap_or("no diagnostics")
        )?;
    }
    Ok(())
}
