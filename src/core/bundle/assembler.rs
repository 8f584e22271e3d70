//! Bundle assembly
//!
//! Picks the bundle kind from the patient's identity state and links every
//! observation to its subject.

use super::unit::{Entry, EntryResource, SubmissionMode, SubmissionUnit};
use crate::core::identity::IdentityStore;
use crate::domain::ids::{RemoteId, TempRef};
use crate::domain::{EdgeError, ObservationRecord, PatientRecord, Result, SubjectRef};
use std::sync::Arc;

/// Builds submission units for one patient at a time
///
/// The assembler puts no upper bound on the number of observations. Keeping
/// bundles to a size the server accepts is the caller's responsibility; the
/// observation sources enforce a configured maximum.
pub struct BundleAssembler {
    store: Arc<IdentityStore>,
}

impl BundleAssembler {
    pub fn new(store: Arc<IdentityStore>) -> Self {
        Self { store }
    }

    /// Assemble one submission unit
    ///
    /// - Remote id known: a **batch** of observation entries, each subject
    ///   set to `Patient/<remote id>`.
    /// - Remote id unknown: a **transaction** with the patient entry first,
    ///   then the observations in input order. The patient and every
    ///   observation get a freshly minted `urn:uuid:` full URL, and every
    ///   observation subject is the patient's full URL.
    ///
    /// An empty observation list yields an empty batch or a patient-only
    /// transaction.
    ///
    /// # Errors
    ///
    /// - `Identity(NotFound)` if the patient is not in the store
    /// - `Validation` if an observation was sourced for a different patient
    pub fn assemble(
        &self,
        patient: &PatientRecord,
        observations: Vec<ObservationRecord>,
    ) -> Result<SubmissionUnit> {
        ensure_same_patient(patient, &observations)?;

        let unit = match self.store.remote_id_of(&patient.local_id)? {
            Some(remote_id) => assemble_batch(patient, remote_id, observations),
            None => assemble_transaction(patient, observations),
        };

        tracing::debug!(
            local_id = %unit.local_id,
            bundle_type = unit.mode.bundle_type(),
            entries = unit.entry_count(),
            "Assembled bundle"
        );

        Ok(unit)
    }
}

fn assemble_batch(
    patient: &PatientRecord,
    remote_id: RemoteId,
    observations: Vec<ObservationRecord>,
) -> SubmissionUnit {
    let entries = observations
        .into_iter()
        .map(|obs| Entry {
            full_url: None,
            resource: EntryResource::Observation(
                obs.with_subject(SubjectRef::Remote(remote_id.clone())),
            ),
        })
        .collect();

    SubmissionUnit {
        local_id: patient.local_id.clone(),
        mode: SubmissionMode::Batch { remote_id },
        entries,
    }
}

fn assemble_transaction(
    patient: &PatientRecord,
    observations: Vec<ObservationRecord>,
) -> SubmissionUnit {
    let patient_ref = TempRef::mint();

    let mut entries = Vec::with_capacity(observations.len() + 1);
    entries.push(Entry {
        full_url: Some(patient_ref.clone()),
        resource: EntryResource::Patient(patient.clone()),
    });
    entries.extend(observations.into_iter().map(|obs| Entry {
        full_url: Some(TempRef::mint()),
        resource: EntryResource::Observation(
            obs.with_subject(SubjectRef::Temporary(patient_ref.clone())),
        ),
    }));

    SubmissionUnit {
        local_id: patient.local_id.clone(),
        mode: SubmissionMode::Transaction { patient_ref },
        entries,
    }
}

fn ensure_same_patient(patient: &PatientRecord, observations: &[ObservationRecord]) -> Result<()> {
    let foreign = observations.iter().find_map(|obs| match &obs.subject {
        SubjectRef::Local(id) if *id != patient.local_id => Some(id),
        _ => None,
    });
    match foreign {
        Some(id) => Err(EdgeError::Validation(format!(
            "Observation sourced for patient {id} cannot be bundled for {}",
            patient.local_id
        ))),
        None => Ok(()),
    }
}
