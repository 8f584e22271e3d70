//! In-memory identity store
//!
//! Holds one record per roster patient together with the remote identifier
//! learned from the FHIR server. The store is passed explicitly to every
//! component that reads or writes identity state.

use crate::domain::ids::{LocalId, RemoteId};
use crate::domain::{IdentityError, PatientRecord};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Guard proving the holder is the only submission flow for one patient
///
/// Dropping it releases the patient for the next flow.
pub struct PatientGuard {
    local_id: LocalId,
    _guard: OwnedMutexGuard<()>,
}

impl PatientGuard {
    pub fn local_id(&self) -> &LocalId {
        &self.local_id
    }
}

/// Identity store keyed by local identifier
///
/// The set of patients is fixed when the store is built; only remote
/// identifiers change afterwards.
pub struct IdentityStore {
    records: RwLock<HashMap<LocalId, PatientRecord>>,
    roster_order: Vec<LocalId>,
    flow_locks: HashMap<LocalId, Arc<Mutex<()>>>,
}

impl IdentityStore {
    /// Build a store from roster records
    ///
    /// # Errors
    ///
    /// Returns `DuplicateLocalId` if two records share a local identifier.
    pub fn new(patients: Vec<PatientRecord>) -> Result<Self, IdentityError> {
        let mut records = HashMap::with_capacity(patients.len());
        let mut roster_order = Vec::with_capacity(patients.len());
        let mut flow_locks = HashMap::with_capacity(patients.len());

        for patient in patients {
            let local_id = patient.local_id.clone();
            if records.contains_key(&local_id) {
                return Err(IdentityError::DuplicateLocalId(local_id));
            }
            roster_order.push(local_id.clone());
            flow_locks.insert(local_id.clone(), Arc::new(Mutex::new(())));
            records.insert(local_id, patient);
        }

        tracing::debug!(patients = roster_order.len(), "Identity store initialized");

        Ok(Self {
            records: RwLock::new(records),
            roster_order,
            flow_locks,
        })
    }

    /// Look up a patient record by local identifier
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such patient was loaded.
    pub fn lookup(&self, local_id: &LocalId) -> Result<PatientRecord, IdentityError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records
            .get(local_id)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(local_id.clone()))
    }

    /// Remote identifier of a patient, `None` if never successfully submitted
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such patient was loaded.
    pub fn remote_id_of(&self, local_id: &LocalId) -> Result<Option<RemoteId>, IdentityError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records
            .get(local_id)
            .map(|record| record.remote_id.clone())
            .ok_or_else(|| IdentityError::NotFound(local_id.clone()))
    }

    /// Record the server-assigned identifier for a patient
    ///
    /// Recording the same value again is a no-op. A remote identifier never
    /// changes once set.
    ///
    /// # Errors
    ///
    /// - `UnknownPatient` if the local identifier is not in the store
    /// - `RemoteIdConflict` if a different remote identifier is already recorded
    pub fn record_remote_id(
        &self,
        local_id: &LocalId,
        remote_id: RemoteId,
    ) -> Result<(), IdentityError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .get_mut(local_id)
            .ok_or_else(|| IdentityError::UnknownPatient(local_id.clone()))?;

        match &record.remote_id {
            Some(existing) if *existing == remote_id => Ok(()),
            Some(existing) => Err(IdentityError::RemoteIdConflict {
                local_id: local_id.clone(),
                existing: existing.clone(),
                attempted: remote_id,
            }),
            None => {
                tracing::info!(
                    local_id = %local_id,
                    remote_id = %remote_id,
                    "Stored patient remote id"
                );
                record.remote_id = Some(remote_id);
                Ok(())
            }
        }
    }

    /// Wait until no other submission flow holds this patient
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such patient was loaded.
    pub async fn lock_patient(&self, local_id: &LocalId) -> Result<PatientGuard, IdentityError> {
        let lock = self
            .flow_locks
            .get(local_id)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(local_id.clone()))?;
        let guard = lock.lock_owned().await;
        Ok(PatientGuard {
            local_id: local_id.clone(),
            _guard: guard,
        })
    }

    /// `(full name, local id)` pairs in roster order
    pub fn listing(&self) -> Vec<(String, LocalId)> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        self.roster_order
            .iter()
            .filter_map(|id| records.get(id).map(|r| (r.name.text.clone(), id.clone())))
            .collect()
    }

    /// Local identifier at a 1-based roster position
    pub fn local_id_at(&self, position: usize) -> Option<&LocalId> {
        position
            .checked_sub(1)
            .and_then(|index| self.roster_order.get(index))
    }

    pub fn len(&self) -> usize {
        self.roster_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster_order.is_empty()
    }
}
