//! Response resolution
//!
//! Lines a server outcome up with the unit that produced it and records the
//! patient's remote identifier when a transaction created the patient.

use super::outcome::{ResultEntry, SubmissionOutcome};
use super::unit::{ResourceType, SubmissionMode, SubmissionUnit};
use crate::core::identity::IdentityStore;
use crate::domain::ids::{LocalId, RemoteId};
use crate::domain::{Result, SubmissionError};
use std::sync::Arc;

/// One entry the server declined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// Position in the submitted bundle
    pub index: usize,
    pub resource_type: ResourceType,
    pub status: String,
    pub diagnostics: Option<String>,
}

/// What a submission achieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub local_id: LocalId,
    /// Remote id recorded by this submission; `None` for batches and for
    /// transactions whose patient entry failed
    pub patient_remote_id: Option<RemoteId>,
    /// Ids of the observations the server created, in submission order
    pub observation_ids: Vec<RemoteId>,
    pub failures: Vec<EntryFailure>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn created_observations(&self) -> usize {
        self.observation_ids.len()
    }
}

pub struct ResponseResolver {
    store: Arc<IdentityStore>,
}

impl ResponseResolver {
    pub fn new(store: Arc<IdentityStore>) -> Self {
        Self { store }
    }

    /// Interpret an outcome positionally against its unit
    ///
    /// Entry `i` of the outcome answers entry `i` of the unit. For a
    /// transaction, entry 0 is the patient and its id is written to the
    /// identity store. For a batch every entry, starting at 0, is an
    /// observation.
    ///
    /// # Errors
    ///
    /// - `Submission(ProtocolViolation)` if the outcome length differs from
    ///   the unit length; nothing is recorded in that case
    /// - `Identity(RemoteIdConflict)` if the store already holds a different
    ///   remote id for the patient
    pub fn resolve(
        &self,
        unit: &SubmissionUnit,
        outcome: &SubmissionOutcome,
    ) -> Result<Resolution> {
        if outcome.len() != unit.entry_count() {
            return Err(SubmissionError::ProtocolViolation {
                submitted: unit.entry_count(),
                returned: outcome.len(),
            }
            .into());
        }

        let mut resolution = Resolution {
            local_id: unit.local_id.clone(),
            patient_remote_id: None,
            observation_ids: Vec::with_capacity(unit.observation_count()),
            failures: Vec::new(),
        };

        for (index, (entry, result)) in unit.entries.iter().zip(&outcome.entries).enumerate() {
            match result {
                ResultEntry::Created { id } => match entry.resource_type() {
                    ResourceType::Patient => resolution.patient_remote_id = Some(id.clone()),
                    ResourceType::Observation => resolution.observation_ids.push(id.clone()),
                },
                ResultEntry::Failed {
                    status,
                    diagnostics,
                } => {
                    tracing::warn!(
                        local_id = %unit.local_id,
                        index,
                        resource_type = %entry.resource_type(),
                        status = %status,
                        "Server declined bundle entry"
                    );
                    resolution.failures.push(EntryFailure {
                        index,
                        resource_type: entry.resource_type(),
                        status: status.clone(),
                        diagnostics: diagnostics.clone(),
                    });
                }
            }
        }

        if let SubmissionMode::Transaction { .. } = unit.mode {
            if let Some(remote_id) = &resolution.patient_remote_id {
                self.store
                    .record_remote_id(&unit.local_id, remote_id.clone())?;
            }
        }

        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bundle::assembler::BundleAssembler;
    use crate::domain::patient::fixtures::mary_johnson;
    use crate::domain::{EdgeError, IdentityError, ObservationRecord};
    use chrono::DateTime;

    fn observations(local_id: &LocalId, count: usize) -> Vec<ObservationRecord> {
        let effective = DateTime::parse_from_rfc3339("2025-03-14T06:23:11-04:00").unwrap();
        (0..count)
            .map(|_| ObservationRecord::new(local_id.clone(), 72.0, effective))
            .collect()
    }

    fn setup() -> (Arc<IdentityStore>, BundleAssembler, ResponseResolver) {
        let store = Arc::new(IdentityStore::new(vec![mary_johnson()]).unwrap());
        (
            store.clone(),
            BundleAssembler::new(store.clone()),
            ResponseResolver::new(store),
        )
    }

    fn remote(id: &str) -> RemoteId {
        RemoteId::new(id).unwrap()
    }

    #[test]
    fn test_transaction_records_patient_id() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        let unit = assembler
            .assemble(&mary, observations(&mary.local_id, 2))
            .unwrap();
        let outcome = SubmissionOutcome::from_ids(["P1", "O1", "O2"]).unwrap();

        let resolution = resolver.resolve(&unit, &outcome).unwrap();

        assert_eq!(resolution.patient_remote_id, Some(remote("P1")));
        assert_eq!(resolution.observation_ids, vec![remote("O1"), remote("O2")]);
        assert!(resolution.is_complete());
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), Some(remote("P1")));
    }

    #[test]
    fn test_batch_resolution_starts_at_first_entry() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        store.record_remote_id(&mary.local_id, remote("P1")).unwrap();

        let unit = assembler
            .assemble(&mary, observations(&mary.local_id, 3))
            .unwrap();
        let outcome = SubmissionOutcome::from_ids(["O7", "O8", "O9"]).unwrap();

        let resolution = resolver.resolve(&unit, &outcome).unwrap();

        // every batch entry is an observation, including entry 0
        assert_eq!(
            resolution.observation_ids,
            vec![remote("O7"), remote("O8"), remote("O9")]
        );
        assert_eq!(resolution.patient_remote_id, None);
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), Some(remote("P1")));
    }

    #[test]
    fn test_count_mismatch_is_protocol_violation() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        let unit = assembler
            .assemble(&mary, observations(&mary.local_id, 2))
            .unwrap();
        let outcome = SubmissionOutcome::from_ids(["P1", "O1"]).unwrap();

        let err = resolver.resolve(&unit, &outcome).unwrap_err();

        assert!(matches!(
            err,
            EdgeError::Submission(SubmissionError::ProtocolViolation {
                submitted: 3,
                returned: 2
            })
        ));
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), None);
    }

    #[test]
    fn test_failed_observation_is_reported_and_patient_kept() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        let unit = assembler
            .assemble(&mary, observations(&mary.local_id, 2))
            .unwrap();
        let outcome = SubmissionOutcome::new(vec![
            ResultEntry::created(remote("P1")),
            ResultEntry::failed("400 Bad Request", Some("bad value".to_string())),
            ResultEntry::created(remote("O2")),
        ]);

        let resolution = resolver.resolve(&unit, &outcome).unwrap();

        assert!(!resolution.is_complete());
        assert_eq!(resolution.failures.len(), 1);
        assert_eq!(resolution.failures[0].index, 1);
        assert_eq!(resolution.failures[0].resource_type, ResourceType::Observation);
        assert_eq!(resolution.created_observations(), 1);
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), Some(remote("P1")));
    }

    #[test]
    fn test_failed_patient_entry_records_nothing() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        let unit = assembler.assemble(&mary, vec![]).unwrap();
        let outcome = SubmissionOutcome::new(vec![ResultEntry::failed("422", None)]);

        let resolution = resolver.resolve(&unit, &outcome).unwrap();

        assert_eq!(resolution.patient_remote_id, None);
        assert_eq!(resolution.failures[0].resource_type, ResourceType::Patient);
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), None);
    }

    #[test]
    fn test_conflicting_patient_id_propagates() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        let unit = assembler.assemble(&mary, vec![]).unwrap();
        store.record_remote_id(&mary.local_id, remote("P1")).unwrap();

        let outcome = SubmissionOutcome::from_ids(["P2"]).unwrap();
        let err = resolver.resolve(&unit, &outcome).unwrap_err();

        assert!(matches!(
            err,
            EdgeError::Identity(IdentityError::RemoteIdConflict { .. })
        ));
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), Some(remote("P1")));
    }

    #[test]
    fn test_entry_without_id_keeps_patient_id() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        let unit = assembler
            .assemble(&mary, observations(&mary.local_id, 1))
            .unwrap();
        let outcome = SubmissionOutcome::new(vec![
            ResultEntry::created(remote("P1")),
            ResultEntry::failed("201", Some("no resource id or location".to_string())),
        ]);

        let resolution = resolver.resolve(&unit, &outcome).unwrap();

        assert_eq!(resolution.patient_remote_id, Some(remote("P1")));
        assert_eq!(resolution.failures.len(), 1);
        assert_eq!(resolution.failures[0].index, 1);
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), Some(remote("P1")));
    }

    #[test]
    fn test_patient_only_transaction_records_id() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        let unit = assembler.assemble(&mary, vec![]).unwrap();
        assert!(matches!(unit.mode, SubmissionMode::Transaction { .. }));

        let outcome = SubmissionOutcome::from_ids(["P2"]).unwrap();
        let resolution = resolver.resolve(&unit, &outcome).unwrap();

        assert_eq!(resolution.patient_remote_id, Some(remote("P2")));
        assert!(resolution.observation_ids.is_empty());
        assert!(resolution.is_complete());
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), Some(remote("P2")));
    }

    #[test]
    fn test_resubmitted_unit_resolves_after_transport_failure() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        // a transport failure leaves the unit unresolved and the store untouched
        let unit = assembler
            .assemble(&mary, observations(&mary.local_id, 1))
            .unwrap();
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), None);

        let outcome = SubmissionOutcome::from_ids(["P1", "O1"]).unwrap();
        let resolution = resolver.resolve(&unit, &outcome).unwrap();

        assert_eq!(resolution.patient_remote_id, Some(remote("P1")));
        assert_eq!(resolution.observation_ids, vec![remote("O1")]);
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), Some(remote("P1")));

        // the same answer arriving twice is not a conflict
        resolver.resolve(&unit, &outcome).unwrap();
        assert_eq!(store.remote_id_of(&mary.local_id).unwrap(), Some(remote("P1")));
    }

    #[test]
    fn test_empty_batch_with_empty_outcome() {
        let (store, assembler, resolver) = setup();
        let mary = mary_johnson();
        store.record_remote_id(&mary.local_id, remote("P1")).unwrap();
        let unit = assembler.assemble(&mary, vec![]).unwrap();

        let resolution = resolver
            .resolve(&unit, &SubmissionOutcome::default())
            .unwrap();
        assert!(resolution.observation_ids.is_empty());
        assert!(resolution.is_complete());
    }
}
