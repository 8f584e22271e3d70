//! End-to-end sync flows against an in-memory submitter
//!
//! Covers first contact (transaction), follow-up sends (batch), partial
//! failures and concurrent sends for the same patient.

use async_trait::async_trait;
use chrono::DateTime;
use edgehr::adapters::roster::parse_line;
use edgehr::core::bundle::{ResultEntry, SubmissionMode, SubmissionOutcome, SubmissionUnit};
use edgehr::core::identity::IdentityStore;
use edgehr::core::sync::{BundleSubmitter, SyncCoordinator, SyncSummary};
use edgehr::domain::{
    EdgeError, LocalId, ObservationRecord, PatientRecord, RemoteId, Result, SubjectRef,
    SubmissionError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const MARY: &str = "Mary Johnson | 123 Main Street, Boston, MA, 02142 | 1980-04-12 | female | phone, mobile, 617-231-3345 | http://mgb.org, 356-444-9972";
const JOHN: &str = "John Smith | 9 Elm Street, Cambridge, MA, 02139 | 1975-11-02 | male | phone, home, 617-555-0100 | http://mgb.org, 100-200-3000";

fn roster() -> Vec<PatientRecord> {
    vec![parse_line(MARY).unwrap(), parse_line(JOHN).unwrap()]
}

fn observations(local_id: &LocalId, values: &[f64]) -> Vec<ObservationRecord> {
    let effective = DateTime::parse_from_rfc3339("2025-03-14T06:23:11-05:00").unwrap();
    values
        .iter()
        .map(|v| ObservationRecord::new(local_id.clone(), *v, effective))
        .collect()
}

/// Records every unit and answers like a FHIR server would
///
/// Patients get `P<n>` ids, observations `O<n>`. Observation values listed
/// in `reject_values` come back as `400` entries. The first
/// `transport_failures` calls fail before reaching the server.
#[derive(Default)]
struct RecordingServer {
    units: Mutex<Vec<SubmissionUnit>>,
    next_id: AtomicUsize,
    reject_values: Vec<f64>,
    delay: Option<Duration>,
    transport_failures: AtomicUsize,
}

#[async_trait]
impl BundleSubmitter for RecordingServer {
    async fn submit(&self, unit: &SubmissionUnit) -> Result<SubmissionOutcome> {
        self.units.lock().unwrap().push(unit.clone());
        if self
            .transport_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(SubmissionError::Transport("connection reset by peer".into()).into());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let entries = unit
            .entries
            .iter()
            .map(|entry| {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                match &entry.resource {
                    edgehr::core::bundle::EntryResource::Patient(_) => {
                        ResultEntry::created(RemoteId::new(format!("P{n}")).unwrap())
                    }
                    edgehr::core::bundle::EntryResource::Observation(obs)
                        if self.reject_values.contains(&obs.value) =>
                    {
                        ResultEntry::failed("400 Bad Request", Some("value out of range".into()))
                    }
                    edgehr::core::bundle::EntryResource::Observation(_) => {
                        ResultEntry::created(RemoteId::new(format!("O{n}")).unwrap())
                    }
                }
            })
            .collect();
        Ok(SubmissionOutcome::new(entries))
    }
}

fn setup(server: RecordingServer) -> (Arc<RecordingServer>, SyncCoordinator) {
    let server = Arc::new(server);
    let store = Arc::new(IdentityStore::new(roster()).unwrap());
    let coordinator = SyncCoordinator::new(store, server.clone());
    (server, coordinator)
}

fn mary() -> LocalId {
    LocalId::new("356-444-9972").unwrap()
}

#[tokio::test]
async fn test_first_contact_sends_linked_transaction() {
    let (server, coordinator) = setup(RecordingServer::default());

    let report = coordinator
        .sync_patient(&mary(), observations(&mary(), &[72.0, 75.0]))
        .await
        .unwrap();

    assert_eq!(report.bundle_type, "transaction");
    assert_eq!(
        report.resolution.patient_remote_id,
        Some(RemoteId::new("P1").unwrap())
    );
    assert_eq!(report.resolution.created_observations(), 2);
    assert_eq!(
        coordinator.store().remote_id_of(&mary()).unwrap(),
        Some(RemoteId::new("P1").unwrap())
    );

    let units = server.units.lock().unwrap();
    let unit = &units[0];
    assert_eq!(unit.entry_count(), 3);

    let SubmissionMode::Transaction { patient_ref } = &unit.mode else {
        panic!("expected a transaction, got {:?}", unit.mode);
    };
    assert_eq!(unit.entries[0].full_url.as_ref(), Some(patient_ref));
    assert!(patient_ref.as_str().starts_with("urn:uuid:"));

    for entry in &unit.entries[1..] {
        let edgehr::core::bundle::EntryResource::Observation(obs) = &entry.resource else {
            panic!("expected an observation entry");
        };
        assert_eq!(obs.subject, SubjectRef::Temporary(patient_ref.clone()));
        let own_ref = entry.full_url.as_ref().unwrap();
        assert_ne!(own_ref, patient_ref);
    }
}

#[tokio::test]
async fn test_known_patient_sends_batch_with_remote_subject() {
    let (server, coordinator) = setup(RecordingServer::default());

    coordinator
        .sync_patient(&mary(), observations(&mary(), &[72.0]))
        .await
        .unwrap();
    let report = coordinator
        .sync_patient(&mary(), observations(&mary(), &[80.0, 81.0, 82.0]))
        .await
        .unwrap();

    assert_eq!(report.bundle_type, "batch");
    assert_eq!(report.resolution.patient_remote_id, None);
    assert_eq!(report.resolution.created_observations(), 3);

    let units = server.units.lock().unwrap();
    let batch = &units[1];
    assert_eq!(batch.entry_count(), 3);
    for entry in &batch.entries {
        assert!(entry.full_url.is_none());
        let edgehr::core::bundle::EntryResource::Observation(obs) = &entry.resource else {
            panic!("batch must hold observations only");
        };
        assert_eq!(obs.subject, SubjectRef::Remote(RemoteId::new("P1").unwrap()));
    }
}

#[tokio::test]
async fn test_batch_failures_are_reported_per_entry() {
    let (_, coordinator) = setup(RecordingServer {
        reject_values: vec![999.0],
        ..RecordingServer::default()
    });

    coordinator
        .sync_patient(&mary(), observations(&mary(), &[70.0]))
        .await
        .unwrap();
    let report = coordinator
        .sync_patient(&mary(), observations(&mary(), &[71.0, 999.0, 73.0]))
        .await
        .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.resolution.created_observations(), 2);
    assert_eq!(report.resolution.failures.len(), 1);
    let failure = &report.resolution.failures[0];
    assert_eq!(failure.index, 1);
    assert_eq!(failure.status, "400 Bad Request");
    assert_eq!(failure.diagnostics.as_deref(), Some("value out of range"));
}

#[tokio::test]
async fn test_concurrent_first_contact_registers_patient_once() {
    let (server, coordinator) = setup(RecordingServer {
        delay: Some(Duration::from_millis(20)),
        ..RecordingServer::default()
    });

    let (mary_a, mary_b) = (mary(), mary());
    let (first, second) = tokio::join!(
        coordinator.sync_patient(&mary_a, observations(&mary(), &[70.0])),
        coordinator.sync_patient(&mary_b, observations(&mary(), &[71.0])),
    );
    first.unwrap();
    second.unwrap();

    let units = server.units.lock().unwrap();
    let transactions = units.iter().filter(|u| u.is_transaction()).count();
    assert_eq!(transactions, 1);
    assert_eq!(units.len(), 2);
}

#[tokio::test]
async fn test_sync_many_covers_whole_roster() {
    let (_, coordinator) = setup(RecordingServer::default());
    let john = LocalId::new("100-200-3000").unwrap();

    let results = coordinator
        .sync_many(
            vec![
                (mary(), observations(&mary(), &[70.0, 71.0])),
                (john.clone(), observations(&john, &[65.0])),
            ],
            2,
        )
        .await;

    let summary = SyncSummary::from_results(&results);
    assert!(summary.is_successful());
    assert_eq!(summary.patients, 2);
    assert_eq!(summary.patients_created, 2);
    assert_eq!(summary.observations_sent, 3);
    assert_eq!(summary.observations_created, 3);
}

#[tokio::test]
async fn test_patient_only_transaction_registers_patient() {
    let (server, coordinator) = setup(RecordingServer::default());
    server.next_id.store(1, Ordering::SeqCst);

    let report = coordinator.sync_patient(&mary(), vec![]).await.unwrap();

    assert_eq!(report.bundle_type, "transaction");
    assert_eq!(report.observations_sent, 0);
    assert_eq!(
        report.resolution.patient_remote_id,
        Some(RemoteId::new("P2").unwrap())
    );
    assert!(report.resolution.observation_ids.is_empty());
    assert_eq!(
        coordinator.store().remote_id_of(&mary()).unwrap(),
        Some(RemoteId::new("P2").unwrap())
    );
    assert_eq!(server.units.lock().unwrap()[0].entry_count(), 1);
}

#[tokio::test]
async fn test_resend_after_transport_failure_registers_patient() {
    let (server, coordinator) = setup(RecordingServer {
        transport_failures: AtomicUsize::new(1),
        ..Default::default()
    });

    let err = coordinator
        .sync_patient(&mary(), observations(&mary(), &[72.0]))
        .await
        .unwrap_err();
    let EdgeError::Submission(submission) = err else {
        panic!("expected a submission error, got {err:?}");
    };
    assert!(matches!(submission, SubmissionError::Transport(_)));
    assert!(submission.is_retryable());
    assert_eq!(coordinator.store().remote_id_of(&mary()).unwrap(), None);

    let report = coordinator
        .sync_patient(&mary(), observations(&mary(), &[72.0]))
        .await
        .unwrap();

    // still first contact, so the retry is again a transaction
    assert_eq!(report.bundle_type, "transaction");
    assert_eq!(
        coordinator.store().remote_id_of(&mary()).unwrap(),
        Some(RemoteId::new("P1").unwrap())
    );
    assert_eq!(
        report.resolution.observation_ids,
        vec![RemoteId::new("O2").unwrap()]
    );

    let units = server.units.lock().unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].entries.len(), units[1].entries.len());
}

struct DroppingServer;

#[async_trait]
impl BundleSubmitter for DroppingServer {
    async fn submit(&self, _unit: &SubmissionUnit) -> Result<SubmissionOutcome> {
        // One entry short of whatever was sent
        Ok(SubmissionOutcome::new(vec![ResultEntry::created(
            RemoteId::new("P1").unwrap(),
        )]))
    }
}

#[tokio::test]
async fn test_misaligned_response_records_nothing() {
    let store = Arc::new(IdentityStore::new(roster()).unwrap());
    let coordinator = SyncCoordinator::new(store, Arc::new(DroppingServer));

    let err = coordinator
        .sync_patient(&mary(), observations(&mary(), &[70.0]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EdgeError::Submission(SubmissionError::ProtocolViolation {
            submitted: 2,
            returned: 1
        })
    ));
    assert_eq!(coordinator.store().remote_id_of(&mary()).unwrap(), None);
}
