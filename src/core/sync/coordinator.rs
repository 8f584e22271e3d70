//! Sync coordinator - drives one submission flow per patient
//!
//! A flow is lookup, assemble, submit, resolve. The patient lock is held
//! for the whole flow so two flows for the same patient can never both see
//! "remote id unknown" and register the patient twice.

use super::submitter::BundleSubmitter;
use super::summary::SyncReport;
use crate::core::bundle::{BundleAssembler, ResponseResolver, SubmissionUnit};
use crate::core::identity::IdentityStore;
use crate::domain::ids::LocalId;
use crate::domain::{ObservationRecord, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;

pub struct SyncCoordinator {
    store: Arc<IdentityStore>,
    assembler: BundleAssembler,
    resolver: ResponseResolver,
    submitter: Arc<dyn BundleSubmitter>,
}

impl SyncCoordinator {
    pub fn new(store: Arc<IdentityStore>, submitter: Arc<dyn BundleSubmitter>) -> Self {
        Self {
            assembler: BundleAssembler::new(store.clone()),
            resolver: ResponseResolver::new(store.clone()),
            store,
            submitter,
        }
    }

    pub fn store(&self) -> &Arc<IdentityStore> {
        &self.store
    }

    /// Assemble the unit a sync would send, without sending it
    pub fn preview(
        &self,
        local_id: &LocalId,
        observations: Vec<ObservationRecord>,
    ) -> Result<SubmissionUnit> {
        let patient = self.store.lookup(local_id)?;
        self.assembler.assemble(&patient, observations)
    }

    /// Submit one patient's observations and record what the server assigned
    ///
    /// On a submission error the identity store is left as it was.
    pub async fn sync_patient(
        &self,
        local_id: &LocalId,
        observations: Vec<ObservationRecord>,
    ) -> Result<SyncReport> {
        let start = Instant::now();
        let _guard = self.store.lock_patient(local_id).await?;

        crate::log_sync_start!(local_id, observations.len());

        let patient = self.store.lookup(local_id)?;
        let unit = self.assembler.assemble(&patient, observations)?;
        let observations_sent = unit.observation_count();

        let outcome = match self.submitter.submit(&unit).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    local_id = %local_id,
                    bundle_type = unit.mode.bundle_type(),
                    error = %e,
                    "Bundle submission failed"
                );
                return Err(e);
            }
        };

        let resolution = self.resolver.resolve(&unit, &outcome)?;

        crate::log_sync_complete!(
            local_id,
            resolution.created_observations(),
            resolution.failures.len(),
            start.elapsed()
        );

        Ok(SyncReport {
            bundle_type: unit.mode.bundle_type(),
            observations_sent,
            resolution,
        })
    }

    /// Sync several patients, at most `concurrency` at a time
    ///
    /// Results come back in completion order. Requests for the same patient
    /// still run one after the other.
    pub async fn sync_many(
        &self,
        requests: Vec<(LocalId, Vec<ObservationRecord>)>,
        concurrency: usize,
    ) -> Vec<(LocalId, Result<SyncReport>)> {
        tracing::info!(
            patients = requests.len(),
            concurrency,
            "Starting multi-patient sync"
        );

        stream::iter(requests)
            .map(|(local_id, observations)| async move {
                let result = self.sync_patient(&local_id, observations).await;
                (local_id, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }
}
