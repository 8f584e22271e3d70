//! Seam between the sync core and the remote store

use crate::core::bundle::{SubmissionOutcome, SubmissionUnit};
use crate::domain::ids::RemoteId;
use crate::domain::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Sends one submission unit and returns the server's per-entry results
///
/// Implementations must return entries in request order and must report a
/// count mismatch as `SubmissionError::ProtocolViolation`. A failed call must
/// leave no partial outcome behind.
#[async_trait]
pub trait BundleSubmitter: Send + Sync {
    async fn submit(&self, unit: &SubmissionUnit) -> Result<SubmissionOutcome>;
}

/// Fetches the server's copy of a registered patient
#[async_trait]
pub trait PatientReader: Send + Sync {
    async fn read_patient(&self, remote_id: &RemoteId) -> Result<Value>;
}
