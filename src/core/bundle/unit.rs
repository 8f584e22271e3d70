//! Submission unit: the bundle sent to the FHIR server in one call
//!
//! Transaction and batch bundles share one type; [`SubmissionMode`] carries
//! what differs between them.

use crate::domain::ids::{LocalId, RemoteId, TempRef};
use crate::domain::{ObservationRecord, PatientRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// FHIR resource types this gateway creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Patient,
    Observation,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Observation => "Observation",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource wrapped by a bundle entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResource {
    Patient(PatientRecord),
    Observation(ObservationRecord),
}

impl EntryResource {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            EntryResource::Patient(_) => ResourceType::Patient,
            EntryResource::Observation(_) => ResourceType::Observation,
        }
    }
}

/// One create instruction inside a bundle
///
/// Every entry is a `POST <ResourceType>`; this gateway only creates.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Temporary reference, present only in transaction bundles
    pub full_url: Option<TempRef>,
    pub resource: EntryResource,
}

impl Entry {
    pub fn resource_type(&self) -> ResourceType {
        self.resource.resource_type()
    }

    /// HTTP verb of the write instruction
    pub fn request_method(&self) -> &'static str {
        "POST"
    }

    /// Target URL of the write instruction, relative to the FHIR base
    pub fn request_url(&self) -> &'static str {
        self.resource_type().as_str()
    }
}

/// How the server must process the unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionMode {
    /// Patient entry first, observations linked to it through `patient_ref`;
    /// all entries succeed or fail together
    Transaction { patient_ref: TempRef },
    /// Observations only, each referencing the already known patient
    Batch { remote_id: RemoteId },
}

impl SubmissionMode {
    /// FHIR `Bundle.type` code
    pub fn bundle_type(&self) -> &'static str {
        match self {
            SubmissionMode::Transaction { .. } => "transaction",
            SubmissionMode::Batch { .. } => "batch",
        }
    }
}

/// Ordered collection of entries for one patient
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionUnit {
    pub local_id: LocalId,
    pub mode: SubmissionMode,
    pub entries: Vec<Entry>,
}

impl SubmissionUnit {
    pub fn is_transaction(&self) -> bool {
        matches!(self.mode, SubmissionMode::Transaction { .. })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of observation entries
    pub fn observation_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.resource_type() == ResourceType::Observation)
            .count()
    }

    /// Index of the first observation entry in `entries`
    ///
    /// Transaction units lead with the patient entry.
    pub fn first_observation_index(&self) -> usize {
        match self.mode {
            SubmissionMode::Transaction { .. } => 1,
            SubmissionMode::Batch { .. } => 0,
        }
    }
}
