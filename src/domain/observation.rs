//! Heart-rate observation domain model

use super::ids::{LocalId, RemoteId, TempRef};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an observation's subject points at
///
/// Sources produce `Local`; the assembler rewrites it to `Remote` or
/// `Temporary` before the observation enters a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectRef {
    /// The roster identifier, never sent to the server
    Local(LocalId),
    /// `Patient/<remote id>`
    Remote(RemoteId),
    /// `urn:uuid:` of the patient entry in the same transaction
    Temporary(TempRef),
}

impl SubjectRef {
    /// Wire form of the reference, `None` while still unresolved
    pub fn reference(&self) -> Option<String> {
        match self {
            SubjectRef::Local(_) => None,
            SubjectRef::Remote(id) => Some(id.patient_reference()),
            SubjectRef::Temporary(temp) => Some(temp.as_str().to_string()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, SubjectRef::Local(_))
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectRef::Local(id) => write!(f, "local:{id}"),
            SubjectRef::Remote(id) => write!(f, "{}", id.patient_reference()),
            SubjectRef::Temporary(temp) => write!(f, "{temp}"),
        }
    }
}

/// A single heart-rate measurement in beats per minute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub value: f64,
    pub effective: DateTime<FixedOffset>,
    pub subject: SubjectRef,
}

impl ObservationRecord {
    /// New observation for a roster patient, subject not yet resolved
    pub fn new(local_id: LocalId, value: f64, effective: DateTime<FixedOffset>) -> Self {
        Self {
            value,
            effective,
            subject: SubjectRef::Local(local_id),
        }
    }

    /// Replaces the subject reference
    pub fn with_subject(mut self, subject: SubjectRef) -> Self {
        self.subject = subject;
        self
    }
}
