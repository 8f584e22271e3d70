//! Per-entry results returned by the FHIR server

use crate::domain::ids::RemoteId;

/// Result of one submitted entry, in submission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultEntry {
    /// The server created the resource and assigned this id
    Created { id: RemoteId },
    /// The server declined this entry
    Failed {
        status: String,
        diagnostics: Option<String>,
    },
}

impl ResultEntry {
    pub fn created(id: RemoteId) -> Self {
        ResultEntry::Created { id }
    }

    pub fn failed(status: impl Into<String>, diagnostics: Option<String>) -> Self {
        ResultEntry::Failed {
            status: status.into(),
            diagnostics,
        }
    }

    /// Assigned id, `None` for a failed entry
    pub fn remote_id(&self) -> Option<&RemoteId> {
        match self {
            ResultEntry::Created { id } => Some(id),
            ResultEntry::Failed { .. } => None,
        }
    }
}

/// Ordered results for a whole submission unit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionOutcome {
    pub entries: Vec<ResultEntry>,
}

impl SubmissionOutcome {
    pub fn new(entries: Vec<ResultEntry>) -> Self {
        Self { entries }
    }

    /// Outcome where every entry was created with the given ids
    pub fn from_ids<I, S>(ids: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = ids
            .into_iter()
            .map(|id| RemoteId::new(id).map(ResultEntry::created))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, ResultEntry::Failed { .. }))
            .count()
    }
}
