//! Domain error types
//!
//! This module defines the error hierarchy for edgehr.
//! All errors are domain-specific and don't expose third-party types.

use super::ids::{LocalId, RemoteId};
use thiserror::Error;

/// Main edgehr error type
///
/// This is the primary error type used throughout the application.
/// It wraps the identity and submission error families and provides
/// context for the collaborators around them.
#[derive(Debug, Error)]
pub enum EdgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Identity store misuse
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Remote store submission errors
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// Patient roster loading errors
    #[error("Roster error: {0}")]
    Roster(String),

    /// Observation source errors
    #[error("Observation source error: {0}")]
    Observation(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Identity store errors
///
/// These indicate a programming error in the caller (asking about a patient
/// that was never loaded) and are not meant to be caught and retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No patient with this local identifier was loaded
    #[error("Patient not found: {0}")]
    NotFound(LocalId),

    /// Attempted to record a remote id for a patient that is not in the store
    #[error("Unknown patient, unable to store remote id: {0}")]
    UnknownPatient(LocalId),

    /// A different remote id is already recorded for this patient
    #[error("Patient {local_id} already has remote id {existing}, refusing {attempted}")]
    RemoteIdConflict {
        local_id: LocalId,
        existing: RemoteId,
        attempted: RemoteId,
    },

    /// Local identifier appears twice in the roster
    #[error("Duplicate local identifier: {0}")]
    DuplicateLocalId(LocalId),
}

/// Submission errors
///
/// Errors that occur when sending a bundle to the FHIR server.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Network-level failure, including timeouts
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server declined the whole bundle (non-2xx status)
    #[error("Bundle rejected by server: {status} - {body}")]
    Rejected { status: u16, body: String },

    /// The response does not line up entry-for-entry with the request
    #[error("Protocol violation: submitted {submitted} entries, server returned {returned}")]
    ProtocolViolation { submitted: usize, returned: usize },

    /// A 2xx response whose body is not a response bundle
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl SubmissionError {
    /// Whether repeating the same submission may succeed
    ///
    /// Only transport failures qualify. A rejection is most likely a
    /// validation problem and a protocol violation leaves alignment unknown.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmissionError::Transport(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for EdgeError {
    fn from(err: std::io::Error) -> Self {
        EdgeError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for EdgeError {
    fn from(err: serde_json::Error) -> Self {
        EdgeError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for EdgeError {
    fn from(err: toml::de::Error) -> Self {
        EdgeError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(id: &str) -> LocalId {
        LocalId::new(id).unwrap()
    }

    #[test]
    fn test_edge_error_display() {
        let err = EdgeError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_identity_error_conversion() {
        let err: EdgeError = IdentityError::NotFound(local("356-444-9972")).into();
        assert!(matches!(err, EdgeError::Identity(IdentityError::NotFound(_))));
        assert!(err.to_string().contains("356-444-9972"));
    }

    #[test]
    fn test_submission_error_conversion() {
        let err: EdgeError = SubmissionError::Rejected {
            status: 422,
            body: "bad subject".to_string(),
        }
        .into();
        assert!(matches!(err, EdgeError::Submission(_)));
        assert!(err.to_string().contains("422"));
    }

    #[test]
    fn test_protocol_violation_display() {
        let err = SubmissionError::ProtocolViolation {
            submitted: 3,
            returned: 2,
        };
        assert_eq!(
            err.to_string(),
            "Protocol violation: submitted 3 entries, server returned 2"
        );
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(SubmissionError::Transport("reset".to_string()).is_retryable());
        assert!(!SubmissionError::Rejected {
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(!SubmissionError::ProtocolViolation {
            submitted: 1,
            returned: 0
        }
        .is_retryable());
        assert!(!SubmissionError::InvalidResponse("not json".to_string()).is_retryable());
    }

    #[test]
    fn test_remote_id_conflict_display() {
        let err = IdentityError::RemoteIdConflict {
            local_id: local("356-444-9972"),
            existing: RemoteId::new("P1").unwrap(),
            attempted: RemoteId::new("P9").unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("P1"));
        assert!(msg.contains("P9"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: EdgeError = io_err.into();
        assert!(matches!(err, EdgeError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: EdgeError = json_err.into();
        assert!(matches!(err, EdgeError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: EdgeError = toml_err.into();
        assert!(matches!(err, EdgeError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_edge_error_implements_std_error() {
        let err = EdgeError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
