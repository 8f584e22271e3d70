//! Domain models and types for edgehr.
//!
//! This module contains the domain models shared by the sync core and its
//! collaborators.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`LocalId`], [`RemoteId`], [`TempRef`])
//! - **Domain models** ([`PatientRecord`], [`ObservationRecord`])
//! - **Error types** ([`EdgeError`], [`IdentityError`], [`SubmissionError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are newtypes so a roster identifier can never be sent where a
//! server identifier is expected:
//!
//! ```rust
//! use edgehr::domain::{LocalId, RemoteId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let local = LocalId::new("356-444-9972")?;
//! let remote = RemoteId::new("1842")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: RemoteId = local;  // Compile error!
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod observation;
pub mod patient;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{EdgeError, IdentityError, SubmissionError};
pub use ids::{LocalId, RemoteId, TempRef};
pub use observation::{ObservationRecord, SubjectRef};
pub use patient::{Address, ContactPoint, Gender, HumanName, PatientRecord, PatientRecordBuilder};
pub use result::Result;
