//! Bundle assembly and response resolution
//!
//! - [`assembler`] - Builds a transaction or batch unit for one patient
//! - [`resolver`] - Aligns the server's per-entry results with the unit
//! - [`unit`] / [`outcome`] - The data passed between them

pub mod assembler;
pub mod outcome;
pub mod resolver;
pub mod unit;

pub use assembler::BundleAssembler;
pub use outcome::{ResultEntry, SubmissionOutcome};
pub use resolver::{EntryFailure, Resolution, ResponseResolver};
pub use unit::{Entry, EntryResource, ResourceType, SubmissionMode, SubmissionUnit};
