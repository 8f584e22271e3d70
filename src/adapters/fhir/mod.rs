//! FHIR R4 server integration
//!
//! - [`client`] - HTTP client implementing [`BundleSubmitter`](crate::core::sync::BundleSubmitter)
//!   and [`PatientReader`](crate::core::sync::PatientReader)
//! - [`models`] - Bundle wire types and resource JSON

pub mod client;
pub mod models;

pub use client::FhirClient;
pub use models::{observation_resource, patient_resource, Bundle, BundleEntry};
