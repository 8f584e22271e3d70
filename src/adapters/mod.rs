//! External system integrations for edgehr.
//!
//! - [`fhir`] - FHIR R4 server client and wire models
//! - [`roster`] - Patient roster file parsing
//! - [`observations`] - Synthetic and file-backed heart-rate readings
//!
//! The sync core only sees these through [`crate::core::sync::BundleSubmitter`]
//! and plain domain records, so every adapter can be swapped for a fake in
//! tests.
//!
//! ```rust,no_run
//! use edgehr::adapters::fhir::FhirClient;
//! use edgehr::config::{secret_string, FhirConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FhirConfig {
//!     base_url: "http://127.0.0.1:8080/csp/healthshare/demo/fhir/r4/".to_string(),
//!     username: "_System".to_string(),
//!     password: secret_string("demo".to_string()),
//!     ..FhirConfig::default()
//! };
//! let client = FhirClient::new(config)?;
//! # Ok(())
//! # }
//! ```

pub mod fhir;
pub mod observations;
pub mod roster;
