//! Configuration management for edgehr.
//!
//! edgehr reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `EDGEHR_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation before anything connects to the server
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use edgehr::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("edgehr.toml")?;
//! println!("FHIR endpoint: {}", config.fhir.base_url);
//! println!("Roster: {}", config.roster.path);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`FhirConfig`] - FHIR endpoint, Basic credentials, timeouts, TLS
//! - [`RosterConfig`] - Patient roster file
//! - [`ObservationsConfig`] - Synthetic and series observation sources
//! - [`SyncConfig`] - Multi-patient concurrency
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [fhir]
//! base_url = "http://127.0.0.1:8080/csp/healthshare/demo/fhir/r4/"
//! username = "_System"
//! password = "${EDGEHR_FHIR_PASSWORD}"
//!
//! [roster]
//! path = "patients.txt"
//!
//! [observations]
//! series_dir = "series"
//! max_count = 1000
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, EdgeConfig, FhirConfig, LoggingConfig, ObservationsConfig, RosterConfig,
    SyncConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
