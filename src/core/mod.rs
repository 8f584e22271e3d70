//! Core sync logic for edgehr.
//!
//! # Modules
//!
//! - [`identity`] - Identity store and per-patient flow locks
//! - [`bundle`] - Bundle assembly and response resolution
//! - [`sync`] - Sync orchestration and summaries
//!
//! # Sync Workflow
//!
//! 1. **Lock**: Take the patient's flow lock
//! 2. **Assemble**: Transaction if the patient is unknown remotely, batch otherwise
//! 3. **Submit**: One request to the FHIR server
//! 4. **Resolve**: Align per-entry results and record the patient's remote id
//!
//! # Example
//!
//! ```rust,no_run
//! use edgehr::adapters::fhir::FhirClient;
//! use edgehr::adapters::roster::load_roster;
//! use edgehr::config::load_config;
//! use edgehr::core::identity::IdentityStore;
//! use edgehr::core::sync::SyncCoordinator;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("edgehr.toml")?;
//! let store = Arc::new(IdentityStore::new(load_roster(&config.roster.path)?)?);
//! let client = Arc::new(FhirClient::new(config.fhir.clone())?);
//! let coordinator = SyncCoordinator::new(store.clone(), client);
//!
//! if let Some(local_id) = store.local_id_at(1) {
//!     let report = coordinator.sync_patient(local_id, Vec::new()).await?;
//!     println!("Bundle type: {}", report.bundle_type);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod identity;
pub mod sync;
