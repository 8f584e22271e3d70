// edgehr - Heart-rate observation gateway for FHIR R4 servers
// Copyright (c) 2025 Edge Gateway Contributors
// Licensed under the MIT License

//! # edgehr - FHIR observation gateway
//!
//! edgehr reads a patient roster, gathers heart-rate readings for each
//! patient and sends them to a FHIR R4 server as bundles.
//!
//! ## Overview
//!
//! The first time a patient is sent, the patient and its observations go
//! together in one **transaction** bundle. Observations reference the patient
//! through a `urn:uuid:` temporary reference and the server assigns the real
//! id. Every later send for that patient is a **batch** of observations that
//! reference `Patient/<id>` directly.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and interactive menu
//! - [`core`] - Identity store, bundle assembly, response resolution, sync
//! - [`adapters`] - FHIR client, roster parser, observation sources
//! - [`domain`] - Identifiers, records and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgehr::adapters::fhir::FhirClient;
//! use edgehr::adapters::roster::load_roster;
//! use edgehr::config::load_config;
//! use edgehr::core::identity::IdentityStore;
//! use edgehr::core::sync::SyncCoordinator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("edgehr.toml")?;
//!     let store = Arc::new(IdentityStore::new(load_roster(&config.roster.path)?)?);
//!     let client = Arc::new(FhirClient::new(config.fhir.clone())?);
//!     let coordinator = SyncCoordinator::new(store.clone(), client);
//!
//!     let local_id = store.local_id_at(1).ok_or("empty roster")?.clone();
//!     let report = coordinator.sync_patient(&local_id, Vec::new()).await?;
//!     println!("Sent a {} bundle", report.bundle_type);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`], whose error is [`domain::EdgeError`].
//! Identity and submission failures convert into it with `?`:
//!
//! ```rust,no_run
//! use edgehr::domain::EdgeError;
//!
//! fn retry_worthwhile(err: &EdgeError) -> bool {
//!     matches!(err, EdgeError::Submission(e) if e.is_retryable())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
