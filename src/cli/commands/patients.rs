//! Patients command implementation
//!
//! Lists the roster, or dumps one patient's resource field by field. With
//! `--remote-id` the resource is read from the FHIR server instead.

use crate::adapters::fhir::{patient_resource, FhirClient};
use crate::adapters::roster::load_roster;
use crate::cli::render::print_resource;
use crate::cli::session::exit_code_for;
use crate::config::{load_config, EdgeConfig};
use crate::core::identity::IdentityStore;
use crate::domain::ids::RemoteId;
use crate::domain::{EdgeError, Result};
use clap::Args;

/// Arguments for the patients command
#[derive(Args, Debug)]
pub struct PatientsArgs {
    /// Show every field of the patient at this roster position (1-based)
    #[arg(short, long, value_name = "N")]
    pub show: Option<usize>,

    /// Read the patient with this server id and show every field
    #[arg(long, value_name = "ID", conflicts_with = "show")]
    pub remote_id: Option<String>,
}

impl PatientsArgs {
    /// Execute the patients command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        if let Some(remote_id) = &self.remote_id {
            return match show_remote(&config, remote_id).await {
                Ok(()) => Ok(0),
                Err(e) => {
                    crate::log_error_with_context!(e, "Failed to read patient from server");
                    eprintln!("❌ {e}");
                    Ok(exit_code_for(&e))
                }
            };
        }

        let patients = match load_roster(&config.roster.path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };
        let store = IdentityStore::new(patients)?;

        match self.show {
            None => {
                println!("👥 Patients in {}:", config.roster.path);
                for (position, (name, local_id)) in store.listing().iter().enumerate() {
                    println!("  {:>3}. {name} ({local_id})", position + 1);
                }
                Ok(0)
            }
            Some(position) => {
                let Some(local_id) = store.local_id_at(position) else {
                    eprintln!("❌ No patient number {position} (roster has {})", store.len());
                    return Ok(2);
                };
                let record = store.lookup(local_id)?;
                println!("🧑 Patient {position}: {}", record.name.text);
                print_resource(&patient_resource(&record));
                Ok(0)
            }
        }
    }
}

async fn show_remote(config: &EdgeConfig, remote_id: &str) -> Result<()> {
    let remote_id = RemoteId::new(remote_id).map_err(EdgeError::Validation)?;
    let client = FhirClient::new(config.fhir.clone())?;
    let resource = client.read_patient(&remote_id).await?;
    println!("🌐 Patient/{remote_id} from {}", client.base_url());
    print_resource(&resource);
    Ok(())
}
