//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the edgehr configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  FHIR Server: {}", config.fhir.base_url);
        println!("  FHIR Username: {}", config.fhir.username);
        println!("  TLS Verify: {}", config.fhir.tls_verify);
        println!("  Timeout: {}s", config.fhir.timeout_seconds);
        println!("  Roster: {}", config.roster.path);
        println!("  Series Directory: {}", config.observations.series_dir);
        println!(
            "  Synthetic Values: {}..={} (max {} per bundle)",
            config.observations.low_value,
            config.observations.high_value,
            config.observations.max_count
        );
        println!(
            "  Concurrent Patients: {}",
            config.sync.max_concurrent_patients
        );
        println!();
        Ok(0)
    }
}
