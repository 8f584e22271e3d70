//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "edgehr.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing edgehr configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your FHIR server URL", self.output);
                println!("  2. Set EDGEHR_FHIR_USERNAME and EDGEHR_FHIR_PASSWORD (or a .env file)");
                println!("  3. Validate configuration: edgehr validate-config");
                println!("  4. List patients: edgehr patients");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_config() -> String {
        r#"# edgehr Configuration File
# Syncs heart-rate observations to a FHIR R4 server

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[fhir]
# Bundles are POSTed to this base URL
base_url = "http://127.0.0.1:8080/csp/healthshare/demo/fhir/r4/"

# Basic authentication (use environment variables)
username = "${EDGEHR_FHIR_USERNAME}"
password = "${EDGEHR_FHIR_PASSWORD}"

timeout_seconds = 60
connect_timeout_seconds = 10
tls_verify = true

[roster]
# One patient per line: Name | Address | Date of Birth | Gender | Telecom | Identifier
path = "patients.txt"

[observations]
# One <local id without dashes>.txt file per patient
series_dir = "series"

# Synthetic observations
max_count = 1000
low_value = 60
high_value = 120

# generate-series
series_readings = 100
series_year = 2025
series_month = 3

[sync]
max_concurrent_patients = 4

[logging]
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
