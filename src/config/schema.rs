//! Configuration schema types
//!
//! This module defines the configuration structure that maps to `edgehr.toml`.

use crate::config::{secret_string, SecretString};
use serde::{Deserialize, Serialize};

/// Main edgehr configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// FHIR server connection
    pub fhir: FhirConfig,

    /// Patient roster source
    #[serde(default)]
    pub roster: RosterConfig,

    /// Observation sources
    #[serde(default)]
    pub observations: ObservationsConfig,

    /// Multi-patient sync settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EdgeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.fhir.validate()?;
        self.roster.validate()?;
        self.observations.validate()?;
        self.sync.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// FHIR server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhirConfig {
    /// FHIR R4 base URL; bundles are POSTed here
    pub base_url: String,

    /// Username for HTTP Basic authentication
    pub username: String,

    /// Password for HTTP Basic authentication
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// Whole-request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connection establishment timeout
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Only disable against a local server with a self-signed certificate.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl FhirConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err("fhir.base_url cannot be empty".to_string());
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("fhir.base_url '{}' is not a valid URL: {e}", self.base_url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("fhir.base_url must start with http:// or https://".to_string());
        }

        if self.username.is_empty() {
            return Err("fhir.username cannot be empty".to_string());
        }

        if self.password.expose_secret().is_empty() {
            return Err("fhir.password cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("fhir.timeout_seconds must be > 0".to_string());
        }

        if self.connect_timeout_seconds == 0 {
            return Err("fhir.connect_timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for FhirConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/fhir/r4/".to_string(),
            username: String::new(),
            password: secret_string(String::new()),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            tls_verify: true,
        }
    }
}

/// Patient roster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Pipe-delimited roster file
    #[serde(default = "default_roster_path")]
    pub path: String,
}

impl RosterConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("roster.path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: default_roster_path(),
        }
    }
}

/// Observation source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationsConfig {
    /// Directory holding one series file per patient
    #[serde(default = "default_series_dir")]
    pub series_dir: String,

    /// Largest number of synthetic observations per bundle
    #[serde(default = "default_max_count")]
    pub max_count: usize,

    /// Lowest synthetic heart rate (beats/minute)
    #[serde(default = "default_low_value")]
    pub low_value: u32,

    /// Highest synthetic heart rate (beats/minute)
    #[serde(default = "default_high_value")]
    pub high_value: u32,

    /// Readings per generated series file
    #[serde(default = "default_series_readings")]
    pub series_readings: usize,

    /// Year of generated series readings
    #[serde(default = "default_series_year")]
    pub series_year: i32,

    /// Month of generated series readings (1-12)
    #[serde(default = "default_series_month")]
    pub series_month: u32,
}

impl ObservationsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.series_dir.trim().is_empty() {
            return Err("observations.series_dir cannot be empty".to_string());
        }

        if self.max_count == 0 {
            return Err("observations.max_count must be > 0".to_string());
        }

        if self.low_value > self.high_value {
            return Err(format!(
                "observations.low_value ({}) must not exceed observations.high_value ({})",
                self.low_value, self.high_value
            ));
        }

        if self.series_readings == 0 {
            return Err("observations.series_readings must be > 0".to_string());
        }

        if !(1..=12).contains(&self.series_month) {
            return Err(format!(
                "observations.series_month must be between 1 and 12, got {}",
                self.series_month
            ));
        }

        Ok(())
    }
}

impl Default for ObservationsConfig {
    fn default() -> Self {
        Self {
            series_dir: default_series_dir(),
            max_count: default_max_count(),
            low_value: default_low_value(),
            high_value: default_high_value(),
            series_readings: default_series_readings(),
            series_year: default_series_year(),
            series_month: default_series_month(),
        }
    }
}

/// Multi-patient sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Patients submitted in parallel by `post --all`
    #[serde(default = "default_max_concurrent_patients")]
    pub max_concurrent_patients: usize,
}

impl SyncConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_patients == 0 {
            return Err("sync.max_concurrent_patients must be > 0".to_string());
        }
        if self.max_concurrent_patients > 64 {
            return Err("sync.max_concurrent_patients must be <= 64".to_string());
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_patients: default_max_concurrent_patients(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rotating local files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_roster_path() -> String {
    "patients.txt".to_string()
}

fn default_series_dir() -> String {
    "series".to_string()
}

fn default_max_count() -> usize {
    1000
}

fn default_low_value() -> u32 {
    60
}

fn default_high_value() -> u32 {
    120
}

fn default_series_readings() -> usize {
    100
}

fn default_series_year() -> i32 {
    2025
}

fn default_series_month() -> u32 {
    3
}

fn default_max_concurrent_patients() -> usize {
    4
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
