//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Human-readable console output, always on
//! - Optional JSON log files with daily or hourly rotation
//! - Level taken from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use edgehr::logging::init_logging;
//! use edgehr::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Gateway started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a patient sync
///
/// # Example
///
/// ```no_run
/// use edgehr::log_sync_start;
/// use edgehr::domain::LocalId;
///
/// let local_id = LocalId::new("356-444-9972").unwrap();
/// log_sync_start!(&local_id, 10);
/// ```
#[macro_export]
macro_rules! log_sync_start {
    ($local_id:expr, $observations:expr) => {
        tracing::info!(
            local_id = %$local_id,
            observations = $observations,
            "Starting patient sync"
        );
    };
}

/// Log the completion of a patient sync
///
/// # Example
///
/// ```no_run
/// use edgehr::log_sync_complete;
/// use edgehr::domain::LocalId;
/// use std::time::Duration;
///
/// let local_id = LocalId::new("356-444-9972").unwrap();
/// log_sync_complete!(&local_id, 10, 0, Duration::from_millis(250));
/// ```
#[macro_export]
macro_rules! log_sync_complete {
    ($local_id:expr, $created:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            local_id = %$local_id,
            created = $created,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Patient sync completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use edgehr::log_error_with_context;
/// use edgehr::domain::EdgeError;
///
/// let error = EdgeError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
