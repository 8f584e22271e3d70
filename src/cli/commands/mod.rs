//! CLI command implementations
//!
//! Every command returns its process exit code. Failures that end a command
//! are printed to the user and mapped to a code rather than bubbled up.

pub mod generate;
pub mod init;
pub mod menu;
pub mod patients;
pub mod post;
pub mod preview;
pub mod validate;

use crate::cli::session::{exit_code_for, ObservationSource, Session};
use crate::config::load_config;
use clap::Args;

/// Observation source shared by `preview` and `post`
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ObservationArgs {
    /// Number of synthetic observations to generate
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Read observations from the patient's series file
    #[arg(long)]
    pub from_series: bool,
}

impl ObservationArgs {
    pub fn source(&self) -> ObservationSource {
        match self.count {
            Some(count) => ObservationSource::Synthetic(count),
            None => ObservationSource::Series,
        }
    }
}

/// Load configuration and open a session, or the exit code to stop with
pub(crate) fn open_session(config_path: &str) -> Result<Session, i32> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, config_path = %config_path, "Failed to load configuration");
            eprintln!("❌ {e}");
            return Err(2);
        }
    };

    Session::open(config).map_err(|e| {
        crate::log_error_with_context!(e, "Failed to open session");
        eprintln!("❌ {e}");
        exit_code_for(&e)
    })
}
