//! Preview command implementation
//!
//! Assembles the bundle a `post` would send and prints it without sending.

use super::{open_session, ObservationArgs};
use crate::adapters::fhir::Bundle;
use crate::cli::session::exit_code_for;
use crate::core::bundle::SubmissionUnit;
use crate::domain::Result;
use clap::Args;
use std::io::Write;

/// Entries printed in full
const SHOWN_ENTRIES: usize = 2;

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Roster position of the patient (1-based)
    #[arg(short, long, value_name = "N")]
    pub patient: usize,

    #[command(flatten)]
    pub source: ObservationArgs,
}

impl PreviewArgs {
    /// Execute the preview command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut session = match open_session(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let unit = match session
            .patient_at(self.patient)
            .and_then(|id| {
                let observations = session.observations(&id, self.source.source())?;
                session.coordinator().preview(&id, observations)
            }) {
            Ok(unit) => unit,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        write_preview(&mut std::io::stdout(), &unit)?;
        Ok(0)
    }
}

/// Entry count followed by the first entries as pretty JSON
pub(crate) fn write_preview(out: &mut impl Write, unit: &SubmissionUnit) -> Result<()> {
    let bundle = Bundle::from_unit(unit)?;
    writeln!(
        out,
        "📦 {} bundle with {} entries ({} observations)",
        bundle.bundle_type,
        bundle.entry.len(),
        unit.observation_count()
    )?;

    let shown = &bundle.entry[..bundle.entry.len().min(SHOWN_ENTRIES)];
    writeln!(out, "{}", serde_json::to_string_pretty(shown)?)?;
    if bundle.entry.len() > SHOWN_ENTRIES {
        writeln!(out, "... and {} more", bundle.entry.len() - SHOWN_ENTRIES)?;
    }
    Ok(())
}
