//! Post command implementation
//!
//! Syncs one patient, or the whole roster, to the FHIR server.

use super::{open_session, ObservationArgs};
use crate::cli::session::{exit_code_for, write_report, Session};
use crate::core::sync::{SyncReport, SyncSummary};
use crate::domain::ids::LocalId;
use crate::domain::{EdgeError, Result, SubmissionError};
use clap::{ArgGroup, Args};
use std::io::Write;
use std::time::Instant;

/// Arguments for the post command
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["patient", "all"])))]
pub struct PostArgs {
    /// Roster position of the patient (1-based)
    #[arg(short, long, value_name = "N")]
    pub patient: Option<usize>,

    /// Post every patient in the roster
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub source: ObservationArgs,
}

impl PostArgs {
    /// Execute the post command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut session = match open_session(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let mut out = std::io::stdout();
        match self.patient {
            Some(position) => post_one(&mut session, position, &self.source, &mut out).await,
            None => post_all(&mut session, &self.source, &mut out).await,
        }
    }
}

pub(crate) async fn post_one(
    session: &mut Session,
    position: usize,
    source: &ObservationArgs,
    out: &mut impl Write,
) -> anyhow::Result<i32> {
    match sync_position(session, position, source).await {
        Ok(report) => {
            write_report(out, &report)?;
            Ok(if report.is_complete() { 0 } else { 1 })
        }
        Err(e) => {
            writeln!(out, "❌ {e}")?;
            Ok(exit_code_for(&e))
        }
    }
}

async fn sync_position(
    session: &mut Session,
    position: usize,
    source: &ObservationArgs,
) -> Result<SyncReport> {
    let local_id = session.patient_at(position)?;
    let observations = session.observations(&local_id, source.source())?;
    session
        .coordinator()
        .sync_patient(&local_id, observations)
        .await
}

pub(crate) async fn post_all(
    session: &mut Session,
    source: &ObservationArgs,
    out: &mut impl Write,
) -> anyhow::Result<i32> {
    let start = Instant::now();
    let listing = session.store().listing();

    let mut requests = Vec::with_capacity(listing.len());
    let mut results: Vec<(LocalId, Result<SyncReport>)> = Vec::new();
    for (_, local_id) in listing {
        match session.observations(&local_id, source.source()) {
            Ok(observations) => requests.push((local_id, observations)),
            Err(e) => {
                tracing::warn!(local_id = %local_id, error = %e, "Skipping patient");
                results.push((local_id, Err(e)));
            }
        }
    }

    let concurrency = session.config().sync.max_concurrent_patients;
    results.extend(
        session
            .coordinator()
            .sync_many(requests, concurrency)
            .await,
    );

    for (local_id, result) in &results {
        match result {
            Ok(report) => write_report(out, report)?,
            Err(e) => writeln!(out, "❌ {local_id}: {e}")?,
        }
    }

    let summary = SyncSummary::from_results(&results).with_duration(start.elapsed());
    summary.log_summary();

    writeln!(out)?;
    writeln!(out, "📊 Sync Summary:")?;
    writeln!(out, "  Patients: {}", summary.patients)?;
    writeln!(out, "  Patients registered: {}", summary.patients_created)?;
    writeln!(out, "  Observations sent: {}", summary.observations_sent)?;
    writeln!(out, "  Observations created: {}", summary.observations_created)?;
    writeln!(out, "  Entry failures: {}", summary.entry_failures)?;
    writeln!(out, "  Errors: {}", summary.errors.len())?;
    writeln!(out, "  Duration: {:.2}s", summary.duration.as_secs_f64())?;

    Ok(summary_exit_code(&summary, &results))
}

fn summary_exit_code(summary: &SyncSummary, results: &[(LocalId, Result<SyncReport>)]) -> i32 {
    if summary.is_successful() {
        return 0;
    }
    let all_transport = !results.is_empty()
        && results.iter().all(|(_, r)| {
            matches!(r, Err(EdgeError::Submission(SubmissionError::Transport(_))))
        });
    if all_transport {
        4
    } else {
        1
    }
}
