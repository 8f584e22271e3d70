//! Interactive menu
//!
//! Remote ids recorded while the menu runs stay in the session, so posting
//! the same patient twice sends a transaction and then a batch.

use super::open_session;
use super::preview::write_preview;
use crate::adapters::fhir::patient_resource;
use crate::cli::render::flatten_fields;
use crate::cli::session::{write_report, ObservationSource, Session};
use crate::domain::ids::LocalId;
use crate::domain::Result;
use clap::Args;
use std::io::{BufRead, Write};

/// Arguments for the menu command
#[derive(Args, Debug)]
pub struct MenuArgs {}

impl MenuArgs {
    /// Execute the menu command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut session = match open_session(config_path) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let stdin = std::io::stdin();
        run_menu(&mut session, &mut stdin.lock(), &mut std::io::stdout()).await?;
        Ok(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    ListPatients,
    ShowPatient,
    PreviewSeries,
    PostSeries,
    PreviewSynthetic,
    PostSynthetic,
    ShowRemotePatient,
    Quit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::ListPatients),
            "2" => Some(Self::ShowPatient),
            "3" => Some(Self::PreviewSeries),
            "4" => Some(Self::PostSeries),
            "5" => Some(Self::PreviewSynthetic),
            "6" => Some(Self::PostSynthetic),
            "7" => Some(Self::ShowRemotePatient),
            "q" | "Q" | "0" => Some(Self::Quit),
            _ => None,
        }
    }
}

fn write_options(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "1. List patients")?;
    writeln!(out, "2. Show patient")?;
    writeln!(out, "3. Create bundle from series file")?;
    writeln!(out, "4. Post bundle from series file")?;
    writeln!(out, "5. Create bundle of synthetic observations")?;
    writeln!(out, "6. Post bundle of synthetic observations")?;
    writeln!(out, "7. Show patient from server")?;
    writeln!(out, "q. Quit")?;
    Ok(())
}

/// Print `label` and read one line; `None` at end of input
fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str) -> std::io::Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Drive the menu until the user quits or input ends
pub async fn run_menu(
    session: &mut Session,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    loop {
        write_options(out)?;
        let Some(line) = prompt(input, out, "Choose an option: ")? else {
            break;
        };
        let Some(choice) = Choice::parse(&line) else {
            writeln!(out, "Unknown option '{line}'")?;
            continue;
        };

        match choice {
            Choice::Quit => break,
            Choice::ListPatients => {
                for (position, (name, local_id)) in session.store().listing().iter().enumerate() {
                    writeln!(out, "{:>3}. {name} ({local_id})", position + 1)?;
                }
            }
            Choice::ShowPatient => {
                let Some(local_id) = ask_patient(session, input, out)? else {
                    continue;
                };
                let resource = patient_resource(&session.store().lookup(&local_id)?);
                for field in flatten_fields(&resource) {
                    writeln!(out, "  {field}")?;
                }
            }
            Choice::ShowRemotePatient => {
                let Some(local_id) = ask_patient(session, input, out)? else {
                    continue;
                };
                match session.remote_patient(&local_id).await {
                    Ok(resource) => {
                        for field in flatten_fields(&resource) {
                            writeln!(out, "  {field}")?;
                        }
                    }
                    Err(e) => writeln!(out, "❌ {e}")?,
                }
            }
            Choice::PreviewSeries | Choice::PostSeries => {
                let Some(local_id) = ask_patient(session, input, out)? else {
                    continue;
                };
                let post = choice == Choice::PostSeries;
                act(session, &local_id, ObservationSource::Series, post, out).await?;
            }
            Choice::PreviewSynthetic | Choice::PostSynthetic => {
                let Some(local_id) = ask_patient(session, input, out)? else {
                    continue;
                };
                let Some(count) = ask_count(session.max_count(), input, out)? else {
                    continue;
                };
                let post = choice == Choice::PostSynthetic;
                act(session, &local_id, ObservationSource::Synthetic(count), post, out).await?;
            }
        }
    }

    writeln!(out, "👋 Bye")?;
    Ok(())
}

fn ask_patient(
    session: &Session,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<Option<LocalId>> {
    let label = format!("Patient number (1-{}): ", session.store().len());
    let Some(line) = prompt(input, out, &label)? else {
        return Ok(None);
    };
    let picked = line
        .parse::<usize>()
        .ok()
        .and_then(|n| session.patient_at(n).ok());
    if picked.is_none() {
        writeln!(out, "Invalid patient number '{line}'")?;
    }
    Ok(picked)
}

/// Observation count, clamped to `1..=max`
fn ask_count(max: usize, input: &mut impl BufRead, out: &mut impl Write) -> anyhow::Result<Option<usize>> {
    let label = format!("Number of observations (1-{max}): ");
    let Some(line) = prompt(input, out, &label)? else {
        return Ok(None);
    };
    match line.parse::<i64>() {
        Ok(n) => Ok(Some(clamp_count(n, max))),
        Err(_) => {
            writeln!(out, "Invalid number '{line}'")?;
            Ok(None)
        }
    }
}

fn clamp_count(requested: i64, max: usize) -> usize {
    let max = max.max(1);
    usize::try_from(requested).unwrap_or(1).clamp(1, max)
}

async fn act(
    session: &mut Session,
    local_id: &LocalId,
    source: ObservationSource,
    post: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if let Err(e) = send_or_preview(session, local_id, source, post, out).await {
        writeln!(out, "❌ {e}")?;
    }
    Ok(())
}

async fn send_or_preview(
    session: &mut Session,
    local_id: &LocalId,
    source: ObservationSource,
    post: bool,
    out: &mut impl Write,
) -> Result<()> {
    let observations = session.observations(local_id, source)?;
    if post {
        let report = session
            .coordinator()
            .sync_patient(local_id, observations)
            .await?;
        write_report(out, &report)?;
    } else {
        let unit = session.coordinator().preview(local_id, observations)?;
        write_preview(out, &unit)?;
    }
    Ok(())
}
