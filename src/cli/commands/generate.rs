//! Generate-series command implementation

use crate::adapters::observations::SeriesWriter;
use crate::adapters::roster::load_roster;
use crate::config::{load_config, EdgeConfig};
use crate::domain::PatientRecord;
use clap::Args;
use std::io::Write;

/// Arguments for the generate-series command
#[derive(Args, Debug)]
pub struct GenerateSeriesArgs {
    /// Readings per patient (defaults to observations.series_readings)
    #[arg(short, long)]
    pub readings: Option<usize>,

    /// Overwrite existing series files
    #[arg(long)]
    pub force: bool,
}

impl GenerateSeriesArgs {
    /// Execute the generate-series command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };
        let patients = match load_roster(&config.roster.path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        self.write_all(&config, &patients, &mut std::io::stdout())
    }

    fn write_all(
        &self,
        config: &EdgeConfig,
        patients: &[PatientRecord],
        out: &mut impl Write,
    ) -> anyhow::Result<i32> {
        let obs = &config.observations;
        let mut writer = match SeriesWriter::new(
            &obs.series_dir,
            obs.series_year,
            obs.series_month,
            obs.low_value,
            obs.high_value,
        ) {
            Ok(w) => w,
            Err(e) => {
                writeln!(out, "❌ {e}")?;
                return Ok(2);
            }
        };

        let readings = self.readings.unwrap_or(obs.series_readings);
        let mut skipped = 0;
        for patient in patients {
            match writer.write_series(&patient.local_id, readings, self.force) {
                Ok(path) => writeln!(out, "✅ {} -> {}", patient.name.text, path.display())?,
                Err(e) => {
                    skipped += 1;
                    writeln!(out, "⚠️  {}: {e}", patient.name.text)?;
                }
            }
        }

        writeln!(
            out,
            "📝 Wrote {} of {} series files ({readings} readings each)",
            patients.len() - skipped,
            patients.len()
        )?;
        Ok(if skipped == 0 { 0 } else { 1 })
    }
}
