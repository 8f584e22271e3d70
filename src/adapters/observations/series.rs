//! Per-patient series files
//!
//! Each file is named after the patient's local identifier without dashes
//! (`3564449972.txt`) and holds one reading per line:
//!
//! ```text
//! (75, '2025-03-14T06:23:11-05:00')
//! ```

use crate::domain::ids::LocalId;
use crate::domain::{EdgeError, ObservationRecord, Result};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

const READING_PATTERN: &str = r#"^\(\s*(-?\d+(?:\.\d+)?)\s*,\s*['"]([^'"]+)['"]\s*\)$"#;

/// Time zones series readings are stamped in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UsZone {
    Eastern,
    Central,
}

impl UsZone {
    const ALL: [UsZone; 2] = [UsZone::Eastern, UsZone::Central];

    fn standard_hours(self) -> i32 {
        match self {
            UsZone::Eastern => -5,
            UsZone::Central => -6,
        }
    }

    /// UTC offset in force at a wall-clock time
    fn offset_at(self, local: NaiveDateTime) -> Option<FixedOffset> {
        let hours = self.standard_hours() + i32::from(is_daylight_saving(local));
        FixedOffset::east_opt(hours * 3600)
    }
}

/// US daylight saving: second Sunday of March to first Sunday of November
///
/// Wall times skipped by the spring change keep standard time. Times
/// repeated by the autumn change take daylight time.
fn is_daylight_saving(local: NaiveDateTime) -> bool {
    let year = local.year();
    let start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)
        .and_then(|d| d.and_hms_opt(3, 0, 0));
    let end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)
        .and_then(|d| d.and_hms_opt(2, 0, 0));
    match (start, end) {
        (Some(start), Some(end)) => local >= start && local < end,
        _ => false,
    }
}

fn series_path(dir: &Path, local_id: &LocalId) -> PathBuf {
    dir.join(format!("{}.txt", local_id.compact()))
}

fn reading_regex() -> Result<Regex> {
    Regex::new(READING_PATTERN)
        .map_err(|e| EdgeError::Other(format!("Invalid reading pattern: {e}")))
}

/// Parse one series line into a value and timestamp
pub fn parse_reading(line: &str) -> std::result::Result<(f64, DateTime<FixedOffset>), String> {
    let re = reading_regex().map_err(|e| e.to_string())?;
    parse_with(&re, line)
}

fn parse_with(re: &Regex, line: &str) -> std::result::Result<(f64, DateTime<FixedOffset>), String> {
    let caps = re
        .captures(line.trim())
        .ok_or_else(|| "expected (value, 'timestamp')".to_string())?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|e| format!("invalid value '{}': {e}", &caps[1]))?;
    let effective = DateTime::parse_from_rfc3339(&caps[2])
        .map_err(|e| format!("invalid timestamp '{}': {e}", &caps[2]))?;
    Ok((value, effective))
}

/// Render a reading the way series files store it
pub fn format_reading(value: u32, effective: &DateTime<FixedOffset>) -> String {
    format!("({value}, '{}')", effective.to_rfc3339())
}

/// Reads recorded observations from the series directory
pub struct SeriesSource {
    dir: PathBuf,
}

impl SeriesSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, local_id: &LocalId) -> PathBuf {
        series_path(&self.dir, local_id)
    }

    /// All well-formed readings in the patient's series file, in file order
    ///
    /// # Errors
    ///
    /// Returns an `Observation` error naming the path if the file is missing
    /// or unreadable. Malformed lines are skipped with a warning.
    pub fn read_from_series(&self, local_id: &LocalId) -> Result<Vec<ObservationRecord>> {
        let path = self.path_for(local_id);
        let contents = fs::read_to_string(&path).map_err(|e| {
            EdgeError::Observation(format!("Failed to read series file {}: {}", path.display(), e))
        })?;

        let re = reading_regex()?;
        let mut observations = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_with(&re, line) {
                Ok((value, effective)) => {
                    observations.push(ObservationRecord::new(local_id.clone(), value, effective));
                }
                Err(reason) => {
                    tracing::warn!(
                        path = %path.display(),
                        line = index + 1,
                        reason = %reason,
                        "Skipping malformed series line"
                    );
                }
            }
        }

        tracing::info!(
            path = %path.display(),
            observations = observations.len(),
            "Read observation series"
        );
        Ok(observations)
    }
}

/// Writes series files of random readings for one day of a given month
pub struct SeriesWriter {
    dir: PathBuf,
    year: i32,
    month: u32,
    low: u32,
    high: u32,
    rng: StdRng,
}

impl SeriesWriter {
    /// # Errors
    ///
    /// Returns `Validation` if the year and month do not form a date or if
    /// `low > high`
    pub fn new(dir: impl Into<PathBuf>, year: i32, month: u32, low: u32, high: u32) -> Result<Self> {
        Self::build(dir.into(), year, month, low, high, StdRng::from_entropy())
    }

    pub fn with_seed(
        dir: impl Into<PathBuf>,
        year: i32,
        month: u32,
        low: u32,
        high: u32,
        seed: u64,
    ) -> Result<Self> {
        Self::build(dir.into(), year, month, low, high, StdRng::seed_from_u64(seed))
    }

    fn build(dir: PathBuf, year: i32, month: u32, low: u32, high: u32, rng: StdRng) -> Result<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EdgeError::Validation(format!(
                "invalid series month {year}-{month:02}"
            )));
        }
        if low > high {
            return Err(EdgeError::Validation(format!(
                "low value {low} is greater than high value {high}"
            )));
        }
        Ok(Self {
            dir,
            year,
            month,
            low,
            high,
            rng,
        })
    }

    /// Write `readings` lines for one random day of the month
    ///
    /// Every reading in a file is stamped in one randomly chosen zone, with
    /// the offset that zone observes at the reading's wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns an `Observation` error if the file exists and `force` is not
    /// set, or an `Io` error if it cannot be written.
    pub fn write_series(&mut self, local_id: &LocalId, readings: usize, force: bool) -> Result<PathBuf> {
        let path = series_path(&self.dir, local_id);
        if path.exists() && !force {
            return Err(EdgeError::Observation(format!(
                "Series file {} already exists, use --force to overwrite",
                path.display()
            )));
        }

        fs::create_dir_all(&self.dir)?;

        let last_day = self.days_in_month();
        let day = self.rng.gen_range(1..=last_day);
        let zone = UsZone::ALL[self.rng.gen_range(0..UsZone::ALL.len())];
        let midnight = NaiveDate::from_ymd_opt(self.year, self.month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| {
                EdgeError::Validation(format!("invalid series date {}-{}-{day}", self.year, self.month))
            })?;

        let mut lines = Vec::with_capacity(readings);
        for _ in 0..readings {
            let value = self.rng.gen_range(self.low..=self.high);
            let local = midnight + Duration::seconds(self.rng.gen_range(0..86_400));
            let effective = zone
                .offset_at(local)
                .and_then(|offset| local.and_local_timezone(offset).single())
                .ok_or_else(|| EdgeError::Other(format!("no UTC offset for {local} in {zone:?}")))?;
            lines.push(format_reading(value, &effective));
        }
        lines.push(String::new());
        fs::write(&path, lines.join("\n"))?;

        tracing::info!(
            path = %path.display(),
            readings,
            day,
            "Wrote observation series"
        );
        Ok(path)
    }

    fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first| first.pred_opt())
            .map(|last| last.day())
            .unwrap_or(28)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    fn mary() -> LocalId {
        LocalId::new("356-444-9972").unwrap()
    }

    #[test]
    fn test_parse_reading() {
        let (value, effective) = parse_reading("(75, '2025-03-14T06:23:11-04:00')").unwrap();
        assert_eq!(value, 75.0);
        assert_eq!(effective.to_rfc3339(), "2025-03-14T06:23:11-04:00");
    }

    #[test]
    fn test_parse_reading_rejects_garbage() {
        assert!(parse_reading("75, 2025-03-14").is_err());
        assert!(parse_reading("(75, 'yesterday')").is_err());
        assert!(parse_reading("(fast, '2025-03-14T06:23:11-04:00')").is_err());
    }

    #[test]
    fn test_read_from_series_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("3564449972.txt"),
            "(75, '2025-03-14T06:23:11-04:00')\nnot a reading\n\n(80, '2025-03-14T07:00:00-04:00')\n",
        )
        .unwrap();

        let source = SeriesSource::new(dir.path());
        let observations = source.read_from_series(&mary()).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].value, 75.0);
        assert_eq!(observations[1].value, 80.0);
    }

    #[test]
    fn test_read_from_series_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let source = SeriesSource::new(dir.path());
        let err = source.read_from_series(&mary()).unwrap_err();
        assert!(matches!(err, EdgeError::Observation(_)));
        assert!(err.to_string().contains("3564449972.txt"));
    }

    #[test]
    fn test_writer_output_reads_back() {
        let dir = TempDir::new().unwrap();
        let mut writer = SeriesWriter::with_seed(dir.path(), 2025, 3, 60, 160, 11).unwrap();
        let path = writer.write_series(&mary(), 100, false).unwrap();
        assert!(path.ends_with("3564449972.txt"));

        let observations = SeriesSource::new(dir.path()).read_from_series(&mary()).unwrap();
        assert_eq!(observations.len(), 100);

        let first_day = observations[0].effective.date_naive();
        for obs in &observations {
            assert!((60.0..=160.0).contains(&obs.value));
            assert_eq!(obs.effective.date_naive(), first_day);
            assert_eq!(obs.effective.month(), 3);
            let local = obs.effective.naive_local();
            assert!(UsZone::ALL
                .iter()
                .any(|zone| zone.offset_at(local) == Some(*obs.effective.offset())));
        }
    }

    #[test]
    fn test_summer_series_uses_daylight_offsets() {
        let dir = TempDir::new().unwrap();
        let mut writer = SeriesWriter::with_seed(dir.path(), 2025, 7, 60, 160, 5).unwrap();
        writer.write_series(&mary(), 50, false).unwrap();

        let observations = SeriesSource::new(dir.path()).read_from_series(&mary()).unwrap();
        let offset = *observations[0].effective.offset();
        assert!([-4 * 3600, -5 * 3600].contains(&offset.local_minus_utc()));
        assert!(observations.iter().all(|o| *o.effective.offset() == offset));
    }

    fn wall(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test_case("2025-01-15 12:00" => false)]
    #[test_case("2025-03-09 01:59" => false)]
    #[test_case("2025-03-09 02:30" => false; "skipped hour keeps standard time")]
    #[test_case("2025-03-09 03:00" => true)]
    #[test_case("2025-07-04 09:00" => true)]
    #[test_case("2025-11-02 01:30" => true; "repeated hour takes daylight time")]
    #[test_case("2025-11-02 02:00" => false)]
    #[test_case("2024-03-10 03:00" => true)]
    fn test_is_daylight_saving(local: &str) -> bool {
        is_daylight_saving(wall(local))
    }

    #[test]
    fn test_zone_offsets() {
        let winter = wall("2025-01-15 12:00");
        let summer = wall("2025-07-04 12:00");
        let hours = |zone: UsZone, at: NaiveDateTime| {
            zone.offset_at(at).unwrap().local_minus_utc() / 3600
        };
        assert_eq!(hours(UsZone::Eastern, winter), -5);
        assert_eq!(hours(UsZone::Eastern, summer), -4);
        assert_eq!(hours(UsZone::Central, winter), -6);
        assert_eq!(hours(UsZone::Central, summer), -5);
    }

    #[test]
    fn test_writer_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let mut writer = SeriesWriter::with_seed(dir.path(), 2025, 3, 60, 160, 3).unwrap();
        writer.write_series(&mary(), 5, false).unwrap();

        assert!(matches!(
            writer.write_series(&mary(), 5, false),
            Err(EdgeError::Observation(_))
        ));
        assert!(writer.write_series(&mary(), 5, true).is_ok());
    }

    #[test]
    fn test_writer_rejects_invalid_month() {
        let dir = TempDir::new().unwrap();
        assert!(SeriesWriter::new(dir.path(), 2025, 13, 60, 160).is_err());
    }

    #[test]
    fn test_days_in_month() {
        let dir = TempDir::new().unwrap();
        let feb = SeriesWriter::with_seed(dir.path(), 2024, 2, 60, 160, 0).unwrap();
        assert_eq!(feb.days_in_month(), 29);
        let dec = SeriesWriter::with_seed(dir.path(), 2025, 12, 60, 160, 0).unwrap();
        assert_eq!(dec.days_in_month(), 31);
    }
}
