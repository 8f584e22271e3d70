//! Roster line parser

use crate::domain::{Address, ContactPoint, EdgeError, Gender, PatientRecord, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const FIELD_COUNT: usize = 6;

/// Read and parse a roster file
///
/// # Errors
///
/// Returns a `Roster` error if the file cannot be read. Malformed lines are
/// skipped with a warning rather than failing the load.
pub fn load_roster(path: impl AsRef<Path>) -> Result<Vec<PatientRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        EdgeError::Roster(format!("Failed to read roster {}: {}", path.display(), e))
    })?;

    let patients = parse_roster(&contents);
    tracing::info!(
        path = %path.display(),
        patients = patients.len(),
        "Loaded patient roster"
    );
    Ok(patients)
}

/// Parse roster text, keeping the first record for each local identifier
pub fn parse_roster(contents: &str) -> Vec<PatientRecord> {
    let mut seen = HashSet::new();
    let mut patients = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(patient) => {
                if !seen.insert(patient.local_id.clone()) {
                    tracing::warn!(
                        line = line_number,
                        local_id = %patient.local_id,
                        "Skipping duplicate roster identifier"
                    );
                    continue;
                }
                patients.push(patient);
            }
            Err(reason) => {
                tracing::warn!(line = line_number, reason = %reason, "Skipping malformed roster line");
            }
        }
    }

    patients
}

/// Parse one `Name | Address | Date of Birth | Gender | Telecom | Identifier` line
pub fn parse_line(line: &str) -> std::result::Result<PatientRecord, String> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() < FIELD_COUNT {
        return Err(format!(
            "expected {FIELD_COUNT} '|' separated fields, found {}",
            fields.len()
        ));
    }

    let full_name = fields[0];
    if full_name.is_empty() {
        return Err("name is empty".to_string());
    }

    let [line_1, city, state, postal_code] = comma_parts::<4>(fields[1], "address")?;
    let birth_date = NaiveDate::parse_from_str(fields[2], "%Y-%m-%d")
        .map_err(|e| format!("invalid date of birth '{}': {e}", fields[2]))?;
    let gender: Gender = fields[3].parse()?;
    let [system, use_, value] = comma_parts::<3>(fields[4], "telecom")?;
    let [identifier_system, identifier_value] = comma_parts::<2>(fields[5], "identifier")?;

    PatientRecord::builder()
        .local_id(&identifier_value)?
        .identifier_system(identifier_system)
        .full_name(full_name)
        .address(Address {
            line: line_1,
            city,
            state,
            postal_code,
        })
        .birth_date(birth_date)
        .gender(gender)
        .telecom(ContactPoint { system, use_, value })
        .build()
}

/// First `N` comma separated parts of a field, trimmed
fn comma_parts<const N: usize>(field: &str, name: &str) -> std::result::Result<[String; N], String> {
    let parts: Vec<String> = field.split(',').map(|p| p.trim().to_string()).collect();
    if parts.len() < N {
        return Err(format!(
            "{name} field malformed, expected {N} comma separated parts: '{field}'"
        ));
    }
    let mut parts = parts.into_iter();
    Ok(std::array::from_fn(|_| parts.next().unwrap_or_default()))
}
