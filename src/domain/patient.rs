//! Patient domain model
//!
//! This module defines the patient record loaded from the roster.

use super::ids::{LocalId, RemoteId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    /// FHIR code for this gender
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "unknown" => Ok(Gender::Unknown),
            other => Err(format!(
                "Invalid gender '{other}'. Must be one of: male, female, other, unknown"
            )),
        }
    }
}

/// Human name split into given and family parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanName {
    pub given: String,
    pub family: String,
    pub text: String,
}

impl HumanName {
    /// Splits a full name: the first token is the given name, the rest the family name
    pub fn from_full_name(full_name: &str) -> Self {
        let text = full_name.trim().to_string();
        let mut parts = text.split_whitespace();
        let given = parts.next().unwrap_or_default().to_string();
        let family = parts.collect::<Vec<_>>().join(" ");
        Self {
            given,
            family,
            text,
        }
    }
}

/// Postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// A single contact channel (e.g. phone, mobile, 617-231-3345)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub system: String,
    pub use_: String,
    pub value: String,
}

/// Patient record owned by the identity store
///
/// Created once from the roster. The only field that changes afterwards is
/// `remote_id`, set when the FHIR server assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub local_id: LocalId,
    pub identifier_system: String,
    pub name: HumanName,
    pub address: Address,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub telecom: ContactPoint,
    pub remote_id: Option<RemoteId>,
}

impl PatientRecord {
    /// Returns a builder for constructing a patient record
    pub fn builder() -> PatientRecordBuilder {
        PatientRecordBuilder::default()
    }

    /// Whether the FHIR server already knows this patient
    pub fn is_known_remotely(&self) -> bool {
        self.remote_id.is_some()
    }
}

/// Builder for constructing PatientRecord instances
#[derive(Debug, Default)]
pub struct PatientRecordBuilder {
    local_id: Option<LocalId>,
    identifier_system: Option<String>,
    name: Option<HumanName>,
    address: Option<Address>,
    birth_date: Option<NaiveDate>,
    gender: Option<Gender>,
    telecom: Option<ContactPoint>,
}

impl PatientRecordBuilder {
    /// Sets the local identifier, validating it
    pub fn local_id(mut self, id: &str) -> Result<Self, String> {
        self.local_id = Some(LocalId::new(id)?);
        Ok(self)
    }

    /// Sets the identifier system URI
    pub fn identifier_system(mut self, system: impl Into<String>) -> Self {
        self.identifier_system = Some(system.into());
        self
    }

    /// Sets the name from a full name string
    pub fn full_name(mut self, full_name: &str) -> Self {
        self.name = Some(HumanName::from_full_name(full_name));
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn telecom(mut self, telecom: ContactPoint) -> Self {
        self.telecom = Some(telecom);
        self
    }

    /// Builds the record
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing
    pub fn build(self) -> Result<PatientRecord, String> {
        Ok(PatientRecord {
            local_id: self.local_id.ok_or("local_id is required")?,
            identifier_system: self.identifier_system.unwrap_or_default(),
            name: self.name.ok_or("name is required")?,
            address: self.address.ok_or("address is required")?,
            birth_date: self.birth_date.ok_or("birth_date is required")?,
            gender: self.gender.unwrap_or(Gender::Unknown),
            telecom: self.telecom.ok_or("telecom is required")?,
            remote_id: None,
        })
    }
}
