//! Domain identifier types with validation
//!
//! Three kinds of identifier flow through a sync: the roster's local
//! identifier, the server-assigned remote identifier, and the temporary
//! `urn:uuid:` reference minted for entries of a transaction bundle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Local patient identifier newtype wrapper
///
/// Assigned by the external roster (e.g. `356-444-9972`) and stable for the
/// life of the process.
///
/// # Examples
///
/// ```
/// use edgehr::domain::ids::LocalId;
/// use std::str::FromStr;
///
/// let id = LocalId::from_str("356-444-9972").unwrap();
/// assert_eq!(id.as_str(), "356-444-9972");
/// assert_eq!(id.compact(), "3564449972");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalId(String);

impl LocalId {
    /// Creates a new LocalId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(LocalId)` if the ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Local patient identifier cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the local ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier with dashes removed, used to name series files
    pub fn compact(&self) -> String {
        self.0.replace('-', "")
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocalId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for LocalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Server-assigned resource identifier
///
/// Authoritative once the FHIR server has created the resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteId(String);

impl RemoteId {
    /// Creates a new RemoteId, rejecting empty values and values containing `/`
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Remote identifier cannot be empty".to_string());
        }
        if id.contains('/') {
            return Err(format!("Remote identifier cannot contain '/': {id}"));
        }
        Ok(Self(id))
    }

    /// Extracts the id from a `Location` value such as
    /// `Patient/123/_history/1` or `http://host/fhir/Patient/123`
    pub fn from_location(location: &str, resource_type: &str) -> Option<Self> {
        let segments: Vec<&str> = location.split('/').collect();
        let pos = segments.iter().rposition(|s| *s == resource_type)?;
        segments
            .get(pos + 1)
            .and_then(|id| RemoteId::new(*id).ok())
    }

    /// Returns the remote ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Literal reference to a patient with this id: `Patient/<id>`
    pub fn patient_reference(&self) -> String {
        format!("Patient/{}", self.0)
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RemoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Temporary reference for an entry of a transaction bundle
///
/// Process-unique `urn:uuid:` token, valid only inside the bundle it was
/// minted for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempRef(String);

impl TempRef {
    /// Mints a fresh reference from a random v4 UUID
    pub fn mint() -> Self {
        Self(format!("urn:uuid:{}", Uuid::new_v4()))
    }

    /// Returns the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TempRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TempRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = s
            .strip_prefix("urn:uuid:")
            .ok_or_else(|| format!("Temporary reference must start with urn:uuid:, got: {s}"))?;
        Uuid::parse_str(uuid).map_err(|e| format!("Invalid UUID in temporary reference: {e}"))?;
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for TempRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
