//! FHIR R4 wire models
//!
//! Serde types for the request and response bundles, plus the conversions
//! between them and the crate's submission types.

use crate::core::bundle::{
    Entry, EntryResource, ResourceType, ResultEntry, SubmissionOutcome, SubmissionUnit,
};
use crate::domain::ids::RemoteId;
use crate::domain::{EdgeError, ObservationRecord, PatientRecord, Result, SubmissionError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const LOINC_SYSTEM: &str = "http://loinc.org";
pub const HEART_RATE_CODE: &str = "8867-4";
pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";
pub const OBSERVATION_CATEGORY_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/observation-category";

const MISSING_ID_DIAGNOSTICS: &str = "no resource id or location";

/// FHIR Bundle as sent and received
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(rename = "type")]
    pub bundle_type: String,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

fn default_resource_type() -> String {
    "Bundle".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<BundleEntryRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<BundleEntryResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleEntryRequest {
    pub method: String,
    pub url: String,
}

/// Per-entry result inside a batch-response or transaction-response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntryResponse {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Value>,
}

impl Bundle {
    /// Wire form of a submission unit
    pub fn from_unit(unit: &SubmissionUnit) -> Result<Self> {
        let entry = unit
            .entries
            .iter()
            .map(entry_to_wire)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            resource_type: default_resource_type(),
            bundle_type: unit.mode.bundle_type().to_string(),
            entry,
        })
    }

    /// Per-entry outcome of a response bundle, in response order
    pub fn into_outcome(self) -> std::result::Result<SubmissionOutcome, SubmissionError> {
        if self.resource_type != "Bundle" {
            return Err(SubmissionError::InvalidResponse(format!(
                "expected a Bundle, got {}",
                self.resource_type
            )));
        }

        let entries = self
            .entry
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry_to_result(index, entry))
            .collect();

        Ok(SubmissionOutcome::new(entries))
    }
}

fn entry_to_wire(entry: &Entry) -> Result<BundleEntry> {
    let resource = match &entry.resource {
        EntryResource::Patient(patient) => patient_resource(patient),
        EntryResource::Observation(obs) => observation_resource(obs)?,
    };

    Ok(BundleEntry {
        full_url: entry.full_url.as_ref().map(|r| r.as_str().to_string()),
        resource: Some(resource),
        request: Some(BundleEntryRequest {
            method: entry.request_method().to_string(),
            url: entry.request_url().to_string(),
        }),
        response: None,
    })
}

/// Result for one response entry
///
/// A 2xx entry the id cannot be recovered from is reported as a failed
/// entry so the rest of the outcome still resolves.
fn entry_to_result(index: usize, entry: BundleEntry) -> ResultEntry {
    let status = entry.response.as_ref().map(|r| r.status.trim().to_string());

    if let Some(status) = &status {
        if !status.starts_with('2') {
            let diagnostics = entry
                .response
                .as_ref()
                .and_then(|r| r.outcome.as_ref())
                .and_then(outcome_diagnostics);
            return ResultEntry::failed(status.clone(), diagnostics);
        }
    }

    let resource_type = entry
        .resource
        .as_ref()
        .and_then(|r| r.get("resourceType"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let from_resource = entry
        .resource
        .as_ref()
        .and_then(|r| r.get("id"))
        .and_then(Value::as_str)
        .and_then(|id| RemoteId::new(id).ok());

    let from_location = || {
        let location = entry.response.as_ref()?.location.as_deref()?;
        match resource_type.as_deref() {
            Some(resource_type) => RemoteId::from_location(location, resource_type),
            None => [ResourceType::Patient, ResourceType::Observation]
                .iter()
                .find_map(|rt| RemoteId::from_location(location, rt.as_str())),
        }
    };

    match from_resource.or_else(from_location) {
        Some(id) => ResultEntry::created(id),
        None => {
            tracing::warn!(index, "Response entry carries no resource id or location");
            ResultEntry::failed(
                status.unwrap_or_else(|| "unknown".to_string()),
                Some(MISSING_ID_DIAGNOSTICS.to_string()),
            )
        }
    }
}

/// First `issue.diagnostics` of an OperationOutcome
fn outcome_diagnostics(outcome: &Value) -> Option<String> {
    outcome
        .get("issue")?
        .as_array()?
        .iter()
        .find_map(|issue| issue.get("diagnostics").and_then(Value::as_str))
        .map(str::to_string)
}

/// Patient resource JSON
pub fn patient_resource(patient: &PatientRecord) -> Value {
    let mut name = json!({
        "use": "official",
        "text": patient.name.text,
        "given": [patient.name.given],
    });
    if !patient.name.family.is_empty() {
        name["family"] = json!(patient.name.family);
    }

    json!({
        "resourceType": "Patient",
        "identifier": [{
            "system": patient.identifier_system,
            "value": patient.local_id.as_str(),
        }],
        "name": [name],
        "telecom": [{
            "system": patient.telecom.system,
            "use": patient.telecom.use_,
            "value": patient.telecom.value,
        }],
        "gender": patient.gender.as_str(),
        "birthDate": patient.birth_date.format("%Y-%m-%d").to_string(),
        "address": [{
            "line": [patient.address.line],
            "city": patient.address.city,
            "state": patient.address.state,
            "postalCode": patient.address.postal_code,
        }],
    })
}

/// Heart-rate Observation resource JSON
///
/// # Errors
///
/// Returns `Validation` if the subject still holds the local identifier
pub fn observation_resource(obs: &ObservationRecord) -> Result<Value> {
    let reference = obs.subject.reference().ok_or_else(|| {
        EdgeError::Validation(format!(
            "observation subject {} was not resolved before submission",
            obs.subject
        ))
    })?;

    Ok(json!({
        "resourceType": "Observation",
        "status": "final",
        "category": [{
            "coding": [{
                "system": OBSERVATION_CATEGORY_SYSTEM,
                "code": "vital-signs",
                "display": "Vital Signs",
            }],
        }],
        "code": {
            "coding": [{
                "system": LOINC_SYSTEM,
                "code": HEART_RATE_CODE,
                "display": "Heart rate",
            }],
            "text": "Heart rate",
        },
        "subject": { "reference": reference },
        "effectiveDateTime": obs.effective.to_rfc3339(),
        "valueQuantity": {
            "value": obs.value,
            "unit": "beats/minute",
            "system": UCUM_SYSTEM,
            "code": "/min",
        },
    }))
}
