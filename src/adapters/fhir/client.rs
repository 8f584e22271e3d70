//! FHIR REST client
//!
//! Posts one bundle per call to the server's base URL and hands back the
//! per-entry outcome. Registered patients can be read back by remote id.

use super::models::Bundle;
use crate::config::FhirConfig;
use crate::core::bundle::{SubmissionOutcome, SubmissionUnit};
use crate::core::sync::{BundleSubmitter, PatientReader};
use crate::domain::ids::RemoteId;
use crate::domain::{EdgeError, Result, SubmissionError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;

pub const FHIR_JSON: &str = "application/fhir+json";

/// HTTP client for a single FHIR R4 endpoint
///
/// # Example
///
/// ```no_run
/// use edgehr::adapters::fhir::FhirClient;
/// use edgehr::config::FhirConfig;
///
/// # fn example() -> edgehr::domain::Result<()> {
/// let client = FhirClient::new(FhirConfig::default())?;
/// println!("Posting bundles to {}", client.base_url());
/// # Ok(())
/// # }
/// ```
pub struct FhirClient {
    base_url: String,
    client: Client,
    config: FhirConfig,
}

impl FhirClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the HTTP client cannot be built
    pub fn new(config: FhirConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds));

        if !config.tls_verify {
            tracing::warn!(
                base_url = %config.base_url,
                "TLS certificate verification disabled for FHIR server"
            );
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| EdgeError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_header_value(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.config.username,
            self.config.password.expose_secret()
        );
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {encoded}")
    }

    /// Request carrying the headers every call to the server sends
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(ACCEPT, "*/*")
            .header(CONTENT_TYPE, FHIR_JSON)
            .header("Prefer", "return=representation")
            .header(AUTHORIZATION, self.auth_header_value())
    }

    fn resource_url(&self, resource_type: &str, id: &RemoteId) -> String {
        format!(
            "{}/{resource_type}/{id}",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Send a unit and return its per-entry outcome
    ///
    /// # Errors
    ///
    /// - `Transport` on network failure or timeout
    /// - `Rejected` on any non-2xx status, carrying status and body
    /// - `InvalidResponse` if the body is not a response bundle
    /// - `ProtocolViolation` if the entry count differs from the request
    pub async fn post_bundle(&self, unit: &SubmissionUnit) -> Result<SubmissionOutcome> {
        let bundle = Bundle::from_unit(unit)?;
        let body = serde_json::to_vec(&bundle)?;

        tracing::debug!(
            url = %self.base_url,
            bundle_type = %bundle.bundle_type,
            entries = bundle.entry.len(),
            "Posting bundle"
        );

        let response = self
            .request(Method::POST, &self.base_url)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                body = %text,
                "FHIR server rejected bundle"
            );
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let response_bundle: Bundle = serde_json::from_str(&text)
            .map_err(|e| SubmissionError::InvalidResponse(format!("not a FHIR Bundle: {e}")))?;
        let outcome = response_bundle.into_outcome()?;

        if outcome.len() != unit.entry_count() {
            return Err(SubmissionError::ProtocolViolation {
                submitted: unit.entry_count(),
                returned: outcome.len(),
            }
            .into());
        }

        tracing::debug!(
            status = status.as_u16(),
            entries = outcome.len(),
            failed = outcome.failure_count(),
            "Bundle accepted"
        );

        Ok(outcome)
    }

    /// `GET Patient/{id}` and return the resource as the server holds it
    ///
    /// # Errors
    ///
    /// - `Transport` on network failure or timeout
    /// - `Rejected` on any non-2xx status, including an unknown id
    /// - `InvalidResponse` if the body is not a Patient resource
    pub async fn read_patient(&self, remote_id: &RemoteId) -> Result<Value> {
        let url = self.resource_url("Patient", remote_id);
        tracing::debug!(url = %url, "Reading patient");

        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                remote_id = %remote_id,
                "FHIR server refused patient read"
            );
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let resource: Value = serde_json::from_str(&text)
            .map_err(|e| SubmissionError::InvalidResponse(format!("not JSON: {e}")))?;
        match resource.get("resourceType").and_then(Value::as_str) {
            Some("Patient") => Ok(resource),
            other => Err(SubmissionError::InvalidResponse(format!(
                "expected a Patient resource, got {}",
                other.unwrap_or("no resourceType")
            ))
            .into()),
        }
    }
}

fn transport_error(error: reqwest::Error) -> EdgeError {
    let message = if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    };
    SubmissionError::Transport(message).into()
}

#[async_trait]
impl BundleSubmitter for FhirClient {
    async fn submit(&self, unit: &SubmissionUnit) -> Result<SubmissionOutcome> {
        self.post_bundle(unit).await
    }
}

#[async_trait]
impl PatientReader for FhirClient {
    async fn read_patient(&self, remote_id: &RemoteId) -> Result<Value> {
        FhirClient::read_patient(self, remote_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_auth_header_value() {
        let config = FhirConfig {
            username: "_System".to_string(),
            password: secret_string("ISCDEMO".to_string()),
            ..FhirConfig::default()
        };
        let client = FhirClient::new(config).unwrap();
        // base64("_System:ISCDEMO")
        assert_eq!(client.auth_header_value(), "Basic X1N5c3RlbTpJU0NERU1P");
    }

    #[test]
    fn test_client_keeps_base_url() {
        let config = FhirConfig {
            base_url: "https://fhir.example.org/r4/".to_string(),
            tls_verify: false,
            ..FhirConfig::default()
        };
        let client = FhirClient::new(config).unwrap();
        assert_eq!(client.base_url(), "https://fhir.example.org/r4/");
    }

    #[test]
    fn test_resource_url_joins_with_one_slash() {
        let id = RemoteId::new("1842").unwrap();
        for base_url in ["https://fhir.example.org/r4/", "https://fhir.example.org/r4"] {
            let config = FhirConfig {
                base_url: base_url.to_string(),
                ..FhirConfig::default()
            };
            let client = FhirClient::new(config).unwrap();
            assert_eq!(
                client.resource_url("Patient", &id),
                "https://fhir.example.org/r4/Patient/1842"
            );
        }
    }
}
