//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::EdgeConfig;
use super::secret_string;
use crate::domain::errors::EdgeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into EdgeConfig
/// 4. Applies environment variable overrides (EDGEHR_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file is missing or unreadable,
/// a referenced variable is unset, parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use edgehr::config::loader::load_config;
///
/// let config = load_config("edgehr.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<EdgeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EdgeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        EdgeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: EdgeConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        EdgeError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| EdgeError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(EdgeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using the EDGEHR_* prefix
///
/// Variables follow the pattern `EDGEHR_<SECTION>_<KEY>`, for example
/// `EDGEHR_FHIR_BASE_URL`. Values that fail to parse are ignored.
fn apply_env_overrides(config: &mut EdgeConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("EDGEHR_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // FHIR overrides
    if let Ok(val) = std::env::var("EDGEHR_FHIR_BASE_URL") {
        config.fhir.base_url = val;
    }
    if let Ok(val) = std::env::var("EDGEHR_FHIR_USERNAME") {
        config.fhir.username = val;
    }
    if let Ok(val) = std::env::var("EDGEHR_FHIR_PASSWORD") {
        config.fhir.password = secret_string(val);
    }
    if let Some(timeout) = parsed_var("EDGEHR_FHIR_TIMEOUT_SECONDS") {
        config.fhir.timeout_seconds = timeout;
    }
    if let Some(timeout) = parsed_var("EDGEHR_FHIR_CONNECT_TIMEOUT_SECONDS") {
        config.fhir.connect_timeout_seconds = timeout;
    }
    if let Some(verify) = parsed_var("EDGEHR_FHIR_TLS_VERIFY") {
        config.fhir.tls_verify = verify;
    }

    // Roster overrides
    if let Ok(val) = std::env::var("EDGEHR_ROSTER_PATH") {
        config.roster.path = val;
    }

    // Observation overrides
    if let Ok(val) = std::env::var("EDGEHR_OBSERVATIONS_SERIES_DIR") {
        config.observations.series_dir = val;
    }
    if let Some(count) = parsed_var("EDGEHR_OBSERVATIONS_MAX_COUNT") {
        config.observations.max_count = count;
    }
    if let Some(low) = parsed_var("EDGEHR_OBSERVATIONS_LOW_VALUE") {
        config.observations.low_value = low;
    }
    if let Some(high) = parsed_var("EDGEHR_OBSERVATIONS_HIGH_VALUE") {
        config.observations.high_value = high;
    }

    // Sync overrides
    if let Some(concurrency) = parsed_var("EDGEHR_SYNC_MAX_CONCURRENT_PATIENTS") {
        config.sync.max_concurrent_patients = concurrency;
    }

    // Logging overrides
    if let Some(enabled) = parsed_var("EDGEHR_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("EDGEHR_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|val| val.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("EDGEHR_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${EDGEHR_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"");
        std::env::remove_var("EDGEHR_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("EDGEHR_LOADER_MISSING_VAR");
        let input = "password = \"${EDGEHR_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("EDGEHR_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("EDGEHR_LOADER_COMMENTED_VAR");
        let input = "# password = \"${EDGEHR_LOADER_COMMENTED_VAR}\"\nname = \"x\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${EDGEHR_LOADER_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(EdgeError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let temp_file = write_config(
            r#"
[fhir]
base_url = "http://127.0.0.1:8080/csp/healthshare/demo/fhir/r4/"
username = "_System"
password = "demo-password"

[roster]
path = "data/patients.txt"

[observations]
max_count = 500
"#,
        );

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(
            config.fhir.base_url,
            "http://127.0.0.1:8080/csp/healthshare/demo/fhir/r4/"
        );
        assert_eq!(config.fhir.password.expose_secret(), "demo-password");
        assert_eq!(config.roster.path, "data/patients.txt");
        assert_eq!(config.observations.max_count, 500);
        assert_eq!(config.observations.low_value, 60);
    }

    #[test]
    fn test_load_config_fails_validation() {
        let temp_file = write_config(
            r#"
[fhir]
base_url = "http://localhost:8080/fhir"
username = "_System"
password = ""
"#,
        );

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn test_load_config_missing_fhir_section() {
        let temp_file = write_config("[application]\nlog_level = \"debug\"\n");
        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("TOML parse error"));
    }
}
