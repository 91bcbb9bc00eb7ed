//! Runtime configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `HEMOTRIAGE_MODEL_PATH` | `models/svm_patient_model.json` |
//! | `HEMOTRIAGE_VERIFY_MODEL_DIGEST` | `false` |
//! | `HEMOTRIAGE_DEMOGRAPHICS_POLICY` | `require` (or `default`: age 30, gender M) |
//! | `HEMOTRIAGE_LOG_MODE` | `stderr` (or `file`) |
//! | `HEMOTRIAGE_LOG_FILE` | `hemotriage.log` |

use std::path::PathBuf;

use crate::adapters::DemographicsPolicy;

pub const MODEL_PATH_ENV: &str = "HEMOTRIAGE_MODEL_PATH";
pub const VERIFY_MODEL_DIGEST_ENV: &str = "HEMOTRIAGE_VERIFY_MODEL_DIGEST";
pub const DEMOGRAPHICS_POLICY_ENV: &str = "HEMOTRIAGE_DEMOGRAPHICS_POLICY";
pub const LOG_MODE_ENV: &str = "HEMOTRIAGE_LOG_MODE";
pub const LOG_FILE_ENV: &str = "HEMOTRIAGE_LOG_FILE";

const DEFAULT_MODEL_PATH: &str = "models/svm_patient_model.json";
const DEFAULT_LOG_FILE: &str = "hemotriage.log";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} (expected {expected})")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Stderr,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub verify_model_digest: bool,
    pub demographics_policy: DemographicsPolicy,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            verify_model_digest: false,
            demographics_policy: DemographicsPolicy::Require,
            log_mode: LogMode::Stderr,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Ok(true),
        "0" | "false" | "FALSE" | "no" | "NO" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            expected: "a boolean (1/0, true/false, yes/no)",
        }),
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for unrecognised values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for unrecognised values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(MODEL_PATH_ENV) {
            config.model_path = PathBuf::from(path);
        }

        if let Some(v) = lookup(VERIFY_MODEL_DIGEST_ENV) {
            config.verify_model_digest = parse_bool(VERIFY_MODEL_DIGEST_ENV, &v)?;
        }

        if let Some(v) = lookup(DEMOGRAPHICS_POLICY_ENV) {
            config.demographics_policy = match v.trim().to_ascii_lowercase().as_str() {
                "require" => DemographicsPolicy::Require,
                "default" | "legacy" => DemographicsPolicy::legacy(),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: DEMOGRAPHICS_POLICY_ENV,
                        value: v,
                        expected: "require or default",
                    })
                }
            };
        }

        if let Some(v) = lookup(LOG_MODE_ENV) {
            config.log_mode = match v.trim().to_ascii_lowercase().as_str() {
                "stderr" => LogMode::Stderr,
                "file" => LogMode::File,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: LOG_MODE_ENV,
                        value: v,
                        expected: "stderr or file",
                    })
                }
            };
        }

        if let Some(path) = lookup(LOG_FILE_ENV) {
            config.log_file = PathBuf::from(path);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.demographics_policy, DemographicsPolicy::Require);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (MODEL_PATH_ENV, "/opt/model.json"),
            (VERIFY_MODEL_DIGEST_ENV, "yes"),
            (DEMOGRAPHICS_POLICY_ENV, "Default"),
            (LOG_MODE_ENV, "file"),
            (LOG_FILE_ENV, "/tmp/h.log"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.model_path, PathBuf::from("/opt/model.json"));
        assert!(config.verify_model_digest);
        assert_eq!(config.demographics_policy, DemographicsPolicy::legacy());
        assert_eq!(config.log_mode, LogMode::File);
        assert_eq!(config.log_file, PathBuf::from("/tmp/h.log"));
    }

    #[test]
    fn test_invalid_values() {
        let err =
            AppConfig::from_lookup(lookup(&[(LOG_MODE_ENV, "syslog")])).expect_err("bad mode");
        assert!(matches!(err, ConfigError::InvalidValue { var: LOG_MODE_ENV, .. }));

        assert!(AppConfig::from_lookup(lookup(&[(VERIFY_MODEL_DIGEST_ENV, "maybe")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[(DEMOGRAPHICS_POLICY_ENV, "guess")])).is_err());
    }
}
