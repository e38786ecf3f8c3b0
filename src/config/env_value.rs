// ABOUTME: Configuration values that are either literals or references to environment variables.
// ABOUTME: Lets credentials live in the pipeline's secret store instead of the config file.

use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn literal(value: impl Into<String>) -> Self {
        EnvValue::Literal(value.into())
    }

    pub fn from_env(var: impl Into<String>) -> Self {
        EnvValue::FromEnv {
            var: var.into(),
            default: None,
        }
    }

    pub fn from_env_or(var: impl Into<String>, default: impl Into<String>) -> Self {
        EnvValue::FromEnv {
            var: var.into(),
            default: Some(default.into()),
        }
    }

    /// Resolve a required value. An unset variable without a default is an error.
    pub fn resolve(&self) -> Result<String> {
        self.resolve_optional().ok_or_else(|| match self {
            EnvValue::FromEnv { var, .. } => Error::MissingEnvVar(var.clone()),
            EnvValue::Literal(_) => Error::InvalidConfig("empty value".to_string()),
        })
    }

    /// Resolve an optional value. Unset and blank both mean absent.
    pub fn resolve_optional(&self) -> Option<String> {
        let value = match self {
            EnvValue::Literal(s) => Some(s.clone()),
            EnvValue::FromEnv { var, default } => std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| default.clone()),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_resolves_to_itself() {
        assert_eq!(EnvValue::literal("MTT").resolve().unwrap(), "MTT");
    }

    #[test]
    fn unset_variable_without_default_is_absent() {
        temp_env::with_var_unset("IICS_TEST_UNSET_VAR", || {
            let value = EnvValue::from_env("IICS_TEST_UNSET_VAR");
            assert_eq!(value.resolve_optional(), None);
            assert!(matches!(value.resolve(), Err(Error::MissingEnvVar(v)) if v == "IICS_TEST_UNSET_VAR"));
        });
    }

    #[test]
    fn blank_variable_falls_back_to_default() {
        temp_env::with_var("IICS_TEST_BLANK_VAR", Some(""), || {
            let value = EnvValue::from_env_or("IICS_TEST_BLANK_VAR", "fallback");
            assert_eq!(value.resolve().unwrap(), "fallback");
        });
    }

    #[test]
    fn deserializes_both_shapes() {
        let literal: EnvValue = serde_yaml::from_str("plain").unwrap();
        assert_eq!(literal, EnvValue::literal("plain"));

        let from_env: EnvValue = serde_yaml::from_str("env: IICS_PASSWORD").unwrap();
        assert_eq!(from_env, EnvValue::from_env("IICS_PASSWORD"));
    }
}
