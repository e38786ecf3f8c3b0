// ABOUTME: Configuration types and parsing for iics.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, destination merging and the env-only fallback.

mod env_value;
mod tuning;

pub use env_value::EnvValue;
pub use tuning::{PollingConfig, RetryConfig};

use crate::client::{ClientOptions, DEFAULT_API_SUFFIX, RetryPolicy, SessionContext};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "iics.yml";
pub const CONFIG_FILENAME_ALT: &str = "iics.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".iics/config.yml";

pub const DEFAULT_LOGIN_URL: &str = "https://dm-em.informaticacloud.com";
pub const DEFAULT_RESOURCE_TYPE: &str = "MTT";

/// Name of the destination `from_env` derives from `UAT_`-prefixed variables.
pub const UAT_DESTINATION: &str = "uat";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_login_url")]
    pub login_url: EnvValue,

    #[serde(default)]
    pub pod_url: Option<EnvValue>,

    #[serde(default)]
    pub username: Option<EnvValue>,

    #[serde(default)]
    pub password: Option<EnvValue>,

    #[serde(default)]
    pub session_id: Option<EnvValue>,

    #[serde(default = "default_resource_type")]
    pub resource_type: EnvValue,

    #[serde(default = "default_api_suffix")]
    pub api_suffix: String,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

/// Per-org overrides. Only the fields that are set replace the base values.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Destination {
    #[serde(default)]
    pub login_url: Option<EnvValue>,

    #[serde(default)]
    pub pod_url: Option<EnvValue>,

    #[serde(default)]
    pub username: Option<EnvValue>,

    #[serde(default)]
    pub password: Option<EnvValue>,

    #[serde(default)]
    pub session_id: Option<EnvValue>,

    #[serde(default)]
    pub resource_type: Option<EnvValue>,
}

fn default_login_url() -> EnvValue {
    EnvValue::literal(DEFAULT_LOGIN_URL)
}

fn default_resource_type() -> EnvValue {
    EnvValue::literal(DEFAULT_RESOURCE_TYPE)
}

fn default_api_suffix() -> String {
    DEFAULT_API_SUFFIX.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Discover a config file, or build one from the environment when none exists.
    pub fn discover_or_env(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => {
                tracing::debug!("no configuration file found, using environment variables");
                Ok(Self::from_env())
            }
            other => other,
        }
    }

    /// Configuration wired to the pipeline's environment variables.
    ///
    /// Values are resolved lazily, so variables set after this call are seen.
    pub fn from_env() -> Self {
        let uat = Destination {
            pod_url: Some(EnvValue::from_env("UAT_IICS_POD_URL")),
            username: Some(EnvValue::from_env("UAT_IICS_USERNAME")),
            password: Some(EnvValue::from_env("UAT_IICS_PASSWORD")),
            session_id: Some(EnvValue::from_env("uat_sessionId")),
            ..Destination::default()
        };

        Config {
            login_url: EnvValue::from_env_or("IICS_LOGIN_URL", DEFAULT_LOGIN_URL),
            pod_url: Some(EnvValue::from_env("IICS_POD_URL")),
            username: Some(EnvValue::from_env("IICS_USERNAME")),
            password: Some(EnvValue::from_env("IICS_PASSWORD")),
            session_id: Some(EnvValue::from_env("sessionId")),
            resource_type: EnvValue::from_env_or("RESOURCE_TYPE", DEFAULT_RESOURCE_TYPE),
            api_suffix: default_api_suffix(),
            request_timeout: default_request_timeout(),
            retry: RetryConfig::default(),
            polling: PollingConfig::default(),
            destinations: HashMap::from([(UAT_DESTINATION.to_string(), uat)]),
        }
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref v) = dest.login_url {
            merged.login_url = v.clone();
        }
        // An unset pod variable falls back to the base org's pod.
        if let Some(pod) = dest.pod_url.as_ref().filter(|v| v.resolve_optional().is_some()) {
            merged.pod_url = Some(pod.clone());
        }
        // Credentials and session travel together: a destination never
        // inherits the base org's identity.
        merged.username = dest.username.clone();
        merged.password = dest.password.clone();
        merged.session_id = dest.session_id.clone();
        if let Some(ref v) = dest.resource_type {
            merged.resource_type = v.clone();
        }

        Ok(merged)
    }

    /// Session state seeded from the resolved connection settings.
    pub fn session(&self) -> Result<SessionContext> {
        let mut session = SessionContext::new().login_url(self.login_url.resolve()?);
        if let Some(pod) = resolve(&self.pod_url) {
            session = session.pod_url(pod);
        }
        if let (Some(user), Some(pass)) = (resolve(&self.username), resolve(&self.password)) {
            session = session.credentials(user, pass);
        }
        if let Some(id) = resolve(&self.session_id) {
            session = session.session_id(id);
        }
        Ok(session)
    }

    pub fn resource_type(&self) -> String {
        self.resource_type
            .resolve_optional()
            .unwrap_or_else(|| DEFAULT_RESOURCE_TYPE.to_string())
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_suffix: self.api_suffix.clone(),
            retry: RetryPolicy::from(&self.retry),
            pull_interval: self.polling.pull_interval,
            job_interval: self.polling.job_interval,
            request_timeout: self.request_timeout,
        }
    }
}

fn resolve(value: &Option<EnvValue>) -> Option<String> {
    value.as_ref().and_then(EnvValue::resolve_optional)
}
