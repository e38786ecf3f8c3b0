// ABOUTME: Connection and authentication state for one IICS org.
// ABOUTME: Owns the session id and derives the request headers both API generations expect.

use std::fmt;

use super::error::{ClientError, Result};
use super::model::{LoginOutcome, LoginRequest, LoginResponse};
use super::poller::Sleeper;
use super::retry::RetryPolicy;
use super::transport::{ApiRequest, Transport};

pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
/// Session header read by the current (core v3) API.
pub const SESSION_HEADER: &str = "INFA-SESSION-ID";
/// Session header read by the legacy (v2) API.
pub const LEGACY_SESSION_HEADER: &str = "icSessionId";

const LOGIN_PATH: &str = "/saas/public/core/v3/login";

/// Connection and auth state. Mutated only by [`SessionContext::login`].
#[derive(Clone, Default)]
pub struct SessionContext {
    login_url: Option<String>,
    pod_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    session_id: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = non_empty(url.into());
        self
    }

    pub fn pod_url(mut self, url: impl Into<String>) -> Self {
        self.pod_url = non_empty(url.into());
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = non_empty(username.into());
        self.password = non_empty(password.into());
        self
    }

    /// Reuse a session id obtained by an earlier login (e.g. a previous pipeline step).
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = non_empty(session_id.into());
        self
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn current_pod_url(&self) -> Option<&str> {
        self.pod_url.as_deref()
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Headers sent on every call. The session headers appear once a session
    /// id is known; both carry the same value.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), CONTENT_TYPE.to_string())];
        if let Some(id) = &self.session_id {
            headers.push((SESSION_HEADER.to_string(), id.clone()));
            headers.push((LEGACY_SESSION_HEADER.to_string(), id.clone()));
        }
        headers
    }

    /// Fails with a configuration error unless a pod URL and session id are set.
    /// Returns the pod URL on success.
    pub fn ensure_authenticated(&self) -> Result<&str> {
        match (self.pod_url.as_deref(), self.session_id.as_deref()) {
            (Some(pod), Some(_)) => Ok(pod),
            (None, _) => Err(ClientError::config(
                "pod URL is required for authenticated calls",
            )),
            (_, None) => Err(ClientError::config(
                "session id is required for authenticated calls; log in first",
            )),
        }
    }

    /// Post the credentials to the login endpoint and adopt the returned session.
    ///
    /// Missing login URL or credentials fail before anything is sent. If the
    /// response advertises a pod URL and none was configured, it is adopted.
    pub async fn login(
        &mut self,
        transport: &dyn Transport,
        sleeper: &dyn Sleeper,
        retry: &RetryPolicy,
    ) -> Result<LoginOutcome> {
        let (Some(login_url), Some(username), Some(password)) = (
            self.login_url.as_deref(),
            self.username.as_deref(),
            self.password.as_deref(),
        ) else {
            return Err(ClientError::config(
                "login URL, username and password are required for login",
            ));
        };

        let url = format!("{}{}", login_url.trim_end_matches('/'), LOGIN_PATH);
        let body = serde_json::to_value(LoginRequest { username, password })
            .map_err(|e| ClientError::config(format!("invalid credentials: {e}")))?;
        let request = ApiRequest::post(&url, Some(body)).with_headers(&self.headers_without_session());

        tracing::info!(%login_url, %username, "logging in");

        let response = retry
            .run(sleeper, "login", || transport.send(request.clone()))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "login failed");
                ClientError::Authentication {
                    reason: e.to_string(),
                    source: Some(e),
                }
            })?;

        let parsed: LoginResponse = response.json().map_err(|e| ClientError::Authentication {
            reason: "login response could not be decoded".to_string(),
            source: Some(e),
        })?;

        let session_id = parsed
            .user_info
            .and_then(|u| u.session_id)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ClientError::Authentication {
                reason: "login response did not contain a session id".to_string(),
                source: None,
            })?;

        let base_api_url = parsed
            .products
            .into_iter()
            .find_map(|p| p.base_api_url)
            .filter(|u| !u.is_empty());

        if self.pod_url.is_none() {
            self.pod_url = base_api_url.clone();
        }
        self.session_id = Some(session_id.clone());

        tracing::info!("login successful");
        Ok(LoginOutcome {
            session_id,
            base_api_url,
        })
    }

    fn headers_without_session(&self) -> Vec<(String, String)> {
        vec![("Content-Type".to_string(), CONTENT_TYPE.to_string())]
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("login_url", &self.login_url)
            .field("pod_url", &self.pod_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("session_id", &self.session_id.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
