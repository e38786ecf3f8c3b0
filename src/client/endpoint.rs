// ABOUTME: Resolves logical API paths against the pod URL's two base conventions.
// ABOUTME: Tries each candidate base in order and moves on only when a candidate answers 404.

use nonempty::NonEmpty;
use std::future::Future;

use super::error::TransportError;

/// Default API suffix some pod URLs carry (`https://<pod>/saas`).
pub const DEFAULT_API_SUFFIX: &str = "/saas";

/// Ordered candidate base URLs for one pod.
///
/// The platform does not document whether its core-v3 endpoints live under
/// the suffixed or the bare pod URL, so both are tried. The v2 job and
/// activity-log endpoints are pinned to the bare form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    candidates: NonEmpty<String>,
}

impl EndpointResolver {
    pub fn new(pod_url: &str, api_suffix: &str) -> Self {
        let suffix = normalize_suffix(api_suffix);
        let stripped = strip_suffix(pod_url, &suffix);

        let mut candidates = NonEmpty::new(stripped.clone());
        if !suffix.is_empty() {
            let suffixed = format!("{stripped}{suffix}");
            if suffixed != stripped {
                candidates.push(suffixed);
            }
        }

        Self { candidates }
    }

    /// Candidate bases in the order they are tried.
    pub fn candidates(&self) -> &NonEmpty<String> {
        &self.candidates
    }

    /// Base for endpoints whose convention is pinned (v2 job/activity APIs).
    pub fn pinned_base(&self) -> &str {
        self.candidates.first()
    }

    pub fn pinned_url(&self, path: &str) -> String {
        join(self.pinned_base(), path)
    }

    pub fn candidate_urls(&self, path: &str) -> NonEmpty<String> {
        self.candidates.clone().map(|base| join(&base, path))
    }

    /// Issue `attempt` against each candidate URL until one answers with
    /// anything other than 404. If every candidate answers 404, the last
    /// not-found error is returned.
    pub async fn resolve<T, F, Fut>(&self, path: &str, mut attempt: F) -> Result<T, TransportError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut last_not_found = None;
        for url in self.candidate_urls(path) {
            match attempt(url.clone()).await {
                Err(e) if e.is_not_found() => {
                    tracing::debug!(%url, "endpoint not found, trying next base");
                    last_not_found = Some(e);
                }
                other => return other,
            }
        }

        Err(last_not_found.unwrap_or_else(|| TransportError::Status {
            url: self.pinned_url(path),
            status: 404,
            body: String::new(),
        }))
    }
}

fn normalize_suffix(suffix: &str) -> String {
    let trimmed = suffix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn strip_suffix(pod_url: &str, suffix: &str) -> String {
    let base = pod_url.trim().trim_end_matches('/');
    if suffix.is_empty() {
        return base.to_string();
    }
    base.strip_suffix(suffix)
        .map(|s| s.trim_end_matches('/'))
        .unwrap_or(base)
        .to_string()
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
