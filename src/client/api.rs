// ABOUTME: Authenticated request plumbing shared by the sync, job and rollback components.
// ABOUTME: Combines session headers, endpoint resolution and the retry policy per call.

use serde::Serialize;
use serde_json::Value;

use super::endpoint::EndpointResolver;
use super::error::{ClientError, TransportError};
use super::poller::Sleeper;
use super::retry::RetryPolicy;
use super::session::SessionContext;
use super::transport::{ApiRequest, ApiResponse, Method, Transport};

/// Whether a call may be repeated after a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    Retriable,
    Once,
}

/// Borrowed view of everything an authenticated call needs.
///
/// Built by the client after `ensure_authenticated` succeeded, so every
/// component holding one can assume a pod URL and session id exist.
pub struct Api<'a> {
    headers: Vec<(String, String)>,
    endpoints: EndpointResolver,
    transport: &'a dyn Transport,
    sleeper: &'a dyn Sleeper,
    retry: RetryPolicy,
}

impl<'a> Api<'a> {
    pub fn new(
        session: &SessionContext,
        api_suffix: &str,
        transport: &'a dyn Transport,
        sleeper: &'a dyn Sleeper,
        retry: RetryPolicy,
    ) -> Result<Self, ClientError> {
        let pod_url = session.ensure_authenticated()?;
        Ok(Self {
            headers: session.headers(),
            endpoints: EndpointResolver::new(pod_url, api_suffix),
            transport,
            sleeper,
            retry,
        })
    }

    pub fn sleeper(&self) -> &'a dyn Sleeper {
        self.sleeper
    }

    pub fn endpoints(&self) -> &EndpointResolver {
        &self.endpoints
    }

    /// Core-v3 call: tolerant of both base-URL conventions.
    pub async fn core<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        idempotency: Idempotency,
    ) -> Result<ApiResponse, TransportError> {
        let body = encode(body, path)?;
        self.endpoints
            .resolve(path, |url| {
                let request = self.request(method, url, body.clone());
                async move { self.send(request, idempotency).await }
            })
            .await
    }

    /// v2 call: always the suffix-stripped base.
    pub async fn pinned<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        idempotency: Idempotency,
    ) -> Result<ApiResponse, TransportError> {
        let body = encode(body, path)?;
        let request = self.request(method, self.endpoints.pinned_url(path), body);
        self.send(request, idempotency).await
    }

    fn request(&self, method: Method, url: String, body: Option<Value>) -> ApiRequest {
        let request = match method {
            Method::Get => ApiRequest::get(url),
            Method::Post => ApiRequest::post(url, body),
        };
        request.with_headers(&self.headers)
    }

    async fn send(
        &self,
        request: ApiRequest,
        idempotency: Idempotency,
    ) -> Result<ApiResponse, TransportError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        match idempotency {
            Idempotency::Retriable => {
                let what = request.url.clone();
                self.retry
                    .run(self.sleeper, &what, || self.transport.send(request.clone()))
                    .await
            }
            Idempotency::Once => self.transport.send(request).await,
        }
    }
}

fn encode<B: Serialize>(body: Option<&B>, path: &str) -> Result<Option<Value>, TransportError> {
    body.map(serde_json::to_value)
        .transpose()
        .map_err(|e| TransportError::Decode {
            url: path.to_string(),
            message: format!("failed to encode request body: {e}"),
        })
}
