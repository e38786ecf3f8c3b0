// ABOUTME: Error types for the IICS orchestration client.
// ABOUTME: Separates raw transport failures from definitive remote outcomes.

use snafu::Snafu;

/// A single HTTP exchange that did not produce a usable 2xx response.
///
/// This is the only error class RetryPolicy ever retries. It is surfaced to
/// callers unchanged once retries are exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum TransportError {
    #[snafu(display("connection to {url} failed: {message}"))]
    Connect { url: String, message: String },

    #[snafu(display("request to {url} timed out"))]
    Timeout { url: String },

    #[snafu(display("{url} returned HTTP {status}: {body}"))]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[snafu(display("failed to decode response from {url}: {message}"))]
    Decode { url: String, message: String },
}

impl TransportError {
    /// True when the server answered "not found" for this URL.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::Status { status: 404, .. })
    }

    /// Whether another attempt of the same request may succeed.
    ///
    /// A 404 is a definitive answer about the URL, so it is left to the
    /// endpoint resolver instead of being retried. Decoding failures mean the
    /// server answered with something we cannot read; repeating won't help.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Connect { .. } | TransportError::Timeout { .. } => true,
            TransportError::Status { status, .. } => *status != 404,
            TransportError::Decode { .. } => false,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            TransportError::Connect { url, .. }
            | TransportError::Timeout { url }
            | TransportError::Status { url, .. }
            | TransportError::Decode { url, .. } => url,
        }
    }
}

/// Errors returned by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A required setting was missing before any request was made.
    #[error("configuration error: {0}")]
    Config(String),

    /// Login failed after retries or the response carried no session id.
    #[error("authentication failed: {reason}")]
    Authentication {
        reason: String,
        #[source]
        source: Option<TransportError>,
    },

    /// A pull reached a non-successful terminal state, or a rollback
    /// precondition was not met.
    #[error("pull failed: {reason}")]
    Pull {
        reason: String,
        status: Option<String>,
    },

    /// A job run reached a non-successful terminal state.
    #[error("job failed: {reason}")]
    Job {
        reason: String,
        state: Option<i64>,
        object_name: Option<String>,
        message: Option<String>,
    },

    /// The network never produced a usable answer.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Authentication,
    Pull,
    Job,
    Transport,
}

impl ClientError {
    pub fn config(message: impl Into<String>) -> Self {
        ClientError::Config(message.into())
    }

    pub fn pull(reason: impl Into<String>) -> Self {
        ClientError::Pull {
            reason: reason.into(),
            status: None,
        }
    }

    pub fn pull_status(status: impl Into<String>) -> Self {
        let status = status.into();
        ClientError::Pull {
            reason: format!("pull finished with status {status}"),
            status: Some(status),
        }
    }

    pub fn job(reason: impl Into<String>) -> Self {
        ClientError::Job {
            reason: reason.into(),
            state: None,
            object_name: None,
            message: None,
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Config(_) => ErrorKind::Config,
            ClientError::Authentication { .. } => ErrorKind::Authentication,
            ClientError::Pull { .. } => ErrorKind::Pull,
            ClientError::Job { .. } => ErrorKind::Job,
            ClientError::Transport(_) => ErrorKind::Transport,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> TransportError {
        TransportError::Status {
            url: "https://pod/x".to_string(),
            status: code,
            body: String::new(),
        }
    }

    #[test]
    fn not_found_is_not_retryable() {
        assert!(status(404).is_not_found());
        assert!(!status(404).is_retryable());
    }

    #[test]
    fn server_errors_and_connection_failures_are_retryable() {
        assert!(status(500).is_retryable());
        assert!(status(401).is_retryable());
        assert!(
            TransportError::Timeout {
                url: "u".to_string()
            }
            .is_retryable()
        );
        assert!(
            TransportError::Connect {
                url: "u".to_string(),
                message: "refused".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn job_error_display_includes_reason() {
        let err = ClientError::Job {
            reason: "job TestMapping1 finished with state 2".to_string(),
            state: Some(2),
            object_name: Some("TestMapping1".to_string()),
            message: Some("Connection timeout".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::Job);
        assert!(err.to_string().contains("TestMapping1"));
    }
}
