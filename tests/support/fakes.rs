// ABOUTME: In-memory transport and sleeper doubles for exercising the client without a network.
// ABOUTME: Replies are scripted per method and URL; unscripted URLs answer 404.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;

use iics_promote::client::{ApiRequest, ApiResponse, Method, Sleeper, Transport, TransportError};

/// Scripted outcome for one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with the given JSON body.
    Json(Value),
    /// Non-2xx status with an empty body.
    Status(u16),
    /// A failure below HTTP (refused connection, timeout).
    Fail(TransportError),
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Reply::Json(value)
    }

    pub fn connection_refused() -> Self {
        Reply::Fail(TransportError::Connect {
            url: String::new(),
            message: "connection refused".to_string(),
        })
    }

    fn into_result(self, url: &str) -> Result<ApiResponse, TransportError> {
        match self {
            Reply::Json(value) => Ok(ApiResponse {
                url: url.to_string(),
                status: 200,
                body: value.to_string(),
            }),
            Reply::Status(status) => Err(TransportError::Status {
                url: url.to_string(),
                status,
                body: String::new(),
            }),
            Reply::Fail(TransportError::Connect { message, .. }) => Err(TransportError::Connect {
                url: url.to_string(),
                message,
            }),
            Reply::Fail(TransportError::Timeout { .. }) => Err(TransportError::Timeout {
                url: url.to_string(),
            }),
            Reply::Fail(other) => Err(other),
        }
    }
}

struct Route {
    method: Method,
    pattern: String,
    replies: VecDeque<Reply>,
}

impl Route {
    /// Patterns with a query string match the full URL tail; others match the path only.
    fn matches(&self, request: &ApiRequest) -> bool {
        if request.method != self.method {
            return false;
        }
        if self.pattern.contains('?') {
            request.url.ends_with(&self.pattern)
        } else {
            path_of(&request.url).ends_with(&self.pattern)
        }
    }

    /// Pops the next reply; the last reply repeats forever.
    fn next_reply(&mut self) -> Option<Reply> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or_default()
}

/// Transport double that answers from a script and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `reply` for requests matching `method` and `pattern`.
    ///
    /// Replies for the same route are served in order; the last one keeps
    /// being served once the queue is down to it.
    pub fn on(&self, method: Method, pattern: &str, reply: Reply) -> &Self {
        let mut routes = self.routes.lock();
        if let Some(route) = routes
            .iter_mut()
            .find(|r| r.method == method && r.pattern == pattern)
        {
            route.replies.push_back(reply);
        } else {
            routes.push(Route {
                method,
                pattern: pattern.to_string(),
                replies: VecDeque::from([reply]),
            });
        }
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    /// Number of recorded requests whose URL path ends with `pattern`.
    pub fn count(&self, method: Method, pattern: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && path_of(&r.url).ends_with(pattern))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = request.url.clone();
        self.requests.lock().push(request.clone());

        let reply = {
            let mut routes = self.routes.lock();
            routes
                .iter_mut()
                .find(|r| r.matches(&request))
                .and_then(Route::next_reply)
        };

        reply.unwrap_or(Reply::Status(404)).into_result(&url)
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.slept.lock().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}
