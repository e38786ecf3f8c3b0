// ABOUTME: Generic fixed-interval poller for long-running server-side operations.
// ABOUTME: Sleeps, fetches, extracts a state and stops once that state is terminal.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Source of delays. Production code sleeps on the tokio timer; tests record
/// the requested durations and return immediately.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Final observation of a polled operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Polled<T, S> {
    pub payload: T,
    pub state: S,
    /// Number of status fetches performed, including the terminal one.
    pub polls: u32,
}

/// Blocking-style poll loop with a fixed delay before every fetch.
///
/// There is no attempt limit: the loop ends on a terminal state or on the
/// first fetch error, which is returned as-is.
pub struct Poller<'a> {
    sleeper: &'a dyn Sleeper,
    interval: Duration,
}

impl<'a> Poller<'a> {
    pub fn new(sleeper: &'a dyn Sleeper, interval: Duration) -> Self {
        Self { sleeper, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until `extract` yields a state accepted by `is_terminal`.
    ///
    /// `extract` returning `None` means the status is not available yet; the
    /// loop keeps going.
    pub async fn until_terminal<T, S, E, F, Fut, X, P>(
        &self,
        what: &str,
        mut fetch: F,
        extract: X,
        is_terminal: P,
    ) -> Result<Polled<T, S>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        X: Fn(&T) -> Option<S>,
        P: Fn(&S) -> bool,
        S: std::fmt::Debug,
    {
        let mut polls = 0u32;
        loop {
            self.sleeper.sleep(self.interval).await;
            polls += 1;

            let payload = fetch().await?;
            match extract(&payload) {
                Some(state) if is_terminal(&state) => {
                    tracing::debug!(%what, ?state, polls, "reached terminal state");
                    return Ok(Polled {
                        payload,
                        state,
                        polls,
                    });
                }
                Some(state) => {
                    tracing::debug!(%what, ?state, polls, "still running");
                }
                None => {
                    tracing::warn!(%what, polls, "status not available yet, polling again");
                }
            }
        }
    }
}

/// Sleeper that records requested delays and returns immediately.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    slept: parking_lot::Mutex<Vec<Duration>>,
}

#[cfg(test)]
impl RecordingSleeper {
    pub(crate) fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}
