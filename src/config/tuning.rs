// ABOUTME: Retry and polling cadence settings.
// ABOUTME: Durations are written in humantime form such as "2s" or "1m".

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_initial_backoff", with = "humantime_serde")]
    pub initial_backoff: Duration,

    #[serde(default = "default_max_backoff", with = "humantime_serde")]
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
        }
    }
}

fn default_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> Duration {
    Duration::from_secs(2)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PollingConfig {
    /// Delay before each status check of a pull.
    #[serde(default = "default_pull_interval", with = "humantime_serde")]
    pub pull_interval: Duration,

    /// Delay before each activity-log check of a job run.
    #[serde(default = "default_job_interval", with = "humantime_serde")]
    pub job_interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            pull_interval: default_pull_interval(),
            job_interval: default_job_interval(),
        }
    }
}

fn default_pull_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_job_interval() -> Duration {
    Duration::from_secs(20)
}
