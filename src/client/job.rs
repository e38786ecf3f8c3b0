// ABOUTME: Starts a job for one task and waits for its run to finish via the activity log.
// ABOUTME: A run is done at the first non-zero state; 1 is success, anything else a failure.

use std::time::Duration;

use super::api::{Api, Idempotency};
use super::error::{ClientError, Result};
use super::model::{ActivityLogEntry, JOB_RUNNING, JobRun, JobStartRequest, JobStarted};
use super::poller::Poller;
use super::transport::Method;
use crate::types::TaskId;

const JOB_PATH: &str = "/api/v2/job/";
const ACTIVITY_LOG_PATH: &str = "/api/v2/activity/activityLog";

pub struct JobRunner<'a> {
    api: &'a Api<'a>,
    poll_interval: Duration,
}

impl<'a> JobRunner<'a> {
    pub fn new(api: &'a Api<'a>, poll_interval: Duration) -> Self {
        Self { api, poll_interval }
    }

    /// Start a job for `task_id` and block until it reaches a terminal state.
    ///
    /// The job start is sent once: repeating it could launch a second run.
    pub async fn run_job(&self, task_id: &TaskId, task_type: &str) -> Result<JobRun> {
        tracing::info!(task = %task_id, %task_type, "starting job");

        let body = JobStartRequest {
            kind: "job",
            task_id: task_id.as_str(),
            task_type,
        };
        let response = self
            .api
            .pinned(Method::Post, JOB_PATH, Some(&body), Idempotency::Once)
            .await?;
        let started: JobStarted = response.json()?;
        let run_id = started
            .run_id
            .ok_or_else(|| ClientError::job("could not retrieve runId from job start response"))?;

        self.wait_for_run(run_id).await
    }

    /// Poll the activity log for `run_id`. An empty log means the run is not
    /// visible yet and is polled again.
    pub async fn wait_for_run(&self, run_id: u64) -> Result<JobRun> {
        let path = format!("{ACTIVITY_LOG_PATH}?runId={run_id}");
        let path = path.as_str();
        let api = self.api;
        let poller = Poller::new(api.sleeper(), self.poll_interval);

        let polled = poller
            .until_terminal(
                "job",
                || async move {
                    let response = api
                        .pinned(Method::Get, path, None::<&()>, Idempotency::Once)
                        .await?;
                    let log: Option<Vec<ActivityLogEntry>> = response.json()?;
                    Ok::<_, ClientError>(log.unwrap_or_default())
                },
                |log: &Vec<ActivityLogEntry>| log.first().map(|entry| entry.state),
                |state: &i64| *state != JOB_RUNNING,
            )
            .await?;

        let entry = polled.payload.into_iter().next();
        let run = JobRun {
            run_id,
            state: polled.state,
            object_name: entry
                .as_ref()
                .and_then(|e| e.object_name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            error_message: entry.and_then(|e| e.error_msg),
        };

        if run.succeeded() {
            tracing::info!(run_id, object = %run.object_name, "job completed successfully");
            return Ok(run);
        }

        let message = run
            .error_message
            .clone()
            .unwrap_or_else(|| "No error message".to_string());
        tracing::error!(
            run_id,
            object = %run.object_name,
            state = run.state,
            error = %message,
            "job failed"
        );
        Err(ClientError::Job {
            reason: format!("job {} finished with state {}", run.object_name, run.state),
            state: Some(run.state),
            object_name: Some(run.object_name),
            message: Some(message),
        })
    }
}
