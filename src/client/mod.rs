// ABOUTME: Orchestration client for commit-driven promotion on IICS.
// ABOUTME: Wires session, retry, endpoint resolution and polling into sync, job and rollback operations.

mod api;
mod endpoint;
mod error;
mod job;
mod model;
mod poller;
mod retry;
mod rollback;
mod session;
mod sync;
mod transport;

pub use api::{Api, Idempotency};
pub use endpoint::{DEFAULT_API_SUFFIX, EndpointResolver};
pub use error::{ClientError, ErrorKind, Result, TransportError};
pub use job::JobRunner;
pub use model::{
    CommitObject, JOB_RUNNING, JOB_SUCCEEDED, JobRun, LoginOutcome, PullAction, PullState,
    RollbackTarget,
};
pub use poller::{Polled, Poller, Sleeper, TokioSleeper};
pub use retry::RetryPolicy;
pub use rollback::RollbackResolver;
pub use session::{CONTENT_TYPE, LEGACY_SESSION_HEADER, SESSION_HEADER, SessionContext};
pub use sync::CommitSyncEngine;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

use std::sync::Arc;
use std::time::Duration;

use crate::diagnostics::{Diagnostics, Warning};
use crate::types::{CommitHash, ObjectId, TaskId};

const LOGOUT_PATH: &str = "/public/core/v3/logout";

/// Tunables for one client instance.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_suffix: String,
    pub retry: RetryPolicy,
    pub pull_interval: Duration,
    pub job_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_suffix: DEFAULT_API_SUFFIX.to_string(),
            retry: RetryPolicy::default(),
            pull_interval: Duration::from_secs(10),
            job_interval: Duration::from_secs(20),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Outcome of a pull followed by job runs for the same commit.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub pull: PullAction,
    pub runs: Vec<JobRun>,
}

/// Entry point for all operations against one org.
///
/// Operations run strictly one after another; nothing here spawns work.
pub struct IicsClient {
    session: SessionContext,
    options: ClientOptions,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
}

impl IicsClient {
    /// Client over HTTPS with real sleeps.
    pub fn new(session: SessionContext, options: ClientOptions) -> Result<Self> {
        let transport = HttpTransport::new(options.request_timeout)?;
        Ok(Self::with_parts(
            session,
            options,
            Arc::new(transport),
            Arc::new(TokioSleeper),
        ))
    }

    pub fn with_parts(
        session: SessionContext,
        options: ClientOptions,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            session,
            options,
            transport,
            sleeper,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub async fn login(&mut self) -> Result<LoginOutcome> {
        self.session
            .login(
                self.transport.as_ref(),
                self.sleeper.as_ref(),
                &self.options.retry,
            )
            .await
    }

    fn api(&self) -> Result<Api<'_>> {
        Api::new(
            &self.session,
            &self.options.api_suffix,
            self.transport.as_ref(),
            self.sleeper.as_ref(),
            self.options.retry,
        )
    }

    pub async fn pull_by_commit(&self, commit: &CommitHash) -> Result<PullAction> {
        let api = self.api()?;
        CommitSyncEngine::new(&api, self.options.pull_interval)
            .pull_by_commit(commit)
            .await
    }

    pub async fn pull_by_commit_objects(&self, commit: &CommitHash) -> Result<PullAction> {
        let api = self.api()?;
        CommitSyncEngine::new(&api, self.options.pull_interval)
            .pull_by_commit_objects(commit)
            .await
    }

    pub async fn pull_by_commit_object(
        &self,
        commit: &CommitHash,
        object_id: &ObjectId,
    ) -> Result<PullAction> {
        let api = self.api()?;
        CommitSyncEngine::new(&api, self.options.pull_interval)
            .pull_by_commit_object(commit, object_id)
            .await
    }

    pub async fn get_commit_objects(
        &self,
        commit: &CommitHash,
        type_filter: Option<&str>,
    ) -> Result<Vec<CommitObject>> {
        let api = self.api()?;
        CommitSyncEngine::new(&api, self.options.pull_interval)
            .get_commit_objects(commit, type_filter)
            .await
    }

    pub async fn run_job(&self, task_id: &TaskId, task_type: &str) -> Result<JobRun> {
        let api = self.api()?;
        JobRunner::new(&api, self.options.job_interval)
            .run_job(task_id, task_type)
            .await
    }

    /// Run a job for every object of `object_type` in the commit, in server order.
    ///
    /// Objects without an execution handle are skipped with a warning. The
    /// first failing job ends the sequence.
    pub async fn run_commit_jobs(
        &self,
        commit: &CommitHash,
        object_type: &str,
        diag: &mut Diagnostics,
    ) -> Result<Vec<JobRun>> {
        let api = self.api()?;
        let sync = CommitSyncEngine::new(&api, self.options.pull_interval);
        let runner = JobRunner::new(&api, self.options.job_interval);

        let objects = sync.get_commit_objects(commit, Some(object_type)).await?;
        if objects.is_empty() {
            diag.warn(Warning::nothing_to_run(format!(
                "no objects of type '{object_type}' found in commit {commit}"
            )));
            return Ok(Vec::new());
        }

        let mut runs = Vec::with_capacity(objects.len());
        for object in &objects {
            let Some(task_id) = &object.app_context_id else {
                diag.warn(Warning::missing_task(format!(
                    "object {} ({}) has no appContextId, skipping",
                    object.name, object.id
                )));
                continue;
            };
            runs.push(runner.run_job(task_id, object_type).await?);
        }
        Ok(runs)
    }

    /// Pull the commit, then run its objects of `object_type`.
    pub async fn deploy(
        &self,
        commit: &CommitHash,
        object_type: &str,
        diag: &mut Diagnostics,
    ) -> Result<DeployReport> {
        let pull = self.pull_by_commit(commit).await?;
        let runs = self.run_commit_jobs(commit, object_type, diag).await?;
        Ok(DeployReport { pull, runs })
    }

    pub async fn rollback(&self, target: &RollbackTarget) -> Result<PullAction> {
        let api = self.api()?;
        let sync = CommitSyncEngine::new(&api, self.options.pull_interval);
        RollbackResolver::new(&api, &sync).rollback(target).await
    }

    /// End the session. Failures are recorded as warnings and never returned.
    pub async fn logout(&self, diag: &mut Diagnostics) {
        let Ok(api) = self.api() else {
            tracing::debug!("no active session, skipping logout");
            return;
        };

        match api
            .core(Method::Post, LOGOUT_PATH, None::<&()>, Idempotency::Once)
            .await
        {
            Ok(_) => tracing::info!("logged out"),
            Err(e) => diag.warn(Warning::logout(format!(
                "logout failed (session may already be expired): {e}"
            ))),
        }
    }
}
