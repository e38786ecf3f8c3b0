// ABOUTME: Pulls a commit's artifacts from source control into the target org.
// ABOUTME: Falls back from the bulk commit endpoint to an explicit object list when it is missing.

use std::time::Duration;

use super::api::{Api, Idempotency};
use super::error::{ClientError, Result};
use super::model::{
    CommitDetails, CommitObject, ObjectRef, PullAction, PullByCommitRequest, PullObjectsRequest,
    PullStarted, PullState, SourceControlAction,
};
use super::poller::Poller;
use super::transport::Method;
use crate::types::{CommitHash, ObjectId, PullActionId};

const PULL_BY_COMMIT_PATH: &str = "/public/core/v3/pullByCommitHash";
const PULL_PATH: &str = "/public/core/v3/pull";
const COMMIT_PATH: &str = "/public/core/v3/commit";
const ACTION_PATH: &str = "/public/core/v3/sourceControlAction";

/// Synchronizes commits into the org and waits for each pull to finish.
pub struct CommitSyncEngine<'a> {
    api: &'a Api<'a>,
    poll_interval: Duration,
}

impl<'a> CommitSyncEngine<'a> {
    pub fn new(api: &'a Api<'a>, poll_interval: Duration) -> Self {
        Self { api, poll_interval }
    }

    /// Pull every object of a commit.
    ///
    /// When the bulk endpoint is unknown to the pod (404 on every base), the
    /// commit's objects are listed and pulled explicitly instead.
    pub async fn pull_by_commit(&self, commit: &CommitHash) -> Result<PullAction> {
        tracing::info!(commit = %commit.short(), "syncing commit to org");

        let body = PullByCommitRequest {
            commit_hash: commit.as_str(),
        };
        let started = self
            .api
            .core(
                Method::Post,
                PULL_BY_COMMIT_PATH,
                Some(&body),
                Idempotency::Retriable,
            )
            .await;

        match started {
            Ok(response) => {
                let started: PullStarted = response.json()?;
                self.wait_for(started).await
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    commit = %commit.short(),
                    "bulk pull endpoint unavailable, pulling commit objects explicitly"
                );
                self.pull_by_commit_objects(commit).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Pull all objects of a commit by listing them and naming each id.
    pub async fn pull_by_commit_objects(&self, commit: &CommitHash) -> Result<PullAction> {
        let objects = self.get_commit_objects(commit, None).await?;
        let ids: Vec<ObjectId> = objects.into_iter().map(|o| o.id).collect();
        if ids.is_empty() {
            return Err(ClientError::pull(format!(
                "commit {commit} has no objects to pull"
            )));
        }
        self.pull_objects(commit, &ids).await
    }

    /// Pull a single object as it was at `commit`.
    pub async fn pull_by_commit_object(
        &self,
        commit: &CommitHash,
        object_id: &ObjectId,
    ) -> Result<PullAction> {
        tracing::info!(commit = %commit.short(), object = %object_id, "syncing object to org");
        self.pull_objects(commit, std::slice::from_ref(object_id))
            .await
    }

    /// List the objects changed by a commit, optionally keeping one type.
    /// Server order is preserved.
    pub async fn get_commit_objects(
        &self,
        commit: &CommitHash,
        type_filter: Option<&str>,
    ) -> Result<Vec<CommitObject>> {
        tracing::info!(commit = %commit.short(), "listing commit objects");

        let path = format!("{COMMIT_PATH}/{commit}");
        let response = self
            .api
            .core(Method::Get, &path, None::<&()>, Idempotency::Retriable)
            .await?;
        let details: Option<CommitDetails> = response.json()?;
        let changes = details.unwrap_or_default().changes;

        Ok(match type_filter {
            Some(kind) => changes
                .into_iter()
                .filter(|o| o.object_type == kind)
                .collect(),
            None => changes,
        })
    }

    async fn pull_objects(&self, commit: &CommitHash, ids: &[ObjectId]) -> Result<PullAction> {
        let body = PullObjectsRequest {
            commit_hash: commit.as_str(),
            objects: ids.iter().map(|id| ObjectRef { id: id.as_str() }).collect(),
        };
        let response = self
            .api
            .core(Method::Post, PULL_PATH, Some(&body), Idempotency::Retriable)
            .await?;
        let started: PullStarted = response.json()?;
        self.wait_for(started).await
    }

    async fn wait_for(&self, started: PullStarted) -> Result<PullAction> {
        let id = started
            .pull_action_id
            .ok_or_else(|| ClientError::pull("pull response did not contain a pullActionId"))?;
        self.wait_for_pull(&id).await
    }

    /// Poll a pull action until it leaves `IN_PROGRESS`.
    pub async fn wait_for_pull(&self, id: &PullActionId) -> Result<PullAction> {
        let path = format!("{ACTION_PATH}/{id}");
        let path = path.as_str();
        let api = self.api;
        let poller = Poller::new(api.sleeper(), self.poll_interval);

        let polled = poller
            .until_terminal(
                "pull",
                || async move {
                    let response = api
                        .core(Method::Get, path, None::<&()>, Idempotency::Once)
                        .await?;
                    let action: SourceControlAction = response.json()?;
                    Ok::<_, ClientError>(action)
                },
                |action: &SourceControlAction| Some(action.status.state.clone()),
                PullState::is_terminal,
            )
            .await?;

        match polled.state {
            PullState::Successful => {
                tracing::info!(pull_action = %id, polls = polled.polls, "pull successful");
                Ok(PullAction {
                    id: id.clone(),
                    state: PullState::Successful,
                })
            }
            other => {
                tracing::error!(
                    pull_action = %id,
                    state = %other,
                    message = polled.payload.status.message.as_deref().unwrap_or(""),
                    "pull failed"
                );
                Err(ClientError::pull_status(other.to_string()))
            }
        }
    }
}
