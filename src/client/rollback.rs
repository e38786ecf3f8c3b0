// ABOUTME: Rolls a single artifact back to the commit before its current one.
// ABOUTME: Reads commit history, looks up the object id and re-pulls that object at the older hash.

use super::api::{Api, Idempotency};
use super::error::{ClientError, Result};
use super::model::{
    CommitHistory, LookupKey, LookupRequest, LookupResponse, PullAction, RollbackTarget,
};
use super::sync::CommitSyncEngine;
use super::transport::Method;
use crate::types::{CommitHash, ObjectId};

const HISTORY_PATH: &str = "/public/core/v3/commitHistory";
const LOOKUP_PATH: &str = "/public/core/v3/lookup";

pub struct RollbackResolver<'a> {
    api: &'a Api<'a>,
    sync: &'a CommitSyncEngine<'a>,
}

impl<'a> RollbackResolver<'a> {
    pub fn new(api: &'a Api<'a>, sync: &'a CommitSyncEngine<'a>) -> Self {
        Self { api, sync }
    }

    /// Re-apply the previous committed version of `target`.
    pub async fn rollback(&self, target: &RollbackTarget) -> Result<PullAction> {
        tracing::info!(
            path = %target.path_name,
            name = %target.mapping_name,
            object_type = %target.object_type,
            "rolling back artifact"
        );

        let previous = self.previous_commit(target).await?;
        let object_id = self.lookup_object(target).await?;

        tracing::info!(commit = %previous.short(), object = %object_id, "previous version found");
        self.sync.pull_by_commit_object(&previous, &object_id).await
    }

    /// Hash of the most recent commit before the current one.
    pub async fn previous_commit(&self, target: &RollbackTarget) -> Result<CommitHash> {
        let query = urlencoding::encode(&target.history_query()).into_owned();
        let path = format!("{HISTORY_PATH}?q={query}");

        let response = self
            .api
            .core(Method::Get, &path, None::<&()>, Idempotency::Retriable)
            .await?;
        let history: Option<CommitHistory> = response.json()?;
        let commits = history.unwrap_or_default().commits;

        let Some(previous) = commits.get(1) else {
            return Err(ClientError::pull(format!(
                "no previous commit found to roll back {} to",
                target.artifact_path()
            )));
        };

        CommitHash::new(&previous.hash).map_err(|e| {
            ClientError::pull(format!(
                "commit history returned an invalid hash '{}': {e}",
                previous.hash
            ))
        })
    }

    /// Resolve the artifact's object id from its path and type.
    pub async fn lookup_object(&self, target: &RollbackTarget) -> Result<ObjectId> {
        let body = LookupRequest {
            objects: vec![LookupKey {
                path: target.artifact_path(),
                object_type: target.object_type.to_uppercase(),
            }],
        };
        let response = self
            .api
            .core(Method::Post, LOOKUP_PATH, Some(&body), Idempotency::Retriable)
            .await?;
        let found: Option<LookupResponse> = response.json()?;

        found
            .unwrap_or_default()
            .objects
            .into_iter()
            .next()
            .map(|o| o.id)
            .ok_or_else(|| {
                ClientError::pull(format!(
                    "object {} not found in path {}",
                    target.mapping_name, target.path_name
                ))
            })
    }
}
