// ABOUTME: Wire and domain types exchanged with the IICS REST APIs.
// ABOUTME: Covers login, commits, pulls, job runs, activity logs and rollback lookups.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::types::{ObjectId, PullActionId, TaskId};

// =============================================================================
// Login
// =============================================================================

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub user_info: Option<UserInfo>,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserInfo {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Product {
    #[serde(default)]
    pub base_api_url: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session_id: String,
    /// Pod URL advertised by the login response, when the platform sends one.
    pub base_api_url: Option<String>,
}

// =============================================================================
// Commits
// =============================================================================

/// One changed artifact in a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitObject {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    /// Artifact kind code such as `MTT` or `DSS`.
    #[serde(rename = "type", default)]
    pub object_type: String,
    /// Execution handle; only runnable artifacts carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_context_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommitDetails {
    #[serde(default)]
    pub changes: Vec<CommitObject>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommitHistory {
    #[serde(default)]
    pub commits: Vec<CommitSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitSummary {
    pub hash: String,
}

// =============================================================================
// Pulls
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullByCommitRequest<'a> {
    pub commit_hash: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullObjectsRequest<'a> {
    pub commit_hash: &'a str,
    pub objects: Vec<ObjectRef<'a>>,
}

#[derive(Serialize)]
pub(crate) struct ObjectRef<'a> {
    pub id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullStarted {
    #[serde(default)]
    pub pull_action_id: Option<PullActionId>,
}

/// State of a server-side pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullState {
    InProgress,
    Successful,
    /// Any other terminal code, kept verbatim.
    Failed(String),
}

impl PullState {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "IN_PROGRESS" => PullState::InProgress,
            "SUCCESSFUL" => PullState::Successful,
            other => PullState::Failed(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PullState::InProgress)
    }
}

impl fmt::Display for PullState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullState::InProgress => write!(f, "IN_PROGRESS"),
            PullState::Successful => write!(f, "SUCCESSFUL"),
            PullState::Failed(code) => write!(f, "{code}"),
        }
    }
}

impl<'de> Deserialize<'de> for PullState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(PullState::from_wire(&value))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourceControlAction {
    pub status: ActionStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionStatus {
    pub state: PullState,
    #[serde(default)]
    pub message: Option<String>,
}

/// A finished pull as observed by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullAction {
    pub id: PullActionId,
    pub state: PullState,
}

// =============================================================================
// Jobs
// =============================================================================

pub const JOB_RUNNING: i64 = 0;
pub const JOB_SUCCEEDED: i64 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobStartRequest<'a> {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub task_id: &'a str,
    pub task_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobStarted {
    #[serde(default, deserialize_with = "deserialize_run_id")]
    pub run_id: Option<u64>,
}

/// Accepts `runId` as a JSON number or a numeric string. Zero means "no run".
fn deserialize_run_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    let raw: Option<Raw> = Option::deserialize(deserializer)?;
    let id = match raw {
        None => None,
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<u64>().ok(),
    };
    Ok(id.filter(|n| *n != 0))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivityLogEntry {
    pub state: i64,
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

/// Terminal outcome of one job execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRun {
    pub run_id: u64,
    pub state: i64,
    pub object_name: String,
    pub error_message: Option<String>,
}

impl JobRun {
    pub fn succeeded(&self) -> bool {
        self.state == JOB_SUCCEEDED
    }
}

// =============================================================================
// Rollback
// =============================================================================

/// Identifies an artifact by logical path for commit-history lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackTarget {
    pub path_name: String,
    pub mapping_name: String,
    pub object_type: String,
}

impl RollbackTarget {
    pub const DEFAULT_TYPE: &'static str = "DTEMPLATE";

    pub fn new(path_name: impl Into<String>, mapping_name: impl Into<String>) -> Self {
        Self {
            path_name: path_name.into(),
            mapping_name: mapping_name.into(),
            object_type: Self::DEFAULT_TYPE.to_string(),
        }
    }

    pub fn with_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = object_type.into();
        self
    }

    /// `<path>/<name>` with duplicate separators collapsed at the join.
    pub fn artifact_path(&self) -> String {
        format!(
            "{}/{}",
            self.path_name.trim_end_matches('/'),
            self.mapping_name.trim_start_matches('/')
        )
    }

    /// Filter expression for the commit-history endpoint (not yet percent-encoded).
    pub fn history_query(&self) -> String {
        format!(
            "path=='{}' and type=='{}'",
            self.artifact_path(),
            self.object_type
        )
    }
}

#[derive(Serialize)]
pub(crate) struct LookupRequest {
    pub objects: Vec<LookupKey>,
}

#[derive(Serialize)]
pub(crate) struct LookupKey {
    pub path: String,
    #[serde(rename = "type")]
    pub object_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LookupResponse {
    #[serde(default)]
    pub objects: Vec<LookupObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupObject {
    pub id: ObjectId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_state_maps_wire_codes() {
        assert_eq!(PullState::from_wire("IN_PROGRESS"), PullState::InProgress);
        assert_eq!(PullState::from_wire("SUCCESSFUL"), PullState::Successful);
        assert_eq!(
            PullState::from_wire("WARNING"),
            PullState::Failed("WARNING".to_string())
        );
        assert!(!PullState::InProgress.is_terminal());
        assert!(PullState::Failed("FAILED".to_string()).is_terminal());
    }

    #[test]
    fn run_id_accepts_numbers_and_strings() {
        let started: JobStarted = serde_json::from_str(r#"{"runId": 12345}"#).unwrap();
        assert_eq!(started.run_id, Some(12345));

        let started: JobStarted = serde_json::from_str(r#"{"runId": "77"}"#).unwrap();
        assert_eq!(started.run_id, Some(77));

        let started: JobStarted = serde_json::from_str(r#"{"runId": 0}"#).unwrap();
        assert_eq!(started.run_id, None);

        let started: JobStarted = serde_json::from_str(r#"{"taskId": "t"}"#).unwrap();
        assert_eq!(started.run_id, None);
    }

    #[test]
    fn commit_object_reads_platform_field_names() {
        let json = r#"{"id":"obj-1","name":"TestMapping1","type":"MTT","appContextId":"app-ctx-1"}"#;
        let object: CommitObject = serde_json::from_str(json).unwrap();
        assert_eq!(object.object_type, "MTT");
        assert_eq!(object.app_context_id, Some(TaskId::new("app-ctx-1")));
    }

    #[test]
    fn rollback_query_uses_path_and_type() {
        let target = RollbackTarget::new("Project/Folder/", "m_load_orders");
        assert_eq!(target.artifact_path(), "Project/Folder/m_load_orders");
        assert_eq!(
            target.history_query(),
            "path=='Project/Folder/m_load_orders' and type=='DTEMPLATE'"
        );
    }

    #[test]
    fn job_start_body_has_type_tag() {
        let body = serde_json::to_value(JobStartRequest {
            kind: "job",
            task_id: "app-ctx-1",
            task_type: "MTT",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"@type": "job", "taskId": "app-ctx-1", "taskType": "MTT"})
        );
    }
}
