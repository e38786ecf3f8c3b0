// ABOUTME: Integration tests for the iics-promote CLI commands.
// ABOUTME: Validates argument handling and failure reporting, and full runs against a local mock server.

use assert_cmd::Command;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use serde_json::json;
use std::fs;

const PIPELINE_VARS: [&str; 15] = [
    "RUST_LOG",
    "COMMIT_HASH",
    "RESOURCE_TYPE",
    "PATH_NAME",
    "OBJECT_NAME",
    "IICS_LOGIN_URL",
    "IICS_POD_URL",
    "IICS_USERNAME",
    "IICS_PASSWORD",
    "sessionId",
    "UAT_IICS_POD_URL",
    "UAT_IICS_USERNAME",
    "UAT_IICS_PASSWORD",
    "uat_sessionId",
    "GITHUB_ENV",
];

/// Command running in an empty directory with no pipeline variables set.
fn iics_cmd(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("iics-promote"));
    cmd.current_dir(dir.path());
    for var in PIPELINE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_shows_commands() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("test"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("rollback"))
        .stdout(predicate::str::contains("objects"));
}

#[test]
fn pull_requires_a_commit() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .arg("pull")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--commit"));
}

#[test]
fn invalid_commit_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .args(["pull", "--commit", "not-a-hash"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: invalid commit hash"));
}

#[test]
fn pull_without_session_fails_with_error() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .args(["pull", "--commit", "abc123def456"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("pod URL is required"));
}

#[test]
fn commit_falls_back_to_environment() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .env("COMMIT_HASH", "abc123def456")
        .env("IICS_POD_URL", "https://mock-pod.informaticacloud.com/saas")
        .arg("test")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("session id is required"));
}

#[test]
fn login_without_credentials_fails() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .args(["login", "--target", "dev"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("credentials for DEV are not configured"));
}

#[test]
fn explicit_uat_login_without_credentials_fails() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .args(["login", "--target", "uat"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("credentials for UAT are not configured"));
}

#[test]
fn rollback_without_session_fails_with_error() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .args(["rollback", "--path", "Project/Folder", "--name", "MyMapping"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: configuration error"));
}

#[test]
fn unknown_destination_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("iics.yml"),
        "pod_url: https://pod.example.com/saas\n",
    )
    .unwrap();

    iics_cmd(&dir)
        .args(["--destination", "staging", "objects", "--commit", "abc123"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown destination: staging"));
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .args(["--config", "missing.yml", "objects", "--commit", "abc123"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: I/O error"));
}

#[test]
fn json_mode_reports_errors_as_events() {
    let dir = tempfile::tempdir().unwrap();
    iics_cmd(&dir)
        .args(["--json", "objects", "--commit", "abc123"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(r#""event":"error""#));
}

#[test]
fn rollback_defaults_to_the_uat_destination() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("iics.yml"),
        r#"
pod_url: https://dev-pod.example.com/saas
session_id: dev-session
destinations:
  uat:
    pod_url: https://uat-pod.example.com/saas
"#,
    )
    .unwrap();

    iics_cmd(&dir)
        .args(["rollback", "--path", "Project/Folder", "--name", "MyMapping"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("session id is required"));
}

mod against_mock_server {
    use super::*;

    fn login_reply(
        server: &mut Server,
        username: &str,
        session: &str,
        pod: &str,
    ) -> mockito::Mock {
        server
            .mock("POST", "/saas/public/core/v3/login")
            .match_body(Matcher::PartialJson(json!({"username": username})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "userInfo": {"sessionId": session},
                    "products": [{"baseApiUrl": pod}]
                })
                .to_string(),
            )
            .create()
    }

    #[test]
    fn login_exports_each_org_under_its_own_variables() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join("github_env");
        let mut server = Server::new();
        let dev = login_reply(
            &mut server,
            "dev-user",
            "dev-session",
            "https://dev-pod.informaticacloud.com/saas",
        );
        let uat = login_reply(
            &mut server,
            "uat-user",
            "uat-session",
            "https://uat-pod.informaticacloud.com/saas",
        );

        iics_cmd(&dir)
            .env("GITHUB_ENV", &env_file)
            .env("IICS_LOGIN_URL", server.url())
            .env("IICS_USERNAME", "dev-user")
            .env("IICS_PASSWORD", "dev-pass")
            .env("UAT_IICS_USERNAME", "uat-user")
            .env("UAT_IICS_PASSWORD", "uat-pass")
            .args(["login", "--target", "all"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Login complete"));

        dev.assert();
        uat.assert();
        assert_eq!(
            fs::read_to_string(&env_file).unwrap(),
            "sessionId=dev-session\n\
             IICS_POD_URL=https://dev-pod.informaticacloud.com/saas\n\
             uat_sessionId=uat-session\n\
             UAT_IICS_POD_URL=https://uat-pod.informaticacloud.com/saas\n"
        );
    }

    #[test]
    fn login_all_skips_uat_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join("github_env");
        let mut server = Server::new();
        let dev = login_reply(
            &mut server,
            "dev-user",
            "dev-session",
            "https://dev-pod.informaticacloud.com/saas",
        );

        iics_cmd(&dir)
            .env("GITHUB_ENV", &env_file)
            .env("IICS_LOGIN_URL", server.url())
            .env("IICS_USERNAME", "dev-user")
            .env("IICS_PASSWORD", "dev-pass")
            .args(["login"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Skipping UAT login"));

        dev.assert();
        let exported = fs::read_to_string(&env_file).unwrap();
        assert!(exported.starts_with("sessionId=dev-session\n"));
        assert!(!exported.contains("uat_sessionId"));
    }

    #[test]
    fn test_command_runs_every_mapping_task_of_a_commit() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::new();
        let url = server.url();
        fs::write(
            dir.path().join("iics.yml"),
            format!(
                "login_url: {url}\n\
                 username: dev-user\n\
                 password: dev-pass\n\
                 polling:\n  job_interval: 1ms\n"
            ),
        )
        .unwrap();

        let login = login_reply(&mut server, "dev-user", "dev-session", &format!("{url}/saas"));
        let commit = server
            .mock("GET", "/public/core/v3/commit/abc123def456")
            .match_header("INFA-SESSION-ID", "dev-session")
            .with_status(200)
            .with_body(
                json!({"changes": [
                    {"id": "obj-1", "name": "Mapping1", "type": "MTT", "appContextId": "app-ctx-1"},
                    {"id": "obj-2", "name": "Mapping2", "type": "MTT", "appContextId": "app-ctx-2"},
                    {"id": "obj-3", "name": "Conn1", "type": "CONNECTION"}
                ]})
                .to_string(),
            )
            .create();
        let jobs: Vec<_> = [("app-ctx-1", 101), ("app-ctx-2", 102)]
            .into_iter()
            .map(|(task, run)| {
                server
                    .mock("POST", "/api/v2/job/")
                    .match_header("icSessionId", "dev-session")
                    .match_body(Matcher::PartialJson(
                        json!({"@type": "job", "taskId": task, "taskType": "MTT"}),
                    ))
                    .with_status(200)
                    .with_body(json!({"runId": run}).to_string())
                    .expect(1)
                    .create()
            })
            .collect();
        let logs: Vec<_> = ["101", "102"]
            .into_iter()
            .map(|run| {
                server
                    .mock("GET", "/api/v2/activity/activityLog")
                    .match_query(Matcher::UrlEncoded("runId".into(), run.into()))
                    .with_status(200)
                    .with_body(json!([{"state": 1}]).to_string())
                    .create()
            })
            .collect();
        let logout = server
            .mock("POST", "/public/core/v3/logout")
            .with_status(200)
            .create();

        iics_cmd(&dir)
            .args(["test", "--commit", "abc123def456"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2 job(s) succeeded"));

        login.assert();
        commit.assert();
        for mock in jobs.iter().chain(&logs) {
            mock.assert();
        }
        logout.assert();
    }
}
