// ABOUTME: Deploy command implementation.
// ABOUTME: Pulls a commit into the org, then runs the objects it changed.

use super::connection::{connect, finish, parse_commit};
use iics_promote::config::Config;
use iics_promote::diagnostics::Diagnostics;
use iics_promote::error::Result;
use iics_promote::output::Output;

pub async fn deploy(
    config: &Config,
    commit: &str,
    object_type: Option<&str>,
    mut output: Output,
) -> Result<()> {
    let commit = parse_commit(commit)?;
    let object_type = object_type
        .map(str::to_string)
        .unwrap_or_else(|| config.resource_type());
    output.start_timer();
    let mut diag = Diagnostics::default();

    let client = connect(config, &output).await?;
    output.progress(&format!(
        "Deploying commit {} and running {object_type} objects",
        commit.short()
    ));

    let result = client.deploy(&commit, &object_type, &mut diag).await;
    finish(&client, &output, &mut diag).await;

    let report = result?;
    output.data(&report.runs, || {
        report
            .runs
            .iter()
            .map(|run| format!("  ✓ {} (run {})", run.object_name, run.run_id))
            .collect::<Vec<_>>()
            .join("\n")
    });
    output.success(&format!(
        "Deployed commit {} (pull action {}, {} job(s) succeeded)",
        commit.short(),
        report.pull.id,
        report.runs.len()
    ));
    Ok(())
}
