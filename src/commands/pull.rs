// ABOUTME: Pull command implementation.
// ABOUTME: Syncs a whole commit, or a single object of it, into the org.

use super::connection::{connect, finish, parse_commit};
use iics_promote::config::Config;
use iics_promote::diagnostics::Diagnostics;
use iics_promote::error::Result;
use iics_promote::output::Output;
use iics_promote::types::ObjectId;

pub async fn pull(config: &Config, commit: &str, object: Option<&str>, mut output: Output) -> Result<()> {
    let commit = parse_commit(commit)?;
    output.start_timer();
    let mut diag = Diagnostics::default();

    let client = connect(config, &output).await?;
    output.progress(&format!("  → Pulling commit {}...", commit.short()));

    let result = match object {
        Some(id) => client.pull_by_commit_object(&commit, &ObjectId::new(id)).await,
        None => client.pull_by_commit(&commit).await,
    };
    finish(&client, &output, &mut diag).await;

    let action = result?;
    output.success(&format!(
        "Pulled commit {} (pull action {})",
        commit.short(),
        action.id
    ));
    Ok(())
}
