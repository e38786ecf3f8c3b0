// ABOUTME: Objects command implementation.
// ABOUTME: Lists the artifacts a commit changed, optionally of one type.

use super::connection::{connect, finish, parse_commit};
use iics_promote::config::Config;
use iics_promote::diagnostics::Diagnostics;
use iics_promote::error::Result;
use iics_promote::output::Output;

pub async fn objects(
    config: &Config,
    commit: &str,
    object_type: Option<&str>,
    output: Output,
) -> Result<()> {
    let commit = parse_commit(commit)?;
    let mut diag = Diagnostics::default();

    let client = connect(config, &output).await?;
    let result = client.get_commit_objects(&commit, object_type).await;
    finish(&client, &output, &mut diag).await;

    let objects = result?;
    output.data(&objects, || {
        objects
            .iter()
            .map(|o| {
                let task = o.app_context_id.as_ref().map(|t| t.as_str()).unwrap_or("-");
                format!("{}\t{}\t{}\t{}", o.id, o.object_type, o.name, task)
            })
            .collect::<Vec<_>>()
            .join("\n")
    });
    Ok(())
}
