// ABOUTME: Rollback command implementation.
// ABOUTME: Restores one artifact to the version before its latest commit.

use super::connection::{connect, finish};
use iics_promote::client::RollbackTarget;
use iics_promote::config::Config;
use iics_promote::diagnostics::Diagnostics;
use iics_promote::error::Result;
use iics_promote::output::Output;

pub async fn rollback(
    config: &Config,
    path: &str,
    name: &str,
    object_type: &str,
    mut output: Output,
) -> Result<()> {
    let target = RollbackTarget::new(path, name).with_type(object_type);
    output.start_timer();
    let mut diag = Diagnostics::default();

    let client = connect(config, &output).await?;
    output.progress(&format!("Rolling back {}", target.artifact_path()));

    let result = client.rollback(&target).await;
    finish(&client, &output, &mut diag).await;

    result?;
    output.success(&format!("Rolled back {} in {}", name, path));
    Ok(())
}
