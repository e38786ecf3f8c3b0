// ABOUTME: Shared helpers for building an authenticated client and closing it again.
// ABOUTME: Every command except login goes through connect and finish.

use iics_promote::client::IicsClient;
use iics_promote::config::Config;
use iics_promote::diagnostics::Diagnostics;
use iics_promote::error::Result;
use iics_promote::output::Output;
use iics_promote::types::CommitHash;

/// Build a client from config, logging in first when no session id was handed in.
pub async fn connect(config: &Config, output: &Output) -> Result<IicsClient> {
    let mut client = IicsClient::new(config.session()?, config.client_options())?;

    let session = client.session();
    if session.current_session_id().is_none() && session.has_credentials() {
        output.progress("  → Logging in...");
        client.login().await?;
    }

    Ok(client)
}

/// Log out and print whatever warnings the command collected.
pub async fn finish(client: &IicsClient, output: &Output, diag: &mut Diagnostics) {
    client.logout(diag).await;
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
}

pub fn parse_commit(value: &str) -> Result<CommitHash> {
    Ok(CommitHash::new(value)?)
}
