// ABOUTME: Login command implementation.
// ABOUTME: Obtains session ids for DEV and/or UAT and appends them to the pipeline env file.

use crate::cli::Target;
use iics_promote::client::IicsClient;
use iics_promote::config::{Config, UAT_DESTINATION};
use iics_promote::diagnostics::{Diagnostics, Warning};
use iics_promote::error::{Error, Result};
use iics_promote::output::Output;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File later pipeline steps read their environment from.
const PIPELINE_ENV: &str = "GITHUB_ENV";

/// Variables one org's login hands to later steps.
struct Org {
    label: &'static str,
    session_var: &'static str,
    pod_var: &'static str,
}

const DEV: Org = Org {
    label: "DEV",
    session_var: "sessionId",
    pod_var: "IICS_POD_URL",
};

const UAT: Org = Org {
    label: "UAT",
    session_var: "uat_sessionId",
    pod_var: "UAT_IICS_POD_URL",
};

pub async fn login(config: &Config, target: Target, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let env_file = std::env::var_os(PIPELINE_ENV).map(PathBuf::from);
    if env_file.is_none() {
        diag.warn(Warning::pipeline_env(format!(
            "{PIPELINE_ENV} is not set, session ids will not be exported"
        )));
    }

    if matches!(target, Target::Dev | Target::All) {
        login_org(config, &DEV, env_file.as_deref(), &output).await?;
    }

    if matches!(target, Target::Uat | Target::All) {
        let uat = match config.for_destination(UAT_DESTINATION) {
            Ok(uat) => Some(uat),
            Err(Error::UnknownDestination(_)) if target == Target::All => None,
            Err(e) => return Err(e),
        };
        let uat = uat.filter(|c| target == Target::Uat || has_credentials(c));
        match uat {
            Some(uat) => login_org(&uat, &UAT, env_file.as_deref(), &output).await?,
            None => output.progress("Skipping UAT login (credentials not provided)"),
        }
    }

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    output.success("Login complete");
    Ok(())
}

fn has_credentials(config: &Config) -> bool {
    config
        .session()
        .map(|s| s.has_credentials())
        .unwrap_or(false)
}

async fn login_org(
    config: &Config,
    org: &Org,
    env_file: Option<&Path>,
    output: &Output,
) -> Result<()> {
    let session = config.session()?;
    if !session.has_credentials() {
        return Err(Error::MissingCredentials(org.label.to_string()));
    }

    output.progress(&format!("  → Logging in to {}...", org.label));
    let mut client = IicsClient::new(session, config.client_options())?;
    let outcome = client.login().await?;

    if let Some(path) = env_file {
        let mut vars = vec![(org.session_var, outcome.session_id.as_str())];
        if let Some(pod) = outcome.base_api_url.as_deref() {
            vars.push((org.pod_var, pod));
        }
        export(path, &vars)?;
    }

    output.progress(&format!("  ✓ Logged in to {}", org.label));
    Ok(())
}

/// Append `KEY=value` lines to the pipeline env file.
fn export(path: &Path, vars: &[(&str, &str)]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for (key, value) in vars {
        writeln!(file, "{key}={value}")?;
    }
    Ok(())
}
