// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand, ValueEnum};
use iics_promote::client::RollbackTarget;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "iics-promote")]
#[command(about = "Commit-driven promotion, testing and rollback for Informatica Cloud orgs")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (default: iics.yml, else environment variables)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Target destination (defined in config)
    #[arg(short, long, global = true)]
    pub destination: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and export session ids for later pipeline steps
    Login {
        /// Which org(s) to log in to
        #[arg(long, value_enum, default_value_t = Target::All)]
        target: Target,
    },

    /// Pull a commit (or one object of it) into the org
    Pull {
        /// Commit hash to pull
        #[arg(long, env = "COMMIT_HASH")]
        commit: String,

        /// Pull only this object id
        #[arg(long)]
        object: Option<String>,
    },

    /// Run a job for every object of a type changed by a commit
    Test {
        #[arg(long, env = "COMMIT_HASH")]
        commit: String,

        /// Object type to run (default: resource_type from config)
        #[arg(long = "type")]
        object_type: Option<String>,
    },

    /// Pull a commit, then run its objects of a type
    Deploy {
        #[arg(long, env = "COMMIT_HASH")]
        commit: String,

        #[arg(long = "type")]
        object_type: Option<String>,
    },

    /// Restore an artifact to the version before its latest commit
    ///
    /// Runs against the `uat` destination when one is configured and no
    /// --destination is given.
    Rollback {
        /// Project/folder path of the artifact
        #[arg(long, env = "PATH_NAME")]
        path: String,

        /// Artifact name
        #[arg(long, env = "OBJECT_NAME")]
        name: String,

        #[arg(long = "type", default_value = RollbackTarget::DEFAULT_TYPE)]
        object_type: String,
    },

    /// List the objects changed by a commit
    Objects {
        #[arg(long, env = "COMMIT_HASH")]
        commit: String,

        #[arg(long = "type")]
        object_type: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Dev,
    Uat,
    All,
}
