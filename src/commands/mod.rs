// ABOUTME: Command module aggregator for the iics-promote CLI.
// ABOUTME: Re-exports one handler per subcommand.

mod connection;
mod deploy;
mod login;
mod objects;
mod pull;
mod rollback;

pub use deploy::deploy;
pub use login::login;
pub use objects::objects;
pub use pull::pull;
pub use rollback::rollback;
pub use test::test;
