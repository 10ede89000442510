//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], [`validate`], or [`health`].
//! Each handler lives in its own submodule.

pub mod health;
pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::EdgeError;

pub async fn dispatch(cli: Cli) -> Result<(), EdgeError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  edgeport v{version}: static frontend, reverse proxy and demo session edge\n\n  \
         No command provided. To get started:\n\n    \
         edgeport init                  Generate a starter config\n    \
         edgeport run                   Start the server (reads /app/config/static-server.conf)\n    \
         edgeport run -c edge.conf      Start with a specific config file\n    \
         edgeport --help                See all commands and options\n"
    );
}
