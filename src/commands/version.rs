use clap::{Args, Subcommand};
use serde::Serialize;

use sidekick::version::VersionStore;

use super::CmdResult;

#[derive(Args)]
pub struct VersionArgs {
    #[command(subcommand)]
    command: VersionCommand,
}

#[derive(Subcommand)]
enum VersionCommand {
    /// Show the version recorded in the version file
    Show,
}

#[derive(Serialize)]
pub struct VersionShowOutput {
    command: String,
    path: String,
    version: String,
}

pub fn run(args: VersionArgs, global: &crate::commands::GlobalArgs) -> CmdResult<VersionShowOutput> {
    match args.command {
        VersionCommand::Show => {
            let project = global.load_project(None)?;
            let store = VersionStore::new(project.version_file())?;
            let version = store.read()?;
            Ok((
                VersionShowOutput {
                    command: "version.show".to_string(),
                    path: store.path().display().to_string(),
                    version,
                },
                0,
            ))
        }
    }
}
