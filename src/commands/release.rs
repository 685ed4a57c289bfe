use clap::{Args, ValueEnum};

use sidekick::release::{self, Operator, ReleaseOptions, ReleaseReport};
use sidekick::utils::command::SystemRunner;

use super::CmdResult;

#[derive(Clone, Copy, ValueEnum)]
pub enum BumpType {
    Patch,
    Minor,
    Major,
}

impl BumpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpType::Patch => "patch",
            BumpType::Minor => "minor",
            BumpType::Major => "major",
        }
    }
}

#[derive(Args)]
pub struct ReleaseArgs {
    /// New version (skips the prompt). A leading 'v' is removed.
    #[arg(long, conflicts_with = "bump")]
    pub version: Option<String>,

    /// Derive the new version from the current one
    #[arg(long, value_enum)]
    pub bump: Option<BumpType>,

    /// Commit, tag and push without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Show the planned git steps without writing or running anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Answers the release questions on the terminal.
struct TerminalOperator;

impl Operator for TerminalOperator {
    fn ask_version(&mut self, current: &str) -> sidekick::Result<String> {
        eprintln!("Current version: {}", current);
        crate::tty::prompt("New version (e.g. 1.0.1): ")
    }

    fn confirm_publish(&mut self, version: &str) -> sidekick::Result<bool> {
        crate::tty::confirm(&format!("Commit, create tag '{}' and push?", version))
    }
}

pub fn run(args: ReleaseArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ReleaseReport> {
    let project = global.load_project(None)?;

    let options = ReleaseOptions {
        version: args.version,
        bump: args.bump.map(|b| b.as_str().to_string()),
        assume_yes: args.yes,
        dry_run: args.dry_run,
    };

    let report = release::run(&project, &SystemRunner, &mut TerminalOperator, &options)?;
    Ok((report, 0))
}
