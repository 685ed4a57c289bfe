use std::io;

use clap::Args;

use sidekick::cancel::InterruptGuard;
use sidekick::config;
use sidekick::deploy::{self, DeployOptions, DeployReport};
use sidekick::log_status;
use sidekick::utils::command::SystemRunner;

use super::CmdResult;

#[derive(Args)]
pub struct DeployArgs {
    /// Bridge executable: a name on PATH or a path (default: adb)
    #[arg(long, env = "SIDEKICK_BRIDGE")]
    pub bridge: Option<String>,

    /// Skip the file sync and go straight to the log stream
    #[arg(long)]
    pub no_sync: bool,

    /// Print matched lines without highlighting the keyword
    #[arg(long)]
    pub no_color: bool,

    /// Only show lines containing this keyword (default: logs.keyword)
    #[arg(long)]
    pub keyword: Option<String>,

    /// Keep the terminal contents when the stream starts
    #[arg(long)]
    pub no_clear: bool,
}

pub fn run(args: DeployArgs, global: &crate::commands::GlobalArgs) -> CmdResult<DeployReport> {
    let mut project = global.load_project(args.bridge.as_deref())?;

    let logs = &mut project.config.logs;
    if let Some(keyword) = args.keyword {
        logs.keyword = keyword;
    }
    if args.no_color {
        logs.color = false;
    }
    if args.no_clear {
        logs.clear_screen = false;
    }
    config::validate(&project.config)?;

    let (_guard, cancel) = InterruptGuard::install()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let report = deploy::run(
        &project,
        &SystemRunner,
        &cancel,
        &mut out,
        &DeployOptions {
            skip_sync: args.no_sync,
        },
    )?;

    log_status!(
        "deploy",
        "{} of {} lines matched",
        report.logs.outcome.lines_emitted,
        report.logs.outcome.lines_seen
    );

    Ok((report, 0))
}
