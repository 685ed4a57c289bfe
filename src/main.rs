use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};

use commands::GlobalArgs;

#[derive(Debug, Clone, Copy)]
enum ResponseMode {
    Json,
    Raw(RawOutputMode),
}

#[derive(Debug, Clone, Copy)]
enum RawOutputMode {
    InteractivePassthrough,
    Help,
}

mod commands;
mod output;
mod tty;

use commands::{config, deploy, release, version};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "sidekick")]
#[command(version = VERSION)]
#[command(about = "Push a plugin to a device, follow its log, and cut version releases")]
struct Cli {
    /// Project root (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the plugin files to the device and follow its log
    Deploy(deploy::DeployArgs),
    /// Bump the version file, then commit, tag and push it
    Release(release::ReleaseArgs),
    /// Read the project version
    Version(version::VersionArgs),
    /// Inspect or create sidekick.toml
    Config(config::ConfigArgs),
    /// List available commands (alias for --help)
    List,
}

fn response_mode(command: &Commands) -> ResponseMode {
    match command {
        Commands::Deploy(_) => ResponseMode::Raw(RawOutputMode::InteractivePassthrough),
        Commands::List => ResponseMode::Raw(RawOutputMode::Help),
        _ => ResponseMode::Json,
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs { root: cli.root };
    let mode = response_mode(&cli.command);

    if let ResponseMode::Raw(RawOutputMode::Help) = mode {
        let mut cmd = Cli::command();
        if cmd.print_help().is_err() {
            return std::process::ExitCode::from(exit_code_to_u8(1));
        }
        println!();
        return std::process::ExitCode::SUCCESS;
    }

    if let ResponseMode::Json = mode {
        tty::status("sidekick is working...");
    }

    let (json_result, exit_code) = commands::run_json(cli.command, &global);

    match mode {
        ResponseMode::Json => {
            let _ = output::print_json_result(json_result);
        }
        // The stream already went to stdout; only failures get an envelope.
        ResponseMode::Raw(RawOutputMode::InteractivePassthrough) => {
            if let Err(err) = json_result {
                let _ = output::print_result::<serde_json::Value>(Err(err));
            }
        }
        ResponseMode::Raw(RawOutputMode::Help) => {}
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
