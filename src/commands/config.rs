use clap::{Args, Subcommand};
use serde::Serialize;

use sidekick::config::{self, Config};

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display the effective configuration (defaults merged with sidekick.toml)
    Show {
        /// Show only built-in defaults (ignore sidekick.toml)
        #[arg(long)]
        builtin: bool,
    },
    /// Write the built-in defaults to sidekick.toml
    Init {
        /// Overwrite an existing sidekick.toml
        #[arg(long)]
        force: bool,
    },
    /// Show the path to sidekick.toml
    Path,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<Config>,
}

pub fn run(args: ConfigArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    let root = global.project_root()?;
    let path = config::config_path(&root);

    match args.command {
        ConfigCommand::Show { builtin } => {
            let config = if builtin {
                Config::default()
            } else {
                config::load_config(&root)?
            };
            Ok((
                ConfigOutput {
                    command: "config.show".to_string(),
                    path: path.display().to_string(),
                    exists: Some(path.exists()),
                    config: Some(config),
                },
                0,
            ))
        }
        ConfigCommand::Init { force } => {
            let written = config::init_config(&root, force)?;
            Ok((
                ConfigOutput {
                    command: "config.init".to_string(),
                    path: written.display().to_string(),
                    exists: Some(true),
                    config: Some(Config::default()),
                },
                0,
            ))
        }
        ConfigCommand::Path => Ok((
            ConfigOutput {
                command: "config.path".to_string(),
                path: path.display().to_string(),
                exists: Some(path.exists()),
                config: None,
            },
            0,
        )),
    }
}
