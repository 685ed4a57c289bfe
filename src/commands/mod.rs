use std::path::PathBuf;

use sidekick::Project;

pub type CmdResult<T> = sidekick::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    /// Project root; defaults to the working directory.
    pub root: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn project_root(&self) -> sidekick::Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().map_err(|e| {
                sidekick::Error::internal_io(e.to_string(), Some("resolve working directory".to_string()))
            }),
        }
    }

    /// Load the project, applying CLI overrides before validation.
    pub fn load_project(&self, bridge: Option<&str>) -> sidekick::Result<Project> {
        let mut project = Project::load(self.project_root()?)?;
        if let Some(bridge) = bridge {
            project.config.bridge = bridge.to_string();
        }
        sidekick::config::validate(&project.config)?;
        Ok(project)
    }
}

pub mod config;
pub mod deploy;
pub mod release;
pub mod version;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (sidekick::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Deploy(args) => dispatch!(args, global, deploy),
        crate::Commands::Release(args) => dispatch!(args, global, release),
        crate::Commands::Version(args) => dispatch!(args, global, version),
        crate::Commands::Config(args) => dispatch!(args, global, config),

        // Special case: List uses raw output mode
        crate::Commands::List => {
            let err = sidekick::Error::validation_invalid_argument(
                "output_mode",
                "List command uses raw output mode",
                None,
                None,
            );
            crate::output::map_cmd_result_to_json::<serde_json::Value>(Err(err))
        }
    }
}
