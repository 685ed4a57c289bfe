//! Deploy pipeline: sync the plugin files, then follow the device log.

use std::io::Write;

use serde::Serialize;

use crate::bridge::Bridge;
use crate::cancel::CancelToken;
use crate::config::Project;
use crate::error::Result;
use crate::logs::{self, LogSessionReport};
use crate::sync::{self, SyncReport};
use crate::utils::command::CommandRunner;

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Go straight to the log stream.
    pub skip_sync: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub bridge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncReport>,
    pub logs: LogSessionReport,
}

/// Run sync then the log stream. Only a missing bridge (checked before any
/// side effect) or a failure to open the stream is an error. A cancel during
/// sync skips the stream: the log report ends `Interrupted` with no bridge call.
pub fn run(
    project: &Project,
    runner: &dyn CommandRunner,
    cancel: &CancelToken,
    out: &mut dyn Write,
    options: &DeployOptions,
) -> Result<DeployReport> {
    let bridge = Bridge::resolve(&project.config.bridge)?;

    let sync = if options.skip_sync {
        None
    } else {
        Some(sync::sync(project, &bridge, runner, cancel))
    };

    let logs = logs::follow(project, &bridge, runner, cancel, out)?;

    Ok(DeployReport {
        bridge: bridge.program(),
        sync,
        logs,
    })
}
