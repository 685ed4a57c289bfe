//! Transport bridge (adb) invocation.
//!
//! The bridge is opaque: it is only ever driven through its command line.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::error::{CommandFailedDetails, Error, Result};
use crate::utils::command::{self, CommandOutput, CommandRunner};

/// A resolved bridge executable.
#[derive(Debug, Clone)]
pub struct Bridge {
    program: PathBuf,
}

impl Bridge {
    /// Resolve the configured bridge, failing before any side effect when the
    /// executable cannot be found.
    ///
    /// Paths (anything with a separator) are tilde-expanded and must exist.
    /// Bare names are looked up on PATH.
    pub fn resolve(configured: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(configured.trim()).to_string();
        let candidate = Path::new(&expanded);

        if candidate.components().count() > 1 || candidate.is_absolute() {
            if candidate.is_file() {
                return Ok(Self::new(candidate));
            }
            return Err(Error::bridge_not_found(configured, Some(expanded)));
        }

        which::which(&expanded)
            .map(Self::new)
            .map_err(|_| Error::bridge_not_found(configured, None))
    }

    /// Wrap a program path without checking it exists.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// `<bridge> push <local> <remoteDir>`
    pub fn push(&self, runner: &dyn CommandRunner, local: &Path, remote_dir: &str) -> CommandOutput {
        let local = local.to_string_lossy();
        let program = self.program();
        let args = ["push", local.as_ref(), remote_dir];
        command::run_reported(runner, &program, &args, None)
    }

    /// `<bridge> logcat -c`
    pub fn clear_log(&self, runner: &dyn CommandRunner) -> CommandOutput {
        let program = self.program();
        command::run_reported(runner, &program, &["logcat", "-c"], None)
    }

    /// Arguments for the continuous, timestamped log stream.
    pub fn stream_args() -> [&'static str; 3] {
        ["logcat", "-v", "time"]
    }

    /// Spawn `<bridge> logcat -v time` with stdout piped.
    pub fn spawn_log_stream(&self) -> Result<Child> {
        Command::new(&self.program)
            .args(Self::stream_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::bridge_command_failed(CommandFailedDetails {
                    command: command::display_command(&self.program(), &Self::stream_args()),
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: format!("Command error: {}", e),
                    completed_steps: Vec::new(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_missing_path() {
        let err = Bridge::resolve("/nonexistent/platform-tools/adb").unwrap_err();
        assert_eq!(err.code.as_str(), "bridge.not_found");
        assert_eq!(err.details["resolved"], "/nonexistent/platform-tools/adb");
    }

    #[test]
    fn resolve_rejects_unknown_name() {
        let err = Bridge::resolve("definitely-not-a-bridge-xyz").unwrap_err();
        assert_eq!(err.code.as_str(), "bridge.not_found");
        assert!(err.details.get("resolved").is_none());
    }

    #[test]
    fn resolve_accepts_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let adb = dir.path().join("adb");
        std::fs::write(&adb, "").unwrap();

        let bridge = Bridge::resolve(adb.to_str().unwrap()).unwrap();
        assert_eq!(bridge.program(), adb.to_string_lossy());
    }

    #[test]
    fn resolve_finds_programs_on_path() {
        let bridge = Bridge::resolve("sh").unwrap();
        assert!(bridge.program().ends_with("sh"));
    }

    #[test]
    fn stream_spawn_failure_is_a_bridge_command_failure() {
        let err = Bridge::new("/nonexistent/adb").spawn_log_stream().unwrap_err();
        assert_eq!(err.code.as_str(), "bridge.command_failed");
        assert_eq!(err.details["exitCode"], -1);
        assert_eq!(err.details["command"], "/nonexistent/adb logcat -v time");
    }
}
