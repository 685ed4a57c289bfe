//! Command execution primitives with consistent error handling.
//!
//! Every external program the pipelines touch (the bridge, git) goes through a
//! [`CommandRunner`]. Callers decide whether a failed outcome is fatal.

use std::path::Path;
use std::process::Command;

use serde::Serialize;

use crate::error::{CommandFailedDetails, Error, Result};
use crate::utils::shell;

/// Captured result of one external command.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

impl CommandOutput {
    /// Error text for display. Prefers stderr, falls back to stdout.
    pub fn error_text(&self) -> String {
        if !self.stderr.trim().is_empty() {
            self.stderr.trim().to_string()
        } else {
            self.stdout.trim().to_string()
        }
    }
}

/// Executes external programs synchronously.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], current_dir: Option<&Path>) -> CommandOutput;
}

/// Runner backed by `std::process::Command`. No timeout, no retries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], current_dir: Option<&Path>) -> CommandOutput {
        let mut cmd = Command::new(program);
        cmd.args(args);

        if let Some(dir) = current_dir {
            cmd.current_dir(dir);
        }

        match cmd.output() {
            Ok(out) => CommandOutput {
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
                success: out.status.success(),
                exit_code: out.status.code().unwrap_or(-1),
            },
            Err(e) => CommandOutput {
                stdout: String::new(),
                stderr: format!("Command error: {}", e),
                success: false,
                exit_code: -1,
            },
        }
    }
}

/// Render a program and its arguments as a copy-pasteable command line.
pub fn display_command(program: &str, args: &[&str]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(shell::quote_arg(program));
    parts.extend(args.iter().map(|a| shell::quote_arg(a)));
    parts.join(" ")
}

/// Print a failed command and its diagnostic text to stderr.
pub fn report_failure(command_line: &str, output: &CommandOutput) {
    eprintln!("Error: {}", command_line);
    let text = output.error_text();
    if !text.is_empty() {
        eprintln!("{}", text);
    }
}

/// Run a command whose failure only needs to be reported. Failures are
/// printed and returned like any other outcome.
pub fn run_reported(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
    current_dir: Option<&Path>,
) -> CommandOutput {
    let output = runner.run(program, args, current_dir);
    if !output.success {
        report_failure(&display_command(program, args), &output);
    }
    output
}

/// Build the failure details for a command that exited non-zero.
pub fn failure_details(
    program: &str,
    args: &[&str],
    output: &CommandOutput,
    completed_steps: Vec<String>,
) -> CommandFailedDetails {
    CommandFailedDetails {
        command: display_command(program, args),
        exit_code: output.exit_code,
        stdout: output.stdout.trim().to_string(),
        stderr: output.stderr.trim().to_string(),
        completed_steps,
    }
}

/// Run a command and return trimmed stdout, or an error built by `to_error`.
pub fn run_required<F>(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
    current_dir: Option<&Path>,
    to_error: F,
) -> Result<String>
where
    F: FnOnce(CommandFailedDetails) -> Error,
{
    let output = runner.run(program, args, current_dir);
    if !output.success {
        report_failure(&display_command(program, args), &output);
        return Err(to_error(failure_details(program, args, &output, Vec::new())));
    }
    Ok(output.stdout.trim().to_string())
}
