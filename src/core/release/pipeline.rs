use crate::config::Project;
use crate::error::{Error, Result};
use crate::git;
use crate::log_status;
use crate::utils::command::CommandRunner;
use crate::version::{self, VersionStore};

use super::executor::{execute, plan};
use super::types::{ReleaseOutcome, ReleaseReport};

/// The person driving the release. The CLI implements this with terminal
/// prompts; tests script the answers.
pub trait Operator {
    /// Ask for the new version. An empty answer cancels.
    fn ask_version(&mut self, current: &str) -> Result<String>;

    /// Ask whether to commit, tag and push `version`.
    fn confirm_publish(&mut self, version: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Use this version instead of asking.
    pub version: Option<String>,
    /// Derive the version from the current one: patch, minor or major.
    pub bump: Option<String>,
    /// Publish without asking for confirmation.
    pub assume_yes: bool,
    /// Compute the plan only; nothing is written and no mutating git command runs.
    pub dry_run: bool,
}

/// Read the current version, write the new one, and publish it once the
/// operator confirms.
///
/// The version file is rewritten before the confirmation; answering no leaves
/// that change in place and runs no git command.
pub fn run(
    project: &Project,
    runner: &dyn CommandRunner,
    operator: &mut dyn Operator,
    options: &ReleaseOptions,
) -> Result<ReleaseReport> {
    let store = VersionStore::new(project.version_file())?;
    let current = store.read()?;
    log_status!("release", "Current version: {}", current);

    let mut report = ReleaseReport {
        outcome: ReleaseOutcome::Cancelled,
        started_at: chrono::Utc::now().to_rfc3339(),
        current_version: current.clone(),
        new_version: None,
        prefix_stripped: false,
        warnings: Vec::new(),
        write: None,
        plan: None,
        run: None,
    };

    let input = match (&options.version, &options.bump) {
        (Some(version), _) => version.clone(),
        (None, Some(bump)) => version::increment_version(&current, bump).ok_or_else(|| {
            Error::validation_invalid_argument(
                "bump",
                format!("Cannot apply '{}' bump to version '{}'", bump, current),
                Some(current.clone()),
                Some(vec!["patch".to_string(), "minor".to_string(), "major".to_string()]),
            )
        })?,
        (None, None) => operator.ask_version(&current)?,
    };

    let Some(normalized) = version::normalize(&input)? else {
        log_status!("release", "No version entered; cancelled.");
        return Ok(report);
    };

    if normalized.prefix_stripped {
        warn(
            &mut report.warnings,
            format!(
                "The 'v' prefix was removed. Using: {}",
                normalized.version
            ),
        );
    }
    if !normalized.is_semver {
        warn(
            &mut report.warnings,
            format!(
                "'{}' is not a semantic version (MAJOR.MINOR.PATCH)",
                normalized.version
            ),
        );
    }

    let new_version = normalized.version;
    report.new_version = Some(new_version.clone());
    report.prefix_stripped = normalized.prefix_stripped;

    let version_file = project.config.release.version_file.clone();
    let remote = project.config.release.remote.clone();

    if options.dry_run {
        let branch = git::current_branch(runner, &project.root)?;
        report.plan = Some(plan(&new_version, &branch, &remote, &version_file));
        report.outcome = ReleaseOutcome::DryRun;
        return Ok(report);
    }

    let write = store.write(&new_version)?;
    log_status!(
        "release",
        "{} updated: {} -> {}",
        version_file,
        write.old_version,
        write.new_version
    );
    report.write = Some(write);

    let confirmed = options.assume_yes || operator.confirm_publish(&new_version)?;
    if !confirmed {
        log_status!(
            "release",
            "Version file changed, git publishing skipped."
        );
        report.outcome = ReleaseOutcome::Declined;
        return Ok(report);
    }

    let branch = git::current_branch(runner, &project.root)?;
    log_status!("release", "Publishing {} on branch '{}'", new_version, branch);

    let release_plan = plan(&new_version, &branch, &remote, &version_file);
    let run = execute(&release_plan, runner, &project.root)?;
    log_status!("release", "Released {}", new_version);

    report.plan = Some(release_plan);
    report.run = Some(run);
    report.outcome = ReleaseOutcome::Released;
    Ok(report)
}

fn warn(warnings: &mut Vec<String>, message: String) {
    eprintln!("Warning: {}", message);
    warnings.push(message);
}
