use std::path::Path;

use crate::error::{CommandFailedDetails, Error, Result};
use crate::git::{self, GIT};
use crate::log_status;
use crate::utils::command::{self, CommandRunner};

use super::types::{PlannedStep, ReleasePlan, ReleaseRun, ReleaseStep, StepResult};

pub fn commit_message(version: &str) -> String {
    format!("Bump version to {}", version)
}

/// Build the ordered step list. The tag is the version itself, no prefix.
pub fn plan(version: &str, branch: &str, remote: &str, version_file: &str) -> ReleasePlan {
    let message = commit_message(version);

    let steps = ReleaseStep::ORDER
        .iter()
        .map(|&step| {
            let args = match step {
                ReleaseStep::Stage => git::add_args(version_file),
                ReleaseStep::Commit => git::commit_args(&message),
                ReleaseStep::Tag => git::tag_args(version),
                ReleaseStep::PushBranch => git::push_args(remote, branch),
                ReleaseStep::PushTag => git::push_args(remote, &git::tag_ref(version)),
            };
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            PlannedStep {
                step,
                command: command::display_command(GIT, &arg_refs),
                args,
            }
        })
        .collect();

    ReleasePlan {
        version: version.to_string(),
        tag: version.to_string(),
        branch: branch.to_string(),
        remote: remote.to_string(),
        version_file: version_file.to_string(),
        commit_message: message,
        steps,
    }
}

/// Run every planned step in `repo`, stopping at the first failure.
pub fn execute(plan: &ReleasePlan, runner: &dyn CommandRunner, repo: &Path) -> Result<ReleaseRun> {
    let mut completed: Vec<StepResult> = Vec::with_capacity(plan.steps.len());

    for planned in &plan.steps {
        log_status!("release", "{}", planned.command);

        let args: Vec<&str> = planned.args.iter().map(String::as_str).collect();
        let output = runner.run(GIT, &args, Some(repo));

        if !output.success {
            command::report_failure(&planned.command, &output);
            let done: Vec<ReleaseStep> = completed.iter().map(|r| r.step).collect();
            let details = CommandFailedDetails {
                command: planned.command.clone(),
                exit_code: output.exit_code,
                stdout: output.stdout.trim().to_string(),
                stderr: output.stderr.trim().to_string(),
                completed_steps: done.iter().map(|s| s.as_str().to_string()).collect(),
            };

            let mut err = Error::git_command_failed(details);
            for hint in recovery_hints(plan, planned.step, &done) {
                err = err.with_hint(hint);
            }
            return Err(err);
        }

        completed.push(StepResult {
            step: planned.step,
            command: planned.command.clone(),
            stdout: output.stdout.trim().to_string(),
        });
    }

    Ok(ReleaseRun {
        version: plan.version.clone(),
        tag: plan.tag.clone(),
        branch: plan.branch.clone(),
        steps: completed,
    })
}

/// Manual recovery instructions for a run that stopped at `failed`.
pub fn recovery_hints(
    plan: &ReleasePlan,
    failed: ReleaseStep,
    completed: &[ReleaseStep],
) -> Vec<String> {
    let mut hints = vec![format!(
        "Release stopped at '{}'; no changes were rolled back",
        failed.as_str()
    )];

    let done = |step: ReleaseStep| completed.contains(&step);

    if done(ReleaseStep::PushBranch) {
        hints.push(format!(
            "The commit is on {}/{}; retry the tag push with: git push {} {}",
            plan.remote,
            plan.branch,
            plan.remote,
            git::tag_ref(&plan.tag)
        ));
        return hints;
    }

    if done(ReleaseStep::Tag) {
        hints.push(format!("Delete the local tag with: git tag -d {}", plan.tag));
    }
    if done(ReleaseStep::Commit) {
        hints.push("Undo the version commit with: git reset --soft HEAD~1".to_string());
    } else {
        if done(ReleaseStep::Stage) {
            hints.push(format!(
                "Unstage the version file with: git reset {}",
                plan.version_file
            ));
        }
        hints.push(format!(
            "{} already contains version {}; restore it with: git checkout -- {}",
            plan.version_file, plan.version, plan.version_file
        ));
    }

    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReleasePlan {
        plan("1.0.1", "main", "origin", "_meta.lua")
    }

    #[test]
    fn plan_orders_the_five_steps() {
        let p = sample();
        let commands: Vec<&str> = p.steps.iter().map(|s| s.command.as_str()).collect();
        assert_eq!(
            commands,
            vec![
                "git add _meta.lua",
                "git commit -m 'Bump version to 1.0.1'",
                "git tag -- 1.0.1",
                "git push origin main",
                "git push origin refs/tags/1.0.1",
            ]
        );
        assert_eq!(p.tag, "1.0.1");
        assert_eq!(p.steps[1].args, vec!["commit", "-m", "Bump version to 1.0.1"]);
    }

    #[test]
    fn hints_after_tag_failure_cover_commit() {
        let hints = recovery_hints(
            &sample(),
            ReleaseStep::Tag,
            &[ReleaseStep::Stage, ReleaseStep::Commit],
        );
        assert!(hints.iter().any(|h| h.contains("git reset --soft HEAD~1")));
        assert!(!hints.iter().any(|h| h.contains("git tag -d")));
        assert!(!hints.iter().any(|h| h.contains("git checkout --")));
    }

    #[test]
    fn hints_after_commit_failure_unstage_and_restore() {
        let hints = recovery_hints(&sample(), ReleaseStep::Commit, &[ReleaseStep::Stage]);
        assert!(hints.iter().any(|h| h.contains("git reset _meta.lua")));
        assert!(hints.iter().any(|h| h.contains("git checkout -- _meta.lua")));
    }

    #[test]
    fn hints_after_branch_push_failure_drop_tag_and_commit() {
        let hints = recovery_hints(
            &sample(),
            ReleaseStep::PushBranch,
            &[ReleaseStep::Stage, ReleaseStep::Commit, ReleaseStep::Tag],
        );
        assert!(hints.iter().any(|h| h.contains("git tag -d 1.0.1")));
        assert!(hints.iter().any(|h| h.contains("git reset --soft HEAD~1")));
    }

    #[test]
    fn hints_after_tag_push_failure_suggest_retry() {
        let hints = recovery_hints(
            &sample(),
            ReleaseStep::PushTag,
            &[
                ReleaseStep::Stage,
                ReleaseStep::Commit,
                ReleaseStep::Tag,
                ReleaseStep::PushBranch,
            ],
        );
        assert_eq!(hints.len(), 2);
        assert!(hints[1].contains("git push origin refs/tags/1.0.1"));
    }
}
