use std::cell::RefCell;
use std::fs;
use std::path::Path;

use sidekick::config::{Config, Project};
use sidekick::release::{self, Operator, ReleaseOptions, ReleaseOutcome};
use sidekick::utils::command::{CommandOutput, CommandRunner};

const META: &str = "local _meta = {\n    name = \"sidekick\",\n    min_version = \"2023.10\",\n    version = \"1.2.3\",\n}\nreturn _meta\n";

/// Records every invocation; `git <fail_on> ...` exits 128.
struct RecordingRunner {
    calls: RefCell<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl RecordingRunner {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }

    fn failing_on(subcommand: &'static str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: Some(subcommand),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str], _current_dir: Option<&Path>) -> CommandOutput {
        let mut line = vec![program];
        line.extend_from_slice(args);
        self.calls.borrow_mut().push(line.join(" "));

        if args.first() == Some(&"rev-parse") {
            return ok("main\n");
        }
        if self.fail_on.is_some() && args.first() == self.fail_on.as_ref() {
            return CommandOutput {
                stdout: String::new(),
                stderr: "fatal: refusing to continue".to_string(),
                success: false,
                exit_code: 128,
            };
        }
        ok("")
    }
}

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        success: true,
        exit_code: 0,
    }
}

struct ScriptedOperator {
    answer: &'static str,
    confirm: bool,
    confirmations: usize,
}

impl ScriptedOperator {
    fn new(answer: &'static str, confirm: bool) -> Self {
        Self {
            answer,
            confirm,
            confirmations: 0,
        }
    }
}

impl Operator for ScriptedOperator {
    fn ask_version(&mut self, _current: &str) -> sidekick::Result<String> {
        Ok(self.answer.to_string())
    }

    fn confirm_publish(&mut self, _version: &str) -> sidekick::Result<bool> {
        self.confirmations += 1;
        Ok(self.confirm)
    }
}

fn project_with(meta: &str) -> (tempfile::TempDir, Project) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("_meta.lua"), meta).unwrap();
    let project = Project::new(dir.path(), Config::default());
    (dir, project)
}

fn meta(project: &Project) -> String {
    fs::read_to_string(project.version_file()).unwrap()
}

#[test]
fn confirmed_release_runs_all_git_steps_in_order() {
    let (_dir, project) = project_with(META);
    let runner = RecordingRunner::new();
    let mut operator = ScriptedOperator::new("v2.0.0", true);

    let report =
        release::run(&project, &runner, &mut operator, &ReleaseOptions::default()).unwrap();

    assert_eq!(report.outcome, ReleaseOutcome::Released);
    assert_eq!(report.current_version, "1.2.3");
    assert_eq!(report.new_version.as_deref(), Some("2.0.0"));
    assert!(report.prefix_stripped);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(
        runner.calls(),
        vec![
            "git rev-parse --abbrev-ref HEAD",
            "git add _meta.lua",
            "git commit -m Bump version to 2.0.0",
            "git tag -- 2.0.0",
            "git push origin main",
            "git push origin refs/tags/2.0.0",
        ]
    );
    assert_eq!(report.run.unwrap().steps.len(), 5);
    assert_eq!(meta(&project), META.replace("\"1.2.3\"", "\"2.0.0\""));
}

#[test]
fn tag_failure_stops_before_any_push() {
    let (_dir, project) = project_with(META);
    let runner = RecordingRunner::failing_on("tag");
    let mut operator = ScriptedOperator::new("1.2.4", true);

    let err = release::run(&project, &runner, &mut operator, &ReleaseOptions::default())
        .unwrap_err();

    assert_eq!(err.code.as_str(), "git.command_failed");
    assert_eq!(err.details["exitCode"], 128);
    assert_eq!(
        err.details["completedSteps"],
        serde_json::json!(["stage", "commit"])
    );
    assert!(err
        .hints
        .iter()
        .any(|h| h.message.contains("git reset --soft HEAD~1")));
    assert!(!runner.calls().iter().any(|c| c.starts_with("git push")));
    assert!(meta(&project).contains("version = \"1.2.4\""));
}

#[test]
fn option_like_version_is_rejected_before_any_git_call() {
    let (_dir, project) = project_with(META);
    let runner = RecordingRunner::new();
    let mut operator = ScriptedOperator::new("-l", true);

    let err = release::run(&project, &runner, &mut operator, &ReleaseOptions::default())
        .unwrap_err();

    assert_eq!(err.code.as_str(), "validation.invalid_argument");
    assert_eq!(operator.confirmations, 0);
    assert!(runner.calls().is_empty());
    assert_eq!(meta(&project), META);
}

#[test]
fn declining_keeps_the_new_version_and_runs_no_git() {
    let (_dir, project) = project_with(META);
    let runner = RecordingRunner::new();
    let mut operator = ScriptedOperator::new("1.3.0", false);

    let report =
        release::run(&project, &runner, &mut operator, &ReleaseOptions::default()).unwrap();

    assert_eq!(report.outcome, ReleaseOutcome::Declined);
    assert_eq!(operator.confirmations, 1);
    assert!(runner.calls().is_empty());
    assert!(meta(&project).contains("version = \"1.3.0\""));
    assert!(meta(&project).contains("min_version = \"2023.10\""));
}

#[test]
fn empty_answer_cancels_without_changes() {
    let (_dir, project) = project_with(META);
    let runner = RecordingRunner::new();
    let mut operator = ScriptedOperator::new("", true);

    let report =
        release::run(&project, &runner, &mut operator, &ReleaseOptions::default()).unwrap();

    assert_eq!(report.outcome, ReleaseOutcome::Cancelled);
    assert_eq!(operator.confirmations, 0);
    assert!(runner.calls().is_empty());
    assert_eq!(meta(&project), META);
}

#[test]
fn dry_run_plans_without_writing() {
    let (_dir, project) = project_with(META);
    let runner = RecordingRunner::new();
    let mut operator = ScriptedOperator::new("unused", true);
    let options = ReleaseOptions {
        version: Some("1.2.4".to_string()),
        dry_run: true,
        ..Default::default()
    };

    let report = release::run(&project, &runner, &mut operator, &options).unwrap();

    assert_eq!(report.outcome, ReleaseOutcome::DryRun);
    assert!(report.write.is_none());
    assert_eq!(report.plan.unwrap().steps.len(), 5);
    assert_eq!(runner.calls(), vec!["git rev-parse --abbrev-ref HEAD"]);
    assert_eq!(meta(&project), META);
}

#[test]
fn bump_derives_the_version_and_skips_the_prompt() {
    let (_dir, project) = project_with(META);
    let runner = RecordingRunner::new();
    let mut operator = ScriptedOperator::new("9.9.9", true);
    let options = ReleaseOptions {
        bump: Some("minor".to_string()),
        assume_yes: true,
        ..Default::default()
    };

    let report = release::run(&project, &runner, &mut operator, &options).unwrap();

    assert_eq!(report.new_version.as_deref(), Some("1.3.0"));
    assert_eq!(operator.confirmations, 0);
    assert!(runner.calls().contains(&"git tag -- 1.3.0".to_string()));
}

#[test]
fn duplicate_version_keys_are_rejected_before_any_change() {
    let content = "version = \"1.0.0\"\nversion = \"1.0.1\"\n";
    let (_dir, project) = project_with(content);
    let runner = RecordingRunner::new();
    let mut operator = ScriptedOperator::new("2.0.0", true);

    let err = release::run(&project, &runner, &mut operator, &ReleaseOptions::default())
        .unwrap_err();

    assert_eq!(err.code.as_str(), "version.key_ambiguous");
    assert_eq!(err.details["matchCount"], 2);
    assert!(runner.calls().is_empty());
    assert_eq!(meta(&project), content);
}

#[test]
fn missing_version_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let project = Project::new(dir.path(), Config::default());
    let runner = RecordingRunner::new();
    let mut operator = ScriptedOperator::new("2.0.0", true);

    let err = release::run(&project, &runner, &mut operator, &ReleaseOptions::default())
        .unwrap_err();

    assert_eq!(err.code.as_str(), "version.file_not_found");
}
