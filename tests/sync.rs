use std::cell::RefCell;
use std::fs;
use std::path::Path;

use sidekick::bridge::Bridge;
use sidekick::cancel::CancelToken;
use sidekick::config::{Config, Project};
use sidekick::sync::{self, SyncStatus};
use sidekick::utils::command::{CommandOutput, CommandRunner};

struct RecordingRunner {
    calls: RefCell<Vec<Vec<String>>>,
    success: bool,
}

impl RecordingRunner {
    fn new(success: bool) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            success,
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str], _current_dir: Option<&Path>) -> CommandOutput {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(|a| a.to_string()));
        self.calls.borrow_mut().push(call);

        CommandOutput {
            stdout: String::new(),
            stderr: if self.success {
                String::new()
            } else {
                "adb: error: no devices/emulators found".to_string()
            },
            success: self.success,
            exit_code: if self.success { 0 } else { 1 },
        }
    }
}

fn project(files: &[&str]) -> (tempfile::TempDir, Project) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.sync.files = files.iter().map(|f| f.to_string()).collect();
    config.sync.remote_dir = "/sdcard/plugin/".to_string();
    let project = Project::new(dir.path(), config);
    (dir, project)
}

#[test]
fn missing_file_is_skipped_with_one_warning() {
    let (dir, project) = project(&["a.txt", "b.txt"]);
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    let runner = RecordingRunner::new(true);

    let report = sync::sync(&project, &Bridge::new("adb"), &runner, &CancelToken::new());

    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][1], "push");
    assert!(calls[0][2].ends_with("a.txt"));
    assert_eq!(calls[0][3], "/sdcard/plugin/");

    assert_eq!(report.pushed, 1);
    assert_eq!(report.missing, 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("b.txt"));
    assert_eq!(report.entries[1].status, SyncStatus::Missing);
}

#[test]
fn failed_push_is_recorded_and_sync_continues() {
    let (dir, project) = project(&["src/main.lua", "src/utils.lua"]);
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/main.lua"), "").unwrap();
    fs::write(dir.path().join("src/utils.lua"), "").unwrap();
    let runner = RecordingRunner::new(false);

    let report = sync::sync(&project, &Bridge::new("adb"), &runner, &CancelToken::new());

    assert_eq!(runner.calls.borrow().len(), 2);
    assert_eq!(report.failed, 2);
    assert_eq!(report.pushed, 0);
    assert!(report.entries[0]
        .error
        .as_deref()
        .unwrap()
        .contains("no devices"));
}

#[test]
fn shared_base_names_are_warned_about_before_pushing() {
    let (dir, project) = project(&["src/init.lua", "lib/init.lua"]);
    for sub in ["src", "lib"] {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
        fs::write(dir.path().join(sub).join("init.lua"), "").unwrap();
    }
    let runner = RecordingRunner::new(true);

    let report = sync::sync(&project, &Bridge::new("adb"), &runner, &CancelToken::new());

    assert_eq!(report.pushed, 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("'init.lua'"));
}

#[test]
fn cancelled_sync_pushes_nothing_further() {
    let (dir, project) = project(&["a.lua", "b.lua"]);
    fs::write(dir.path().join("a.lua"), "").unwrap();
    fs::write(dir.path().join("b.lua"), "").unwrap();
    let runner = RecordingRunner::new(true);
    let cancel = CancelToken::new();
    cancel.cancel();

    let report = sync::sync(&project, &Bridge::new("adb"), &runner, &cancel);

    assert!(runner.calls.borrow().is_empty());
    assert!(report.interrupted);
    assert!(report.entries.is_empty());
}
