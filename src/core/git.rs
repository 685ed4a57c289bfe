use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::command::{self, CommandRunner};

pub const GIT: &str = "git";

/// Name of the checked-out branch.
///
/// A detached HEAD is rejected: there is no branch to push.
pub fn current_branch(runner: &dyn CommandRunner, repo: &Path) -> Result<String> {
    let branch = command::run_required(
        runner,
        GIT,
        &["rev-parse", "--abbrev-ref", "HEAD"],
        Some(repo),
        Error::git_command_failed,
    )?;

    if branch.is_empty() || branch == "HEAD" {
        return Err(Error::validation_invalid_argument(
            "branch",
            "HEAD is detached; check out a branch before releasing",
            None,
            None,
        ));
    }

    Ok(branch)
}

pub fn add_args(path: &str) -> Vec<String> {
    vec!["add".to_string(), path.to_string()]
}

pub fn commit_args(message: &str) -> Vec<String> {
    vec!["commit".to_string(), "-m".to_string(), message.to_string()]
}

/// `tag -- <tag>`: the separator keeps the name from being read as an option.
pub fn tag_args(tag: &str) -> Vec<String> {
    vec!["tag".to_string(), "--".to_string(), tag.to_string()]
}

/// Fully qualified ref for pushing a tag.
pub fn tag_ref(tag: &str) -> String {
    format!("refs/tags/{}", tag)
}

pub fn push_args(remote: &str, refname: &str) -> Vec<String> {
    vec!["push".to_string(), remote.to_string(), refname.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::command::CommandOutput;
    use std::cell::RefCell;

    struct FixedRunner {
        output: CommandOutput,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl CommandRunner for FixedRunner {
        fn run(&self, program: &str, args: &[&str], _dir: Option<&Path>) -> CommandOutput {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().map(|a| a.to_string()));
            self.calls.borrow_mut().push(call);
            self.output.clone()
        }
    }

    fn runner(stdout: &str, success: bool) -> FixedRunner {
        FixedRunner {
            output: CommandOutput {
                stdout: stdout.to_string(),
                stderr: if success { String::new() } else { "fatal: not a git repository".to_string() },
                success,
                exit_code: if success { 0 } else { 128 },
            },
            calls: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn current_branch_trims_output() {
        let r = runner("main\n", true);
        assert_eq!(current_branch(&r, Path::new(".")).unwrap(), "main");
        assert_eq!(
            r.calls.borrow()[0],
            vec!["git", "rev-parse", "--abbrev-ref", "HEAD"]
        );
    }

    #[test]
    fn current_branch_rejects_detached_head() {
        let err = current_branch(&runner("HEAD\n", true), Path::new(".")).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn current_branch_propagates_git_failure() {
        let err = current_branch(&runner("", false), Path::new(".")).unwrap_err();
        assert_eq!(err.code.as_str(), "git.command_failed");
        assert_eq!(err.details["exitCode"], 128);
    }

    #[test]
    fn argument_builders() {
        assert_eq!(push_args("origin", "1.0.1"), vec!["push", "origin", "1.0.1"]);
        assert_eq!(tag_args("1.0.1"), vec!["tag", "--", "1.0.1"]);
        assert_eq!(tag_args("-l"), vec!["tag", "--", "-l"]);
        assert_eq!(push_args("origin", &tag_ref("1.0.1")), vec!["push", "origin", "refs/tags/1.0.1"]);
        assert_eq!(commit_args("m"), vec!["commit", "-m", "m"]);
    }
}
