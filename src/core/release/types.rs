use serde::Serialize;

use crate::version::VersionWrite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStep {
    Stage,
    Commit,
    Tag,
    PushBranch,
    PushTag,
}

impl ReleaseStep {
    pub const ORDER: [ReleaseStep; 5] = [
        ReleaseStep::Stage,
        ReleaseStep::Commit,
        ReleaseStep::Tag,
        ReleaseStep::PushBranch,
        ReleaseStep::PushTag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStep::Stage => "stage",
            ReleaseStep::Commit => "commit",
            ReleaseStep::Tag => "tag",
            ReleaseStep::PushBranch => "push_branch",
            ReleaseStep::PushTag => "push_tag",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStep {
    pub step: ReleaseStep,
    pub args: Vec<String>,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePlan {
    pub version: String,
    pub tag: String,
    pub branch: String,
    pub remote: String,
    pub version_file: String,
    pub commit_message: String,
    pub steps: Vec<PlannedStep>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step: ReleaseStep,
    pub command: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRun {
    pub version: String,
    pub tag: String,
    pub branch: String,
    pub steps: Vec<StepResult>,
}

/// How a release invocation ended. Every variant is a clean exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseOutcome {
    /// No version entered; nothing changed.
    Cancelled,
    /// Plan computed, nothing written or run.
    DryRun,
    /// Version file rewritten, publishing declined.
    Declined,
    /// Version file rewritten and every git step succeeded.
    Released,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseReport {
    pub outcome: ReleaseOutcome,
    pub started_at: String,
    pub current_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_version: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub prefix_stripped: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write: Option<VersionWrite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<ReleasePlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<ReleaseRun>,
}
