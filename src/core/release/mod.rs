//! Version release: bump the version file, then publish through git.
//!
//! The transaction runs five git steps strictly in order and the first failure
//! aborts the rest. Nothing is rolled back; a failed run reports which steps
//! completed and how to undo them by hand.

mod executor;
mod pipeline;
mod types;

pub use executor::{commit_message, execute, plan, recovery_hints};
pub use pipeline::{run, Operator, ReleaseOptions};
pub use types::{
    PlannedStep, ReleaseOutcome, ReleasePlan, ReleaseReport, ReleaseRun, ReleaseStep, StepResult,
};
