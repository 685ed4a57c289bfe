//! File sync stage: push manifest files to the device, one at a time.
//!
//! Best-effort per file. A missing local file or a failed push is recorded and
//! the remaining entries still run.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::bridge::Bridge;
use crate::cancel::CancelToken;
use crate::config::Project;
use crate::log_status;
use crate::utils::command::CommandRunner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pushed,
    Missing,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEntry {
    pub file: String,
    pub local_path: String,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub remote_dir: String,
    pub entries: Vec<SyncEntry>,
    pub pushed: usize,
    pub missing: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Stopped by the operator before every entry ran.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub interrupted: bool,
}

impl SyncReport {
    fn record(&mut self, entry: SyncEntry) {
        match entry.status {
            SyncStatus::Pushed => self.pushed += 1,
            SyncStatus::Missing => self.missing += 1,
            SyncStatus::Failed => self.failed += 1,
        }
        self.entries.push(entry);
    }

    fn warn(&mut self, message: String) {
        eprintln!("Warning: {}", message);
        self.warnings.push(message);
    }
}

/// Push every manifest file to the configured remote directory.
///
/// Files land at the root of the remote directory regardless of their local
/// subdirectory, so entries sharing a base name overwrite each other.
/// `cancel` is checked before each entry; entries after it are not recorded.
pub fn sync(
    project: &Project,
    bridge: &Bridge,
    runner: &dyn CommandRunner,
    cancel: &CancelToken,
) -> SyncReport {
    let manifest = &project.config.sync;
    let mut report = SyncReport {
        remote_dir: manifest.remote_dir.clone(),
        ..Default::default()
    };

    for (name, files) in flattened_collisions(&manifest.files) {
        report.warn(format!(
            "{} entries share the base name '{}' and will overwrite each other on the device: {}",
            files.len(),
            name,
            files.join(", ")
        ));
    }

    for file in &manifest.files {
        if cancel.is_cancelled() {
            log_status!("sync", "Interrupted.");
            report.interrupted = true;
            return report;
        }

        let local = project.resolve(file);
        let local_path = local.to_string_lossy().to_string();

        if !local.exists() {
            report.warn(format!("File not found, skipping: {}", local_path));
            report.record(SyncEntry {
                file: file.clone(),
                local_path,
                status: SyncStatus::Missing,
                error: None,
            });
            continue;
        }

        log_status!("sync", "Pushing {}", display_name(&local));
        let output = bridge.push(runner, &local, &manifest.remote_dir);

        let (status, error) = if output.success {
            (SyncStatus::Pushed, None)
        } else {
            (SyncStatus::Failed, Some(output.error_text()))
        };

        report.record(SyncEntry {
            file: file.clone(),
            local_path,
            status,
            error,
        });
    }

    log_status!(
        "sync",
        "Done: {} pushed, {} missing, {} failed",
        report.pushed,
        report.missing,
        report.failed
    );

    report
}

/// Manifest entries grouped by base name, for base names used more than once.
pub fn flattened_collisions(files: &[String]) -> Vec<(String, Vec<String>)> {
    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for file in files {
        by_name
            .entry(display_name(Path::new(file)))
            .or_default()
            .push(file.clone());
    }

    by_name
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
