//! Version store: the single `version = "..."` assignment in the plugin's
//! metadata file.
//!
//! Reads and writes are text-level. Only the quoted value changes; every other
//! byte of the file, including the assignment's own spacing, is preserved.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::utils::{io, parser};

/// Matches `version = "..."`. The word boundary keeps keys such as
/// `min_version` out.
pub const VERSION_PATTERN: &str = r#"\bversion\s*=\s*"([^"]*)""#;

#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
    pattern: Regex,
}

/// Result of rewriting the version file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionWrite {
    pub path: String,
    pub old_version: String,
    pub new_version: String,
}

impl VersionStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            pattern: parser::compile(VERSION_PATTERN)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<String> {
        if !self.path.exists() {
            return Err(Error::version_file_not_found(self.display_path()));
        }
        io::read_file(&self.path, "read version file")
    }

    fn display_path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    /// Byte range of the single version value in `content`.
    fn locate(&self, content: &str) -> Result<std::ops::Range<usize>> {
        let spans = parser::capture_spans(content, &self.pattern);
        match spans.len() {
            0 => Err(Error::version_key_missing(self.display_path(), VERSION_PATTERN)),
            1 => Ok(spans[0].clone()),
            n => Err(Error::version_key_ambiguous(
                self.display_path(),
                VERSION_PATTERN,
                n,
            )),
        }
    }

    /// Current version token.
    pub fn read(&self) -> Result<String> {
        let content = self.load()?;
        let span = self.locate(&content)?;
        let value = &content[span];
        if value.is_empty() {
            return Err(Error::version_key_missing(self.display_path(), VERSION_PATTERN)
                .with_hint("The version value is empty"));
        }
        Ok(value.to_string())
    }

    /// Replace the version value with `new_version` and write the file back
    /// atomically. `new_version` must already be normalized.
    pub fn write(&self, new_version: &str) -> Result<VersionWrite> {
        validate_token(new_version)?;

        let content = self.load()?;
        let span = self.locate(&content)?;
        let old_version = content[span.clone()].to_string();
        let updated = parser::splice(&content, span, new_version);

        io::write_file_atomic(&self.path, &updated, "write version file")?;

        Ok(VersionWrite {
            path: self.display_path(),
            old_version,
            new_version: new_version.to_string(),
        })
    }
}

/// An operator-supplied version after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedVersion {
    pub version: String,
    pub prefix_stripped: bool,
    pub is_semver: bool,
}

/// Normalize operator input: trim, strip exactly one leading `v`/`V`, and
/// validate. Returns `Ok(None)` for empty input, which means "cancel".
pub fn normalize(input: &str) -> Result<Option<NormalizedVersion>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (version, prefix_stripped) = match trimmed.strip_prefix(['v', 'V']) {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };

    validate_token(version)?;

    Ok(Some(NormalizedVersion {
        version: version.to_string(),
        prefix_stripped,
        is_semver: semver::Version::parse(version).is_ok(),
    }))
}

/// Reject tokens that are empty, would break the quoted assignment, or would
/// read as an option when passed to git.
pub fn validate_token(version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(Error::validation_invalid_argument(
            "version",
            "Version must not be empty",
            None,
            None,
        ));
    }

    if version.contains('"') || version.chars().any(char::is_whitespace) {
        return Err(Error::validation_invalid_argument(
            "version",
            format!(
                "Version '{}' must not contain quotes or whitespace",
                version
            ),
            Some(version.to_string()),
            None,
        ));
    }

    if version.starts_with('-') {
        return Err(Error::validation_invalid_argument(
            "version",
            format!("Version '{}' must not start with '-'", version),
            Some(version.to_string()),
            None,
        ));
    }

    Ok(())
}

/// Increment a semver version.
/// bump_type: "patch", "minor", or "major"
pub fn increment_version(version: &str, bump_type: &str) -> Option<String> {
    let parsed = semver::Version::parse(version).ok()?;

    let (major, minor, patch) = match bump_type {
        "patch" => (parsed.major, parsed.minor, parsed.patch + 1),
        "minor" => (parsed.major, parsed.minor + 1, 0),
        "major" => (parsed.major + 1, 0, 0),
        _ => return None,
    };

    Some(format!("{}.{}.{}", major, minor, patch))
}
