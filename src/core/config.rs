use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::io;

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE: &str = "sidekick.toml";

/// Root configuration structure for sidekick.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bridge executable: a bare name looked up on PATH, or a path.
    #[serde(default = "default_bridge")]
    pub bridge: String,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(default)]
    pub release: ReleaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge: default_bridge(),
            sync: SyncConfig::default(),
            logs: LogsConfig::default(),
            release: ReleaseConfig::default(),
        }
    }
}

/// Files pushed to the device and where they land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_sync_files")]
    pub files: Vec<String>,

    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            files: default_sync_files(),
            remote_dir: default_remote_dir(),
        }
    }
}

/// Log stream filtering and presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_keyword")]
    pub keyword: String,

    /// Lines containing this literal are always shown.
    #[serde(default = "default_runtime_marker")]
    pub runtime_marker: String,

    /// Matched case-insensitively.
    #[serde(default = "default_error_marker")]
    pub error_marker: String,

    /// Pause between clearing the buffer and opening the stream.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_true")]
    pub clear_screen: bool,

    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            keyword: default_keyword(),
            runtime_marker: default_runtime_marker(),
            error_marker: default_error_marker(),
            settle_ms: default_settle_ms(),
            clear_screen: true,
            color: true,
        }
    }
}

/// Version file and git publishing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(default = "default_version_file")]
    pub version_file: String,

    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            version_file: default_version_file(),
            remote: default_remote(),
        }
    }
}

/// A project root plus its effective configuration. Passed into every stage.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Load the project at `root`, reading sidekick.toml when present.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = load_config(&root)?;
        Ok(Self { root, config })
    }

    /// Resolve a manifest or config path against the project root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let path = Path::new(relative);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn version_file(&self) -> PathBuf {
        self.resolve(&self.config.release.version_file)
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_bridge() -> String {
    "adb".to_string()
}

fn default_sync_files() -> Vec<String> {
    vec![
        "src/main.lua".to_string(),
        "src/progress.lua".to_string(),
        "src/_meta.lua".to_string(),
        "src/utils.lua".to_string(),
    ]
}

fn default_remote_dir() -> String {
    "/storage/emulated/0/koreader/plugins/sidekick.koplugin/".to_string()
}

fn default_keyword() -> String {
    "Sidekick".to_string()
}

fn default_runtime_marker() -> String {
    "luajit".to_string()
}

fn default_error_marker() -> String {
    "runtime error".to_string()
}

fn default_settle_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_version_file() -> String {
    "_meta.lua".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load sidekick.toml from `root`, falling back to built-in defaults when the
/// file does not exist. A file that exists but does not parse is an error.
pub fn load_config(root: &Path) -> Result<Config> {
    let path = config_path(root);
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = io::read_file(&path, &format!("read {}", path.display()))?;
    let config = parse_config(&content, &path.display().to_string())?;
    validate(&config)?;
    Ok(config)
}

pub fn parse_config(content: &str, origin: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| Error::config_invalid_toml(origin, e))
}

/// Reject values the stages cannot work with.
pub fn validate(config: &Config) -> Result<()> {
    if config.bridge.trim().is_empty() {
        return Err(Error::config_invalid_value(
            "bridge",
            None,
            "Bridge executable must not be empty",
        ));
    }
    if config.logs.keyword.is_empty() {
        return Err(Error::config_invalid_value(
            "logs.keyword",
            None,
            "Filter keyword must not be empty",
        ));
    }
    if config.sync.remote_dir.trim().is_empty() {
        return Err(Error::config_invalid_value(
            "sync.remote_dir",
            None,
            "Remote directory must not be empty",
        ));
    }
    if config.release.version_file.trim().is_empty() {
        return Err(Error::config_invalid_value(
            "release.version_file",
            None,
            "Version file must not be empty",
        ));
    }
    if config.release.remote.trim().is_empty() {
        return Err(Error::config_invalid_value(
            "release.remote",
            None,
            "Git remote must not be empty",
        ));
    }
    Ok(())
}

pub fn to_toml(config: &Config) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|e| Error::internal_unexpected(format!("Failed to serialize config: {}", e)))
}

/// Write the built-in defaults to `<root>/sidekick.toml`. Refuses to overwrite
/// unless `force` is set.
pub fn init_config(root: &Path, force: bool) -> Result<PathBuf> {
    let path = config_path(root);
    if path.exists() && !force {
        return Err(Error::validation_invalid_argument(
            "config",
            format!("{} already exists", path.display()),
            None,
            Some(vec!["Pass --force to overwrite it".to_string()]),
        ));
    }

    let content = to_toml(&Config::default())?;
    io::write_file_atomic(&path, &content, &format!("write {}", path.display()))?;
    Ok(path)
}
