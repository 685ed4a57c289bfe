use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidToml,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    BridgeNotFound,
    BridgeCommandFailed,

    VersionFileNotFound,
    VersionKeyMissing,
    VersionKeyAmbiguous,

    GitCommandFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidToml => "config.invalid_toml",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::BridgeNotFound => "bridge.not_found",
            ErrorCode::BridgeCommandFailed => "bridge.command_failed",

            ErrorCode::VersionFileNotFound => "version.file_not_found",
            ErrorCode::VersionKeyMissing => "version.key_missing",
            ErrorCode::VersionKeyAmbiguous => "version.key_ambiguous",

            ErrorCode::GitCommandFailed => "git.command_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidTomlDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeNotFoundDetails {
    pub bridge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

/// Details of an external command that exited non-zero.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub completed_steps: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionKeyDetails {
    pub path: String,
    pub pattern: String,
    pub match_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            to_details(InvalidArgumentDetails {
                field: field.into(),
                problem: problem.into(),
                id,
                tried,
            }),
        )
    }

    pub fn config_invalid_toml(path: impl Into<String>, err: toml::de::Error) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidToml,
            "Invalid TOML in configuration",
            to_details(ConfigInvalidTomlDetails {
                path: path.into(),
                error: err.to_string(),
            }),
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            to_details(ConfigInvalidValueDetails {
                key: key.into(),
                value,
                problem: problem.into(),
            }),
        )
    }

    pub fn bridge_not_found(bridge: impl Into<String>, resolved: Option<String>) -> Self {
        let bridge = bridge.into();
        Self::new(
            ErrorCode::BridgeNotFound,
            format!("Bridge executable not found: {}", bridge),
            to_details(BridgeNotFoundDetails {
                bridge: bridge.clone(),
                resolved,
            }),
        )
        .with_hint("Install the Android platform tools or pass --bridge /path/to/adb")
        .with_hint("The bridge can also be set with SIDEKICK_BRIDGE or `bridge` in sidekick.toml")
    }

    pub fn bridge_command_failed(details: CommandFailedDetails) -> Self {
        Self::new(
            ErrorCode::BridgeCommandFailed,
            format!("Bridge command failed: {}", details.command),
            to_details(details),
        )
    }

    pub fn git_command_failed(details: CommandFailedDetails) -> Self {
        Self::new(
            ErrorCode::GitCommandFailed,
            format!("Git command failed: {}", details.command),
            to_details(details),
        )
    }

    pub fn version_file_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::VersionFileNotFound,
            format!("Version file not found: {}", path),
            serde_json::json!({ "path": path }),
        )
        .with_hint("Set `version_file` in sidekick.toml relative to the project root")
    }

    pub fn version_key_missing(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::VersionKeyMissing,
            format!("Could not find a 'version' key in {}", path),
            to_details(VersionKeyDetails {
                path,
                pattern: pattern.into(),
                match_count: 0,
            }),
        )
        .with_hint("Expected an assignment like: version = \"1.0.0\"")
    }

    pub fn version_key_ambiguous(
        path: impl Into<String>,
        pattern: impl Into<String>,
        match_count: usize,
    ) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::VersionKeyAmbiguous,
            format!(
                "Found {} 'version' assignments in {}; expected exactly one",
                match_count, path
            ),
            to_details(VersionKeyDetails {
                path,
                pattern: pattern.into(),
                match_count,
            }),
        )
        .with_hint("Remove the duplicate assignment so the version has a single source of truth")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            to_details(InternalIoErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            to_details(InternalJsonErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
