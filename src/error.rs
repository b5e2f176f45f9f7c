use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::io;

/// Custom error type for pull_hook operations
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Failed to read request body: {0}")]
    ReadError(String),

    #[error("Missing X-Hub-Signature-256 header")]
    MissingSignature,

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Unsafe repository name: {0}")]
    UnsafeRepositoryName(String),

    #[error("Pull failed in {dir}\n{output}")]
    PullFailed { dir: String, output: String },

    #[error("Build failed in {dir}\n{output}")]
    BuildFailed { dir: String, output: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

impl HookError {
    /// Status code returned to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HookError::MissingSignature | HookError::InvalidSignature(_) => StatusCode::FORBIDDEN,
            HookError::MalformedPayload(_) | HookError::UnsafeRepositoryName(_) => {
                StatusCode::BAD_REQUEST
            }
            HookError::ReadError(_)
            | HookError::PullFailed { .. }
            | HookError::BuildFailed { .. }
            | HookError::ConfigError(_)
            | HookError::IoError(_)
            | HookError::TomlParseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short message returned to the caller. Never carries paths, secrets or
    /// command output; the full error only goes to the server log.
    pub fn public_message(&self) -> &'static str {
        match self {
            HookError::ReadError(_) => "Error reading request body",
            HookError::MissingSignature | HookError::InvalidSignature(_) => {
                "Invalid HMAC signature provided in X-Hub-Signature-256 header"
            }
            HookError::MalformedPayload(_) => "Cannot decode body as json",
            HookError::UnsafeRepositoryName(_) => "Invalid repository name",
            HookError::PullFailed { .. } => "Failed to pull repository",
            HookError::BuildFailed { .. } => "Failed to build repository",
            HookError::ConfigError(_) | HookError::IoError(_) | HookError::TomlParseError(_) => {
                "Internal server error"
            }
        }
    }
}

impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}

/// Helper type for Results that use HookError
pub type Result<T> = std::result::Result<T, HookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_look_the_same() {
        let missing = HookError::MissingSignature;
        let invalid = HookError::InvalidSignature("bad hex".to_string());
        assert_eq!(missing.status_code(), invalid.status_code());
        assert_eq!(missing.public_message(), invalid.public_message());
    }

    #[test]
    fn public_message_hides_command_output() {
        let err = HookError::PullFailed {
            dir: "/var/www/blog.linu.sk".to_string(),
            output: "fatal: detected dubious ownership".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("/var/www"));
        assert!(!err.public_message().contains("dubious"));
        assert!(err.to_string().contains("dubious"));
    }

    #[test]
    fn read_error_is_server_error() {
        let err = HookError::ReadError("length limit exceeded".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Error reading request body");
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(
            HookError::MalformedPayload("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HookError::UnsafeRepositoryName("..".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
