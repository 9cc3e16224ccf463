//! Error types for ragchat.
//!
//! Every failure a request can end in is one of five kinds. The `Display`
//! form is the caller-facing `"<Kind>: <detail>"` string and
//! [`AppError::status_code`] is the single place a kind is mapped to an HTTP
//! status.

use thiserror::Error;

/// Unified error type for ragchat.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic on a request path. Errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// The caller supplied no usable question
    #[error("BadRequest: {0}")]
    BadRequest(String),

    /// Search service unreachable or returned a non-success status
    #[error("SearchError: {0}")]
    Search(String),

    /// A required configuration value is absent or malformed
    #[error("ConfigError: {0}")]
    Config(String),

    /// Generation service unreachable, rejected the request, or returned no output
    #[error("GenerationError: {0}")]
    Generation(String),

    /// Anything else. Carries a summary only.
    #[error("InternalError: {0}")]
    Internal(String),
}

impl AppError {
    /// Short name of the error kind, as it appears before the colon.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BadRequest",
            AppError::Search(_) => "SearchError",
            AppError::Config(_) => "ConfigError",
            AppError::Generation(_) => "GenerationError",
            AppError::Internal(_) => "InternalError",
        }
    }

    /// HTTP status code for this error kind.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Search(_) | AppError::Generation(_) => 502,
            AppError::Config(_) | AppError::Internal(_) => 500,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("serialization failed: {}", err))
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_kind_prefixed() {
        assert_eq!(AppError::Search("503".into()).to_string(), "SearchError: 503");
        assert_eq!(
            AppError::BadRequest("question is required".into()).to_string(),
            "BadRequest: question is required"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::BadRequest(String::new()).status_code(), 400);
        assert_eq!(AppError::Search(String::new()).status_code(), 502);
        assert_eq!(AppError::Generation(String::new()).status_code(), 502);
        assert_eq!(AppError::Config(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_kind_matches_display_prefix() {
        let errors = [
            AppError::BadRequest("x".into()),
            AppError::Search("x".into()),
            AppError::Config("x".into()),
            AppError::Generation("x".into()),
            AppError::Internal("x".into()),
        ];
        for err in errors {
            assert!(err.to_string().starts_with(&format!("{}: ", err.kind())));
        }
    }

    #[test]
    fn test_json_error_becomes_internal() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.kind(), "InternalError");
    }
}
