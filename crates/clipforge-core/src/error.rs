//! Error types module
//!
//! All errors surfaced by the registry, pipeline, and HTTP layer are unified
//! under the `AppError` enum. Engine failures keep the raw ffmpeg diagnostic
//! for operator logs but are marked sensitive so the client only sees a
//! generic message.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
/// This trait allows errors to self-describe their HTTP response characteristics.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "ENGINE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Asset {id} is not {expected}")]
    InvalidKind { id: uuid::Uuid, expected: &'static str },

    #[error("Unsupported export format {0}")]
    UnsupportedFormat(String),

    #[error("Engine error during {operation}: {detail}")]
    Engine { operation: &'static str, detail: String },

    #[error("Clips cannot be concatenated by stream copy: {0}")]
    IncompatibleStreams(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Storage(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Validation(_) => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the asset ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidKind { .. } => (
            400,
            "INVALID_KIND",
            false,
            Some("Reference an asset of the required media kind"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedFormat(_) => (
            400,
            "UNSUPPORTED_FORMAT",
            false,
            Some("Use one of the supported export formats"),
            false,
            LogLevel::Debug,
        ),
        AppError::Engine { .. } => (
            500,
            "ENGINE_ERROR",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::IncompatibleStreams(_) => (
            500,
            "INCOMPATIBLE_STREAMS",
            false,
            Some("Transcode the clips to a common format before merging"),
            true,
            LogLevel::Warn,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidKind { .. } => "InvalidKind",
            AppError::UnsupportedFormat(_) => "UnsupportedFormat",
            AppError::Engine { .. } => "Engine",
            AppError::IncompatibleStreams(_) => "IncompatibleStreams",
            AppError::Storage(_) => "Storage",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including the source chain, for operator logs.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidKind { .. } => self.to_string(),
            AppError::UnsupportedFormat(fmt) => format!("Unsupported export format {}", fmt),
            // Raw ffmpeg diagnostics stay in operator logs.
            AppError::Engine { operation, .. } => {
                format!("Media transformation failed during {}", operation)
            }
            AppError::IncompatibleStreams(_) => {
                "Clips cannot be merged without re-encoding".to_string()
            }
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Asset 42 not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Asset 42 not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_engine_hides_diagnostic() {
        let err = AppError::Engine {
            operation: "trim",
            detail: "x264 [error]: broken stream at /var/lib/clipforge/uploads/a.mp4".to_string(),
        };
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "ENGINE_ERROR");
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("/var/lib"));
        assert!(err.to_string().contains("broken stream"));
    }

    #[test]
    fn test_error_metadata_invalid_kind() {
        let id = uuid::Uuid::new_v4();
        let err = AppError::InvalidKind {
            id,
            expected: "a video",
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_KIND");
        assert!(err.client_message().contains(&id.to_string()));
    }

    #[test]
    fn test_error_metadata_incompatible_streams() {
        let err = AppError::IncompatibleStreams("codec mismatch".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "INCOMPATIBLE_STREAMS");
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(!err.client_message().contains("codec mismatch"));
    }
}
