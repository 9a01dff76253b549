use std::time::Duration;

use rmcp::model::{ErrorCode, ErrorData};
use thiserror::Error;

/// JSON-RPC code the MCP SDKs use for `RequestTimeout`.
pub const REQUEST_TIMEOUT: ErrorCode = ErrorCode(-32001);

/// Caller-facing category of an [`ImageGenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParams,
    MethodNotFound,
    InternalError,
    RequestTimeout,
}

impl ErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            ErrorKind::InvalidParams => ErrorCode::INVALID_PARAMS,
            ErrorKind::MethodNotFound => ErrorCode::METHOD_NOT_FOUND,
            ErrorKind::InternalError => ErrorCode::INTERNAL_ERROR,
            ErrorKind::RequestTimeout => REQUEST_TIMEOUT,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ImageGenError {
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    MethodNotFound(String),

    #[error("Failed to create task: {0}")]
    CreateRejected(String),

    #[error("Failed to create task: the returned task key is empty")]
    EmptyKey,

    #[error("Failed to query task {key}: {message}")]
    QueryRejected { key: String, message: String },

    #[error("Failed to fetch model list: {0}")]
    CatalogRejected(String),

    #[error("Task {key} failed: {reason}")]
    TaskFailed { key: String, reason: String },

    #[error("Task {key} was cancelled: {reason}")]
    TaskCancelled { key: String, reason: String },

    #[error("Task {key} did not finish within {}s", .timeout.as_secs_f64())]
    Timeout { key: String, timeout: Duration },

    #[error("Polling for task {key} was aborted")]
    Aborted { key: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl ImageGenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageGenError::InvalidParams(_) => ErrorKind::InvalidParams,
            ImageGenError::MethodNotFound(_) => ErrorKind::MethodNotFound,
            ImageGenError::Timeout { .. } => ErrorKind::RequestTimeout,
            ImageGenError::CreateRejected(_)
            | ImageGenError::EmptyKey
            | ImageGenError::QueryRejected { .. }
            | ImageGenError::CatalogRejected(_)
            | ImageGenError::TaskFailed { .. }
            | ImageGenError::TaskCancelled { .. }
            | ImageGenError::Aborted { .. }
            | ImageGenError::RequestFailed(_) => ErrorKind::InternalError,
        }
    }
}

impl From<reqwest::Error> for ImageGenError {
    fn from(error: reqwest::Error) -> Self {
        let mut details = vec![];
        if let Some(status) = error.status() {
            details.push(format!("status: {}", status));
        }
        if error.is_timeout() {
            details.push("timeout".to_string());
        }
        if error.is_connect() {
            match error.url().and_then(|u| u.host_str()) {
                Some(host) => details.push(format!("failed to connect to {}", host)),
                None => details.push("connection failed".to_string()),
            }
        }
        if details.is_empty() {
            ImageGenError::RequestFailed(error.to_string())
        } else {
            ImageGenError::RequestFailed(format!("{} ({})", error, details.join(", ")))
        }
    }
}

impl From<ImageGenError> for ErrorData {
    fn from(error: ImageGenError) -> Self {
        ErrorData::new(error.kind().code(), error.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_request_timeout_and_names_the_key() {
        let err = ImageGenError::Timeout {
            key: "abc123".into(),
            timeout: Duration::from_secs(15),
        };
        assert_eq!(err.kind(), ErrorKind::RequestTimeout);
        let data: ErrorData = err.into();
        assert_eq!(data.code, REQUEST_TIMEOUT);
        assert!(data.message.contains("abc123"));
        assert!(data.message.contains("15s"));
    }

    #[test]
    fn terminal_failures_are_internal_errors() {
        for err in [
            ImageGenError::EmptyKey,
            ImageGenError::CreateRejected("quota exceeded".into()),
            ImageGenError::TaskFailed {
                key: "k".into(),
                reason: "boom".into(),
            },
            ImageGenError::TaskCancelled {
                key: "k".into(),
                reason: "revoked".into(),
            },
        ] {
            assert_eq!(err.kind(), ErrorKind::InternalError);
        }
    }

    #[test]
    fn caller_mistakes_keep_their_codes() {
        let data: ErrorData = ImageGenError::InvalidParams("key is required".into()).into();
        assert_eq!(data.code, ErrorCode::INVALID_PARAMS);
        let data: ErrorData = ImageGenError::MethodNotFound("draw".into()).into();
        assert_eq!(data.code, ErrorCode::METHOD_NOT_FOUND);
    }
}
