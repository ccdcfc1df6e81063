//! Error types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Transport failures and error statuses are retried; bad bodies are not
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Http(_) | ApiError::Status { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        let status = ApiError::Status {
            status: 503,
            reason: "Service Unavailable".into(),
        };
        assert_eq!(status.to_string(), "HTTP 503: Service Unavailable");
        assert!(status.is_retryable());
        assert!(ApiError::Cancelled.is_cancelled());
        assert!(!ApiError::Cancelled.is_retryable());
        assert!(!ApiError::InvalidUrl("x".into()).is_cancelled());

        let err = ExportError::Write {
            path: PathBuf::from("/tmp/out.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write /tmp/out.csv: denied");
    }
}
