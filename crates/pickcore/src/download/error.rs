use thiserror::Error;

/// Errors raised while moving bytes from a remote host to local disk.
///
/// Covers range fetches, whole-body fetches, the `HEAD` preflight and the
/// final write of the assembled file.
#[derive(Error, Debug)]
pub enum TransferError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: reqwest::StatusCode, url: String },

    /// `HEAD` preflight returned no usable Content-Length
    #[error("no Content-Length for {0}")]
    MissingContentLength(String),

    /// A sibling chunk failed first and this fetch was abandoned
    #[error("transfer cancelled")]
    Cancelled,

    /// Writing or removing the local file failed
    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    /// A fetch task panicked or was aborted by the runtime
    #[error("fetch task failed: {0}")]
    Join(String),
}

impl TransferError {
    /// Returns subcategory for logging
    pub fn subcategory(&self) -> &'static str {
        match self {
            TransferError::Http(_) => "http",
            TransferError::Status { .. } => "status",
            TransferError::MissingContentLength(_) => "content_length",
            TransferError::Cancelled => "cancelled",
            TransferError::Filesystem(_) => "filesystem",
            TransferError::Join(_) => "join",
        }
    }

    /// Whether this error is the cancellation echo of another failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransferError::Cancelled)
    }
}

impl From<tokio::task::JoinError> for TransferError {
    fn from(err: tokio::task::JoinError) -> Self {
        TransferError::Join(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_error_display() {
        let err = TransferError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            url: "https://cdn.example.com/v.mp4".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 Not Found for https://cdn.example.com/v.mp4");
    }

    #[test]
    fn test_transfer_error_subcategory() {
        assert_eq!(TransferError::Cancelled.subcategory(), "cancelled");
        assert_eq!(TransferError::MissingContentLength("u".into()).subcategory(), "content_length");
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(TransferError::from(io).subcategory(), "filesystem");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(TransferError::Cancelled.is_cancelled());
        assert!(!TransferError::Join("boom".into()).is_cancelled());
    }
}
