//! Status-list error types
//!
//! This module defines the errors raised inside the lookup pipeline. None of
//! them leave the public lookup API: [`crate::RevocationLookup`] turns every
//! variant into either "use fallback data" or "no record".

/// Errors that can occur while building or querying the status table
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// No usable network path, the remote list is not attempted
    #[error("no usable network connection")]
    ConnectivityUnavailable,

    /// Failed to fetch the status list from the remote endpoint
    #[error("status list fetch failed: {0}")]
    FetchError(String),

    /// HTTP transport failure (connect, TLS, read)
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Endpoint answered with a non-success status code
    #[error("status endpoint returned HTTP {0}")]
    HttpStatus(u16),

    /// HTTP timeout
    #[error("HTTP request timed out after {0}s")]
    HttpTimeout(u64),

    /// Response body exceeds the configured limit
    #[error("status list size {0} bytes exceeds maximum {1} bytes")]
    ResponseTooLarge(usize, usize),

    /// Status document is not valid JSON or lacks the `entries` object
    #[error("status list parse error: {0}")]
    ParseError(String),

    /// A looked-up entry exists but lacks `status` or `reason`
    #[error("malformed status entry for serial {serial}: {reason}")]
    EntryMalformed { serial: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serial number text could not be parsed
    #[error("invalid serial number: {0}")]
    InvalidSerial(String),

    /// Certificate parsing error
    #[error("certificate parsing error: {0}")]
    CertificateError(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StatusError {
    /// Whether this error, raised on the remote path, moves the store onto the
    /// local snapshot.
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(
            self,
            StatusError::ConnectivityUnavailable
                | StatusError::FetchError(_)
                | StatusError::HttpError(_)
                | StatusError::HttpStatus(_)
                | StatusError::HttpTimeout(_)
                | StatusError::ResponseTooLarge(..)
                | StatusError::ParseError(_)
                | StatusError::IoError(_)
        )
    }
}

impl From<serde_json::Error> for StatusError {
    fn from(err: serde_json::Error) -> Self {
        StatusError::ParseError(err.to_string())
    }
}
