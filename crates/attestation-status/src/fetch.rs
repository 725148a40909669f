//! Status-list HTTP fetching
//!
//! This module performs the single remote GET of the status list. Every
//! caching layer between us and the authority is told to step aside, the body
//! is read fully into memory under a size limit, and the connection is closed
//! when the call returns.

use super::config::StatusConfig;
use super::error::StatusError;
use reqwest::header::{ACCEPT, CACHE_CONTROL, EXPIRES, PRAGMA};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Source of the raw remote status document
pub trait StatusFetcher: Send + Sync {
    /// Fetch the raw response body from `url`
    fn fetch(&self, url: &str) -> Result<Vec<u8>, StatusError>;
}

/// Status-list fetcher backed by a blocking HTTP client
#[derive(Debug)]
pub struct HttpFetcher {
    /// Whole-request timeout in seconds
    timeout_secs: u64,
    /// Maximum accepted body size in bytes
    max_size_bytes: usize,
    /// Reject non-2xx responses
    require_success_status: bool,
    http_client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given timeouts and a 10 MB body limit
    pub fn new(connect_timeout_secs: u64, timeout_secs: u64) -> Result<Self, StatusError> {
        Self::with_max_size(connect_timeout_secs, timeout_secs, 10 * 1024 * 1024)
    }

    /// Create a fetcher with an explicit body size limit
    pub fn with_max_size(
        connect_timeout_secs: u64,
        timeout_secs: u64,
        max_size_bytes: usize,
    ) -> Result<Self, StatusError> {
        // No idle pool: the connection is dropped together with the response
        let http_client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| StatusError::HttpError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            timeout_secs,
            max_size_bytes,
            require_success_status: true,
            http_client,
        })
    }

    /// Create a fetcher from the retrieval configuration
    pub fn from_config(config: &StatusConfig) -> Result<Self, StatusError> {
        let mut fetcher = Self::with_max_size(
            config.connect_timeout_secs,
            config.http_timeout_secs,
            config.max_response_size_bytes,
        )?;
        fetcher.require_success_status = config.require_success_status;
        Ok(fetcher)
    }

    /// Accept any HTTP status and leave error bodies to the parser
    pub fn permissive(mut self) -> Self {
        self.require_success_status = false;
        self
    }

    fn map_send_error(&self, err: reqwest::Error) -> StatusError {
        if err.is_timeout() {
            StatusError::HttpTimeout(self.timeout_secs)
        } else if err.is_connect() {
            StatusError::HttpError(format!("connection failed: {}", err))
        } else {
            StatusError::HttpError(format!("status list request failed: {}", err))
        }
    }
}

impl StatusFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, StatusError> {
        let response = self
            .http_client
            .get(url)
            .header(CACHE_CONTROL, "max-age=0, no-cache, no-store, must-revalidate")
            .header(PRAGMA, "no-cache")
            .header(EXPIRES, "0")
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        debug!(url = %url, status = %status, "Status list response received");

        if self.require_success_status && !status.is_success() {
            return Err(StatusError::HttpStatus(status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            let length = usize::try_from(length).unwrap_or(usize::MAX);
            if length > self.max_size_bytes {
                return Err(StatusError::ResponseTooLarge(length, self.max_size_bytes));
            }
        }

        // One byte past the limit tells an oversized body from an exact fit
        let limit = u64::try_from(self.max_size_bytes)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        let mut body = Vec::new();
        response.take(limit).read_to_end(&mut body).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                StatusError::HttpTimeout(self.timeout_secs)
            } else {
                StatusError::FetchError(format!("failed to read status list body: {}", e))
            }
        })?;

        if body.len() > self.max_size_bytes {
            return Err(StatusError::ResponseTooLarge(body.len(), self.max_size_bytes));
        }

        debug!(url = %url, bytes = body.len(), "Status list body read");
        Ok(body)
    }
}
