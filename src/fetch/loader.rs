//! Byte fetching for remote and local audio sources.
//!
//! Both loaders race their I/O against a [`CancelSignal`] and map failures
//! to human-readable errors. Cancellation is reported as its own variant so
//! callers can keep it out of the error path.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use super::CancelSignal;

/// Errors produced while loading raw bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to connect to {url}. Check the URL and your internet connection.")]
    Connect { url: String },
    #[error("Request to {url} timed out. The server is not responding.")]
    Timeout { url: String },
    #[error("Server returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("Network error fetching {url}: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
    #[error("Failed to read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
    /// The load was aborted. Benign, never surfaced as a failure.
    #[error("load cancelled")]
    Cancelled,
}

/// Fetches a URL into memory.
///
/// # Errors
/// - If the request cannot be sent, times out, or the connection fails
/// - If the server responds with a non-success status
/// - [`FetchError::Cancelled`] if the signal fires first
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    signal: &mut CancelSignal,
) -> Result<Vec<u8>, FetchError> {
    tracing::debug!("Fetching {url}");

    let response = tokio::select! {
        _ = signal.cancelled() => return Err(FetchError::Cancelled),
        result = client.get(url).timeout(timeout).send() => {
            result.map_err(|e| classify_request_error(url, e))?
        }
    };

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }

    let bytes = tokio::select! {
        _ = signal.cancelled() => return Err(FetchError::Cancelled),
        result = response.bytes() => {
            result.map_err(|e| classify_request_error(url, e))?
        }
    };

    tracing::debug!("Fetched {} bytes from {url}", bytes.len());
    Ok(bytes.to_vec())
}

/// Reads a local file into memory through the same cancellable stage shape
/// as [`fetch_bytes`].
///
/// # Errors
/// - If the file cannot be read
/// - [`FetchError::Cancelled`] if the signal fires first
pub async fn read_file(path: &Path, signal: &mut CancelSignal) -> Result<Vec<u8>, FetchError> {
    tracing::debug!("Reading {}", path.display());

    tokio::select! {
        _ = signal.cancelled() => Err(FetchError::Cancelled),
        result = tokio::fs::read(path) => {
            result.map_err(|e| FetchError::File {
                path: path.display().to_string(),
                source: e,
            })
        }
    }
}

/// Maps a reqwest error to the closest human-readable variant.
fn classify_request_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
        }
    } else if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
