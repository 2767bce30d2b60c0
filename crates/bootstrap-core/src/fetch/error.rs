//! Fetch error taxonomy and classification.

use std::io;
use std::path::PathBuf;

/// Coarse failure class reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailureKind {
    /// Transport failure (DNS, connect, TLS, timeout) or a server-side HTTP error.
    Network,
    /// The remote name does not resolve to a resource (bad name or URL, 404/410).
    NotFound,
    /// The destination could not be written (permissions, disk full).
    Write,
}

/// Error returned by a single artifact fetch. None of these abort the install
/// loop; the orchestrator reports them and lets the pass fail.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL for {remote_path}: {source}")]
    InvalidUrl {
        remote_path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u32 },
    #[error("{url} not found")]
    NotFound { url: String },
    #[error("writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    /// Map this error onto the operator-facing failure class.
    pub fn kind(&self) -> FetchFailureKind {
        match self {
            FetchError::InvalidUrl { .. } | FetchError::NotFound { .. } => {
                FetchFailureKind::NotFound
            }
            FetchError::Network { .. } | FetchError::Status { .. } => FetchFailureKind::Network,
            FetchError::Write { .. } => FetchFailureKind::Write,
        }
    }
}

/// Classify a non-2xx HTTP status. `None` means the status is a success.
/// Status 0 is what libcurl reports for non-HTTP schemes such as `file://`.
pub fn classify_status(url: &str, status: u32) -> Option<FetchError> {
    match status {
        0 | 200..=299 => None,
        404 | 410 => Some(FetchError::NotFound {
            url: url.to_string(),
        }),
        _ => Some(FetchError::Status {
            url: url.to_string(),
            status,
        }),
    }
}

/// libcurl's `CURLE_REMOTE_FILE_NOT_FOUND` (FTP/SFTP/SMB misses).
const CURLE_REMOTE_FILE_NOT_FOUND: u32 = 78;

/// Classify a curl transport error. A missing file behind a `file://` or
/// FTP-style URL is a not-found, the rest are network failures.
pub fn classify_curl_error(url: &str, e: curl::Error) -> FetchError {
    if e.is_file_couldnt_read_file() || e.code() == CURLE_REMOTE_FILE_NOT_FOUND {
        return FetchError::NotFound {
            url: url.to_string(),
        };
    }
    FetchError::Network {
        url: url.to_string(),
        source: e,
    }
}
