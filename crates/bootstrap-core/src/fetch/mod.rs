//! Remote fetcher: retrieve one artifact from the base URL into its
//! destination path.
//!
//! Uses the curl crate (libcurl). Every fetch is a full transfer; there is no
//! resume. Bytes land in a `.part` file that is renamed into place only after
//! the transfer finished with a success status.

mod error;

pub use error::{classify_curl_error, classify_status, FetchError, FetchFailureKind};

use crate::storage::StagedFile;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Retrieves `remote_path` relative to `base` into `dest`.
///
/// Callers remove stale destinations before calling; on error nothing is left
/// at `dest`.
pub trait Fetcher {
    /// Returns the number of bytes written on success.
    fn fetch(&self, base: &Url, remote_path: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// Transfer options applied to every request.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(600),
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("bootstrap/{}", env!("CARGO_PKG_VERSION"))
}

/// Build the full URL for an artifact.
pub fn artifact_url(base: &Url, remote_path: &str) -> Result<Url, FetchError> {
    base.join(remote_path).map_err(|source| FetchError::InvalidUrl {
        remote_path: remote_path.to_string(),
        source,
    })
}

/// libcurl-backed fetcher. Runs in the calling thread.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    opts: FetchOptions,
}

impl CurlFetcher {
    pub fn new(opts: FetchOptions) -> Self {
        curl::init();
        Self { opts }
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.opts.user_agent)?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.timeout(self.opts.timeout)?;
        Ok(())
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, base: &Url, remote_path: &str, dest: &Path) -> Result<u64, FetchError> {
        let url = artifact_url(base, remote_path)?;
        let url = url.as_str();
        let write_err = |source| FetchError::Write {
            path: dest.to_path_buf(),
            source,
        };

        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url)
            .map_err(|e| classify_curl_error(url, e))?;

        let mut staged = StagedFile::create(dest).map_err(write_err)?;
        let mut written = 0u64;
        let mut sink_error: Option<std::io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match staged.write(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        tracing::warn!("artifact write failed: {}", e);
                        sink_error = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(|e| classify_curl_error(url, e))?;
            transfer.perform()
        };

        if let Some(e) = sink_error {
            return Err(write_err(e));
        }
        performed.map_err(|e| classify_curl_error(url, e))?;

        let code = easy
            .response_code()
            .map_err(|e| classify_curl_error(url, e))?;
        if let Some(e) = classify_status(url, code) {
            return Err(e);
        }

        staged.finalize().map_err(write_err)?;
        tracing::debug!(url, dest = %dest.display(), bytes = written, "fetched artifact");
        Ok(written)
    }
}
