//! Primary package installation.
//!
//! The orchestrator only decides *when* to install; how the package gets onto
//! disk sits behind [`PackageInstaller`].

use crate::fetch::{FetchError, Fetcher};
use crate::manifest::Package;
use crate::storage;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("package {package}: {source}")]
    Fetch {
        package: String,
        #[source]
        source: FetchError,
    },
    #[error("package {package}: removing stale {}: {source}", .path.display())]
    Cleanup {
        package: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Installs the whole primary package.
pub trait PackageInstaller {
    fn install(&self, base: &Url, package: &Package) -> Result<(), InstallError>;
}

/// Installs a package by fetching each of its files from the base URL.
///
/// Stale copies are removed first. The entry file is fetched last so that a
/// verified entry implies the rest of the package landed too.
pub struct RemoteInstaller<'a, F: Fetcher> {
    fetcher: &'a F,
}

impl<'a, F: Fetcher> RemoteInstaller<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }
}

impl<F: Fetcher> PackageInstaller for RemoteInstaller<'_, F> {
    fn install(&self, base: &Url, package: &Package) -> Result<(), InstallError> {
        for file in &package.files {
            storage::remove_if_exists(&file.dest).map_err(|source| InstallError::Cleanup {
                package: package.name.clone(),
                path: file.dest.clone(),
                source,
            })?;
        }

        let (entry, rest): (Vec<_>, Vec<_>) = package
            .files
            .iter()
            .partition(|f| f.dest == package.entry.dest);
        for file in rest.into_iter().chain(entry) {
            let bytes = self
                .fetcher
                .fetch(base, &file.remote_path, &file.dest)
                .map_err(|source| InstallError::Fetch {
                    package: package.name.clone(),
                    source,
                })?;
            tracing::debug!(package = %package.name, file = %file.name, bytes, "installed file");
        }
        Ok(())
    }
}
