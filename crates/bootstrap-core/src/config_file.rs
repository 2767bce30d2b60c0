//! Plugin configuration file maintenance.
//!
//! The file is created from a fixed template when absent and never touched
//! afterwards: an existing file, even a stale one, is left as is so user
//! edits survive.

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Which boot context reads the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigVariant {
    Primary,
    Recovery,
}

/// Outcome of [`ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatus {
    Created,
    AlreadyPresent,
}

#[derive(Debug, thiserror::Error)]
#[error("writing config {}: {source}", .path.display())]
pub struct ConfigWriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

const RECOVERY_HEADER: &str =
    "# This file is used as an alternative if ux0:tai/config.txt is not found.\n";

const TEMPLATE_BODY: &str = "\
# For users plugins, you must refresh taiHEN from HENkaku Settings for
# changes to take place.
# For kernel plugins, you must reboot for changes to take place.
*KERNEL
# henkaku.skprx is hard-coded to load and is not listed here
*main
# main is a special titleid for SceShell
ur0:tai/henkaku.suprx
*NPXS10015
# this is for modifying the version string
ur0:tai/henkaku.suprx
*NPXS10016
# this is for modifying the version string in settings widget
ur0:tai/henkaku.suprx
";

impl ConfigVariant {
    /// Exact file content for this variant.
    pub fn render(self) -> String {
        match self {
            ConfigVariant::Primary => TEMPLATE_BODY.to_string(),
            ConfigVariant::Recovery => format!("{RECOVERY_HEADER}{TEMPLATE_BODY}"),
        }
    }
}

/// Create the config at `path` for `variant` unless a file already exists.
pub fn ensure(path: &Path, variant: ConfigVariant) -> Result<ConfigStatus, ConfigWriteError> {
    let err = |source| ConfigWriteError {
        path: path.to_path_buf(),
        source,
    };
    if path.exists() {
        return Ok(ConfigStatus::AlreadyPresent);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(err)?;
    }
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(ConfigStatus::AlreadyPresent)
        }
        Err(e) => return Err(err(e)),
    };
    let written = file
        .write_all(variant.render().as_bytes())
        .and_then(|()| file.sync_all());
    if let Err(e) = written {
        // A half-written config would never be rewritten; drop it.
        drop(file);
        let _ = std::fs::remove_file(path);
        return Err(err(e));
    }
    tracing::info!(path = %path.display(), ?variant, "created config");
    Ok(ConfigStatus::Created)
}
