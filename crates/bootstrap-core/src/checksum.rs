//! Integrity verification: streamed CRC-32 over whole files.
//!
//! The checksum is always computed over the complete file content; there is
//! no size or prefix shortcut.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Result of checking one file against an optional expected CRC-32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    /// File exists and (when a checksum is expected) matches it.
    Verified,
    /// File exists but its checksum differs.
    Mismatch { expected: u32, actual: u32 },
    /// File is missing or could not be read.
    Absent,
}

impl Verification {
    /// True when no repair is needed.
    pub fn is_ok(&self) -> bool {
        matches!(self, Verification::Verified)
    }
}

/// Compute the CRC-32 (IEEE) of a file by streaming it in chunks.
pub fn crc32_path(path: &Path) -> Result<u32> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Check `path` against `expected`. With no expected value this is an
/// existence check. Unreadable files are reported as `Absent`.
pub fn verify(path: &Path, expected: Option<u32>) -> Verification {
    if !path.is_file() {
        return Verification::Absent;
    }
    let Some(expected) = expected else {
        return Verification::Verified;
    };
    match crc32_path(path) {
        Ok(actual) if actual == expected => Verification::Verified,
        Ok(actual) => Verification::Mismatch { expected, actual },
        Err(e) => {
            tracing::debug!(path = %path.display(), "checksum read failed: {:#}", e);
            Verification::Absent
        }
    }
}
