//! `bootstrap checksum <path>` – compute the CRC-32 of a file.

use anyhow::Result;
use bootstrap_core::checksum;
use std::path::Path;

/// Print the CRC-32 of the given file as eight hex digits.
pub async fn run_checksum(path: &Path) -> Result<i32> {
    let crc = checksum::crc32_path(path)?;
    println!("{}  {}", format_crc(crc), path.display());
    Ok(0)
}

pub(crate) fn format_crc(crc: u32) -> String {
    format!("{crc:08x}")
}
