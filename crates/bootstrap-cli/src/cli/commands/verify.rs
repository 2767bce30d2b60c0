//! `bootstrap verify` – report what a run would repair.

use anyhow::Result;
use bootstrap_core::checksum::Verification;
use bootstrap_core::manifest::Manifest;
use bootstrap_core::orchestrator::{self, ArtifactStatus};

pub async fn run_verify(json: bool) -> Result<i32> {
    let manifest = Manifest::builtin()?;
    manifest.preflight()?;
    let status = orchestrator::inspect(&manifest);

    if json {
        let configs: Vec<_> = manifest
            .configs
            .iter()
            .map(|c| {
                serde_json::json!({
                    "variant": c.variant,
                    "path": c.path,
                    "present": c.path.is_file(),
                })
            })
            .collect();
        let report = serde_json::json!({ "artifacts": status, "configs": configs });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:<10} {:<16} {}", "STATUS", "NAME", "PATH");
        for s in status.dependencies.iter().chain(std::iter::once(&status.package)) {
            println!("{}", artifact_row(s));
        }
        for c in &manifest.configs {
            let state = if c.path.is_file() { "present" } else { "missing" };
            let name = format!("config ({:?})", c.variant).to_lowercase();
            println!("{:<10} {:<16} {}", state, name, c.path.display());
        }
    }
    Ok(if status.success { 0 } else { 1 })
}

pub(crate) fn artifact_row(s: &ArtifactStatus) -> String {
    let (state, detail) = match s.verification {
        Verification::Verified => ("ok", String::new()),
        Verification::Absent => ("missing", String::new()),
        Verification::Mismatch { expected, actual } => (
            "mismatch",
            format!(" (expected {expected:08x}, got {actual:08x})"),
        ),
    };
    format!("{:<10} {:<16} {}{}", state, s.name, s.path.display(), detail)
}
