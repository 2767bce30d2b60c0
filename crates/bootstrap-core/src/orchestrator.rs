//! Verify-and-repair loop.
//!
//! Each pass runs, strictly in order: dependency check, dependency repair (if
//! anything is missing), package check, package install (if the entry file is
//! missing or wrong), config maintenance, final verification. The loop stops
//! at the first pass whose final verification succeeds, or when the retry
//! policy gives up. Component failures never abort the loop; they only make
//! the pass fail.

use crate::checksum::{self, Verification};
use crate::config_file::{self, ConfigStatus};
use crate::console::Console;
use crate::fetch::Fetcher;
use crate::installer::PackageInstaller;
use crate::manifest::{Artifact, Manifest};
use crate::retry::{RetryDecision, RetryPolicy};
use crate::storage;
use serde::Serialize;
use std::path::PathBuf;
use url::Url;

/// Verification result for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub verification: Verification,
}

impl ArtifactStatus {
    fn check(artifact: &Artifact) -> Self {
        Self {
            name: artifact.name.clone(),
            path: artifact.dest.clone(),
            verification: checksum::verify(&artifact.dest, artifact.expected_crc),
        }
    }

    /// Operator-facing description of what is wrong, `None` when verified.
    pub fn describe(&self) -> Option<String> {
        match self.verification {
            Verification::Verified => None,
            Verification::Absent => Some(format!("{} missing", self.path.display())),
            Verification::Mismatch { expected, actual } => Some(format!(
                "CRC32 mismatch for {}: expected 0x{:08x}, got 0x{:08x}",
                self.path.display(),
                expected,
                actual
            )),
        }
    }
}

/// Final verification state of one pass. Only the latest is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallAttempt {
    /// Zero-based pass index.
    pub index: u32,
    pub dependencies: Vec<ArtifactStatus>,
    pub package: ArtifactStatus,
    pub success: bool,
}

impl InstallAttempt {
    /// Every artifact that failed final verification, described.
    pub fn problems(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .chain(std::iter::once(&self.package))
            .filter_map(ArtifactStatus::describe)
            .collect()
    }

    fn from_checks(index: u32, dependencies: Vec<ArtifactStatus>, package: ArtifactStatus) -> Self {
        let success =
            dependencies.iter().all(|s| s.verification.is_ok()) && package.verification.is_ok();
        Self {
            index,
            dependencies,
            package,
            success,
        }
    }
}

/// Result of a full run: no partial success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success { attempts: u32 },
    Failure { attempts: u32 },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Number of passes that ran.
    pub fn attempts(&self) -> u32 {
        match *self {
            Outcome::Success { attempts } | Outcome::Failure { attempts } => attempts,
        }
    }
}

fn check_dependencies(manifest: &Manifest) -> Vec<ArtifactStatus> {
    manifest
        .dependencies
        .iter()
        .map(ArtifactStatus::check)
        .collect()
}

fn check_package(manifest: &Manifest) -> ArtifactStatus {
    ArtifactStatus::check(&manifest.package.entry)
}

/// Check everything without repairing.
pub fn inspect(manifest: &Manifest) -> InstallAttempt {
    InstallAttempt::from_checks(0, check_dependencies(manifest), check_package(manifest))
}

pub struct Orchestrator<'a> {
    manifest: &'a Manifest,
    base: &'a Url,
    fetcher: &'a dyn Fetcher,
    installer: &'a dyn PackageInstaller,
    console: &'a mut Console,
    last: Option<InstallAttempt>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        manifest: &'a Manifest,
        base: &'a Url,
        fetcher: &'a dyn Fetcher,
        installer: &'a dyn PackageInstaller,
        console: &'a mut Console,
    ) -> Self {
        Self {
            manifest,
            base,
            fetcher,
            installer,
            console,
            last: None,
        }
    }

    /// Run up to `max_attempts` passes back to back.
    pub fn run(&mut self, max_attempts: u32) -> Outcome {
        self.run_with_policy(&RetryPolicy::immediate(max_attempts))
    }

    /// Run passes until success or until `policy` gives up.
    pub fn run_with_policy(&mut self, policy: &RetryPolicy) -> Outcome {
        let mut attempts = 0u32;
        while attempts < policy.max_attempts {
            let attempt = self.pass(attempts);
            attempts += 1;
            let success = attempt.success;
            self.last = Some(attempt);
            if success {
                tracing::info!(attempts, "all artifacts verified");
                return Outcome::Success { attempts };
            }
            match policy.decide(attempts) {
                RetryDecision::GiveUp => break,
                RetryDecision::RetryAfter(delay) => {
                    self.console
                        .warn(&format!("Attempt {} failed, retrying", attempts));
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
            }
        }
        tracing::warn!(attempts, "attempt budget exhausted");
        Outcome::Failure { attempts }
    }

    /// Final verification state of the most recent pass.
    pub fn last_attempt(&self) -> Option<&InstallAttempt> {
        self.last.as_ref()
    }

    fn pass(&mut self, index: u32) -> InstallAttempt {
        let span = tracing::info_span!("pass", attempt = index + 1);
        let _enter = span.enter();
        self.console.info(&format!("Attempt {}", index + 1));

        let deps = check_dependencies(self.manifest);
        let deps_ok = self.report(&deps);
        if !deps_ok {
            let failures = self.repair_dependencies();
            if failures > 0 {
                tracing::warn!(failures, "dependency repair incomplete");
            }
        }

        let package = check_package(self.manifest);
        if !self.report(std::slice::from_ref(&package)) {
            self.repair_package();
        }

        self.ensure_configs();

        InstallAttempt::from_checks(
            index,
            check_dependencies(self.manifest),
            check_package(self.manifest),
        )
    }

    /// Print problems; true when everything verified.
    fn report(&mut self, statuses: &[ArtifactStatus]) -> bool {
        let mut ok = true;
        for status in statuses {
            if let Some(problem) = status.describe() {
                self.console.warn(&problem);
                ok = false;
            }
        }
        ok
    }

    /// Remove every dependency, then fetch every dependency. Individual
    /// failures are reported and the remaining fetches still run.
    fn repair_dependencies(&mut self) -> usize {
        let mut failures = 0;
        for artifact in &self.manifest.dependencies {
            if let Err(e) = storage::remove_if_exists(&artifact.dest) {
                self.console.warn(&format!(
                    "Could not remove {}: {}",
                    artifact.dest.display(),
                    e
                ));
            }
        }
        for artifact in &self.manifest.dependencies {
            self.console.info(&format!("Downloading {}", artifact.name));
            match self
                .fetcher
                .fetch(self.base, &artifact.remote_path, &artifact.dest)
            {
                Ok(bytes) => {
                    tracing::debug!(artifact = %artifact.name, bytes, "dependency fetched");
                }
                Err(e) => {
                    failures += 1;
                    self.console.warn(&format!(
                        "Download of {} failed ({:?}): {}",
                        artifact.name,
                        e.kind(),
                        e
                    ));
                }
            }
        }
        failures
    }

    fn repair_package(&mut self) {
        let package = &self.manifest.package;
        self.console.info(&format!("Installing {}", package.name));
        if let Err(e) = self.installer.install(self.base, package) {
            self.console
                .warn(&format!("Install of {} failed: {}", package.name, e));
        }
    }

    /// Best effort; never fails the pass.
    fn ensure_configs(&mut self) {
        for target in &self.manifest.configs {
            match config_file::ensure(&target.path, target.variant) {
                Ok(ConfigStatus::Created) => self
                    .console
                    .info(&format!("Wrote {}", target.path.display())),
                Ok(ConfigStatus::AlreadyPresent) => {}
                Err(e) => self.console.warn(&e.to_string()),
            }
        }
    }
}
