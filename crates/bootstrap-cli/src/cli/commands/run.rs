//! `bootstrap run` – the verify-and-repair loop.

use anyhow::{Context, Result};
use bootstrap_core::config::BootstrapConfig;
use bootstrap_core::console::Console;
use bootstrap_core::fetch::CurlFetcher;
use bootstrap_core::installer::RemoteInstaller;
use bootstrap_core::manifest::{self, Manifest};
use bootstrap_core::{InstallAttempt, Orchestrator, Outcome};
use std::time::Duration;

pub async fn run_install(cfg: &BootstrapConfig, attempts: Option<u32>, pause: bool) -> Result<i32> {
    let manifest = Manifest::builtin()?;
    manifest.preflight()?;
    let base = manifest::base_url()?;

    let mut policy = cfg.retry.policy();
    if let Some(n) = attempts {
        policy.max_attempts = n;
    }
    let opts = cfg.fetch.options();
    tracing::info!(base = %base, max_attempts = policy.max_attempts, "starting install");

    // The loop is synchronous (blocking curl + file I/O); keep it off the runtime threads.
    let outcome = tokio::task::spawn_blocking(move || {
        let fetcher = CurlFetcher::new(opts);
        let installer = RemoteInstaller::new(&fetcher);
        let mut console = Console::stdout();
        console.clear();
        let mut orchestrator =
            Orchestrator::new(&manifest, &base, &fetcher, &installer, &mut console);
        let outcome = orchestrator.run_with_policy(&policy);
        let last = orchestrator.last_attempt().cloned();
        report_outcome(&mut console, outcome, last.as_ref());
        outcome
    })
    .await
    .context("install task panicked")?;

    if pause && cfg.exit_pause_secs > 0 {
        tokio::time::sleep(Duration::from_secs(cfg.exit_pause_secs)).await;
    }
    Ok(exit_code(outcome))
}

/// Final summary; on failure, lists what the last pass could not verify.
pub(crate) fn report_outcome(
    console: &mut Console,
    outcome: Outcome,
    last: Option<&InstallAttempt>,
) {
    console.blank();
    if outcome.is_success() {
        console.info(&format!(
            "Installation completed successfully ({} attempt(s)).",
            outcome.attempts()
        ));
        return;
    }
    for problem in last.map(InstallAttempt::problems).unwrap_or_default() {
        console.warn(&problem);
    }
    console.warn(&format!(
        "Installation failed after {} attempt(s).",
        outcome.attempts()
    ));
}

pub(crate) fn exit_code(outcome: Outcome) -> i32 {
    if outcome.is_success() {
        0
    } else {
        1
    }
}
