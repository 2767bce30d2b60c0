//! Integration test: local HTTP server, real curl fetcher and remote installer,
//! full verify-and-repair loop against a temp storage layout.

mod common;

use bootstrap_core::checksum::{self, Verification};
use bootstrap_core::config_file::ConfigVariant;
use bootstrap_core::console::Console;
use bootstrap_core::fetch::{CurlFetcher, FetchFailureKind, FetchOptions, Fetcher};
use bootstrap_core::installer::RemoteInstaller;
use bootstrap_core::manifest::Manifest;
use bootstrap_core::{Orchestrator, Outcome};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use url::Url;

const EBOOT: &[u8] = b"\x7fELF primary package entry";

fn remote_files(with_dependencies: bool) -> HashMap<String, Vec<u8>> {
    let mut files = HashMap::new();
    files.insert("MLCL00001/eboot.bin".to_string(), EBOOT.to_vec());
    files.insert("MLCL00001/sce_sys/param.sfo".to_string(), b"PSF\0".to_vec());
    if with_dependencies {
        let big: Vec<u8> = (0u8..100).cycle().take(256 * 1024).collect();
        files.insert("taihen.skprx".to_string(), big);
        files.insert("henkaku.skprx".to_string(), b"henkaku kernel".to_vec());
        files.insert("henkaku.suprx".to_string(), b"henkaku user".to_vec());
    }
    files
}

fn layout(root: &Path) -> Manifest {
    let sys = root.join("ur0");
    let user = root.join("ux0");
    std::fs::create_dir_all(&sys).unwrap();
    std::fs::create_dir_all(&user).unwrap();
    Manifest::builtin_at(&sys, &user, crc32fast::hash(EBOOT))
}

fn fetcher() -> CurlFetcher {
    CurlFetcher::new(FetchOptions {
        connect_timeout: Duration::from_secs(5),
        timeout: Duration::from_secs(30),
        ..FetchOptions::default()
    })
}

fn run(manifest: &Manifest, base: &Url, max_attempts: u32) -> Outcome {
    let fetcher = fetcher();
    let installer = RemoteInstaller::new(&fetcher);
    let mut console = Console::sink();
    Orchestrator::new(manifest, base, &fetcher, &installer, &mut console).run(max_attempts)
}

#[test]
fn empty_target_is_fully_installed_in_one_pass() {
    let server = common::file_server::start(remote_files(true));
    let base = Url::parse(&server.base).unwrap();
    let root = tempdir().unwrap();
    let manifest = layout(root.path());

    assert_eq!(run(&manifest, &base, 3), Outcome::Success { attempts: 1 });

    for dep in &manifest.dependencies {
        assert_eq!(checksum::verify(&dep.dest, None), Verification::Verified);
    }
    assert_eq!(
        std::fs::read(&manifest.dependencies[0].dest).unwrap().len(),
        256 * 1024
    );
    assert_eq!(std::fs::read(&manifest.package.entry.dest).unwrap(), EBOOT);
    for cfg in &manifest.configs {
        assert_eq!(
            std::fs::read_to_string(&cfg.path).unwrap(),
            cfg.variant.render()
        );
    }
    let recovery = manifest
        .configs
        .iter()
        .find(|c| c.variant == ConfigVariant::Recovery)
        .unwrap();
    assert!(recovery.path.starts_with(root.path().join("ur0")));
}

#[test]
fn installed_target_makes_no_requests() {
    let server = common::file_server::start(remote_files(true));
    let base = Url::parse(&server.base).unwrap();
    let root = tempdir().unwrap();
    let manifest = layout(root.path());

    assert!(run(&manifest, &base, 3).is_success());
    let after_first = server.requests().len();
    assert_eq!(after_first, 5);

    assert_eq!(run(&manifest, &base, 3), Outcome::Success { attempts: 1 });
    assert_eq!(server.requests().len(), after_first);
}

#[test]
fn missing_dependencies_on_server_fail_after_budget() {
    let server = common::file_server::start(remote_files(false));
    let base = Url::parse(&server.base).unwrap();
    let root = tempdir().unwrap();
    let manifest = layout(root.path());

    assert_eq!(run(&manifest, &base, 3), Outcome::Failure { attempts: 3 });
    for name in ["taihen.skprx", "henkaku.skprx", "henkaku.suprx"] {
        assert_eq!(server.request_count(name), 3, "{name}");
    }
    for dep in &manifest.dependencies {
        assert!(!dep.dest.exists());
        assert!(!bootstrap_core::storage::temp_path(&dep.dest).exists());
    }
    // The package itself was installed on the first pass and left alone after.
    assert_eq!(server.request_count("MLCL00001/eboot.bin"), 1);
}

#[test]
fn not_found_is_classified() {
    let server = common::file_server::start(HashMap::new());
    let base = Url::parse(&server.base).unwrap();
    let root = tempdir().unwrap();
    let dest = root.path().join("tai").join("taihen.skprx");

    let err = fetcher().fetch(&base, "taihen.skprx", &dest).unwrap_err();
    assert_eq!(err.kind(), FetchFailureKind::NotFound);
    assert!(!dest.exists());
}

#[test]
fn unreachable_server_is_network_failure() {
    // Bind then drop to get a port with nothing listening.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base = Url::parse(&format!("http://127.0.0.1:{port}/pkg/")).unwrap();
    let root = tempdir().unwrap();
    let dest = root.path().join("henkaku.suprx");

    let err = fetcher().fetch(&base, "henkaku.suprx", &dest).unwrap_err();
    assert_eq!(err.kind(), FetchFailureKind::Network);
    assert!(!dest.exists());
}
