//! Declarative table of everything the installer manages.
//!
//! The orchestrator walks these records generically; adding or removing a
//! managed file is a change here, not in the control flow.

use crate::config_file::ConfigVariant;
use std::path::{Path, PathBuf};
use url::Url;

/// Mount point of the system storage root (plugins, recovery config).
pub const SYSTEM_ROOT: &str = "/mnt/ur0";
/// Mount point of the user storage root (apps, primary config).
pub const USER_ROOT: &str = "/mnt/ux0";

/// Remote base location, fixed at build time.
pub const BASE_URL: &str = match option_env!("BOOTSTRAP_BASE_URL") {
    Some(url) => url,
    None => "https://bootstrap.example.net/pkg/",
};

/// Expected CRC-32 of the package entry file, fixed at build time (hex).
pub const PACKAGE_CRC32_HEX: &str = match option_env!("BOOTSTRAP_PACKAGE_CRC32") {
    Some(crc) => crc,
    None => "4d9b2c6e",
};

/// A file that must exist at `dest`, optionally with an exact CRC-32.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    /// Path relative to the base URL.
    pub remote_path: String,
    pub dest: PathBuf,
    pub expected_crc: Option<u32>,
}

impl Artifact {
    pub fn new(name: &str, remote_path: &str, dest: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            remote_path: remote_path.to_string(),
            dest,
            expected_crc: None,
        }
    }

    pub fn with_crc(mut self, crc: u32) -> Self {
        self.expected_crc = Some(crc);
        self
    }
}

/// The primary installed package. Only `entry` is verified; `files` are what
/// an installer lays down (the entry included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub install_dir: PathBuf,
    pub entry: Artifact,
    pub files: Vec<Artifact>,
}

/// One config file to keep present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTarget {
    pub variant: ConfigVariant,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub dependencies: Vec<Artifact>,
    pub package: Package,
    pub configs: Vec<ConfigTarget>,
    /// Storage roots that must already exist before anything is installed.
    pub roots: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("storage root {} is not available", .0.display())]
    MissingRoot(PathBuf),
    #[error("invalid build-time package checksum {0:?}")]
    BadChecksum(String),
    #[error("invalid build-time base URL {url:?}: {source}")]
    BadBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// The built-in base URL, parsed. Artifact paths are joined onto it, so a
/// missing trailing `/` is added.
pub fn base_url() -> Result<Url, PreflightError> {
    let raw = if BASE_URL.ends_with('/') {
        BASE_URL.to_string()
    } else {
        format!("{BASE_URL}/")
    };
    Url::parse(&raw).map_err(|source| PreflightError::BadBaseUrl { url: raw, source })
}

/// Parse a CRC-32 written as hex, with or without a `0x` prefix.
pub fn parse_crc32(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).ok()
}

impl Manifest {
    /// The built-in manifest at the fixed mount points.
    pub fn builtin() -> Result<Self, PreflightError> {
        let crc = parse_crc32(PACKAGE_CRC32_HEX)
            .ok_or_else(|| PreflightError::BadChecksum(PACKAGE_CRC32_HEX.to_string()))?;
        Ok(Self::builtin_at(Path::new(SYSTEM_ROOT), Path::new(USER_ROOT), crc))
    }

    /// The built-in layout rooted at `system_root` / `user_root`.
    pub fn builtin_at(system_root: &Path, user_root: &Path, package_crc: u32) -> Self {
        let tai = system_root.join("tai");
        let app = user_root.join("app").join("MLCL00001");

        let entry = Artifact::new("eboot.bin", "MLCL00001/eboot.bin", app.join("eboot.bin"))
            .with_crc(package_crc);
        let param = Artifact::new(
            "param.sfo",
            "MLCL00001/sce_sys/param.sfo",
            app.join("sce_sys").join("param.sfo"),
        );

        Self {
            dependencies: vec![
                Artifact::new("taihen.skprx", "taihen.skprx", tai.join("taihen.skprx")),
                Artifact::new("henkaku.skprx", "henkaku.skprx", tai.join("henkaku.skprx")),
                Artifact::new("henkaku.suprx", "henkaku.suprx", tai.join("henkaku.suprx")),
            ],
            package: Package {
                name: "MLCL00001".to_string(),
                install_dir: app,
                files: vec![entry.clone(), param],
                entry,
            },
            configs: vec![
                ConfigTarget {
                    variant: ConfigVariant::Primary,
                    path: user_root.join("tai").join("config.txt"),
                },
                ConfigTarget {
                    variant: ConfigVariant::Recovery,
                    path: tai.join("config.txt"),
                },
            ],
            roots: vec![system_root.to_path_buf(), user_root.to_path_buf()],
        }
    }

    /// Startup precondition: every storage root is a mounted directory.
    pub fn preflight(&self) -> Result<(), PreflightError> {
        match self.roots.iter().find(|r| !r.is_dir()) {
            Some(missing) => Err(PreflightError::MissingRoot(missing.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_crc32_accepts_prefixes() {
        assert_eq!(parse_crc32("4d9b2c6e"), Some(0x4d9b_2c6e));
        assert_eq!(parse_crc32("0xCBF43926"), Some(0xcbf4_3926));
        assert_eq!(parse_crc32(" 0X1 "), Some(1));
        assert_eq!(parse_crc32("xyz"), None);
        assert_eq!(parse_crc32("123456789"), None);
    }

    #[test]
    fn builtin_layout() {
        let m = Manifest::builtin_at(Path::new("/s"), Path::new("/u"), 7);
        let deps: Vec<_> = m.dependencies.iter().map(|a| a.dest.clone()).collect();
        assert_eq!(
            deps,
            vec![
                PathBuf::from("/s/tai/taihen.skprx"),
                PathBuf::from("/s/tai/henkaku.skprx"),
                PathBuf::from("/s/tai/henkaku.suprx"),
            ]
        );
        assert!(m.dependencies.iter().all(|a| a.expected_crc.is_none()));
        assert_eq!(m.package.entry.dest, PathBuf::from("/u/app/MLCL00001/eboot.bin"));
        assert_eq!(m.package.entry.expected_crc, Some(7));
        assert!(m.package.files.contains(&m.package.entry));
        assert_eq!(m.configs[0].path, PathBuf::from("/u/tai/config.txt"));
        assert_eq!(m.configs[0].variant, ConfigVariant::Primary);
        assert_eq!(m.configs[1].path, PathBuf::from("/s/tai/config.txt"));
        assert_eq!(m.configs[1].variant, ConfigVariant::Recovery);
    }

    #[test]
    fn builtin_checksum_parses() {
        assert!(parse_crc32(PACKAGE_CRC32_HEX).is_some());
        assert!(base_url().unwrap().path().ends_with('/'));
    }

    #[test]
    fn preflight_requires_roots() {
        let sys = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        let m = Manifest::builtin_at(sys.path(), user.path(), 0);
        assert!(m.preflight().is_ok());

        let gone = user.path().join("unmounted");
        let m = Manifest::builtin_at(sys.path(), &gone, 0);
        match m.preflight() {
            Err(PreflightError::MissingRoot(p)) => assert_eq!(p, gone),
            other => panic!("expected MissingRoot, got {:?}", other),
        }
    }
}
