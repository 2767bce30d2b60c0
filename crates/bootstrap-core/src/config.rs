use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::{default_user_agent, FetchOptions};
use crate::retry::RetryPolicy;

/// Pass budget and spacing (`[retry]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of verify-and-repair passes (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds between failed passes (0 = retry immediately).
    pub base_delay_secs: f64,
    /// Maximum delay in seconds between passes.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.0,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    /// Non-positive or NaN base delays mean no delay; anything larger than
    /// `max_delay_secs` (including `inf`) is clamped to it.
    pub fn policy(&self) -> RetryPolicy {
        let max_delay = Duration::from_secs(self.max_delay_secs);
        let base_delay = if self.base_delay_secs > 0.0 {
            Duration::try_from_secs_f64(self.base_delay_secs)
                .map_or(max_delay, |d| d.min(max_delay))
        } else {
            Duration::ZERO
        };
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay,
            max_delay,
        }
    }
}

/// HTTP transfer settings (`[fetch]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    /// Upper bound for a whole transfer.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 600,
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn options(&self) -> FetchOptions {
        FetchOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Global configuration loaded from `~/.config/bootstrap/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Seconds to leave the final message on screen before exiting.
    #[serde(default = "default_exit_pause")]
    pub exit_pause_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_exit_pause() -> u64 {
    3
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            exit_pause_secs: default_exit_pause(),
            retry: RetryConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bootstrap")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BootstrapConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<BootstrapConfig> {
    if !path.exists() {
        let default_cfg = BootstrapConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BootstrapConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
