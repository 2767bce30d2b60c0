pub mod config;
pub mod logging;

pub mod checksum;
pub mod config_file;
pub mod console;
pub mod fetch;
pub mod installer;
pub mod manifest;
pub mod orchestrator;
pub mod retry;
pub mod storage;

pub use orchestrator::{InstallAttempt, Orchestrator, Outcome};
