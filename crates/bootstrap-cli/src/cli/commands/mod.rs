//! CLI command handlers, one per file.

mod checksum;
mod completions;
mod run;
mod verify;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use run::run_install;
pub use verify::run_verify;
