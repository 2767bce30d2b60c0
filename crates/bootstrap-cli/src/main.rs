use bootstrap_core::logging;

mod cli;

use crate::cli::CliCommand;

/// Exit status for startup failures (unusable config, storage not mounted).
const EXIT_PRECONDITION: i32 = 2;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    match CliCommand::run_from_args().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("bootstrap error: {:#}", err);
            std::process::exit(EXIT_PRECONDITION);
        }
    }
}
