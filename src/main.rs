//! # `kbot`
//!
//! Command-line entry point. Loads the process configuration, initialises
//! logging, and dispatches the argument vector to the command tree.
//!
//! ```sh
//! kbot                 # print help
//! kbot version -o json # build metadata as JSON
//! kbot help version    # help for a single command
//! ```

use anyhow::Result;
use kbot::config::{Config, LogLevel};
use kbot::error::{KbotError, exit_code_of};
use kbot::system::RealSystem;
use std::io::{self, Write as _};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let system = RealSystem::new();

    let config = match Config::load(&system) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(exit_code_of(&err));
        }
    };

    init_tracing(config.settings.log_level);
    debug!(
        "kbot {} ({})",
        config.build.version(),
        config.build.target()
    );

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let mut stdout = io::stdout().lock();
    let result = kbot::run(&args, config, &mut stdout);
    stdout.flush()?;
    drop(stdout);

    match result {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            debug!("Command failed: {err:?}");
            eprintln!("Error: {err:#}");
            if err
                .downcast_ref::<KbotError>()
                .is_some_and(KbotError::is_usage)
            {
                eprintln!("Run 'kbot help' for usage.");
            }
            std::process::exit(exit_code_of(&err));
        }
    }
}

/// `RUST_LOG` wins over the configured level; logs go to stderr so stdout
/// only carries command output
fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}
