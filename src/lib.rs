//! `kbot` - command-execution core of a Kubernetes-oriented operational bot
//!
//! This library provides a typed command registry, a dispatcher that binds
//! command-line flags to handlers, and the build metadata injected when the
//! binary is compiled.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod system;

use anyhow::Result;
use cli::Dispatcher;
use config::Config;
use std::io::Write;

/// Build the dispatcher for the built-in command tree
///
/// # Errors
///
/// Returns an error if the command tree cannot be built
#[inline]
pub fn build_dispatcher(config: Config) -> Result<Dispatcher> {
    let registry = commands::build_registry()?;
    Ok(Dispatcher::new(registry, config))
}

/// Main entry point for the kbot library
///
/// `args` excludes the program name. Command output is written to `out`.
///
/// # Errors
///
/// Returns an error if resolution, flag parsing or the command itself fails
#[inline]
pub fn run<S: AsRef<str>>(args: &[S], config: Config, out: &mut dyn Write) -> Result<()> {
    let dispatcher = build_dispatcher(config)?;
    dispatcher.dispatch(args, out)?;
    out.flush()?;
    Ok(())
}
