//! Built-in commands
//!
//! Populates the registry at startup. The tree is immutable once
//! [`build_registry`] returns.

pub mod help;
pub mod version;

use crate::cli::{Command, Registry};
use crate::error::KbotError;

/// Name of the root command and of the binary
pub const APP_NAME: &str = "kbot";

const APP_ABOUT: &str = "kbot - a Kubernetes-oriented operational bot";

/// Build the complete command tree
///
/// # Errors
///
/// Returns an error if a built-in command definition is invalid or registered twice
#[inline]
pub fn build_registry() -> Result<Registry, KbotError> {
    let mut registry = Registry::new(Command::new(APP_NAME, APP_ABOUT))?;
    let root = registry.root();

    registry.register(root, version::command())?;
    registry.register(root, help::command())?;

    Ok(registry)
}
