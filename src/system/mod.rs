//! System abstraction for environment and filesystem reads
//!
//! Configuration loading goes through this trait so that tests can run
//! against an in-memory environment instead of the real process state.

use std::env::VarError;
use std::io;
use std::path::Path;

pub mod mock;
pub mod real;

pub use mock::MockSystem;
pub use real::RealSystem;

/// Unified trait for the system interactions kbot performs at startup
///
/// # Implementations
/// - `RealSystem`: Production implementation using `std::env` and `std::fs`
/// - `MockSystem`: Test implementation using in-memory storage
pub trait System: Send + Sync {
    /// Get an environment variable
    fn env_var(&self, key: &str) -> Result<String, VarError>;

    /// Read entire file contents as a string
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if a path points to an existing file
    fn is_file(&self, path: &Path) -> bool;

    /// Get a non-empty environment variable, treating empty values as unset
    #[inline]
    fn non_empty_var(&self, key: &str) -> Option<String> {
        self.env_var(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}
