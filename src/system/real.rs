//! Real system implementation using `std::env` and `std::fs`

use super::System;
use std::env::VarError;
use std::fs;
use std::io;
use std::path::Path;

/// Production implementation of System trait
///
/// Delegates directly to the standard library.
#[derive(Debug, Clone, Copy)]
pub struct RealSystem;

impl RealSystem {
    /// Create a new `RealSystem` instance
    #[must_use]
    pub const fn new() -> Self {
        return Self;
    }
}

impl Default for RealSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RealSystem {
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        std::env::var(key)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
