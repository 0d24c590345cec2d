//! Mock system implementation for testing

use super::System;
use std::collections::HashMap;
use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// # Example
/// ```
/// use kbot::system::{mock::MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_env("KBOT_LOG_LEVEL", "debug").unwrap()
///     .with_file("/etc/kbot.yaml", b"log_level: warn").unwrap();
///
/// assert_eq!(system.env_var("KBOT_LOG_LEVEL").unwrap(), "debug");
/// assert!(system.is_file(Path::new("/etc/kbot.yaml")));
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    env_vars: HashMap<String, String>,
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MockSystem {
    /// Create a new `MockSystem` with an empty environment and filesystem
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                env_vars: HashMap::new(),
                files: HashMap::new(),
            })),
        }
    }

    /// Set an environment variable (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_env(self, key: &str, value: &str) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.env_vars.insert(key.to_owned(), value.to_owned());
        drop(state);
        Ok(self)
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state
            .files
            .insert(path.as_ref().to_path_buf(), contents.to_vec());
        drop(state);
        Ok(self)
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        let state = self.state.read().map_err(|_| VarError::NotPresent)?;
        state.env_vars.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self
            .state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        let bytes = state.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })?;
        let result = bytes.clone();
        drop(state);
        String::from_utf8(result)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        self.state
            .read()
            .map(|state| state.files.contains_key(path))
            .unwrap_or(false)
    }
}
