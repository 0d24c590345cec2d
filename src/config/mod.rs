//! Configuration management module
//!
//! Everything the process needs to know about itself is resolved once at
//! startup into an immutable [`Config`] that is passed explicitly to the
//! dispatcher and every handler.

pub mod build_info;
pub mod settings;

pub use build_info::{BuildInfo, VERSION_PLACEHOLDER, VersionParts};
pub use settings::{LogLevel, Settings};

use crate::system::System;
use anyhow::Result;

/// Runtime override for the embedded version string
pub const ENV_VERSION: &str = "KBOT_VERSION";

/// Path of the optional YAML settings file
pub const ENV_CONFIG: &str = "KBOT_CONFIG";

/// Log level override
pub const ENV_LOG_LEVEL: &str = "KBOT_LOG_LEVEL";

/// Process-wide immutable configuration
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    pub build: BuildInfo,
    pub settings: Settings,
}

impl Config {
    #[must_use]
    #[inline]
    pub const fn new(build: BuildInfo, settings: Settings) -> Self {
        Self { build, settings }
    }

    /// Load configuration from the embedded build metadata and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be loaded
    #[inline]
    pub fn load(system: &dyn System) -> Result<Self> {
        Ok(Self {
            build: BuildInfo::load(system),
            settings: Settings::load(system)?,
        })
    }
}
