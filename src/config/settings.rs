//! Runtime settings loaded from an optional YAML file and the environment

use crate::config::{ENV_CONFIG, ENV_LOG_LEVEL};
use crate::error::KbotError;
use crate::system::System;
use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Log verbosity accepted by `log_level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    #[must_use]
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = KbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "off" => Ok(Self::Off),
            _ => Err(KbotError::configuration(format!(
                "Invalid log level '{s}'. Must be one of: trace, debug, info, warn, error, off"
            ))),
        }
    }
}

/// Shape of the optional settings file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default)]
    log_level: Option<String>,
}

/// Ambient runtime settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Settings {
    pub log_level: LogLevel,
}

impl Settings {
    /// Resolve settings: defaults, then `KBOT_CONFIG` file, then `KBOT_LOG_LEVEL`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `KBOT_CONFIG` names a file that does not exist or cannot be parsed
    /// - A log level is not one of the accepted values
    #[inline]
    pub fn load(system: &dyn System) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(path) = system.non_empty_var(ENV_CONFIG) {
            let file = load_settings_file(system, &path)?;
            if let Some(level) = file.log_level {
                settings.log_level = level
                    .parse()
                    .with_context(|| format!("Invalid settings in {path}"))?;
            }
            debug!("Loaded settings from {path}");
        }

        if let Some(level) = system.non_empty_var(ENV_LOG_LEVEL) {
            settings.log_level = level.parse()?;
            debug!("Log level overridden from {ENV_LOG_LEVEL}");
        }

        Ok(settings)
    }
}

/// Read and parse the YAML settings file
fn load_settings_file(system: &dyn System, path: &str) -> Result<SettingsFile> {
    let path_obj = Path::new(path);

    if !system.is_file(path_obj) {
        return Err(KbotError::configuration(format!(
            "Settings file not found: {path}\n\
            Unset {ENV_CONFIG} or point it at an existing YAML file"
        ))
        .into());
    }

    let content = system.read_to_string(path_obj).map_err(|e| {
        KbotError::configuration(format!("Failed to read settings file {path}: {e}"))
    })?;

    if content.trim().is_empty() {
        return Ok(SettingsFile::default());
    }

    serde_yaml::from_str(&content).map_err(|e| {
        KbotError::configuration(format!("Failed to parse YAML settings in {path}: {e}")).into()
    })
}
