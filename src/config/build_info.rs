//! Build metadata injected when the binary is compiled
//!
//! The release pipeline exports `KBOT_VERSION`, `KBOT_TARGETOS` and
//! `KBOT_TARGETARCH` before invoking cargo; they are embedded with
//! `option_env!`. A non-empty `KBOT_VERSION` in the runtime environment
//! takes precedence over the embedded value.

use crate::config::ENV_VERSION;
use crate::system::System;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Version reported when nothing was injected at build time
pub const VERSION_PLACEHOLDER: &str = "dev";

const EMBEDDED_VERSION: Option<&str> = option_env!("KBOT_VERSION");
const EMBEDDED_TARGETOS: Option<&str> = option_env!("KBOT_TARGETOS");
const EMBEDDED_TARGETARCH: Option<&str> = option_env!("KBOT_TARGETARCH");

/// `<tag>-<shortRevision>[-dev]`
static VERSION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?P<tag>.+?)-(?P<rev>[0-9a-f]{7,40})(?P<dev>-dev)?$").ok());

/// Immutable build metadata, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct BuildInfo {
    version: Option<String>,
    target_os: String,
    target_arch: String,
}

/// Components of a `<tag>-<shortRevision>[-dev]` version string
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct VersionParts {
    pub tag: String,
    pub revision: String,
    pub dev: bool,
}

impl VersionParts {
    /// Split a version string into tag, revision and dev marker
    ///
    /// Returns `None` when the string does not follow the release format.
    #[must_use]
    #[inline]
    pub fn parse(version: &str) -> Option<Self> {
        let captures = VERSION_PATTERN.as_ref()?.captures(version)?;

        Some(Self {
            tag: captures.name("tag")?.as_str().to_owned(),
            revision: captures.name("rev")?.as_str().to_owned(),
            dev: captures.name("dev").is_some(),
        })
    }
}

impl BuildInfo {
    /// Create build metadata from explicit values
    ///
    /// Empty or whitespace-only versions count as not injected.
    #[must_use]
    #[inline]
    pub fn new(version: Option<&str>, target_os: &str, target_arch: &str) -> Self {
        Self {
            version: version
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned),
            target_os: target_os.to_owned(),
            target_arch: target_arch.to_owned(),
        }
    }

    /// Build metadata embedded at compile time
    #[must_use]
    #[inline]
    pub fn embedded() -> Self {
        Self::new(
            EMBEDDED_VERSION,
            EMBEDDED_TARGETOS.unwrap_or(std::env::consts::OS),
            EMBEDDED_TARGETARCH.unwrap_or(std::env::consts::ARCH),
        )
    }

    /// Embedded build metadata with the runtime `KBOT_VERSION` override applied
    #[must_use]
    #[inline]
    pub fn load(system: &dyn System) -> Self {
        let mut info = Self::embedded();
        if let Some(version) = system.non_empty_var(ENV_VERSION) {
            debug!("Version overridden from {ENV_VERSION}: {version}");
            info.version = Some(version.trim().to_owned());
        }
        info
    }

    /// The injected version, or [`VERSION_PLACEHOLDER`] when none was set
    #[must_use]
    #[inline]
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(VERSION_PLACEHOLDER)
    }

    /// Whether a version was injected at all
    #[must_use]
    #[inline]
    pub const fn is_injected(&self) -> bool {
        self.version.is_some()
    }

    /// Tag, revision and dev marker, when the version follows the release format
    #[must_use]
    #[inline]
    pub fn parsed(&self) -> Option<VersionParts> {
        self.version.as_deref().and_then(VersionParts::parse)
    }

    /// Development builds: no injected version, or a `-dev` suffix
    #[must_use]
    #[inline]
    pub fn is_dev(&self) -> bool {
        match self.version.as_deref() {
            None => true,
            Some(version) => version.ends_with("-dev"),
        }
    }

    #[must_use]
    #[inline]
    pub fn target_os(&self) -> &str {
        &self.target_os
    }

    #[must_use]
    #[inline]
    pub fn target_arch(&self) -> &str {
        &self.target_arch
    }

    /// Target pair formatted as `os/arch`
    #[must_use]
    #[inline]
    pub fn target(&self) -> String {
        format!("{}/{}", self.target_os, self.target_arch)
    }
}
