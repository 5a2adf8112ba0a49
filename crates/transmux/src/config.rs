//! Domain configuration.
//!
//! Hosts build a [`DomainConfig`] in code, deserialize it from their own
//! configuration file, or read it from the environment:
//!
//! | Variable | Field | Format |
//! |----------|-------|--------|
//! | `TRANSMUX_DOMAIN` | `domain` | gettext domain name |
//! | `TRANSMUX_PATHS` | `paths` | platform path list (`:` on Unix, `;` on Windows) |
//! | `TRANSMUX_ENTRYPOINT` | `entrypoint` | plugin discovery group |

use std::ffi::OsString;
use std::path::PathBuf;

use serde::Deserialize;

/// Default gettext domain.
pub const DEFAULT_DOMAIN: &str = "messages";

/// Environment variable naming the domain.
pub const ENV_DOMAIN: &str = "TRANSMUX_DOMAIN";
/// Environment variable listing explicit source paths.
pub const ENV_PATHS: &str = "TRANSMUX_PATHS";
/// Environment variable naming the plugin discovery group.
pub const ENV_ENTRYPOINT: &str = "TRANSMUX_ENTRYPOINT";

/// How to assemble one multi-directory domain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomainConfig {
    /// gettext domain (catalog file stem).
    pub domain: String,
    /// Explicit translation directories, highest precedence first.
    pub paths: Vec<PathBuf>,
    /// Plugin discovery group whose `translations` directories are
    /// registered before `paths`.
    pub entrypoint: Option<String>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            paths: Vec::new(),
            entrypoint: None,
        }
    }
}

impl DomainConfig {
    /// Set the domain name.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Append an explicit source path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Set the plugin discovery group.
    #[must_use]
    pub fn with_entrypoint(mut self, group: impl Into<String>) -> Self {
        self.entrypoint = Some(group.into());
        self
    }

    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var_os(key))
    }

    /// Read the configuration through `get_env`.
    ///
    /// Unset or blank variables keep their defaults.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let text = |key: &str| {
            get_env(key)
                .map(|v| v.to_string_lossy().trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        if let Some(domain) = text(ENV_DOMAIN) {
            config.domain = domain;
        }
        if let Some(raw) = get_env(ENV_PATHS) {
            config.paths = std::env::split_paths(&raw)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        config.entrypoint = text(ENV_ENTRYPOINT);
        config
    }
}
