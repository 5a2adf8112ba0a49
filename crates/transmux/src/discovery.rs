//! Plugin discovery seam.
//!
//! The host application owns plugin loading. This crate only asks it which
//! installed plugins advertise a discovery group and where their
//! `translations` resource directory lives.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the resource directory a plugin ships its catalogs in.
pub const TRANSLATIONS_DIR: &str = "translations";

/// One installed plugin, as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPlugin {
    /// Plugin (package) name.
    pub name: String,
    /// Resolved `translations` directory, if the plugin ships one.
    pub translations_dir: Option<PathBuf>,
}

impl DiscoveredPlugin {
    /// Describe a plugin installed at `package_dir`.
    ///
    /// `translations_dir` is set only when `<package_dir>/translations` is
    /// an existing directory.
    #[must_use]
    pub fn from_package_dir(name: impl Into<String>, package_dir: &Path) -> Self {
        let dir = package_dir.join(TRANSLATIONS_DIR);
        Self {
            name: name.into(),
            translations_dir: dir.is_dir().then_some(dir),
        }
    }
}

/// Source of installed plugins keyed by discovery group.
pub trait PluginDiscovery {
    /// Plugins advertising `group`, in the host's discovery order.
    fn plugins(&self, group: &str) -> Vec<DiscoveredPlugin>;
}

impl<D: PluginDiscovery + ?Sized> PluginDiscovery for &D {
    fn plugins(&self, group: &str) -> Vec<DiscoveredPlugin> {
        (**self).plugins(group)
    }
}

/// In-memory plugin index populated by the host at startup.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use transmux::discovery::{PluginDiscovery, StaticDiscovery};
///
/// let discovery = StaticDiscovery::new()
///     .with_package("app.translations", "app_records", Path::new("/srv/app/records"))
///     .with_package("app.translations", "app_search", Path::new("/srv/app/search"));
/// assert_eq!(discovery.plugins("app.translations").len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    groups: HashMap<String, Vec<(String, PathBuf)>>,
}

impl StaticDiscovery {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise the package at `package_dir` under `group`.
    pub fn register(
        &mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        package_dir: impl Into<PathBuf>,
    ) {
        self.groups
            .entry(group.into())
            .or_default()
            .push((name.into(), package_dir.into()));
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_package(
        mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        package_dir: impl Into<PathBuf>,
    ) -> Self {
        self.register(group, name, package_dir);
        self
    }
}

impl PluginDiscovery for StaticDiscovery {
    fn plugins(&self, group: &str) -> Vec<DiscoveredPlugin> {
        self.groups
            .get(group)
            .map(|packages| {
                packages
                    .iter()
                    .map(|(name, dir)| DiscoveredPlugin::from_package_dir(name.as_str(), dir))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translations_dir_only_when_present() {
        let tmp = tempfile::tempdir().unwrap();
        let with = tmp.path().join("with");
        let without = tmp.path().join("without");
        std::fs::create_dir_all(with.join(TRANSLATIONS_DIR)).unwrap();
        std::fs::create_dir_all(&without).unwrap();

        let a = DiscoveredPlugin::from_package_dir("with", &with);
        let b = DiscoveredPlugin::from_package_dir("without", &without);
        assert_eq!(a.translations_dir, Some(with.join(TRANSLATIONS_DIR)));
        assert_eq!(b.translations_dir, None);
    }

    #[test]
    fn translations_file_is_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(TRANSLATIONS_DIR), b"").unwrap();
        let p = DiscoveredPlugin::from_package_dir("odd", tmp.path());
        assert_eq!(p.translations_dir, None);
    }

    #[test]
    fn static_discovery_preserves_order_per_group() {
        let discovery = StaticDiscovery::new()
            .with_package("g", "first", "/nonexistent/first")
            .with_package("other", "x", "/nonexistent/x")
            .with_package("g", "second", "/nonexistent/second");

        let names: Vec<String> = discovery
            .plugins("g")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(discovery.plugins("unknown").is_empty());
    }
}
