//! Translation domain merged from many directories.
//!
//! # Precedence
//!
//! Sources are kept in registration order. When two sources translate the
//! same message, the one registered **first** wins. Merging walks the
//! sources from lowest precedence (last registered) to highest and lets
//! each overwrite what came before.
//!
//! ```text
//! add_path(A)  add_path(B)  add_path(C)
//!
//! resolve("da"):  C ──overlay──▶ B ──overlay──▶ A   =>  A's keys win
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing path | `add_path` on a nonexistent path | `SourceNotFound` |
//! | No sources | Nothing registered | `Translations::Null` |
//! | No source has the locale | e.g. the source language | `Translations::Null` |
//! | Some sources lack the locale | Packaging defect | `MissingCompiledCatalog` |
//! | Corrupt catalog | Unparseable `.mo` | `I18nError::Catalog` |

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info, warn};
use transmux_catalog::{CatalogLoader, LoadedCatalog, MoFileLoader, Translations};

use crate::config::{DEFAULT_DOMAIN, DomainConfig};
use crate::discovery::PluginDiscovery;
use crate::error::I18nError;
use crate::request::{RequestContext, current_request};
use crate::source::{SourceOrigin, TranslationSource};

/// A gettext domain assembled from an ordered list of translation
/// directories.
///
/// Register sources during application setup (`&mut self`), then share the
/// domain immutably between request handlers.
///
/// # Example
///
/// ```no_run
/// use std::rc::Rc;
/// use transmux::{MultiDirDomain, RequestState, with_request};
///
/// let mut domain = MultiDirDomain::new("messages");
/// domain.add_path("/srv/app/translations")?;
/// domain.add_path("/srv/app/plugins/search/translations")?;
///
/// let greeting = with_request(Rc::new(RequestState::new("da")), || {
///     domain.translations().map(|t| t.gettext("Hello").to_string())
/// })?;
/// # Ok::<(), transmux::I18nError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MultiDirDomain<L = MoFileLoader> {
    domain: String,
    sources: Vec<TranslationSource>,
    loader: L,
}

impl Default for MultiDirDomain {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}

impl MultiDirDomain {
    /// Empty domain reading `.mo` files from disk.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self::with_loader(domain, MoFileLoader)
    }

    /// Build a domain from configuration.
    ///
    /// Sources from the entrypoint group are registered first, then the
    /// explicit paths, so plugin catalogs take precedence.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::SourceNotFound`] for a configured path that does
    /// not exist.
    pub fn from_config(
        config: &DomainConfig,
        discovery: &dyn PluginDiscovery,
    ) -> Result<Self, I18nError> {
        let mut domain = Self::new(config.domain.as_str());
        if let Some(group) = &config.entrypoint {
            domain.add_entrypoint(discovery, group)?;
        }
        for path in &config.paths {
            domain.add_path(path)?;
        }
        Ok(domain)
    }

    /// Locale directories that hold a compiled catalog for this domain in
    /// at least one source.
    ///
    /// Reads the `<locale>/LC_MESSAGES/<domain>.mo` layout, so it is only
    /// offered on domains backed by [`MoFileLoader`]:
    ///
    /// ```compile_fail
    /// use transmux::MultiDirDomain;
    /// use transmux::catalog::MoFileLoader;
    ///
    /// let custom = MultiDirDomain::with_loader("messages", &MoFileLoader);
    /// let _ = custom.available_locales();
    /// ```
    #[must_use]
    pub fn available_locales(&self) -> BTreeSet<String> {
        let mut locales = BTreeSet::new();
        for source in &self.sources {
            let Ok(entries) = std::fs::read_dir(source.path()) else {
                continue;
            };
            for entry in entries.flatten() {
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                if MoFileLoader::catalog_path(source.path(), &name, &self.domain).is_file() {
                    locales.insert(name);
                }
            }
        }
        locales
    }
}

impl<L: CatalogLoader> MultiDirDomain<L> {
    /// Empty domain using a custom catalog loader.
    #[must_use]
    pub fn with_loader(domain: impl Into<String>, loader: L) -> Self {
        Self {
            domain: domain.into(),
            sources: Vec::new(),
            loader,
        }
    }

    /// The gettext domain name.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Registered sources, in registration order.
    #[must_use]
    pub fn sources(&self) -> &[TranslationSource] {
        &self.sources
    }

    /// Whether any source is registered.
    #[must_use]
    pub fn has_paths(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Register a translations directory. Relative paths are made absolute
    /// against the current directory at registration time.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::SourceNotFound`] if `path` does not exist.
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> Result<(), I18nError> {
        self.register(path.as_ref(), SourceOrigin::Explicit)
    }

    /// Register the `translations` directory of every plugin advertising
    /// `group`. Plugins without one are skipped.
    ///
    /// Returns the number of sources added.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::SourceNotFound`] if a reported directory
    /// disappeared before registration.
    pub fn add_entrypoint(
        &mut self,
        discovery: &dyn PluginDiscovery,
        group: &str,
    ) -> Result<usize, I18nError> {
        let mut added = 0;
        for plugin in discovery.plugins(group) {
            let Some(dir) = plugin.translations_dir else {
                debug!(group, plugin = %plugin.name, "plugin ships no translations");
                continue;
            };
            self.register(&dir, SourceOrigin::Plugin { name: plugin.name })?;
            added += 1;
        }
        Ok(added)
    }

    fn register(&mut self, path: &Path, origin: SourceOrigin) -> Result<(), I18nError> {
        let not_found = || I18nError::SourceNotFound {
            path: path.to_path_buf(),
        };
        if !matches!(path.try_exists(), Ok(true)) {
            return Err(not_found());
        }
        let path = std::path::absolute(path).map_err(|_| not_found())?;
        let source = TranslationSource::new(path, origin);
        info!(domain = %self.domain, source = %source, "registered translation source");
        self.sources.push(source);
        Ok(())
    }

    /// Merge every source's catalog for `locale`.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::MissingCompiledCatalog`] when some sources have
    /// compiled data for the locale and others do not, and
    /// [`I18nError::Catalog`] when a catalog cannot be read.
    pub fn resolve(&self, locale: &str) -> Result<Translations, I18nError> {
        if self.sources.is_empty() {
            return Ok(Translations::Null);
        }

        let mut loaded = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let catalog = self.loader.load(source.path(), locale, &self.domain)?;
            loaded.push((source, catalog));
        }

        if !loaded.iter().any(|(_, l)| l.is_compiled()) {
            debug!(domain = %self.domain, locale, "no source translates locale");
            return Ok(Translations::Null);
        }
        if let Some((source, _)) = loaded.iter().find(|(_, l)| !l.is_compiled()) {
            warn!(
                domain = %self.domain,
                locale,
                source = %source,
                "compiled catalog missing from source"
            );
            return Err(I18nError::MissingCompiledCatalog {
                path: source.path().to_path_buf(),
                locale: locale.to_string(),
                domain: self.domain.clone(),
            });
        }

        // Lowest precedence first; later overlays overwrite.
        let mut catalogs = loaded.into_iter().rev().filter_map(|(_, l)| match l {
            LoadedCatalog::Compiled { catalog, .. } => Some(catalog),
            LoadedCatalog::Missing => None,
        });
        let Some(mut merged) = catalogs.next() else {
            return Ok(Translations::Null);
        };
        for catalog in catalogs {
            merged.overlay(&catalog);
        }
        debug!(
            domain = %self.domain,
            locale,
            sources = self.sources.len(),
            entries = merged.len(),
            "merged catalogs"
        );
        Ok(Translations::compiled(merged))
    }

    /// Translations for `request`, merged at most once per request.
    ///
    /// Without a request, returns [`Translations::Null`].
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) failures; failures are not
    /// cached.
    pub fn translations_for(
        &self,
        request: Option<&dyn RequestContext>,
    ) -> Result<Translations, I18nError> {
        let Some(request) = request else {
            return Ok(Translations::Null);
        };
        let locale = request.locale();
        let cache = request.translations_cache();
        if let Some(hit) = cache.get(&self.domain, &locale) {
            debug!(domain = %self.domain, locale = %locale, "translations cache hit");
            return Ok(hit);
        }
        debug!(domain = %self.domain, locale = %locale, "translations cache miss");
        let merged = self.resolve(&locale)?;
        Ok(cache.insert(&self.domain, &locale, merged))
    }

    /// Translations for the request active on this thread.
    ///
    /// # Errors
    ///
    /// Same as [`translations_for`](Self::translations_for).
    pub fn translations(&self) -> Result<Translations, I18nError> {
        self.translations_for(current_request().as_deref())
    }
}
