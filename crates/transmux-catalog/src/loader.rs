//! Loading one directory's catalog for a locale and domain.
//!
//! The result is tagged: a directory either has compiled data for the
//! locale ([`LoadedCatalog::Compiled`]) or it does not
//! ([`LoadedCatalog::Missing`]). Callers branch on the tag instead of
//! probing the catalog for no-op behavior.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::locale::candidates;
use crate::mo;

/// Outcome of loading a directory's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedCatalog {
    /// A compiled catalog was found and parsed.
    Compiled { catalog: Catalog, file: PathBuf },
    /// No compiled catalog exists for any candidate of the locale.
    Missing,
}

impl LoadedCatalog {
    /// Whether compiled data was found.
    #[must_use]
    pub const fn is_compiled(&self) -> bool {
        matches!(self, Self::Compiled { .. })
    }
}

/// Primitive that loads a catalog from a translations directory.
pub trait CatalogLoader {
    /// Load `domain` for `locale` from `dir`.
    ///
    /// # Errors
    ///
    /// Fails when a catalog exists but cannot be read or parsed, or when
    /// `locale` is not a valid identifier. Absence is not an error.
    fn load(&self, dir: &Path, locale: &str, domain: &str) -> Result<LoadedCatalog, CatalogError>;
}

impl<L: CatalogLoader + ?Sized> CatalogLoader for &L {
    fn load(&self, dir: &Path, locale: &str, domain: &str) -> Result<LoadedCatalog, CatalogError> {
        (**self).load(dir, locale, domain)
    }
}

/// Filesystem loader for `<dir>/<locale>/LC_MESSAGES/<domain>.mo`.
///
/// Locale candidates are tried most specific first; the first existing file
/// wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoFileLoader;

impl MoFileLoader {
    /// Path of the compiled catalog for one locale directory name.
    #[must_use]
    pub fn catalog_path(dir: &Path, locale_dir: &str, domain: &str) -> PathBuf {
        dir.join(locale_dir)
            .join("LC_MESSAGES")
            .join(format!("{domain}.mo"))
    }
}

impl CatalogLoader for MoFileLoader {
    fn load(&self, dir: &Path, locale: &str, domain: &str) -> Result<LoadedCatalog, CatalogError> {
        for candidate in candidates(locale)? {
            let file = Self::catalog_path(dir, &candidate, domain);
            let data = match std::fs::read(&file) {
                Ok(data) => data,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(CatalogError::Io { path: file, source }),
            };
            let catalog = mo::parse(&data, &file)?;
            debug!(
                file = %file.display(),
                entries = catalog.len(),
                "loaded compiled catalog"
            );
            return Ok(LoadedCatalog::Compiled { catalog, file });
        }
        debug!(dir = %dir.display(), locale, domain, "no compiled catalog");
        Ok(LoadedCatalog::Missing)
    }
}
