//! Errors from source registration and catalog merging.

use std::fmt;
use std::path::PathBuf;

use transmux_catalog::CatalogError;

/// Errors from multi-directory translation domains.
///
/// | Variant | Raised by | Meaning |
/// |---------|-----------|---------|
/// | `SourceNotFound` | registration | A declared translations directory does not exist |
/// | `MissingCompiledCatalog` | resolution | One source lacks a compiled catalog another source has |
/// | `Catalog` | resolution | A compiled catalog exists but is unreadable or corrupt |
#[derive(Debug)]
pub enum I18nError {
    /// A translation source path does not exist.
    SourceNotFound { path: PathBuf },
    /// A source has no compiled catalog for a locale that other sources
    /// translate.
    MissingCompiledCatalog {
        path: PathBuf,
        locale: String,
        domain: String,
    },
    /// Loading a compiled catalog failed.
    Catalog(CatalogError),
}

impl fmt::Display for I18nError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotFound { path } => {
                write!(f, "translations path does not exist: {}", path.display())
            }
            Self::MissingCompiledCatalog {
                path,
                locale,
                domain,
            } => write!(
                f,
                "compiled translations seem to be missing in {} (locale '{locale}', domain '{domain}')",
                path.display()
            ),
            Self::Catalog(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for I18nError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CatalogError> for I18nError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}
