//! Errors raised while reading compiled catalogs.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors from catalog loading and parsing.
#[derive(Debug)]
pub enum CatalogError {
    /// A catalog file exists but could not be read.
    Io { path: PathBuf, source: io::Error },
    /// A catalog file is truncated, has a bad magic number, or points
    /// outside its own bounds.
    InvalidCatalog { path: PathBuf, reason: String },
    /// The catalog header declares a charset other than UTF-8.
    UnsupportedCharset { path: PathBuf, charset: String },
    /// The `Plural-Forms` header could not be parsed.
    InvalidPluralForms { expression: String, reason: String },
    /// A locale string was empty or could escape the catalog directory.
    InvalidLocale(String),
}

impl CatalogError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read catalog {}: {source}", path.display())
            }
            Self::InvalidCatalog { path, reason } => {
                write!(f, "invalid catalog {}: {reason}", path.display())
            }
            Self::UnsupportedCharset { path, charset } => write!(
                f,
                "catalog {} uses unsupported charset '{charset}'",
                path.display()
            ),
            Self::InvalidPluralForms { expression, reason } => {
                write!(f, "invalid plural forms '{expression}': {reason}")
            }
            Self::InvalidLocale(l) => write!(f, "invalid locale: '{l}'"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
