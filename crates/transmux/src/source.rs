//! Registered translation sources.

use std::fmt;
use std::path::{Path, PathBuf};

/// How a source was registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceOrigin {
    /// Registered by an explicit path.
    Explicit,
    /// Registered from a discovered plugin.
    Plugin { name: String },
}

/// A directory holding compiled catalogs as
/// `<locale>/LC_MESSAGES/<domain>.mo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationSource {
    path: PathBuf,
    origin: SourceOrigin,
}

impl TranslationSource {
    pub(crate) fn new(path: PathBuf, origin: SourceOrigin) -> Self {
        Self { path, origin }
    }

    /// The translations directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How the source was registered.
    #[must_use]
    pub const fn origin(&self) -> &SourceOrigin {
        &self.origin
    }
}

impl fmt::Display for TranslationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            SourceOrigin::Explicit => write!(f, "{}", self.path.display()),
            SourceOrigin::Plugin { name } => write!(f, "{} (plugin {name})", self.path.display()),
        }
    }
}
