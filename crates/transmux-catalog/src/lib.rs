#![forbid(unsafe_code)]

//! Compiled translation catalogs for transmux.
//!
//! Reads GNU gettext `.mo` files, evaluates `Plural-Forms` rules, and
//! exposes the tagged [`Translations`] value (a real catalog or the no-op
//! stand-in) that the merging layer hands to request handlers.

pub mod catalog;
pub mod error;
pub mod loader;
pub mod locale;
pub mod mo;
pub mod plural;

pub use catalog::{Catalog, Message, MessageKey, Translations};
pub use error::CatalogError;
pub use loader::{CatalogLoader, LoadedCatalog, MoFileLoader};
pub use plural::PluralRule;
