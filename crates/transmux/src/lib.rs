#![forbid(unsafe_code)]

//! Multi-directory gettext domains for plugin-based web applications.
//!
//! # Role
//! Every installed plugin ships its own compiled catalogs. `transmux`
//! registers those directories once at startup, merges their catalogs per
//! locale on demand, and memoizes the merged result for the lifetime of a
//! single request.
//!
//! # Primary responsibilities
//! - **[`MultiDirDomain`]**: ordered translation sources, overlay merge,
//!   packaging-defect detection.
//! - **[`request`]**: request-scoped cache and the ambient per-thread
//!   request stack.
//! - **[`discovery`]**: the seam to the host's plugin registry.
//! - **[`DomainConfig`]**: code, file, or environment configuration.
//!
//! Catalog parsing and lookups live in [`transmux_catalog`], re-exported
//! here as [`catalog`].

pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod request;
pub mod source;

pub use transmux_catalog as catalog;
pub use transmux_catalog::Translations;

pub use config::DomainConfig;
pub use discovery::{DiscoveredPlugin, PluginDiscovery, StaticDiscovery};
pub use domain::MultiDirDomain;
pub use error::I18nError;
pub use request::{
    RequestContext, RequestGuard, RequestState, TranslationsCache, current_request, enter_request,
    has_active_request, with_request,
};
pub use source::{SourceOrigin, TranslationSource};
