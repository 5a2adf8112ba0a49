//! Request-scoped translation caching.
//!
//! Each in-flight request owns a [`TranslationsCache`]. The first lookup for
//! a (domain, locale) pair in a request merges catalogs; every later lookup
//! in the same request reuses the result. The cache dies with the request.
//!
//! Hosts either pass a [`RequestContext`] explicitly or make it ambient for
//! the current thread with [`enter_request`] / [`with_request`].
//!
//! # Invariants
//!
//! 1. **Thread isolation**: the ambient request stack is thread-local; a
//!    request entered on one thread is invisible on another.
//! 2. **Stack ordering**: nested requests shadow outer ones until their
//!    guard drops.
//! 3. **Cleanup guarantee**: a dropped guard restores the stack to its depth
//!    before the guard's request was entered, including during unwinding.
//!    Dropping an outer guard first also leaves every request nested in it.
//! 4. **Monotonic cache**: an entry goes from absent to present once and is
//!    never replaced for the lifetime of the request.
//!
//! # Failure Modes
//!
//! | Mode | Condition | Behavior |
//! |------|-----------|----------|
//! | Guard leaked | Guard forgotten instead of dropped | Request stays current until thread exit |
//! | No request | Lookup outside any request | Caller receives `Translations::Null` |

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;

use transmux_catalog::Translations;

/// Per-request memo of merged translations, keyed by domain and locale.
#[derive(Debug, Default)]
pub struct TranslationsCache {
    entries: RefCell<HashMap<(String, String), Translations>>,
}

impl TranslationsCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached translations for `domain` and `locale`.
    #[must_use]
    pub fn get(&self, domain: &str, locale: &str) -> Option<Translations> {
        self.entries
            .borrow()
            .get(&(domain.to_string(), locale.to_string()))
            .cloned()
    }

    /// Store translations unless an entry already exists; returns the entry
    /// that ends up cached.
    pub fn insert(&self, domain: &str, locale: &str, translations: Translations) -> Translations {
        self.entries
            .borrow_mut()
            .entry((domain.to_string(), locale.to_string()))
            .or_insert(translations)
            .clone()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// What the resolver needs from the host's request object.
pub trait RequestContext {
    /// The locale negotiated for this request (e.g. `"da"`, `"pt_BR"`).
    fn locale(&self) -> String;

    /// The cache owned by this request.
    fn translations_cache(&self) -> &TranslationsCache;
}

/// Minimal request context: a fixed locale and its own cache.
#[derive(Debug)]
pub struct RequestState {
    locale: String,
    cache: TranslationsCache,
}

impl RequestState {
    /// Context for a request negotiated to `locale`.
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            cache: TranslationsCache::new(),
        }
    }
}

impl RequestContext for RequestState {
    fn locale(&self) -> String {
        self.locale.clone()
    }

    fn translations_cache(&self) -> &TranslationsCache {
        &self.cache
    }
}

// ============================================================================
// Thread-Local Request Stack
// ============================================================================

thread_local! {
    /// Requests currently being served on this thread, innermost last.
    static REQUEST_STACK: RefCell<Vec<Rc<dyn RequestContext>>> = const { RefCell::new(Vec::new()) };
}

/// RAII guard that leaves the request when dropped.
#[must_use = "the request is left when the guard is dropped"]
pub struct RequestGuard {
    depth: usize,
    _marker: PhantomData<*const ()>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        REQUEST_STACK.with(|stack| {
            stack.borrow_mut().truncate(self.depth);
        });
    }
}

/// Make `ctx` the current request on this thread until the guard drops.
pub fn enter_request(ctx: Rc<dyn RequestContext>) -> RequestGuard {
    let depth = REQUEST_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let depth = stack.len();
        stack.push(ctx);
        depth
    });
    RequestGuard {
        depth,
        _marker: PhantomData,
    }
}

/// Run `f` with `ctx` as the current request.
///
/// ```
/// use std::rc::Rc;
/// use transmux::request::{current_request, with_request, RequestState};
///
/// let locale = with_request(Rc::new(RequestState::new("da")), || {
///     current_request().map(|r| r.locale())
/// });
/// assert_eq!(locale.as_deref(), Some("da"));
/// assert!(current_request().is_none());
/// ```
pub fn with_request<F, R>(ctx: Rc<dyn RequestContext>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = enter_request(ctx);
    f()
}

/// The innermost request on this thread, if any.
#[must_use]
pub fn current_request() -> Option<Rc<dyn RequestContext>> {
    REQUEST_STACK.with(|stack| stack.borrow().last().cloned())
}

/// Whether a request is active on this thread.
#[must_use]
pub fn has_active_request() -> bool {
    REQUEST_STACK.with(|stack| !stack.borrow().is_empty())
}
