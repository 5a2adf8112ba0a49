//! End-to-end behavior of multi-directory domains against real `.mo` files.
//!
//! 1. Merged catalogs are built once per request and reused.
//! 2. The first-registered source wins conflicting keys.
//! 3. Registering a missing path fails; an empty directory is accepted.
//! 4. Outside a request every lookup is untranslated.
//! 5. A source lacking a locale other sources translate is a hard error.
//! 6. No sources means untranslated output, never an error.
//! 7. Concurrent requests never see each other's catalogs.

use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;
use transmux::catalog::mo::MoBuilder;
use transmux::catalog::{CatalogError, CatalogLoader, LoadedCatalog, MoFileLoader};
use transmux::{
    I18nError, MultiDirDomain, RequestContext, RequestState, StaticDiscovery, Translations,
    enter_request, with_request,
};
use tracing_test::traced_test;

/// Loader that counts how often the filesystem is consulted.
#[derive(Default)]
struct CountingLoader {
    loads: AtomicUsize,
}

impl CountingLoader {
    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl CatalogLoader for CountingLoader {
    fn load(&self, dir: &Path, locale: &str, domain: &str) -> Result<LoadedCatalog, CatalogError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        MoFileLoader.load(dir, locale, domain)
    }
}

fn source_with(locale: &str, messages: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    messages
        .iter()
        .fold(MoBuilder::new(), |b, (id, text)| b.message(id, text))
        .write_to(dir.path(), locale, "messages")
        .unwrap();
    dir
}

#[test]
fn merged_catalog_is_cached_per_request() {
    let a = source_with("da", &[("Translate", "Oversætte")]);
    let loader = CountingLoader::default();
    let mut domain = MultiDirDomain::with_loader("messages", &loader);
    domain.add_path(a.path()).unwrap();

    let request = RequestState::new("da");
    let first = domain.translations_for(Some(&request)).unwrap();
    let second = domain.translations_for(Some(&request)).unwrap();

    assert_eq!(first.gettext("Translate"), "Oversætte");
    assert!(first.same_instance(&second));
    assert_eq!(loader.loads(), 1);
    assert_eq!(request.translations_cache().len(), 1);
}

#[test]
fn new_request_merges_again() {
    let a = source_with("da", &[("Translate", "Oversætte")]);
    let loader = CountingLoader::default();
    let mut domain = MultiDirDomain::with_loader("messages", &loader);
    domain.add_path(a.path()).unwrap();

    let first = domain
        .translations_for(Some(&RequestState::new("da")))
        .unwrap();
    let second = domain
        .translations_for(Some(&RequestState::new("da")))
        .unwrap();
    assert!(!first.same_instance(&second));
    assert_eq!(loader.loads(), 2);
}

#[test]
fn earliest_registered_source_wins() {
    let a = source_with("da", &[("greeting", "Hi"), ("only_a", "A")]);
    let b = source_with("da", &[("greeting", "Hello"), ("only_b", "B")]);
    let mut domain = MultiDirDomain::new("messages");
    domain.add_path(a.path()).unwrap();
    domain.add_path(b.path()).unwrap();

    let t = domain.resolve("da").unwrap();
    assert_eq!(t.gettext("greeting"), "Hi");
    assert_eq!(t.gettext("only_a"), "A");
    assert_eq!(t.gettext("only_b"), "B");
}

#[test]
fn missing_path_fails_and_empty_directory_succeeds() {
    let empty = tempfile::tempdir().unwrap();
    let mut domain = MultiDirDomain::new("messages");

    let err = domain
        .add_path(empty.path().join("does-not-exist"))
        .unwrap_err();
    assert!(matches!(err, I18nError::SourceNotFound { .. }), "{err}");

    domain.add_path(empty.path()).unwrap();
    assert!(domain.has_paths());
}

#[test]
fn outside_request_is_untranslated() {
    let a = source_with("da", &[("Translate", "Oversætte")]);
    let mut domain = MultiDirDomain::new("messages");
    domain.add_path(a.path()).unwrap();

    let t = domain.translations().unwrap();
    assert!(t.is_null());
    assert_eq!(t.gettext("Translate"), "Translate");
    assert!(domain.translations_for(None).unwrap().is_null());
}

#[test]
fn ambient_request_translates() {
    let a = source_with("da", &[("Translate", "Oversætte")]);
    let mut domain = MultiDirDomain::new("messages");
    domain.add_path(a.path()).unwrap();

    let ctx = Rc::new(RequestState::new("da"));
    let text = with_request(ctx.clone(), || {
        domain
            .translations()
            .map(|t| t.gettext("Translate").to_string())
    })
    .unwrap();
    assert_eq!(text, "Oversætte");
    assert_eq!(ctx.translations_cache().len(), 1);
}

#[test]
#[traced_test]
fn partial_catalog_names_offending_source() {
    let a = source_with("da", &[("Translate", "Oversætte")]);
    let b = tempfile::tempdir().unwrap();
    let mut domain = MultiDirDomain::new("messages");
    domain.add_path(a.path()).unwrap();
    domain.add_path(b.path()).unwrap();

    let err = domain.resolve("da").unwrap_err();
    match &err {
        I18nError::MissingCompiledCatalog {
            path,
            locale,
            domain,
        } => {
            assert_eq!(path, b.path());
            assert_eq!(locale, "da");
            assert_eq!(domain, "messages");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains(&b.path().display().to_string()));
    assert!(logs_contain("compiled catalog missing from source"));
}

#[test]
fn partial_catalog_fails_regardless_of_order() {
    let a = source_with("da", &[("Translate", "Oversætte")]);
    let b = tempfile::tempdir().unwrap();
    let mut domain = MultiDirDomain::new("messages");
    domain.add_path(b.path()).unwrap();
    domain.add_path(a.path()).unwrap();

    let err = domain.resolve("da").unwrap_err();
    assert!(
        matches!(err, I18nError::MissingCompiledCatalog { ref path, .. } if path == b.path()),
        "{err}"
    );
}

#[test]
fn resolution_errors_are_not_cached() {
    let a = source_with("da", &[("Translate", "Oversætte")]);
    let b = tempfile::tempdir().unwrap();
    let mut domain = MultiDirDomain::new("messages");
    domain.add_path(a.path()).unwrap();
    domain.add_path(b.path()).unwrap();

    let request = RequestState::new("da");
    assert!(domain.translations_for(Some(&request)).is_err());
    assert!(request.translations_cache().is_empty());
}

#[test]
fn locale_no_source_translates_is_untranslated() {
    let a = source_with("da", &[("Translate", "Oversætte")]);
    let b = source_with("da", &[("Other", "Anden")]);
    let mut domain = MultiDirDomain::new("messages");
    domain.add_path(a.path()).unwrap();
    domain.add_path(b.path()).unwrap();

    let t = domain.resolve("en").unwrap();
    assert!(t.is_null());
}

#[test]
fn no_sources_is_untranslated() {
    let domain = MultiDirDomain::new("messages");
    assert!(!domain.has_paths());
    for locale in ["da", "en", "pt_BR"] {
        assert!(domain.resolve(locale).unwrap().is_null());
    }
    let request = RequestState::new("da");
    assert!(domain.translations_for(Some(&request)).unwrap().is_null());
}

#[test]
fn corrupt_catalog_propagates() {
    let a = tempfile::tempdir().unwrap();
    let dir = a.path().join("da").join("LC_MESSAGES");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("messages.mo"), b"\x00\x01").unwrap();
    let mut domain = MultiDirDomain::new("messages");
    domain.add_path(a.path()).unwrap();

    let err = domain.resolve("da").unwrap_err();
    assert!(matches!(err, I18nError::Catalog(CatalogError::InvalidCatalog { .. })));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn concurrent_requests_are_isolated() {
    let a = source_with("da", &[("Translate", "Oversætte")]);
    let de = MoBuilder::new().message("Translate", "Übersetzen");
    de.write_to(a.path(), "de", "messages").unwrap();
    let mut domain = MultiDirDomain::new("messages");
    domain.add_path(a.path()).unwrap();
    let domain = &domain;

    let results: Vec<(String, String)> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["da", "de", "da", "de"]
            .into_iter()
            .map(|locale| {
                scope.spawn(move || {
                    let ctx = Rc::new(RequestState::new(locale));
                    let _guard = enter_request(ctx.clone());
                    let mut seen = Vec::new();
                    for _ in 0..20 {
                        let t = domain.translations().unwrap();
                        seen.push(t.gettext("Translate").to_string());
                    }
                    assert!(seen.windows(2).all(|w| w[0] == w[1]));
                    assert_eq!(ctx.translations_cache().len(), 1);
                    (locale.to_string(), seen.swap_remove(0))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (locale, text) in results {
        let expected = if locale == "da" { "Oversætte" } else { "Übersetzen" };
        assert_eq!(text, expected);
    }
}

#[test]
fn plugin_sources_merge_like_explicit_ones() {
    let root = tempfile::tempdir().unwrap();
    let core = root.path().join("core");
    let search = root.path().join("search");
    let theme = root.path().join("theme");
    MoBuilder::new()
        .message("Search", "Søg")
        .message("Home", "Hjem")
        .write_to(&core.join("translations"), "da", "messages")
        .unwrap();
    MoBuilder::new()
        .message("Search", "Find")
        .plural("result", "results", &["resultat", "resultater"])
        .write_to(&search.join("translations"), "da", "messages")
        .unwrap();
    std::fs::create_dir_all(&theme).unwrap();

    let discovery = StaticDiscovery::new()
        .with_package("app.translations", "core", &core)
        .with_package("app.translations", "theme", &theme)
        .with_package("app.translations", "search", &search);
    let mut domain = MultiDirDomain::new("messages");
    assert_eq!(
        domain
            .add_entrypoint(&discovery, "app.translations")
            .unwrap(),
        2
    );

    let t = domain.resolve("da_DK").unwrap();
    assert_eq!(t.gettext("Search"), "Søg");
    assert_eq!(t.gettext("Home"), "Hjem");
    assert_eq!(t.ngettext("result", "results", 1), "resultat");
    assert_eq!(t.ngettext("result", "results", 4), "resultater");
    assert!(!Translations::Null.same_instance(&t));
}
