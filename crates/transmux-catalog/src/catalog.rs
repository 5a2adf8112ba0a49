//! In-memory catalogs and the tagged [`Translations`] value.
//!
//! # Invariants
//!
//! 1. **Lookups never fail**: every `*gettext` call returns either a
//!    translation or the caller's own input text.
//!
//! 2. **Overlay is last-write-wins**: [`Catalog::overlay`] replaces entries
//!    and metadata of `self` with those of the argument; callers apply
//!    sources from lowest to highest precedence.
//!
//! 3. **Shared instances**: cloning a [`Translations::Compiled`] shares the
//!    same catalog, so identity survives caching.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Key not in catalog | Input text returned |
//! | Empty translation | Entry compiled with empty msgstr | Input text returned |
//! | Plural index out of range | Rule selects a form the entry lacks | Germanic choice between inputs |
//! | No catalog | [`Translations::Null`] | Input text returned |

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::plural::PluralRule;

/// Separator between context and msgid in compiled catalogs.
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// Lookup key: optional message context plus the (singular) msgid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub context: Option<String>,
    pub id: String,
}

impl MessageKey {
    /// Key without a context.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            context: None,
            id: id.into(),
        }
    }

    /// Key with a context (`pgettext`-style).
    #[must_use]
    pub fn with_context(context: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            id: id.into(),
        }
    }
}

/// A translated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A plain translation.
    Singular(String),
    /// Plural forms, indexed by the catalog's [`PluralRule`].
    Plural {
        plural_id: String,
        forms: Vec<String>,
    },
}

impl Message {
    fn singular(&self) -> Option<&str> {
        let text = match self {
            Self::Singular(s) => s.as_str(),
            Self::Plural { forms, .. } => forms.first().map_or("", String::as_str),
        };
        (!text.is_empty()).then_some(text)
    }

    fn form(&self, index: usize) -> Option<&str> {
        let text = match self {
            Self::Singular(s) if index == 0 => s.as_str(),
            Self::Singular(_) => return None,
            Self::Plural { forms, .. } => forms.get(index)?.as_str(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Messages for one (domain, locale) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: HashMap<MessageKey, Message>,
    metadata: BTreeMap<String, String>,
    plural: PluralRule,
}

impl Catalog {
    /// Create an empty catalog with the default plural rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a simple translation.
    pub fn insert(&mut self, key: MessageKey, translation: impl Into<String>) {
        self.messages
            .insert(key, Message::Singular(translation.into()));
    }

    /// Insert plural forms for `key`.
    pub fn insert_plural(&mut self, key: MessageKey, plural_id: impl Into<String>, forms: Vec<String>) {
        self.messages.insert(
            key,
            Message::Plural {
                plural_id: plural_id.into(),
                forms,
            },
        );
    }

    /// Set a header field (`Project-Id-Version`, `Language`, ...).
    pub fn set_metadata(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(name.into(), value.into());
    }

    /// Replace the plural rule.
    pub fn set_plural_rule(&mut self, rule: PluralRule) {
        self.plural = rule;
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, key: &MessageKey) -> Option<&Message> {
        self.messages.get(key)
    }

    /// Header field by name.
    #[must_use]
    pub fn metadata(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).map(String::as_str)
    }

    /// All header fields, sorted by name.
    pub fn metadata_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The catalog's plural rule.
    #[must_use]
    pub const fn plural_rule(&self) -> &PluralRule {
        &self.plural
    }

    /// Number of entries (the header is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &MessageKey> {
        self.messages.keys()
    }

    /// Copy every entry and header field of `other` into `self`,
    /// overwriting on conflict. The plural rule is taken from `other`.
    pub fn overlay(&mut self, other: &Self) {
        self.messages.extend(
            other
                .messages
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.metadata.extend(
            other
                .metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.plural = other.plural.clone();
    }

    fn lookup_singular(&self, key: &MessageKey) -> Option<&str> {
        self.messages.get(key).and_then(Message::singular)
    }

    fn lookup_plural(&self, key: &MessageKey, n: u64) -> Option<&str> {
        let index = self.plural.index(n);
        self.messages.get(key).and_then(|m| m.form(index))
    }
}

/// Translations for one locale: a real catalog or the no-op stand-in.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use transmux_catalog::{Catalog, MessageKey, Translations};
///
/// let mut catalog = Catalog::new();
/// catalog.insert(MessageKey::new("Translate"), "Oversætte");
/// let da = Translations::Compiled(Arc::new(catalog));
///
/// assert_eq!(da.gettext("Translate"), "Oversætte");
/// assert_eq!(da.gettext("Untranslated"), "Untranslated");
/// assert_eq!(Translations::Null.gettext("Translate"), "Translate");
/// ```
#[derive(Debug, Clone, Default)]
pub enum Translations {
    /// No compiled data: every lookup returns its input.
    #[default]
    Null,
    /// A loaded (possibly merged) catalog.
    Compiled(Arc<Catalog>),
}

impl Translations {
    /// Wrap an owned catalog.
    #[must_use]
    pub fn compiled(catalog: Catalog) -> Self {
        Self::Compiled(Arc::new(catalog))
    }

    /// Whether this is the no-op stand-in.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The underlying catalog, if any.
    #[must_use]
    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            Self::Null => None,
            Self::Compiled(c) => Some(c),
        }
    }

    /// Whether both values refer to the same catalog instance.
    ///
    /// Two `Null` values are considered the same instance.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Compiled(a), Self::Compiled(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Translate `msgid`.
    #[must_use]
    pub fn gettext<'a>(&'a self, msgid: &'a str) -> &'a str {
        self.catalog()
            .and_then(|c| c.lookup_singular(&MessageKey::new(msgid)))
            .unwrap_or(msgid)
    }

    /// Translate `msgid` within `context`.
    #[must_use]
    pub fn pgettext<'a>(&'a self, context: &str, msgid: &'a str) -> &'a str {
        self.catalog()
            .and_then(|c| c.lookup_singular(&MessageKey::with_context(context, msgid)))
            .unwrap_or(msgid)
    }

    /// Translate a message with plural forms for count `n`.
    #[must_use]
    pub fn ngettext<'a>(&'a self, singular: &'a str, plural: &'a str, n: u64) -> &'a str {
        self.catalog()
            .and_then(|c| c.lookup_plural(&MessageKey::new(singular), n))
            .unwrap_or(if n == 1 { singular } else { plural })
    }

    /// Translate a message with plural forms within `context`.
    #[must_use]
    pub fn npgettext<'a>(
        &'a self,
        context: &str,
        singular: &'a str,
        plural: &'a str,
        n: u64,
    ) -> &'a str {
        self.catalog()
            .and_then(|c| c.lookup_plural(&MessageKey::with_context(context, singular), n))
            .unwrap_or(if n == 1 { singular } else { plural })
    }
}
