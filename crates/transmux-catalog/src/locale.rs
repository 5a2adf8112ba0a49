//! Locale identifiers and lookup candidates.

use crate::error::CatalogError;

/// A locale split into its POSIX components:
/// `language[_territory][.codeset][@modifier]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleParts<'a> {
    pub language: &'a str,
    pub territory: Option<&'a str>,
    pub codeset: Option<&'a str>,
    pub modifier: Option<&'a str>,
}

impl<'a> LocaleParts<'a> {
    /// Split `locale`. `-` is accepted in place of `_` before the territory.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidLocale`] for empty identifiers and for
    /// anything that could escape a catalog directory (`/`, `\`, `..`, NUL).
    pub fn parse(locale: &'a str) -> Result<Self, CatalogError> {
        let unsafe_path = locale.contains(['/', '\\', '\0']) || locale.contains("..");
        if locale.trim().is_empty() || unsafe_path {
            return Err(CatalogError::InvalidLocale(locale.to_string()));
        }

        let (rest, modifier) = match locale.split_once('@') {
            Some((r, m)) => (r, Some(m)),
            None => (locale, None),
        };
        let (rest, codeset) = match rest.split_once('.') {
            Some((r, c)) => (r, Some(c)),
            None => (rest, None),
        };
        let (language, territory) = match rest.split_once(['_', '-']) {
            Some((l, t)) => (l, Some(t)),
            None => (rest, None),
        };
        if language.is_empty() {
            return Err(CatalogError::InvalidLocale(locale.to_string()));
        }
        Ok(Self {
            language,
            territory,
            codeset,
            modifier,
        })
    }
}

/// Directory names to try for `locale`, most specific first.
///
/// Every combination of the optional components is produced; the territory
/// outranks the modifier, which outranks the codeset:
///
/// ```
/// use transmux_catalog::locale::candidates;
///
/// assert_eq!(candidates("pt-BR").unwrap(), vec!["pt_BR", "pt"]);
/// assert_eq!(
///     candidates("de_DE@euro").unwrap(),
///     vec!["de_DE@euro", "de_DE", "de@euro", "de"]
/// );
/// ```
///
/// # Errors
///
/// Propagates [`LocaleParts::parse`] failures.
pub fn candidates(locale: &str) -> Result<Vec<String>, CatalogError> {
    const CODESET: u8 = 1;
    const MODIFIER: u8 = 2;
    const TERRITORY: u8 = 4;

    let parts = LocaleParts::parse(locale)?;
    let present = [
        (TERRITORY, parts.territory.is_some()),
        (CODESET, parts.codeset.is_some()),
        (MODIFIER, parts.modifier.is_some()),
    ]
    .into_iter()
    .filter(|(_, set)| *set)
    .fold(0u8, |mask, (bit, _)| mask | bit);

    let mut out = Vec::new();
    for combo in (0..=present).rev() {
        if combo & !present != 0 {
            continue;
        }
        let mut name = parts.language.to_string();
        if let Some(t) = parts.territory.filter(|_| combo & TERRITORY != 0) {
            name.push('_');
            name.push_str(t);
        }
        if let Some(c) = parts.codeset.filter(|_| combo & CODESET != 0) {
            name.push('.');
            name.push_str(c);
        }
        if let Some(m) = parts.modifier.filter(|_| combo & MODIFIER != 0) {
            name.push('@');
            name.push_str(m);
        }
        out.push(name);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_language() {
        assert_eq!(candidates("da").unwrap(), vec!["da"]);
    }

    #[test]
    fn full_posix_locale() {
        assert_eq!(
            candidates("de_DE.UTF-8@euro").unwrap(),
            vec![
                "de_DE.UTF-8@euro",
                "de_DE@euro",
                "de_DE.UTF-8",
                "de_DE",
                "de.UTF-8@euro",
                "de@euro",
                "de.UTF-8",
                "de",
            ]
        );
    }

    #[test]
    fn hyphenated_territory_is_normalized() {
        assert_eq!(candidates("zh-Hant").unwrap(), vec!["zh_Hant", "zh"]);
    }

    #[test]
    fn parts() {
        let p = LocaleParts::parse("sr_RS.UTF-8@latin").unwrap();
        assert_eq!(p.language, "sr");
        assert_eq!(p.territory, Some("RS"));
        assert_eq!(p.codeset, Some("UTF-8"));
        assert_eq!(p.modifier, Some("latin"));
    }

    #[test]
    fn rejects_path_escapes_and_empties() {
        for bad in ["", "  ", "../etc", "en/../../x", "a\\b", "_US", "en\0"] {
            assert!(
                matches!(candidates(bad), Err(CatalogError::InvalidLocale(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
