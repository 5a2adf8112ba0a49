//! GNU gettext `.mo` reader.
//!
//! Layout (all words are `u32` in the byte order given by the magic):
//!
//! ```text
//! 0   magic           0x950412de
//! 4   revision        major in the high 16 bits (0 or 1)
//! 8   N               number of strings
//! 12  O               offset of the original-string table
//! 16  T               offset of the translation table
//! 20  hash size       (ignored)
//! 24  hash offset     (ignored)
//! O + 8i              (length, offset) of msgid i
//! T + 8i              (length, offset) of msgstr i
//! ```
//!
//! A msgid of the form `ctx\u{4}id` carries a context and `id\0plural` marks
//! a plural entry whose msgstr holds NUL-separated forms. The entry with an
//! empty msgid is the header.

use std::path::Path;

use crate::catalog::{CONTEXT_SEPARATOR, Catalog, MessageKey};
use crate::error::CatalogError;
use crate::plural::PluralRule;

/// Magic number in the file's own byte order.
pub const MAGIC: u32 = 0x9504_12de;

const HEADER_LEN: usize = 28;

#[derive(Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

struct Reader<'a> {
    data: &'a [u8],
    order: ByteOrder,
    path: &'a Path,
}

impl<'a> Reader<'a> {
    fn word(&self, offset: usize) -> Result<u32, CatalogError> {
        let bytes: [u8; 4] = offset
            .checked_add(4)
            .and_then(|end| self.data.get(offset..end))
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| CatalogError::invalid(self.path, format!("truncated at offset {offset}")))?;
        Ok(match self.order {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    fn offset(&self, at: usize) -> Result<usize, CatalogError> {
        usize::try_from(self.word(at)?)
            .map_err(|_| CatalogError::invalid(self.path, "offset exceeds address space"))
    }

    /// Bytes of table entry `index` in the table starting at `table`.
    fn string(&self, table: usize, index: usize) -> Result<&'a [u8], CatalogError> {
        let entry = index
            .checked_mul(8)
            .and_then(|o| o.checked_add(table))
            .ok_or_else(|| CatalogError::invalid(self.path, "string table overflows"))?;
        let len = self.offset(entry)?;
        let start = self.offset(entry + 4)?;
        start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| {
                CatalogError::invalid(
                    self.path,
                    format!("string {index} ({len} bytes at {start}) lies outside the file"),
                )
            })
    }
}

fn utf8<'a>(bytes: &'a [u8], path: &Path) -> Result<&'a str, CatalogError> {
    std::str::from_utf8(bytes)
        .map_err(|e| CatalogError::invalid(path, format!("string is not UTF-8: {e}")))
}

fn is_supported_charset(charset: &str) -> bool {
    matches!(
        charset.to_ascii_lowercase().as_str(),
        "utf-8" | "utf8" | "us-ascii" | "ascii"
    )
}

/// Apply the header entry's `Name: value` lines to `catalog`.
fn apply_header(catalog: &mut Catalog, header: &str, path: &Path) -> Result<(), CatalogError> {
    for line in header.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        match name.to_ascii_lowercase().as_str() {
            "content-type" => {
                let charset = value
                    .split(';')
                    .filter_map(|p| p.trim().split_once('='))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("charset"))
                    .map(|(_, v)| v.trim());
                if let Some(charset) = charset.filter(|c| !is_supported_charset(c)) {
                    return Err(CatalogError::UnsupportedCharset {
                        path: path.to_path_buf(),
                        charset: charset.to_string(),
                    });
                }
            }
            "plural-forms" => catalog.set_plural_rule(PluralRule::parse(value)?),
            _ => {}
        }
        catalog.set_metadata(name, value);
    }
    Ok(())
}

/// Parse a compiled catalog. `path` is used for error messages only.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidCatalog`] for a bad magic number,
/// unsupported revision, truncated tables, or non-UTF-8 strings, and
/// [`CatalogError::UnsupportedCharset`] / [`CatalogError::InvalidPluralForms`]
/// for bad headers.
pub fn parse(data: &[u8], path: &Path) -> Result<Catalog, CatalogError> {
    let Some(magic) = data.get(..4) else {
        return Err(CatalogError::invalid(path, "file shorter than the magic number"));
    };
    let order = if magic == MAGIC.to_le_bytes() {
        ByteOrder::Little
    } else if magic == MAGIC.to_be_bytes() {
        ByteOrder::Big
    } else {
        return Err(CatalogError::invalid(path, "bad magic number"));
    };
    if data.len() < HEADER_LEN {
        return Err(CatalogError::invalid(path, "truncated header"));
    }

    let reader = Reader { data, order, path };
    let major = reader.word(4)? >> 16;
    if major > 1 {
        return Err(CatalogError::invalid(
            path,
            format!("unsupported major revision {major}"),
        ));
    }
    let count = reader.offset(8)?;
    let originals = reader.offset(12)?;
    let translations = reader.offset(16)?;

    let mut catalog = Catalog::new();
    let mut header = None;
    for i in 0..count {
        let raw_id = reader.string(originals, i)?;
        let raw_str = reader.string(translations, i)?;
        if raw_id.is_empty() {
            header = Some(raw_str);
            continue;
        }

        let id = utf8(raw_id, path)?;
        let text = utf8(raw_str, path)?;
        let (context, id) = match id.split_once(CONTEXT_SEPARATOR) {
            Some((ctx, rest)) => (Some(ctx), rest),
            None => (None, id),
        };
        let (singular, plural) = match id.split_once('\0') {
            Some((s, p)) => (s, Some(p)),
            None => (id, None),
        };
        let key = MessageKey {
            context: context.map(str::to_string),
            id: singular.to_string(),
        };
        match plural {
            Some(plural_id) => {
                let forms = text.split('\0').map(str::to_string).collect();
                catalog.insert_plural(key, plural_id, forms);
            }
            None => catalog.insert(key, text),
        }
    }

    if let Some(raw) = header {
        apply_header(&mut catalog, utf8(raw, path)?, path)?;
    }
    Ok(catalog)
}

/// Builder for `.mo` fixtures.
///
/// Produces little-endian, revision 0 files without a hash table.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone, Default)]
pub struct MoBuilder {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    header: Vec<(String, String)>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl MoBuilder {
    /// Start an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header field.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.header.push((name.into(), value.into()));
        self
    }

    /// Add a simple message.
    #[must_use]
    pub fn message(mut self, id: &str, text: &str) -> Self {
        self.entries.push((id.into(), text.into()));
        self
    }

    /// Add a message with a context.
    #[must_use]
    pub fn context_message(mut self, context: &str, id: &str, text: &str) -> Self {
        self.entries
            .push((format!("{context}{CONTEXT_SEPARATOR}{id}").into(), text.into()));
        self
    }

    /// Add a plural message.
    #[must_use]
    pub fn plural(mut self, id: &str, plural_id: &str, forms: &[&str]) -> Self {
        self.entries
            .push((format!("{id}\0{plural_id}").into(), forms.join("\0").into()));
        self
    }

    /// Add raw bytes, for fixtures that must be malformed.
    #[must_use]
    pub fn raw(mut self, id: &[u8], text: &[u8]) -> Self {
        self.entries.push((id.to_vec(), text.to_vec()));
        self
    }

    /// Serialize to `.mo` bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut entries = self.entries.clone();
        if !self.header.is_empty() {
            let header: String = self
                .header
                .iter()
                .map(|(k, v)| format!("{k}: {v}\n"))
                .collect();
            entries.push((Vec::new(), header.into_bytes()));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let word = |v: usize| u32::try_from(v).unwrap_or(u32::MAX).to_le_bytes();
        let n = entries.len();
        let originals = HEADER_LEN;
        let translations = originals + 8 * n;
        let mut strings_at = translations + 8 * n;

        let mut out = Vec::new();
        for v in [MAGIC as usize, 0, n, originals, translations, 0, strings_at] {
            out.extend_from_slice(&word(v));
        }
        let mut tables = Vec::with_capacity(16 * n);
        let mut pool = Vec::new();
        for column in 0..2 {
            for entry in &entries {
                let s = if column == 0 { &entry.0 } else { &entry.1 };
                tables.extend_from_slice(&word(s.len()));
                tables.extend_from_slice(&word(strings_at));
                pool.extend_from_slice(s);
                pool.push(0);
                strings_at += s.len() + 1;
            }
        }
        out.extend_from_slice(&tables);
        out.extend_from_slice(&pool);
        out
    }

    /// Write to `<root>/<locale>/LC_MESSAGES/<domain>.mo`, creating
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Propagates filesystem errors.
    pub fn write_to(
        &self,
        root: &Path,
        locale: &str,
        domain: &str,
    ) -> std::io::Result<std::path::PathBuf> {
        let dir = root.join(locale).join("LC_MESSAGES");
        std::fs::create_dir_all(&dir)?;
        let file = dir.join(format!("{domain}.mo"));
        std::fs::write(&file, self.to_bytes())?;
        Ok(file)
    }
}
