use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use toml::Table;

use super::{Domain, SUPPLEMENTAL_ID};
use crate::error::{FormatError, Result};

/// Supplies raw locale data fragments.
///
/// A fragment is the table stored for one `(locale, domain)` pair. The
/// locale is a CLDR id such as `en_GB`, `root` for the root locale, or
/// [`SUPPLEMENTAL_ID`] for supplemental domains. Returning `Ok(None)` means
/// the locale does not define the domain and lookup should move on to the
/// parent locale.
pub trait LocaleDataSource: Send + Sync {
    fn fragment(&self, locale: &str, domain: Domain) -> Result<Option<Table>>;
}

fn parse_document(locale: &str, domain: Domain, text: &str) -> Result<Table> {
    toml::from_str::<Table>(text).map_err(|e| FormatError::MalformedData {
        locale: locale.to_string(),
        domain,
        reason: e.to_string(),
    })
}

fn domain_table(locale: &str, domain: Domain, document: &Table) -> Result<Option<Table>> {
    match document.get(domain.key()) {
        None => Ok(None),
        Some(toml::Value::Table(table)) => Ok(Some(table.clone())),
        Some(other) => Err(FormatError::MalformedData {
            locale: locale.to_string(),
            domain,
            reason: format!("expected a table, found {}", other.type_str()),
        }),
    }
}

const EMBEDDED_LOCALES: &[(&str, &str)] = &[
    ("root", include_str!("data/root.toml")),
    ("en", include_str!("data/en.toml")),
    ("en_001", include_str!("data/en_001.toml")),
    ("en_GB", include_str!("data/en_GB.toml")),
    ("de", include_str!("data/de.toml")),
    ("fr", include_str!("data/fr.toml")),
    ("ja", include_str!("data/ja.toml")),
    ("ru", include_str!("data/ru.toml")),
    ("zh", include_str!("data/zh.toml")),
    ("zh_Hant", include_str!("data/zh_Hant.toml")),
    (SUPPLEMENTAL_ID, include_str!("data/supplemental.toml")),
];

/// Locale data compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedData;

impl EmbeddedData {
    /// Ids of the locales that ship with the crate
    pub fn locales() -> impl Iterator<Item = &'static str> {
        EMBEDDED_LOCALES
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| *id != SUPPLEMENTAL_ID)
    }
}

impl LocaleDataSource for EmbeddedData {
    fn fragment(&self, locale: &str, domain: Domain) -> Result<Option<Table>> {
        let Some((_, text)) = EMBEDDED_LOCALES.iter().find(|(id, _)| *id == locale) else {
            return Ok(None);
        };
        let document = parse_document(locale, domain, text)?;
        domain_table(locale, domain, &document)
    }
}

/// Locale data read from `<root>/<locale>.toml` files at lookup time
#[derive(Debug, Clone)]
pub struct DirectoryData {
    root: PathBuf,
}

impl DirectoryData {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryData { root: root.into() }
    }
}

impl LocaleDataSource for DirectoryData {
    fn fragment(&self, locale: &str, domain: Domain) -> Result<Option<Table>> {
        let path = self.root.join(format!("{locale}.toml"));
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FormatError::MalformedData {
                    locale: locale.to_string(),
                    domain,
                    reason: format!("cannot read {}: {e}", path.display()),
                });
            }
        };
        let document = parse_document(locale, domain, &text)?;
        domain_table(locale, domain, &document)
    }
}

/// Locale data held in memory, handy for tests and for callers that
/// assemble their own data set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryData {
    fragments: HashMap<(String, Domain), Table>,
}

impl InMemoryData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one fragment
    pub fn insert(&mut self, locale: impl Into<String>, domain: Domain, table: Table) {
        self.fragments.insert((locale.into(), domain), table);
    }

    /// Add every domain table found in a TOML document for `locale`.
    pub fn with_document(mut self, locale: &str, text: &str) -> Result<Self> {
        for domain in Domain::ALL {
            let document = parse_document(locale, domain, text)?;
            if let Some(table) = domain_table(locale, domain, &document)? {
                self.insert(locale, domain, table);
            }
        }
        Ok(self)
    }
}

impl LocaleDataSource for InMemoryData {
    fn fragment(&self, locale: &str, domain: Domain) -> Result<Option<Table>> {
        Ok(self.fragments.get(&(locale.to_string(), domain)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_embedded_file_parses() {
        for (id, _) in EMBEDDED_LOCALES {
            for domain in Domain::ALL {
                EmbeddedData.fragment(id, domain).unwrap();
            }
        }
    }

    #[test]
    fn supplemental_domains_live_in_the_supplemental_file() {
        for domain in Domain::ALL.into_iter().filter(|d| d.is_supplemental()) {
            assert!(
                EmbeddedData.fragment(SUPPLEMENTAL_ID, domain).unwrap().is_some(),
                "{domain} missing"
            );
            assert!(EmbeddedData.fragment("en", domain).unwrap().is_none());
        }
    }

    #[test]
    fn in_memory_documents() {
        let data = InMemoryData::new()
            .with_document("xx", "[number_formats.symbols]\ndecimal = \",\"\n")
            .unwrap();
        assert!(data.fragment("xx", Domain::NumberFormats).unwrap().is_some());
        assert!(data.fragment("xx", Domain::Calendar).unwrap().is_none());
    }
}
