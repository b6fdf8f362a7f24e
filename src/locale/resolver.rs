use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use toml::{Table, Value};
use tracing::{debug, trace, warn};

use super::{Domain, EmbeddedData, LocaleDataSource, LocaleTag, SUPPLEMENTAL_ID};
use crate::error::{FormatError, Result};

/// Alias targets are followed at most this many times per lookup
const MAX_ALIAS_DEPTH: usize = 8;
/// Guards against cycles in parent locale data
const MAX_CHAIN_LENGTH: usize = 16;

/// Ordered list of locales consulted for a lookup, most specific first,
/// always ending with `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceChain {
    locales: Vec<LocaleTag>,
}

impl InheritanceChain {
    /// The canonicalized requested locale
    pub fn requested(&self) -> &LocaleTag {
        &self.locales[0]
    }

    pub fn locales(&self) -> &[LocaleTag] {
        &self.locales
    }

    /// CLDR ids in lookup order
    pub fn ids(&self) -> Vec<String> {
        self.locales.iter().map(LocaleTag::cldr_id).collect()
    }
}

enum Lookup {
    Found(Value),
    Alias(String),
    Missing,
}

fn alias_target(value: &Value) -> Option<&str> {
    value.as_table().and_then(table_alias)
}

fn table_alias(table: &Table) -> Option<&str> {
    if table.len() == 1 {
        table.get("alias")?.as_str()
    } else {
        None
    }
}

/// Walk `segments` inside `table`. An alias met on the way rewrites the
/// path to the alias target followed by the unread segments.
fn lookup_path(table: &Table, segments: &[&str]) -> Lookup {
    let Some((first, rest)) = segments.split_first() else {
        return Lookup::Found(Value::Table(table.clone()));
    };
    let Some(value) = table.get(*first) else {
        return Lookup::Missing;
    };
    if let Some(target) = alias_target(value) {
        let mut path = target.to_string();
        for segment in rest {
            path.push('.');
            path.push_str(segment);
        }
        return Lookup::Alias(path);
    }
    if rest.is_empty() {
        return Lookup::Found(value.clone());
    }
    match value {
        Value::Table(child) => lookup_path(child, rest),
        _ => Lookup::Missing,
    }
}

/// Copy keys of `parent` that `child` does not define, recursing into
/// tables present in both.
fn merge_into(child: &mut Table, parent: &Table) {
    for (key, value) in parent {
        match (child.get_mut(key), value) {
            (None, _) => {
                child.insert(key.clone(), value.clone());
            }
            (Some(Value::Table(mine)), Value::Table(theirs)) => {
                if table_alias(mine).is_none() {
                    merge_into(mine, theirs);
                }
            }
            _ => {}
        }
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Resolves locale data paths through the CLDR inheritance chain.
///
/// Fragments are fetched from the data source at most once per
/// `(locale, domain)` pair and shared afterwards.
pub struct LocaleDataResolver {
    source: Box<dyn LocaleDataSource>,
    fragments: RwLock<HashMap<(String, Domain), Option<Arc<Table>>>>,
    chains: RwLock<HashMap<String, Arc<InheritanceChain>>>,
}

impl std::fmt::Debug for LocaleDataResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleDataResolver")
            .field("cached_fragments", &read_lock(&self.fragments).len())
            .finish()
    }
}

impl Default for LocaleDataResolver {
    fn default() -> Self {
        Self::embedded()
    }
}

impl LocaleDataResolver {
    pub fn new(source: impl LocaleDataSource + 'static) -> Self {
        LocaleDataResolver {
            source: Box::new(source),
            fragments: RwLock::new(HashMap::new()),
            chains: RwLock::new(HashMap::new()),
        }
    }

    /// Resolver over the data compiled into the crate
    pub fn embedded() -> Self {
        Self::new(EmbeddedData)
    }

    /// Fetch one fragment, consulting the source only on the first request.
    pub fn fragment(&self, locale: &str, domain: Domain) -> Result<Option<Arc<Table>>> {
        let locale = if domain.is_supplemental() { SUPPLEMENTAL_ID } else { locale };
        let key = (locale.to_string(), domain);
        if let Some(cached) = read_lock(&self.fragments).get(&key) {
            return Ok(cached.clone());
        }
        let loaded = self
            .source
            .fragment(locale, domain)
            .inspect_err(|e| warn!(locale, %domain, error = %e, "cannot load locale data fragment"))?
            .map(Arc::new);
        trace!(locale, %domain, found = loaded.is_some(), "loaded locale data fragment");
        Ok(write_lock(&self.fragments).entry(key).or_insert(loaded).clone())
    }

    /// Look up a dotted path in a supplemental domain
    pub fn supplemental(&self, domain: Domain, path: &str) -> Result<Option<Value>> {
        let Some(table) = self.fragment(SUPPLEMENTAL_ID, domain)? else {
            return Ok(None);
        };
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        Ok(match lookup_path(&table, &segments) {
            Lookup::Found(value) => Some(value),
            _ => None,
        })
    }

    fn supplemental_str(&self, domain: Domain, key: &str) -> Result<Option<String>> {
        let Some(table) = self.fragment(SUPPLEMENTAL_ID, domain)? else {
            return Ok(None);
        };
        Ok(table.get(key).and_then(Value::as_str).map(str::to_string))
    }

    /// Apply language, territory and script aliases, then add the script
    /// implied by likely subtags when it differs from the language default.
    pub fn canonicalize(&self, tag: &LocaleTag) -> Result<LocaleTag> {
        if tag.is_root() {
            return Ok(tag.clone());
        }
        let mut canonical = tag.clone();

        if let Some(aliases) = self.fragment(SUPPLEMENTAL_ID, Domain::LocaleAliases)? {
            let table = |name: &str| aliases.get(name).and_then(Value::as_table);
            if let Some(replacement) = table("language")
                .and_then(|t| t.get(canonical.language()))
                .and_then(Value::as_str)
            {
                let replacement = LocaleTag::parse(replacement)?;
                let script = canonical.script().or(replacement.script()).map(str::to_string);
                let territory = canonical
                    .territory()
                    .or(replacement.territory())
                    .map(str::to_string);
                canonical = canonical
                    .with_language(replacement.language())
                    .with_script(script.as_deref())
                    .with_territory(territory.as_deref());
            }
            if let Some(replacement) = canonical
                .territory()
                .and_then(|t| table("territory").and_then(|a| a.get(t)))
                .and_then(Value::as_str)
                .map(str::to_string)
            {
                canonical = canonical.with_territory(Some(&replacement));
            }
            if let Some(replacement) = canonical
                .script()
                .and_then(|s| table("script").and_then(|a| a.get(s)))
                .and_then(Value::as_str)
                .map(str::to_string)
            {
                canonical = canonical.with_script(Some(&replacement));
            }
        }

        if canonical.script().is_none() {
            if let Some(territory) = canonical.territory() {
                let pair = format!("{}_{}", canonical.language(), territory);
                let likely_script = |key: &str| -> Result<Option<String>> {
                    Ok(self
                        .supplemental_str(Domain::LikelySubtags, key)?
                        .and_then(|t| LocaleTag::parse(&t).ok())
                        .and_then(|t| t.script().map(str::to_string)))
                };
                let regional = likely_script(&pair)?;
                let default = likely_script(canonical.language())?;
                if let Some(script) = regional.filter(|s| Some(s) != default.as_ref()) {
                    canonical = canonical.with_script(Some(&script));
                }
            }
        }

        if &canonical != tag {
            debug!(from = %tag, to = %canonical, "canonicalized locale");
        }
        Ok(canonical)
    }

    /// Build (or fetch from cache) the inheritance chain for `locale`.
    pub fn inheritance_chain(&self, locale: &str) -> Result<Arc<InheritanceChain>> {
        if let Some(chain) = read_lock(&self.chains).get(locale) {
            return Ok(Arc::clone(chain));
        }
        let tag = self.canonicalize(&LocaleTag::parse(locale)?)?;
        let parents = self.fragment(SUPPLEMENTAL_ID, Domain::ParentLocales)?;

        let mut locales = vec![tag.clone()];
        let mut current = tag;
        while !current.is_root() && locales.len() < MAX_CHAIN_LENGTH {
            let explicit = parents
                .as_ref()
                .and_then(|p| p.get(&current.cldr_id()))
                .and_then(Value::as_str);
            let parent = match explicit {
                Some(id) => LocaleTag::parse(id)?,
                None => current.truncate(),
            };
            locales.push(parent.clone());
            current = parent;
        }
        if !current.is_root() {
            locales.push(LocaleTag::root());
        }

        let chain = Arc::new(InheritanceChain { locales });
        trace!(locale, chain = ?chain.ids(), "built inheritance chain");
        write_lock(&self.chains).insert(locale.to_string(), Arc::clone(&chain));
        Ok(chain)
    }

    /// Resolve a dotted path in `domain` for `locale`.
    ///
    /// The first locale in the chain that defines the path wins. An alias
    /// met on the way restarts the lookup at the requested locale with the
    /// rewritten path.
    pub fn resolve(&self, locale: &str, domain: Domain, path: &str) -> Result<Option<Value>> {
        if domain.is_supplemental() {
            return self.supplemental(domain, path);
        }
        let chain = self.inheritance_chain(locale)?;
        let mut path = path.to_string();

        'restart: for _ in 0..=MAX_ALIAS_DEPTH {
            let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
            for tag in chain.locales() {
                let Some(table) = self.fragment(&tag.cldr_id(), domain)? else {
                    continue;
                };
                match lookup_path(&table, &segments) {
                    Lookup::Found(value) => return Ok(Some(value)),
                    Lookup::Alias(target) => {
                        trace!(from = %path, to = %target, "following alias");
                        path = target;
                        continue 'restart;
                    }
                    Lookup::Missing => {}
                }
            }
            return Ok(None);
        }
        Err(FormatError::MalformedData {
            locale: locale.to_string(),
            domain,
            reason: format!("alias chain for `{path}` is too deep"),
        })
    }

    /// Like [`resolve`](Self::resolve) but missing data is an error.
    pub fn require(&self, locale: &str, domain: Domain, path: &str) -> Result<Value> {
        self.resolve(locale, domain, path)?
            .ok_or_else(|| FormatError::DataNotAvailable {
                domain,
                path: path.to_string(),
            })
    }

    /// Resolve a path whose value is a string
    pub fn resolve_str(&self, locale: &str, domain: Domain, path: &str) -> Result<Option<String>> {
        Ok(self
            .resolve(locale, domain, path)?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    pub fn require_str(&self, locale: &str, domain: Domain, path: &str) -> Result<String> {
        self.resolve_str(locale, domain, path)?
            .ok_or_else(|| FormatError::DataNotAvailable {
                domain,
                path: path.to_string(),
            })
    }

    /// Resolve a path whose value is an array of strings
    pub fn resolve_strings(
        &self,
        locale: &str,
        domain: Domain,
        path: &str,
    ) -> Result<Option<Vec<String>>> {
        Ok(self.resolve(locale, domain, path)?.and_then(|v| {
            v.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
        }))
    }

    /// Deep merge of every fragment along the chain, child values winning.
    pub fn merged_fragment(&self, locale: &str, domain: Domain) -> Result<Table> {
        if domain.is_supplemental() {
            return Ok(self
                .fragment(SUPPLEMENTAL_ID, domain)?
                .map(|t| (*t).clone())
                .unwrap_or_default());
        }
        let chain = self.inheritance_chain(locale)?;
        let mut merged = Table::new();
        for tag in chain.locales() {
            if let Some(table) = self.fragment(&tag.cldr_id(), domain)? {
                merge_into(&mut merged, &table);
            }
        }
        Ok(merged)
    }

    /// CLDR release the data was generated from
    pub fn data_version(&self) -> Result<Option<String>> {
        self.supplemental_str(Domain::Meta, "cldr_version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::InMemoryData;

    fn resolver() -> LocaleDataResolver {
        let data = InMemoryData::new()
            .with_document(
                "root",
                r#"
                [calendar.months.format]
                abbreviated = ["M01"]
                [calendar.months.stand_alone]
                alias = "months.format"
                [number_formats.symbols]
                decimal = "."
                group = ","
                "#,
            )
            .unwrap()
            .with_document(
                "xx",
                r#"
                [calendar.months.format]
                abbreviated = ["Jan"]
                [number_formats.symbols]
                decimal = ","
                "#,
            )
            .unwrap();
        LocaleDataResolver::new(data)
    }

    #[test]
    fn child_wins_then_parent_fills_in() {
        let r = resolver();
        assert_eq!(
            r.resolve_str("xx", Domain::NumberFormats, "symbols.decimal").unwrap(),
            Some(",".into())
        );
        assert_eq!(
            r.resolve_str("xx", Domain::NumberFormats, "symbols.group").unwrap(),
            Some(",".into())
        );
    }

    #[test]
    fn alias_restarts_at_requested_locale() {
        let r = resolver();
        let months = r
            .resolve_strings("xx", Domain::Calendar, "months.stand_alone.abbreviated")
            .unwrap();
        assert_eq!(months, Some(vec!["Jan".to_string()]));
    }

    #[test]
    fn missing_required_data() {
        let r = resolver();
        let err = r.require("xx", Domain::Calendar, "eras.abbr").unwrap_err();
        assert!(matches!(err, FormatError::DataNotAvailable { .. }));
    }

    #[test]
    fn merged_view_matches_chain_lookup() {
        let r = resolver();
        let merged = r.merged_fragment("xx", Domain::NumberFormats).unwrap();
        let symbols = merged["symbols"].as_table().unwrap();
        assert_eq!(symbols["decimal"].as_str(), Some(","));
        assert_eq!(symbols["group"].as_str(), Some(","));
    }
}
