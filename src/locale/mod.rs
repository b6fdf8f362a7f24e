//! Locale identifiers and locale data access
//!
//! This module parses locale tags, names the data domains, and exposes the
//! pluggable data sources together with the inheritance-aware resolver.

use std::fmt;
use std::str::FromStr;

use crate::error::{FormatError, Result};

mod resolver;
mod source;

pub use resolver::{InheritanceChain, LocaleDataResolver};
pub use source::{DirectoryData, EmbeddedData, InMemoryData, LocaleDataSource};

/// Locale id used to request supplemental (locale independent) domains
pub const SUPPLEMENTAL_ID: &str = "supplemental";

/// Named partition of locale data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    NumberFormats,
    Currencies,
    Units,
    Calendar,
    TimezoneNames,
    PluralRules,
    ParentLocales,
    LocaleAliases,
    LikelySubtags,
    Metazones,
    CurrencyData,
    WeekData,
    Meta,
}

impl Domain {
    pub const ALL: [Domain; 13] = [
        Domain::NumberFormats,
        Domain::Currencies,
        Domain::Units,
        Domain::Calendar,
        Domain::TimezoneNames,
        Domain::PluralRules,
        Domain::ParentLocales,
        Domain::LocaleAliases,
        Domain::LikelySubtags,
        Domain::Metazones,
        Domain::CurrencyData,
        Domain::WeekData,
        Domain::Meta,
    ];

    /// Table name of the domain inside a data file
    pub fn key(self) -> &'static str {
        match self {
            Domain::NumberFormats => "number_formats",
            Domain::Currencies => "currencies",
            Domain::Units => "units",
            Domain::Calendar => "calendar",
            Domain::TimezoneNames => "timezone_names",
            Domain::PluralRules => "plural_rules",
            Domain::ParentLocales => "parent_locales",
            Domain::LocaleAliases => "locale_aliases",
            Domain::LikelySubtags => "likely_subtags",
            Domain::Metazones => "metazones",
            Domain::CurrencyData => "currency_data",
            Domain::WeekData => "week_data",
            Domain::Meta => "meta",
        }
    }

    /// Supplemental domains are shared by all locales and never inherit
    pub fn is_supplemental(self) -> bool {
        matches!(
            self,
            Domain::PluralRules
                | Domain::ParentLocales
                | Domain::LocaleAliases
                | Domain::LikelySubtags
                | Domain::Metazones
                | Domain::CurrencyData
                | Domain::WeekData
                | Domain::Meta
        )
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A parsed locale identifier: language, optional script, optional
/// territory and variants. Unicode extensions (`-u-...`) are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleTag {
    language: String,
    script: Option<String>,
    territory: Option<String>,
    variants: Vec<String>,
}

impl LocaleTag {
    /// The root locale
    pub fn root() -> Self {
        LocaleTag {
            language: "root".to_string(),
            script: None,
            territory: None,
            variants: Vec::new(),
        }
    }

    /// Parse a BCP 47 tag (`zh-Hant-TW`) or a CLDR id (`zh_Hant_TW`).
    pub fn parse(tag: &str) -> Result<Self> {
        let trimmed = tag.trim();
        let invalid = || FormatError::InvalidLocale(tag.to_string());
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("root") {
            return Ok(LocaleTag::root());
        }

        let mut subtags = trimmed.split(['-', '_']).peekable();
        let language = subtags.next().ok_or_else(invalid)?;
        let language_ok = matches!(language.len(), 2 | 3 | 5..=8)
            && language.chars().all(|c| c.is_ascii_alphabetic());
        if !language_ok {
            return Err(invalid());
        }
        let mut parsed = LocaleTag {
            language: language.to_ascii_lowercase(),
            script: None,
            territory: None,
            variants: Vec::new(),
        };
        if parsed.language == "und" {
            parsed.language = "root".to_string();
        }

        if let Some(script) = subtags.next_if(|s| s.len() == 4 && s.chars().all(|c| c.is_ascii_alphabetic())) {
            parsed.script = Some(title_case(script));
        }
        if let Some(territory) = subtags.next_if(|s| {
            (s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic()))
                || (s.len() == 3 && s.chars().all(|c| c.is_ascii_digit()))
        }) {
            parsed.territory = Some(territory.to_ascii_uppercase());
        }

        for subtag in subtags {
            // singleton starts an extension; everything after it is ignored
            if subtag.len() == 1 && subtag.chars().all(|c| c.is_ascii_alphanumeric()) {
                break;
            }
            let is_variant = subtag.chars().all(|c| c.is_ascii_alphanumeric())
                && (matches!(subtag.len(), 5..=8)
                    || (subtag.len() == 4 && subtag.starts_with(|c: char| c.is_ascii_digit())));
            if !is_variant {
                return Err(invalid());
            }
            parsed.variants.push(subtag.to_ascii_lowercase());
        }
        Ok(parsed)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn territory(&self) -> Option<&str> {
        self.territory.as_deref()
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn is_root(&self) -> bool {
        self.language == "root" && self.script.is_none() && self.territory.is_none()
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_ascii_lowercase();
        self
    }

    pub fn with_script(mut self, script: Option<&str>) -> Self {
        self.script = script.map(title_case);
        self
    }

    pub fn with_territory(mut self, territory: Option<&str>) -> Self {
        self.territory = territory.map(str::to_ascii_uppercase);
        self
    }

    /// CLDR file id: underscore separated, `root` for the root locale
    pub fn cldr_id(&self) -> String {
        if self.is_root() {
            return "root".to_string();
        }
        let mut id = self.language.clone();
        if let Some(script) = &self.script {
            id.push('_');
            id.push_str(script);
        }
        if let Some(territory) = &self.territory {
            id.push('_');
            id.push_str(territory);
        }
        for variant in &self.variants {
            id.push('_');
            id.push_str(&variant.to_ascii_uppercase());
        }
        id
    }

    /// Drop the last subtag; the language alone truncates to root.
    pub fn truncate(&self) -> LocaleTag {
        let mut parent = self.clone();
        if parent.variants.pop().is_some() {
            return parent;
        }
        if parent.territory.take().is_some() {
            return parent;
        }
        if parent.script.take().is_some() {
            return parent;
        }
        LocaleTag::root()
    }
}

fn title_case(subtag: &str) -> String {
    subtag
        .chars()
        .enumerate()
        .map(|(i, c)| if i == 0 { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
        .collect()
}

impl FromStr for LocaleTag {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        LocaleTag::parse(s)
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("und");
        }
        f.write_str(&self.language)?;
        if let Some(script) = &self.script {
            write!(f, "-{script}")?;
        }
        if let Some(territory) = &self.territory {
            write!(f, "-{territory}")?;
        }
        for variant in &self.variants {
            write!(f, "-{variant}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bcp47_and_cldr_forms() {
        let a = LocaleTag::parse("zh-hant-tw").unwrap();
        let b = LocaleTag::parse("zh_Hant_TW").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "zh-Hant-TW");
        assert_eq!(a.cldr_id(), "zh_Hant_TW");
    }

    #[test]
    fn extensions_are_dropped() {
        let tag = LocaleTag::parse("de-DE-u-co-phonebk").unwrap();
        assert_eq!(tag.cldr_id(), "de_DE");
    }

    #[test]
    fn truncation_ends_at_root() {
        let tag = LocaleTag::parse("sr-Latn-RS").unwrap();
        let chain: Vec<String> = std::iter::successors(Some(tag), |t| {
            (!t.is_root()).then(|| t.truncate())
        })
        .map(|t| t.cldr_id())
        .collect();
        assert_eq!(chain, ["sr_Latn_RS", "sr_Latn", "sr", "root"]);
    }

    #[test]
    fn rejects_malformed_tags() {
        assert!(LocaleTag::parse("e").is_err());
        assert!(LocaleTag::parse("en-US-!").is_err());
    }

    #[test]
    fn root_aliases() {
        assert!(LocaleTag::parse("und").unwrap().is_root());
        assert!(LocaleTag::parse("").unwrap().is_root());
    }
}
