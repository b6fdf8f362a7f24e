#[cfg(test)]
mod tests {
    use std::fs;

    use cldr_format::{
        DirectoryData, Domain, EmbeddedData, FormatError, InMemoryData, LocaleDataResolver,
        LocaleTag,
    };
    use tempfile::TempDir;
    use toml::Value;

    fn chain(resolver: &LocaleDataResolver, locale: &str) -> Vec<String> {
        resolver.inheritance_chain(locale).unwrap().ids()
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!(LocaleTag::parse("zh-hant-tw").unwrap().cldr_id(), "zh_Hant_TW");
        assert_eq!(LocaleTag::parse("en_US").unwrap().cldr_id(), "en_US");
        assert_eq!(LocaleTag::parse("en-US-u-ca-gregory").unwrap().cldr_id(), "en_US");
        assert_eq!(LocaleTag::parse("es-419").unwrap().territory(), Some("419"));
        assert!(LocaleTag::parse("und").unwrap().is_root());
        assert!(LocaleTag::parse("").unwrap().is_root());
        for bad in ["e", "en-US-??", "12", "en-US-a$b"] {
            assert!(
                matches!(LocaleTag::parse(bad), Err(FormatError::InvalidLocale(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_inheritance_chains() {
        let resolver = LocaleDataResolver::embedded();
        assert_eq!(chain(&resolver, "en-GB"), ["en_GB", "en_001", "en", "root"]);
        assert_eq!(chain(&resolver, "en-UK"), ["en_GB", "en_001", "en", "root"]);
        assert_eq!(chain(&resolver, "de-AT"), ["de_AT", "de", "root"]);
        assert_eq!(chain(&resolver, "zh-TW"), ["zh_Hant_TW", "zh_Hant", "root"]);
        assert_eq!(chain(&resolver, "zh-CN"), ["zh_CN", "zh", "root"]);
        assert_eq!(chain(&resolver, "iw-IL"), ["he_IL", "he", "root"]);
        assert_eq!(chain(&resolver, "root"), ["root"]);
    }

    #[test]
    fn test_merged_fragment_matches_lookup() {
        let resolver = LocaleDataResolver::embedded();
        let merged = resolver.merged_fragment("en-GB", Domain::Calendar).unwrap();
        for section in ["date_formats", "time_formats", "available_formats"] {
            let table = merged
                .get(section)
                .and_then(Value::as_table)
                .unwrap_or_else(|| panic!("{section} missing from merged data"));
            for (key, value) in table {
                let resolved = resolver
                    .resolve("en-GB", Domain::Calendar, &format!("{section}.{key}"))
                    .unwrap();
                assert_eq!(resolved.as_ref(), Some(value), "{section}.{key}");
            }
        }
    }

    #[test]
    fn test_child_values_win() {
        let resolver = LocaleDataResolver::embedded();
        let gb = resolver
            .require_str("en-GB", Domain::Calendar, "time_formats.short")
            .unwrap();
        let us = resolver
            .require_str("en-US", Domain::Calendar, "time_formats.short")
            .unwrap();
        assert_eq!(gb, "HH:mm");
        assert_eq!(us, "h:mm a");
    }

    #[test]
    fn test_missing_data() {
        let resolver = LocaleDataResolver::embedded();
        assert_eq!(
            resolver.resolve("en", Domain::Calendar, "no.such.path").unwrap(),
            None
        );
        assert!(matches!(
            resolver.require("en", Domain::Units, "long.no-such-unit"),
            Err(FormatError::DataNotAvailable { domain: Domain::Units, .. })
        ));
        assert!(matches!(
            resolver.resolve("x", Domain::Calendar, "date_formats.short"),
            Err(FormatError::InvalidLocale(_))
        ));
    }

    #[test]
    fn test_data_version() {
        let resolver = LocaleDataResolver::embedded();
        assert_eq!(resolver.data_version().unwrap().as_deref(), Some("45"));
        assert!(EmbeddedData::locales().any(|id| id == "root"));
        assert!(EmbeddedData::locales().all(|id| id != "supplemental"));
    }

    #[test]
    fn test_in_memory_data() {
        let data = InMemoryData::new()
            .with_document(
                "root",
                r#"
                [number_formats.symbols]
                decimal = "."
                group = ","
                "#,
            )
            .unwrap()
            .with_document(
                "xx",
                r#"
                [number_formats.symbols]
                decimal = ","
                "#,
            )
            .unwrap();
        let resolver = LocaleDataResolver::new(data);
        let decimal = resolver
            .require_str("xx-YY", Domain::NumberFormats, "symbols.decimal")
            .unwrap();
        let group = resolver
            .require_str("xx-YY", Domain::NumberFormats, "symbols.group")
            .unwrap();
        assert_eq!((decimal.as_str(), group.as_str()), (",", ","));
        assert_eq!(resolver.data_version().unwrap(), None);
    }

    #[test]
    fn test_directory_data() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("root.toml"),
            "[calendar.date_formats]\nshort = \"y-MM-dd\"\nmedium = \"y MMM d\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("fr.toml"),
            "[calendar.date_formats]\nshort = \"dd/MM/y\"\n",
        )
        .unwrap();
        let resolver = LocaleDataResolver::new(DirectoryData::new(dir.path()));
        assert_eq!(chain(&resolver, "fr-CA"), ["fr_CA", "fr", "root"]);
        assert_eq!(
            resolver
                .resolve_str("fr-CA", Domain::Calendar, "date_formats.short")
                .unwrap()
                .as_deref(),
            Some("dd/MM/y")
        );
        assert_eq!(
            resolver
                .resolve_str("fr-CA", Domain::Calendar, "date_formats.medium")
                .unwrap()
                .as_deref(),
            Some("y MMM d")
        );
    }

    #[test]
    fn test_malformed_directory_data() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("root.toml"), "[calendar\nbroken").unwrap();
        let resolver = LocaleDataResolver::new(DirectoryData::new(dir.path()));
        assert!(matches!(
            resolver.resolve("root", Domain::Calendar, "date_formats.short"),
            Err(FormatError::MalformedData { .. })
        ));
    }
}
