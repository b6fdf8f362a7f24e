#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cldr_format::{
        Domain, FormatError, Formatter, InMemoryData, LocaleDataResolver, Notation,
        NumberFormatOptions, NumberStyle, NumberValue, TextWidth, format_number,
    };

    fn fmt(value: impl Into<NumberValue>, locale: &str, options: &NumberFormatOptions) -> String {
        format_number(value, locale, options).unwrap_or_else(|e| panic!("format failed: {e}"))
    }

    fn plain(value: impl Into<NumberValue>, locale: &str) -> String {
        fmt(value, locale, &NumberFormatOptions::new())
    }

    #[test]
    fn test_decimal_defaults() {
        assert_eq!(plain(1234.5, "en-US"), "1,234.5");
        assert_eq!(plain(1234.5, "de"), "1.234,5");
        assert_eq!(plain(1234.5, "fr"), "1\u{202f}234,5");
        assert_eq!(plain(-1234.567, "en"), "-1,234.567");
        assert_eq!(plain(0, "en"), "0");
        assert_eq!(plain(1234567.891, "ja"), "1,234,567.891");
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        let options = NumberFormatOptions::new().maximum_fraction_digits(0);
        assert_eq!(fmt("2.5", "en", &options), "3");
        assert_eq!(fmt("-2.5", "en", &options), "-3");
        let options = NumberFormatOptions::new().maximum_fraction_digits(3);
        assert_eq!(fmt("1.0005", "en", &options), "1.001");
        assert_eq!(plain("0.12345", "en"), "0.123");
    }

    #[test]
    fn test_values_rounding_to_zero_are_unsigned() {
        assert_eq!(plain(-0.0, "en"), "0");
        assert_eq!(plain("-0.0001", "en"), "0");
        assert_eq!(plain("-0.0005", "en"), "-0.001");
        let whole = NumberFormatOptions::new().maximum_fraction_digits(0);
        assert_eq!(fmt(-0.4, "en", &whole), "0");
        assert_eq!(fmt(-0.6, "en", &whole), "-1");
        let compact = NumberFormatOptions::new()
            .notation(Notation::Compact)
            .maximum_fraction_digits(0);
        assert_eq!(fmt("-0.4", "en", &compact), "0");
        let accounting = NumberFormatOptions::new().pattern("#,##0.00;(#,##0.00)");
        assert_eq!(fmt("-0.001", "en", &accounting), "0.00");
        assert_eq!(fmt("-0.01", "en", &accounting), "(0.01)");
    }

    #[test]
    fn test_digit_options() {
        let options = NumberFormatOptions::new().minimum_integer_digits(3);
        assert_eq!(fmt(5, "en", &options), "005");
        let options = NumberFormatOptions::new().minimum_fraction_digits(2);
        assert_eq!(fmt(1, "en", &options), "1.00");
        assert_eq!(fmt(1.23456, "en", &options), "1.235");
        let options = NumberFormatOptions::new().use_grouping(false);
        assert_eq!(fmt(1234567, "en", &options), "1234567");
    }

    #[test]
    fn test_lone_fraction_bounds_adjust_the_other() {
        let options = NumberFormatOptions::new().minimum_fraction_digits(5);
        assert_eq!(fmt(1.5, "en", &options), "1.50000");
        let options = NumberFormatOptions::new()
            .style(NumberStyle::Percent)
            .maximum_fraction_digits(1);
        assert_eq!(fmt(0.1234, "en", &options), "12.3%");
    }

    #[test]
    fn test_conflicting_fraction_bounds() {
        let options = NumberFormatOptions::new()
            .minimum_fraction_digits(3)
            .maximum_fraction_digits(1);
        assert!(matches!(
            format_number(1, "en", &options),
            Err(FormatError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_percent() {
        let options = NumberFormatOptions::new().style(NumberStyle::Percent);
        assert_eq!(fmt(0.5, "en-US", &options), "50%");
        assert_eq!(fmt(0.5, "de", &options), "50\u{a0}%");
        assert_eq!(fmt(-0.256, "en", &options), "-26%");
    }

    #[test]
    fn test_scientific_and_engineering() {
        let scientific = NumberFormatOptions::new().notation(Notation::Scientific);
        assert_eq!(fmt(1234, "en-US", &scientific), "1.234E3");
        assert_eq!(fmt(0.00012, "en", &scientific), "1.2E-4");
        assert_eq!(fmt(-1234, "en", &scientific), "-1.234E3");
        assert_eq!(fmt(1234, "de", &scientific), "1,234E3");

        let engineering = NumberFormatOptions::new().notation(Notation::Engineering);
        assert_eq!(fmt(12345, "en", &engineering), "12.345E3");
        assert_eq!(fmt(0.05, "en", &engineering), "50E-3");
    }

    #[test]
    fn test_explicit_patterns() {
        let options = NumberFormatOptions::new().pattern("#,##0.00;(#,##0.00)");
        assert_eq!(fmt(-5, "en", &options), "(5.00)");
        assert_eq!(fmt(1234, "en", &options), "1,234.00");

        let options = NumberFormatOptions::new().pattern("0.0‰");
        assert_eq!(fmt(0.0123, "en", &options), "12.3‰");

        let options = NumberFormatOptions::new().pattern("0.00E+00");
        assert_eq!(fmt(12345, "en", &options), "1.23E+04");

        let options = NumberFormatOptions::new().pattern("#,##,##0");
        assert_eq!(fmt(12345678, "en", &options), "1,23,45,678");
    }

    #[test]
    fn test_special_values_use_locale_symbols() {
        assert_eq!(plain(f64::INFINITY, "en"), "∞");
        assert_eq!(plain(f64::NEG_INFINITY, "en"), "-∞");
        assert_eq!(plain(f64::NAN, "en"), "NaN");
        assert_eq!(plain(f64::NAN, "ru"), "не число");
        assert_eq!(plain("-Infinity", "de"), "-∞");

        let percent = NumberFormatOptions::new().style(NumberStyle::Percent);
        assert_eq!(fmt(f64::INFINITY, "en", &percent), "∞%");
    }

    #[test]
    fn test_non_numeric_input() {
        assert!(matches!(
            format_number("twelve", "en", &NumberFormatOptions::new()),
            Err(FormatError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_symbols_must_come_from_data() {
        let data = InMemoryData::new()
            .with_document(
                "root",
                r##"
                [number_formats.symbols]
                decimal = "."
                group = ","

                [number_formats.decimal_formats]
                standard = "#,##0.###"
                "##,
            )
            .unwrap();
        let formatter = Formatter::new(Arc::new(LocaleDataResolver::new(data)));
        match formatter.format_number(1, "en", &NumberFormatOptions::new()) {
            Err(FormatError::DataNotAvailable { domain, path }) => {
                assert_eq!(domain, Domain::NumberFormats);
                assert_eq!(path, "symbols.percent");
            }
            other => panic!("expected missing symbol data, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_locale() {
        assert!(matches!(
            format_number(1, "e", &NumberFormatOptions::new()),
            Err(FormatError::InvalidLocale(_))
        ));
    }

    #[test]
    fn test_units() {
        let long = NumberFormatOptions::new()
            .style(NumberStyle::Unit)
            .unit("kilometer")
            .unit_display(TextWidth::Long);
        assert_eq!(fmt(1, "en", &long), "1 kilometer");
        assert_eq!(fmt(2.5, "en", &long), "2.5 kilometers");
        assert_eq!(fmt(2, "ru", &long), "2 километра");
        assert_eq!(fmt(5, "ru", &long), "5 километров");
        assert_eq!(fmt(1.5, "ru", &long), "1,5 километра");

        let short = NumberFormatOptions::new().style(NumberStyle::Unit).unit("kilometer");
        assert_eq!(fmt(5, "en", &short), "5 km");

        let narrow = |unit: &str| {
            NumberFormatOptions::new()
                .style(NumberStyle::Unit)
                .unit(unit)
                .unit_display(TextWidth::Narrow)
        };
        assert_eq!(fmt(3, "en", &narrow("hour")), "3h");
        assert_eq!(fmt(3, "en", &narrow("meter")), "3 m");
    }

    #[test]
    fn test_unknown_unit_echoes_identifier() {
        let options = NumberFormatOptions::new().style(NumberStyle::Unit).unit("furlong");
        assert_eq!(fmt(3, "en", &options), "3 furlong");
    }

    #[test]
    fn test_unit_style_needs_unit() {
        let options = NumberFormatOptions::new().style(NumberStyle::Unit);
        assert!(matches!(
            format_number(3, "en", &options),
            Err(FormatError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_formatter_reuses_patterns() {
        let formatter = Formatter::embedded();
        let options = NumberFormatOptions::new();
        let first = formatter.format_number(9876.5, "en", &options).unwrap();
        let second = formatter.format_number(9876.5, "en", &options).unwrap();
        assert_eq!(first, "9,876.5");
        assert_eq!(first, second);
    }

    #[test]
    fn test_options_from_json() {
        let options: NumberFormatOptions = serde_json::from_str(
            r#"{"style": "percent", "minimumFractionDigits": 1, "somethingElse": true}"#,
        )
        .unwrap();
        assert_eq!(fmt(0.125, "en", &options), "12.5%");
    }
}
