//! Formatting options.
//!
//! Both option records can be built three ways: with the builder methods,
//! from string key/value pairs as passed by a message-format runtime
//! ([`NumberFormatOptions::from_args`]), or deserialized with serde using
//! the ECMA-402 camelCase names. Unknown keys are ignored.

use serde::Deserialize;
use tracing::debug;

use crate::error::{FormatError, Result};

/// Largest accepted fraction digit count
pub const MAX_FRACTION_DIGITS: usize = 20;

fn parse_keyword<T: Copy>(key: &str, value: &str, keywords: &[(&str, T)]) -> Result<T> {
    keywords
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, v)| *v)
        .ok_or_else(|| {
            let allowed: Vec<&str> = keywords.iter().map(|(name, _)| *name).collect();
            FormatError::invalid_option(
                key,
                format!("`{value}` is not one of {}", allowed.join(", ")),
            )
        })
}

fn parse_digits(key: &str, value: &str) -> Result<usize> {
    let digits: usize = value
        .trim()
        .parse()
        .map_err(|_| FormatError::invalid_option(key, format!("`{value}` is not a count")))?;
    if digits > MAX_FRACTION_DIGITS {
        return Err(FormatError::invalid_option(
            key,
            format!("{digits} is out of range 0..={MAX_FRACTION_DIGITS}"),
        ));
    }
    Ok(digits)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(FormatError::invalid_option(
            key,
            format!("`{other}` is not a boolean"),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberStyle {
    #[default]
    Decimal,
    Percent,
    Currency,
    Unit,
}

impl NumberStyle {
    const KEYWORDS: &'static [(&'static str, Self)] = &[
        ("decimal", Self::Decimal),
        ("percent", Self::Percent),
        ("currency", Self::Currency),
        ("unit", Self::Unit),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    #[default]
    Standard,
    Scientific,
    Engineering,
    Compact,
}

impl Notation {
    const KEYWORDS: &'static [(&'static str, Self)] = &[
        ("standard", Self::Standard),
        ("scientific", Self::Scientific),
        ("engineering", Self::Engineering),
        ("compact", Self::Compact),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CurrencyDisplay {
    #[default]
    Symbol,
    NarrowSymbol,
    Code,
    Name,
    /// Symbol with the parenthesized negative pattern where the locale has one
    Accounting,
}

impl CurrencyDisplay {
    const KEYWORDS: &'static [(&'static str, Self)] = &[
        ("symbol", Self::Symbol),
        ("narrowSymbol", Self::NarrowSymbol),
        ("code", Self::Code),
        ("name", Self::Name),
        ("accounting", Self::Accounting),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactDisplay {
    #[default]
    Short,
    Long,
}

impl CompactDisplay {
    const KEYWORDS: &'static [(&'static str, Self)] = &[("short", Self::Short), ("long", Self::Long)];
}

/// Width of unit names, weekday names and similar text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextWidth {
    #[default]
    Short,
    Long,
    Narrow,
}

impl TextWidth {
    const KEYWORDS: &'static [(&'static str, Self)] = &[
        ("short", Self::Short),
        ("long", Self::Long),
        ("narrow", Self::Narrow),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextWidth::Short => "short",
            TextWidth::Long => "long",
            TextWidth::Narrow => "narrow",
        }
    }
}

/// Options for [`format_number`](crate::format_number)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberFormatOptions {
    pub style: NumberStyle,
    pub notation: Notation,
    /// ISO 4217 code, required by the currency style
    pub currency: Option<String>,
    pub currency_display: CurrencyDisplay,
    /// Unit identifier such as `kilometer`, required by the unit style
    pub unit: Option<String>,
    pub unit_display: TextWidth,
    pub compact_display: CompactDisplay,
    pub minimum_integer_digits: Option<usize>,
    pub minimum_fraction_digits: Option<usize>,
    pub maximum_fraction_digits: Option<usize>,
    pub use_grouping: Option<bool>,
    /// Explicit CLDR decimal pattern, overriding the style pattern
    pub pattern: Option<String>,
}

impl NumberFormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: NumberStyle) -> Self {
        self.style = style;
        self
    }

    pub fn notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    pub fn currency_display(mut self, display: CurrencyDisplay) -> Self {
        self.currency_display = display;
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn unit_display(mut self, width: TextWidth) -> Self {
        self.unit_display = width;
        self
    }

    pub fn compact_display(mut self, display: CompactDisplay) -> Self {
        self.compact_display = display;
        self
    }

    pub fn minimum_integer_digits(mut self, digits: usize) -> Self {
        self.minimum_integer_digits = Some(digits);
        self
    }

    pub fn minimum_fraction_digits(mut self, digits: usize) -> Self {
        self.minimum_fraction_digits = Some(digits);
        self
    }

    pub fn maximum_fraction_digits(mut self, digits: usize) -> Self {
        self.maximum_fraction_digits = Some(digits);
        self
    }

    pub fn use_grouping(mut self, grouping: bool) -> Self {
        self.use_grouping = Some(grouping);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Build options from string key/value pairs.
    pub fn from_args<'a>(args: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in args {
            match key {
                "style" => options.style = parse_keyword(key, value, NumberStyle::KEYWORDS)?,
                "notation" => options.notation = parse_keyword(key, value, Notation::KEYWORDS)?,
                "currency" => options.currency = Some(value.to_string()),
                "currencyDisplay" => {
                    options.currency_display = parse_keyword(key, value, CurrencyDisplay::KEYWORDS)?
                }
                "unit" => options.unit = Some(value.to_string()),
                "unitDisplay" => options.unit_display = parse_keyword(key, value, TextWidth::KEYWORDS)?,
                "compactDisplay" => {
                    options.compact_display = parse_keyword(key, value, CompactDisplay::KEYWORDS)?
                }
                "minimumIntegerDigits" => options.minimum_integer_digits = Some(parse_digits(key, value)?),
                "minimumFractionDigits" => {
                    options.minimum_fraction_digits = Some(parse_digits(key, value)?)
                }
                "maximumFractionDigits" => {
                    options.maximum_fraction_digits = Some(parse_digits(key, value)?)
                }
                "useGrouping" => options.use_grouping = Some(parse_bool(key, value)?),
                "pattern" => options.pattern = Some(value.to_string()),
                other => debug!(key = other, "ignoring unknown number option"),
            }
        }
        options.validate()?;
        Ok(options)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        for (key, digits) in [
            ("minimumIntegerDigits", self.minimum_integer_digits),
            ("minimumFractionDigits", self.minimum_fraction_digits),
            ("maximumFractionDigits", self.maximum_fraction_digits),
        ] {
            if let Some(d) = digits {
                if d > MAX_FRACTION_DIGITS || (key == "minimumIntegerDigits" && d == 0) {
                    return Err(FormatError::invalid_option(
                        key,
                        format!("{d} is out of range"),
                    ));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.minimum_fraction_digits, self.maximum_fraction_digits) {
            if min > max {
                return Err(FormatError::invalid_option(
                    "minimumFractionDigits",
                    format!("minimum {min} exceeds maximum {max}"),
                ));
            }
        }
        if self.style == NumberStyle::Currency && self.currency.is_none() {
            return Err(FormatError::invalid_option(
                "currency",
                "currency style requires a currency code",
            ));
        }
        if self.style == NumberStyle::Unit && self.unit.is_none() {
            return Err(FormatError::invalid_option(
                "unit",
                "unit style requires a unit identifier",
            ));
        }
        Ok(())
    }
}

/// Predefined date or time length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateTimeStyle {
    Full,
    Long,
    Medium,
    Short,
}

impl DateTimeStyle {
    const KEYWORDS: &'static [(&'static str, Self)] = &[
        ("full", Self::Full),
        ("long", Self::Long),
        ("medium", Self::Medium),
        ("short", Self::Short),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DateTimeStyle::Full => "full",
            DateTimeStyle::Long => "long",
            DateTimeStyle::Medium => "medium",
            DateTimeStyle::Short => "short",
        }
    }
}

/// Width of numeric date/time fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum NumericWidth {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
}

impl NumericWidth {
    const KEYWORDS: &'static [(&'static str, Self)] = &[("numeric", Self::Numeric), ("2-digit", Self::TwoDigit)];
}

/// Width of the month field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MonthWidth {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "narrow")]
    Narrow,
}

impl MonthWidth {
    const KEYWORDS: &'static [(&'static str, Self)] = &[
        ("numeric", Self::Numeric),
        ("2-digit", Self::TwoDigit),
        ("short", Self::Short),
        ("long", Self::Long),
        ("narrow", Self::Narrow),
    ];
}

/// How the time zone name is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeZoneName {
    Short,
    Long,
    ShortOffset,
    LongOffset,
    ShortGeneric,
    LongGeneric,
}

impl TimeZoneName {
    const KEYWORDS: &'static [(&'static str, Self)] = &[
        ("short", Self::Short),
        ("long", Self::Long),
        ("shortOffset", Self::ShortOffset),
        ("longOffset", Self::LongOffset),
        ("shortGeneric", Self::ShortGeneric),
        ("longGeneric", Self::LongGeneric),
    ];
}

/// Options for [`format_datetime`](crate::format_datetime)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateTimeFormatOptions {
    pub date_style: Option<DateTimeStyle>,
    pub time_style: Option<DateTimeStyle>,
    pub weekday: Option<TextWidth>,
    pub year: Option<NumericWidth>,
    pub month: Option<MonthWidth>,
    pub day: Option<NumericWidth>,
    pub hour: Option<NumericWidth>,
    pub minute: Option<NumericWidth>,
    pub second: Option<NumericWidth>,
    pub time_zone_name: Option<TimeZoneName>,
    /// Force a 12-hour (`true`) or 24-hour (`false`) clock
    pub hour12: Option<bool>,
    /// IANA id, `UTC`/`GMT`, or a fixed offset like `+05:30`
    pub time_zone: Option<String>,
    /// Explicit CLDR date/time pattern, overriding styles and fields
    pub pattern: Option<String>,
}

impl DateTimeFormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_style(mut self, style: DateTimeStyle) -> Self {
        self.date_style = Some(style);
        self
    }

    pub fn time_style(mut self, style: DateTimeStyle) -> Self {
        self.time_style = Some(style);
        self
    }

    pub fn weekday(mut self, width: TextWidth) -> Self {
        self.weekday = Some(width);
        self
    }

    pub fn year(mut self, width: NumericWidth) -> Self {
        self.year = Some(width);
        self
    }

    pub fn month(mut self, width: MonthWidth) -> Self {
        self.month = Some(width);
        self
    }

    pub fn day(mut self, width: NumericWidth) -> Self {
        self.day = Some(width);
        self
    }

    pub fn hour(mut self, width: NumericWidth) -> Self {
        self.hour = Some(width);
        self
    }

    pub fn minute(mut self, width: NumericWidth) -> Self {
        self.minute = Some(width);
        self
    }

    pub fn second(mut self, width: NumericWidth) -> Self {
        self.second = Some(width);
        self
    }

    pub fn time_zone_name(mut self, name: TimeZoneName) -> Self {
        self.time_zone_name = Some(name);
        self
    }

    pub fn hour12(mut self, hour12: bool) -> Self {
        self.hour12 = Some(hour12);
        self
    }

    pub fn time_zone(mut self, zone: impl Into<String>) -> Self {
        self.time_zone = Some(zone.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Whether any individual field was requested
    pub fn has_fields(&self) -> bool {
        self.weekday.is_some()
            || self.year.is_some()
            || self.month.is_some()
            || self.day.is_some()
            || self.hour.is_some()
            || self.minute.is_some()
            || self.second.is_some()
            || self.time_zone_name.is_some()
    }

    /// Build options from string key/value pairs.
    pub fn from_args<'a>(args: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in args {
            match key {
                "dateStyle" => options.date_style = Some(parse_keyword(key, value, DateTimeStyle::KEYWORDS)?),
                "timeStyle" => options.time_style = Some(parse_keyword(key, value, DateTimeStyle::KEYWORDS)?),
                "weekday" => options.weekday = Some(parse_keyword(key, value, TextWidth::KEYWORDS)?),
                "year" => options.year = Some(parse_keyword(key, value, NumericWidth::KEYWORDS)?),
                "month" => options.month = Some(parse_keyword(key, value, MonthWidth::KEYWORDS)?),
                "day" => options.day = Some(parse_keyword(key, value, NumericWidth::KEYWORDS)?),
                "hour" => options.hour = Some(parse_keyword(key, value, NumericWidth::KEYWORDS)?),
                "minute" => options.minute = Some(parse_keyword(key, value, NumericWidth::KEYWORDS)?),
                "second" => options.second = Some(parse_keyword(key, value, NumericWidth::KEYWORDS)?),
                "timeZoneName" => {
                    options.time_zone_name = Some(parse_keyword(key, value, TimeZoneName::KEYWORDS)?)
                }
                "hour12" => options.hour12 = Some(parse_bool(key, value)?),
                "timeZone" => options.time_zone = Some(value.to_string()),
                "pattern" => options.pattern = Some(value.to_string()),
                other => debug!(key = other, "ignoring unknown date/time option"),
            }
        }
        options.validate()?;
        Ok(options)
    }

    /// Styles and individual fields are mutually exclusive
    pub fn validate(&self) -> Result<()> {
        if (self.date_style.is_some() || self.time_style.is_some()) && self.has_fields() {
            return Err(FormatError::invalid_option(
                "dateStyle",
                "cannot be combined with individual date/time fields",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_map_to_fields() {
        let options = NumberFormatOptions::from_args([
            ("style", "currency"),
            ("currency", "EUR"),
            ("maximumFractionDigits", "1"),
            ("somethingElse", "x"),
        ])
        .unwrap();
        assert_eq!(options.style, NumberStyle::Currency);
        assert_eq!(options.currency.as_deref(), Some("EUR"));
        assert_eq!(options.maximum_fraction_digits, Some(1));
    }

    #[test]
    fn invalid_keyword_names_the_key() {
        let err = NumberFormatOptions::from_args([("notation", "fancy")]).unwrap_err();
        assert!(matches!(err, FormatError::InvalidOption { ref key, .. } if key == "notation"));
    }

    #[test]
    fn min_above_max_is_rejected() {
        let err = NumberFormatOptions::from_args([
            ("minimumFractionDigits", "3"),
            ("maximumFractionDigits", "1"),
        ])
        .unwrap_err();
        assert!(matches!(err, FormatError::InvalidOption { .. }));
    }

    #[test]
    fn datetime_args() {
        let options =
            DateTimeFormatOptions::from_args([("month", "2-digit"), ("hour12", "true")]).unwrap();
        assert_eq!(options.month, Some(MonthWidth::TwoDigit));
        assert_eq!(options.hour12, Some(true));
        assert!(DateTimeFormatOptions::from_args([("dateStyle", "short"), ("year", "numeric")]).is_err());
    }
}
