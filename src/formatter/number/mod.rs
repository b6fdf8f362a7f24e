//! Number formatting engine.
//!
//! A call picks a base pattern (explicit, notation specific or style
//! specific), renders the absolute value into a digit body, places the body
//! into the positive or negative section of the pattern, and finally wraps
//! the text for currency names or measurement units.

mod compact;
mod digits;
mod exponential;
mod value;

use rust_decimal::Decimal;
use toml::Value;
use tracing::debug;

use self::compact::{CompactTable, choose};
use self::digits::{DigitSpec, render_digits};
use self::exponential::{ExponentSpec, format_exponential};
use self::value::Numeric;
use crate::cache::PatternCache;
use crate::error::{FormatError, Result};
use crate::locale::{Domain, LocaleDataResolver};
use crate::options::{
    CompactDisplay, CurrencyDisplay, Notation, NumberFormatOptions, NumberStyle, TextWidth,
};
use crate::parser::parse_number_pattern;
use crate::plural::{PluralCategory, PluralOperands, PluralRuleCache};
use crate::types::{CurrencyWidth, DigitLayout, NumberPattern, PatternSection, PatternToken};

pub use self::value::NumberValue;

/// Fraction digits for currencies without an entry in `currency_data`
const DEFAULT_CURRENCY_DIGITS: usize = 2;

/// `10^exponent` as a decimal, `None` beyond decimal range
pub(crate) fn pow10(exponent: u32) -> Option<Decimal> {
    let power = 10i128.checked_pow(exponent)?;
    Decimal::try_from_i128_with_scale(power, 0).ok()
}

/// Number symbols of a locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Symbols {
    pub decimal: String,
    pub group: String,
    pub percent: String,
    pub per_mille: String,
    pub plus: String,
    pub minus: String,
    pub exponential: String,
    pub infinity: String,
    pub nan: String,
}

#[cfg(test)]
impl Default for Symbols {
    fn default() -> Self {
        Symbols {
            decimal: ".".into(),
            group: ",".into(),
            percent: "%".into(),
            per_mille: "‰".into(),
            plus: "+".into(),
            minus: "-".into(),
            exponential: "E".into(),
            infinity: "∞".into(),
            nan: "NaN".into(),
        }
    }
}

impl Symbols {
    /// Every symbol must resolve somewhere along the chain, root included
    pub(crate) fn load(resolver: &LocaleDataResolver, locale: &str) -> Result<Self> {
        let symbol = |key: &str| {
            resolver.require_str(locale, Domain::NumberFormats, &format!("symbols.{key}"))
        };
        Ok(Symbols {
            decimal: symbol("decimal")?,
            group: symbol("group")?,
            percent: symbol("percent")?,
            per_mille: symbol("per_mille")?,
            plus: symbol("plus")?,
            minus: symbol("minus")?,
            exponential: symbol("exponential")?,
            infinity: symbol("infinity")?,
            nan: symbol("nan")?,
        })
    }
}

/// Localized texts of the requested currency
#[derive(Debug, Clone)]
struct CurrencyTexts {
    code: String,
    symbol: String,
    narrow: String,
    name: String,
}

impl CurrencyTexts {
    fn for_width(&self, width: CurrencyWidth, display: CurrencyDisplay) -> &str {
        match (width, display) {
            (CurrencyWidth::Code, _) => &self.code,
            (CurrencyWidth::Name, _) => &self.name,
            (CurrencyWidth::Symbol, CurrencyDisplay::Code) => &self.code,
            (CurrencyWidth::Symbol, CurrencyDisplay::Name) => &self.name,
            (CurrencyWidth::Symbol, CurrencyDisplay::NarrowSymbol) => &self.narrow,
            (CurrencyWidth::Symbol, _) => &self.symbol,
        }
    }
}

fn normalize_currency(code: &str) -> Result<String> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FormatError::invalid_option(
            "currency",
            format!("`{code}` is not an ISO 4217 code"),
        ));
    }
    Ok(code.to_ascii_uppercase())
}

/// Apply a lone minimum or maximum on top of the defaults
fn fraction_range(options: &NumberFormatOptions, defaults: (usize, usize)) -> Result<(usize, usize)> {
    let (min, max) = match (options.minimum_fraction_digits, options.maximum_fraction_digits) {
        (Some(min), Some(max)) => (min, max),
        (Some(min), None) => (min, defaults.1.max(min)),
        (None, Some(max)) => (defaults.0.min(max), max),
        (None, None) => defaults,
    };
    if min > max {
        return Err(FormatError::invalid_option(
            "minimumFractionDigits",
            format!("minimum {min} exceeds maximum {max}"),
        ));
    }
    Ok((min, max))
}

/// Replace the number block of `section` with `block`
fn splice_number_block(section: &PatternSection, block: &[PatternToken]) -> PatternSection {
    let Some((start, end)) = section.number_span() else {
        return section.clone();
    };
    let mut tokens = section.tokens[..start].to_vec();
    tokens.extend_from_slice(block);
    tokens.extend_from_slice(&section.tokens[end..]);
    PatternSection { tokens }
}

fn number_block(section: &PatternSection) -> &[PatternToken] {
    match section.number_span() {
        Some((start, end)) => &section.tokens[start..end],
        None => &[],
    }
}

fn placeholder_count(section: &PatternSection) -> usize {
    section
        .tokens
        .iter()
        .map(|t| match t {
            PatternToken::Digit { count, .. } => *count,
            _ => 0,
        })
        .sum()
}

fn starts_with_letter(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_alphabetic)
}

fn ends_with_letter(text: &str) -> bool {
    text.chars().next_back().is_some_and(char::is_alphabetic)
}

fn starts_with_digit(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_numeric())
}

fn ends_with_digit(text: &str) -> bool {
    text.chars().next_back().is_some_and(|c| c.is_numeric())
}

/// Inserted between a currency word and adjacent digits
const CURRENCY_SPACING: char = '\u{00A0}';

/// Lay out one pattern section around a rendered number body.
///
/// `sign` is emitted at the synthesized sign position; explicit `+`/`-`
/// tokens always render the locale symbols.
fn render_section(
    section: &PatternSection,
    body: &str,
    sign: Option<&str>,
    symbols: &Symbols,
    currency: Option<(&CurrencyTexts, CurrencyDisplay)>,
) -> String {
    let span = section.number_span();
    let sign_at = sign.map(|s| (section.sign_position(), s));
    let mut out = String::new();

    for (index, token) in section.tokens.iter().enumerate() {
        if let Some((position, text)) = sign_at {
            if position == index {
                out.push_str(text);
            }
        }
        if let Some((start, end)) = span {
            if index == start {
                out.push_str(body);
            }
            if index >= start && index < end {
                continue;
            }
        }
        match token {
            PatternToken::Currency(width) => {
                let text = match currency {
                    Some((texts, display)) => texts.for_width(*width, display),
                    None => "¤",
                };
                let before_number = span.is_some_and(|(start, _)| start == index + 1);
                let after_number = span.is_some_and(|(_, end)| end == index);
                if after_number && ends_with_digit(body) && starts_with_letter(text) {
                    out.push(CURRENCY_SPACING);
                }
                out.push_str(text);
                if before_number && ends_with_letter(text) && starts_with_digit(body) {
                    out.push(CURRENCY_SPACING);
                }
            }
            PatternToken::Percent => out.push_str(&symbols.percent),
            PatternToken::PerMille => out.push_str(&symbols.per_mille),
            PatternToken::Plus => out.push_str(&symbols.plus),
            PatternToken::Minus => out.push_str(&symbols.minus),
            PatternToken::Literal(text) | PatternToken::Quoted(text) => out.push_str(text),
            PatternToken::PatternSeparator
            | PatternToken::Digit { .. }
            | PatternToken::Group
            | PatternToken::Decimal
            | PatternToken::Exponent { .. } => {}
        }
    }

    if let Some((position, text)) = sign_at {
        if position >= section.tokens.len() {
            out.push_str(text);
        }
    }
    if span.is_none() {
        out.push_str(body);
    }
    out
}

/// How the digit body of a value is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Standard,
    Exponential { engineering: bool },
    Compact,
}

/// Number formatting over a resolver and the shared caches of a formatter
pub(crate) struct NumberEngine<'a> {
    pub resolver: &'a LocaleDataResolver,
    pub patterns: &'a PatternCache<NumberPattern>,
    pub plurals: &'a PluralRuleCache,
}

impl NumberEngine<'_> {
    fn pattern(&self, text: &str) -> std::sync::Arc<NumberPattern> {
        self.patterns.get_or_parse(text, parse_number_pattern)
    }

    fn category(&self, locale: &str, operands: &PluralOperands) -> Result<PluralCategory> {
        Ok(self.plurals.rules_for(self.resolver, locale)?.category(operands))
    }

    fn currency_digits(&self, code: &str) -> Result<usize> {
        for key in [code, "DEFAULT"] {
            if let Some(Value::Integer(digits)) =
                self.resolver.supplemental(Domain::CurrencyData, &format!("{key}.digits"))?
            {
                return Ok(usize::try_from(digits).unwrap_or(DEFAULT_CURRENCY_DIGITS));
            }
        }
        Ok(DEFAULT_CURRENCY_DIGITS)
    }

    fn currency_texts(
        &self,
        locale: &str,
        code: &str,
        category: PluralCategory,
    ) -> Result<CurrencyTexts> {
        let lookup = |path: String| self.resolver.resolve_str(locale, Domain::Currencies, &path);
        let symbol = lookup(format!("{code}.symbol"))?;
        if symbol.is_none() {
            debug!(locale, code, "no localized currency data, echoing the code");
        }
        let symbol = symbol.unwrap_or_else(|| code.to_string());
        let narrow = lookup(format!("{code}.narrow"))?.unwrap_or_else(|| symbol.clone());
        let mut name = None;
        for path in [
            format!("{code}.name.{category}"),
            format!("{code}.name.other"),
            format!("{code}.display_name"),
        ] {
            if let Some(found) = lookup(path)? {
                name = Some(found);
                break;
            }
        }
        Ok(CurrencyTexts {
            code: code.to_string(),
            symbol,
            narrow,
            name: name.unwrap_or_else(|| code.to_string()),
        })
    }

    /// Style pattern text before any notation is applied
    fn style_pattern(&self, locale: &str, options: &NumberFormatOptions) -> Result<String> {
        let path = match options.style {
            // the name is added afterwards through the unit pattern
            NumberStyle::Currency if options.currency_display == CurrencyDisplay::Name => {
                "decimal_formats.standard"
            }
            NumberStyle::Currency if options.currency_display == CurrencyDisplay::Accounting => {
                "currency_formats.accounting"
            }
            NumberStyle::Currency => "currency_formats.standard",
            NumberStyle::Percent => "percent_formats.standard",
            NumberStyle::Decimal | NumberStyle::Unit => "decimal_formats.standard",
        };
        self.resolver.require_str(locale, Domain::NumberFormats, path)
    }

    /// Combine the style pattern with the locale's scientific number block
    fn exponential_pattern(&self, locale: &str, style: &NumberPattern) -> Result<NumberPattern> {
        let text = self
            .resolver
            .require_str(locale, Domain::NumberFormats, "scientific_formats.standard")?;
        let scientific = self.pattern(&text);
        let block = number_block(&scientific.positive);
        Ok(NumberPattern {
            positive: splice_number_block(&style.positive, block),
            negative: style
                .negative
                .as_ref()
                .map(|section| splice_number_block(section, block)),
        })
    }

    fn compact_table(&self, locale: &str, display: CompactDisplay) -> Result<CompactTable> {
        let long = self
            .resolver
            .resolve(locale, Domain::NumberFormats, "decimal_formats.long")?;
        let short = || self.resolver.resolve(locale, Domain::NumberFormats, "decimal_formats.short");
        let table = match display {
            CompactDisplay::Long => match CompactTable::from_value(long) {
                table if table.is_empty() => CompactTable::from_value(short()?),
                table => table,
            },
            CompactDisplay::Short => CompactTable::from_value(short()?),
        };
        Ok(table)
    }

    /// Render the compact body and return it with the rounded scaled value
    fn compact_body(
        &self,
        locale: &str,
        value: Decimal,
        options: &NumberFormatOptions,
        symbols: &Symbols,
    ) -> Result<(String, PluralOperands)> {
        let table = self.compact_table(locale, options.compact_display)?;
        let fraction_override = match (options.minimum_fraction_digits, options.maximum_fraction_digits) {
            (None, None) => None,
            _ => Some(fraction_range(options, (0, 0))?),
        };
        let describe = |pattern: &str| {
            let parsed = self.pattern(pattern);
            (parsed.positive.literal_text(), placeholder_count(&parsed.positive))
        };
        let choice = choose(&table, value, fraction_override, describe).ok_or_else(|| {
            FormatError::InvalidValue(format!("{value} is outside the decimal range"))
        })?;

        let spec = DigitSpec {
            min_integer: options.minimum_integer_digits.unwrap_or(1),
            min_fraction: fraction_override.map_or(0, |(min, _)| min),
            max_fraction: choice.max_fraction,
            grouping: None,
        };
        let digits = render_digits(choice.rounded, &spec, symbols);
        let mut operands = PluralOperands::from_decimal(choice.rounded);
        operands.e = choice.base_exponent;

        let Some(index) = choice.entry else {
            return Ok((digits, operands));
        };
        let category = self.category(locale, &operands)?;
        let entry = table.entry(index);
        let Some(text) = entry.pattern(category) else {
            return Ok((digits, operands));
        };
        let compact = self.pattern(text);
        Ok((render_section(&compact.positive, &digits, None, symbols, None), operands))
    }

    fn unit_text(
        &self,
        locale: &str,
        unit: &str,
        width: TextWidth,
        category: PluralCategory,
        number: &str,
    ) -> Result<String> {
        let widths = match width {
            TextWidth::Long => [TextWidth::Long, TextWidth::Short, TextWidth::Narrow],
            TextWidth::Short => [TextWidth::Short, TextWidth::Narrow, TextWidth::Long],
            TextWidth::Narrow => [TextWidth::Narrow, TextWidth::Short, TextWidth::Long],
        };
        for width in widths {
            for category in [category, PluralCategory::Other] {
                let path = format!("{unit}.{}.{category}", width.as_str());
                if let Some(pattern) = self.resolver.resolve_str(locale, Domain::Units, &path)? {
                    return Ok(pattern.replace("{0}", number));
                }
            }
        }
        debug!(locale, unit, "no unit pattern, echoing the identifier");
        Ok(format!("{number} {unit}"))
    }

    pub(crate) fn format(
        &self,
        value: &NumberValue,
        locale: &str,
        options: &NumberFormatOptions,
    ) -> Result<String> {
        options.validate()?;
        let numeric = value.to_numeric()?;
        let symbols = Symbols::load(self.resolver, locale)?;
        let currency = options.currency.as_deref().map(normalize_currency).transpose()?;
        let currency_name_display = options.style == NumberStyle::Currency
            && options.currency_display == CurrencyDisplay::Name
            && options.pattern.is_none();

        let (pattern, mode) = match &options.pattern {
            Some(text) => {
                let pattern = self.pattern(text);
                let mode = if pattern.positive.digit_layout().exponent.is_some() {
                    Mode::Exponential {
                        engineering: options.notation == Notation::Engineering,
                    }
                } else {
                    Mode::Standard
                };
                ((*pattern).clone(), mode)
            }
            None => {
                let style = self.pattern(&self.style_pattern(locale, options)?);
                match options.notation {
                    Notation::Standard => ((*style).clone(), Mode::Standard),
                    Notation::Scientific | Notation::Engineering => {
                        let engineering = options.notation == Notation::Engineering;
                        (self.exponential_pattern(locale, &style)?, Mode::Exponential { engineering })
                    }
                    Notation::Compact => ((*style).clone(), Mode::Compact),
                }
            }
        };
        let layout: DigitLayout = pattern.positive.digit_layout();

        let percent = options.style == NumberStyle::Percent
            || pattern.positive.has_token(|t| *t == PatternToken::Percent);
        let per_mille = !percent && pattern.positive.has_token(|t| *t == PatternToken::PerMille);
        let multiplier = match (percent, per_mille) {
            (true, _) => Decimal::ONE_HUNDRED,
            (_, true) => Decimal::ONE_THOUSAND,
            _ => Decimal::ONE,
        };

        let currency_digits = match &currency {
            Some(code) if options.style == NumberStyle::Currency => Some(self.currency_digits(code)?),
            _ => None,
        };
        let default_fraction = match (mode, currency_digits) {
            _ if options.pattern.is_some() => (layout.min_fraction_digits, layout.max_fraction_digits),
            (Mode::Exponential { .. }, _) => (0, 3),
            (_, Some(digits)) => (digits, digits),
            _ => (layout.min_fraction_digits, layout.max_fraction_digits),
        };
        let grouping = match (layout.primary_grouping, options.use_grouping) {
            (_, Some(false)) | (None, _) => None,
            (Some(primary), _) => Some((primary, layout.secondary_grouping)),
        };

        let (body, display_operands) = match numeric {
            Numeric::NaN => (symbols.nan.clone(), None),
            Numeric::Infinite { .. } => (symbols.infinity.clone(), None),
            Numeric::Finite(raw) => {
                let scaled = raw.abs().checked_mul(multiplier).ok_or_else(|| {
                    FormatError::InvalidValue(format!("{raw} overflows when scaled"))
                })?;
                match mode {
                    Mode::Compact => {
                        let (body, operands) = self.compact_body(locale, scaled, options, &symbols)?;
                        (body, Some(operands))
                    }
                    Mode::Standard | Mode::Exponential { .. } => {
                        let (min_fraction, max_fraction) = fraction_range(options, default_fraction)?;
                        let spec = DigitSpec {
                            min_integer: options
                                .minimum_integer_digits
                                .unwrap_or(layout.min_integer_digits),
                            min_fraction,
                            max_fraction,
                            grouping,
                        };
                        if let Mode::Exponential { engineering } = mode {
                            let (digits, signed) = layout.exponent.unwrap_or((1, false));
                            let exponent = ExponentSpec {
                                digits,
                                signed,
                                engineering,
                            };
                            let body = format_exponential(scaled, &spec, exponent, &symbols)
                                .ok_or_else(|| {
                                    FormatError::InvalidValue(format!(
                                        "{raw} cannot be normalized"
                                    ))
                                })?;
                            (body, None)
                        } else {
                            // operands of the digits as displayed, zeros included
                            let mut shown = digits::round(scaled, max_fraction).normalize();
                            if shown.scale() < min_fraction as u32 {
                                shown.rescale(min_fraction as u32);
                            }
                            let operands = PluralOperands::from_decimal(shown);
                            (render_digits(scaled, &spec, &symbols), Some(operands))
                        }
                    }
                }
            }
        };

        // a value that rounds to zero is shown unsigned
        let negative = numeric.is_negative()
            && !display_operands.as_ref().is_some_and(|operands| operands.n.is_zero());

        let currency_texts = match &currency {
            Some(code) => {
                let category = self.currency_name_category(locale, &numeric)?;
                Some(self.currency_texts(locale, code, category)?)
            }
            None => None,
        };

        let (section, sign) = match (&pattern.negative, negative) {
            (Some(section), true) => (section, None),
            (None, true) => (&pattern.positive, Some(symbols.minus.as_str())),
            _ => (&pattern.positive, None),
        };
        let text = render_section(
            section,
            &body,
            sign,
            &symbols,
            currency_texts.as_ref().map(|c| (c, options.currency_display)),
        );

        if currency_name_display {
            if let Some(texts) = &currency_texts {
                let category = self.currency_name_category(locale, &numeric)?;
                let specific = self.resolver.resolve_str(
                    locale,
                    Domain::NumberFormats,
                    &format!("currency_formats.unit_pattern.{category}"),
                )?;
                let unit_pattern = match specific {
                    Some(pattern) => pattern,
                    None => self.resolver.require_str(
                        locale,
                        Domain::NumberFormats,
                        "currency_formats.unit_pattern.other",
                    )?,
                };
                return Ok(unit_pattern.replace("{0}", &text).replace("{1}", &texts.name));
            }
        }

        if options.style == NumberStyle::Unit {
            if let Some(unit) = &options.unit {
                let category = match &display_operands {
                    Some(operands) => self.category(locale, operands)?,
                    None => PluralCategory::Other,
                };
                return self.unit_text(locale, unit, options.unit_display, category, &text);
            }
        }
        Ok(text)
    }

    /// Currency names agree with the value as given, not as rounded
    fn currency_name_category(&self, locale: &str, numeric: &Numeric) -> Result<PluralCategory> {
        match numeric {
            Numeric::Finite(raw) => self.category(locale, &PluralOperands::from_decimal(*raw)),
            _ => Ok(PluralCategory::Other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_bounds_adjust_the_other_side() {
        let options = NumberFormatOptions::new().minimum_fraction_digits(5);
        assert_eq!(fraction_range(&options, (0, 3)).unwrap(), (5, 5));
        let options = NumberFormatOptions::new().maximum_fraction_digits(1);
        assert_eq!(fraction_range(&options, (2, 2)).unwrap(), (1, 1));
    }

    #[test]
    fn currency_codes_are_validated() {
        assert_eq!(normalize_currency("usd").unwrap(), "USD");
        assert!(normalize_currency("US$").is_err());
    }

    #[test]
    fn sign_goes_before_abutting_currency() {
        let pattern = parse_number_pattern("¤#,##0.00");
        let texts = CurrencyTexts {
            code: "USD".into(),
            symbol: "$".into(),
            narrow: "$".into(),
            name: "US dollars".into(),
        };
        let out = render_section(
            &pattern.positive,
            "12.00",
            Some("-"),
            &Symbols::default(),
            Some((&texts, CurrencyDisplay::Symbol)),
        );
        assert_eq!(out, "-$12.00");
    }

    #[test]
    fn currency_words_get_spacing() {
        let pattern = parse_number_pattern("¤#,##0.00");
        let texts = CurrencyTexts {
            code: "CHF".into(),
            symbol: "CHF".into(),
            narrow: "CHF".into(),
            name: "Swiss francs".into(),
        };
        let out = render_section(
            &pattern.positive,
            "5.00",
            None,
            &Symbols::default(),
            Some((&texts, CurrencyDisplay::Symbol)),
        );
        assert_eq!(out, "CHF\u{a0}5.00");
    }

    #[test]
    fn splicing_keeps_affixes() {
        let style = parse_number_pattern("#,##0%");
        let scientific = parse_number_pattern("#E0");
        let spliced = splice_number_block(&style.positive, number_block(&scientific.positive));
        let text: String = spliced.tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(text, "#E0%");
    }
}
