//! Compact notation (`1.5K`, `2 Millionen`).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use toml::{Table, Value};
use tracing::trace;

use super::digits::round;
use super::exponential::magnitude;
use super::pow10;
use crate::plural::PluralCategory;

/// Patterns of one magnitude, keyed by plural category
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct CompactEntry {
    pub exponent: u32,
    patterns: BTreeMap<String, String>,
}

impl CompactEntry {
    pub fn pattern(&self, category: PluralCategory) -> Option<&str> {
        self.patterns
            .get(category.as_str())
            .or_else(|| self.patterns.get("other"))
            .map(String::as_str)
    }
}

/// Threshold key such as `"10000"` to its power of ten
fn threshold_exponent(key: &str) -> Option<u32> {
    let zeros = key.strip_prefix('1')?;
    if !zeros.chars().all(|c| c == '0') {
        return None;
    }
    u32::try_from(zeros.len()).ok()
}

/// Compact magnitude table sorted by ascending threshold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct CompactTable {
    entries: Vec<CompactEntry>,
}

impl CompactTable {
    pub fn from_table(table: &Table) -> Self {
        let mut entries: Vec<CompactEntry> = table
            .iter()
            .filter_map(|(key, value)| {
                let exponent = threshold_exponent(key)?;
                let patterns = value
                    .as_table()?
                    .iter()
                    .filter_map(|(category, pattern)| {
                        Some((category.clone(), pattern.as_str()?.to_string()))
                    })
                    .collect();
                Some(CompactEntry { exponent, patterns })
            })
            .collect();
        entries.sort_by_key(|e| e.exponent);
        CompactTable { entries }
    }

    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            Some(Value::Table(table)) => Self::from_table(&table),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the largest threshold not above `value`
    pub fn select(&self, value: Decimal) -> Option<usize> {
        if value < Decimal::ONE {
            return None;
        }
        let magnitude = magnitude(value);
        self.entries
            .iter()
            .rposition(|e| i64::from(e.exponent) <= magnitude)
    }

    pub fn entry(&self, index: usize) -> &CompactEntry {
        &self.entries[index]
    }

    /// Smallest threshold whose `other` pattern has the given suffix text
    pub fn base_exponent(&self, suffix: &str, literal_text: impl Fn(&str) -> String) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.pattern(PluralCategory::Other).map(&literal_text).as_deref() == Some(suffix))
            .map(|e| e.exponent)
    }
}

/// Fraction digits used by compact rounding: two significant digits for
/// single placeholder patterns, integers otherwise.
pub(super) fn compact_fraction_digits(scaled: Decimal, placeholders: usize) -> usize {
    if placeholders > 1 {
        return 0;
    }
    let magnitude = magnitude(scaled);
    usize::try_from(1 - magnitude).unwrap_or(0)
}

/// Result of choosing a compact pattern for a value
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CompactChoice {
    /// Pattern index, `None` when the value stays uncompacted
    pub entry: Option<usize>,
    /// Power of ten the value was divided by
    pub base_exponent: u32,
    /// Value after division and rounding
    pub rounded: Decimal,
    pub max_fraction: usize,
}

/// Pick the pattern for `value` and round the scaled value.
///
/// `describe` maps a pattern to its literal text and digit placeholder
/// count. When rounding crosses into the next magnitude the selection is
/// redone with the rounded value.
pub(super) fn choose(
    table: &CompactTable,
    value: Decimal,
    fraction_override: Option<(usize, usize)>,
    describe: impl Fn(&str) -> (String, usize),
) -> Option<CompactChoice> {
    let mut target = value;
    for _ in 0..=table.entries.len() {
        let selected = table.select(target);
        let (base_exponent, placeholders) = match selected {
            Some(index) => {
                let other = table.entry(index).pattern(PluralCategory::Other)?;
                let (suffix, placeholders) = describe(other);
                if suffix.is_empty() {
                    (0, 1)
                } else {
                    let base = table
                        .base_exponent(&suffix, |p| describe(p).0)
                        .unwrap_or(table.entry(index).exponent);
                    (base, placeholders)
                }
            }
            None => (0, 1),
        };

        let scaled = target.checked_div(pow10(base_exponent)?)?;
        let max_fraction = match fraction_override {
            Some((_, max)) => max,
            None => compact_fraction_digits(scaled, placeholders),
        };
        let rounded = round(scaled, max_fraction);

        if magnitude(rounded) > magnitude(scaled) {
            let unscaled = rounded.checked_mul(pow10(base_exponent)?)?;
            if table.select(unscaled) != selected {
                trace!(%value, %unscaled, "compact rounding crossed a magnitude");
                target = unscaled;
                continue;
            }
        }

        let entry = selected.filter(|_| base_exponent > 0);
        return Some(CompactChoice {
            entry,
            base_exponent,
            rounded,
            max_fraction,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn english() -> CompactTable {
        let table: Table = r#"
            "1000" = { other = "0K" }
            "10000" = { other = "00K" }
            "100000" = { other = "000K" }
            "1000000" = { other = "0M" }
            "#
        .parse()
        .unwrap();
        CompactTable::from_table(&table)
    }

    fn describe(pattern: &str) -> (String, usize) {
        let suffix: String = pattern.chars().filter(|c| *c != '0').collect();
        let placeholders = pattern.chars().filter(|c| *c == '0').count();
        (suffix, placeholders)
    }

    #[test]
    fn thresholds_parse_as_powers_of_ten() {
        assert_eq!(threshold_exponent("1000"), Some(3));
        assert_eq!(threshold_exponent("1"), Some(0));
        assert_eq!(threshold_exponent("2000"), None);
    }

    #[test]
    fn picks_largest_threshold() {
        let choice = choose(&english(), dec("1500"), None, describe).unwrap();
        assert_eq!(choice.entry, Some(0));
        assert_eq!(choice.rounded, dec("1.5"));

        let choice = choose(&english(), dec("45678"), None, describe).unwrap();
        assert_eq!(choice.base_exponent, 3);
        assert_eq!(choice.rounded, dec("46"));
    }

    #[test]
    fn small_values_are_not_compacted() {
        let choice = choose(&english(), dec("999"), None, describe).unwrap();
        assert_eq!(choice.entry, None);
        assert_eq!(choice.rounded, dec("999"));
        let choice = choose(&english(), dec("1.234"), None, describe).unwrap();
        assert_eq!(choice.rounded, dec("1.2"));
    }

    #[test]
    fn rounding_into_next_magnitude_reselects() {
        let choice = choose(&english(), dec("999999"), None, describe).unwrap();
        assert_eq!(choice.base_exponent, 6);
        assert_eq!(choice.rounded, dec("1"));

        let choice = choose(&english(), dec("999.99"), None, describe).unwrap();
        assert_eq!(choice.entry, Some(0));
        assert_eq!(choice.rounded, dec("1"));
    }
}
