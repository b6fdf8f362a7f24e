//! CLDR plural category selection.
//!
//! Rules come from the `plural_rules` supplemental domain and are parsed
//! once per language. Operands are derived from the decimal text of the
//! number, so `1` and `1.0` may select different categories.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use rust_decimal::Decimal;
use toml::Value;
use tracing::trace;

use crate::error::{FormatError, Result};
use crate::locale::{Domain, LocaleDataResolver};
use crate::parser::parse_plural_condition;
use crate::parser::plural::{Operand, PluralCondition, RangeItem, Relation};

/// Plural category, in CLDR evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// Categories that carry a rule, in evaluation order
    const RULED: [PluralCategory; 5] = [
        PluralCategory::Zero,
        PluralCategory::One,
        PluralCategory::Two,
        PluralCategory::Few,
        PluralCategory::Many,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operands of a number as defined by CLDR plural rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralOperands {
    pub n: Decimal,
    pub i: Decimal,
    pub v: usize,
    pub w: usize,
    pub f: Decimal,
    pub t: Decimal,
    pub e: u32,
}

impl PluralOperands {
    pub fn from_decimal(value: Decimal) -> Self {
        let n = value.abs();
        let text = n.to_string();
        let (_, fraction) = text.split_once('.').unwrap_or((&text, ""));
        let trimmed = fraction.trim_end_matches('0');
        let as_decimal = |digits: &str| digits.parse::<Decimal>().unwrap_or(Decimal::ZERO);
        PluralOperands {
            n,
            i: n.trunc(),
            v: fraction.len(),
            w: trimmed.len(),
            f: as_decimal(fraction),
            t: as_decimal(trimmed),
            e: 0,
        }
    }

    fn get(&self, operand: Operand) -> Decimal {
        match operand {
            Operand::N => self.n,
            Operand::I => self.i,
            Operand::V => Decimal::from(self.v as u64),
            Operand::W => Decimal::from(self.w as u64),
            Operand::F => self.f,
            Operand::T => self.t,
            Operand::E => Decimal::from(self.e),
        }
    }
}

impl From<i64> for PluralOperands {
    fn from(value: i64) -> Self {
        PluralOperands::from_decimal(Decimal::from(value))
    }
}

fn relation_matches(relation: &Relation, operands: &PluralOperands) -> bool {
    let mut value = operands.get(relation.operand);
    if let Some(modulus) = relation.modulus.filter(|m| *m != 0) {
        value %= Decimal::from(modulus);
    }
    let is_integer = value.fract().is_zero();
    let hit = relation.ranges.iter().any(|range| match *range {
        RangeItem::Value(x) => value == Decimal::from(x),
        RangeItem::Range(lo, hi) => {
            (relation.within || is_integer)
                && value >= Decimal::from(lo)
                && value <= Decimal::from(hi)
        }
    });
    hit != relation.negated
}

fn condition_matches(condition: &PluralCondition, operands: &PluralOperands) -> bool {
    condition
        .or_groups
        .iter()
        .any(|group| group.iter().all(|r| relation_matches(r, operands)))
}

/// Parsed plural rules of one language
#[derive(Debug, Clone, Default)]
pub struct PluralRules {
    rules: Vec<(PluralCategory, PluralCondition)>,
}

impl PluralRules {
    /// Build rules from a `{ category = "condition" }` table
    pub fn from_table(language: &str, table: &toml::Table) -> Result<Self> {
        let mut rules = Vec::new();
        for category in PluralCategory::RULED {
            let Some(text) = table.get(category.as_str()).and_then(Value::as_str) else {
                continue;
            };
            let condition = parse_plural_condition(text).map_err(|reason| {
                FormatError::MalformedData {
                    locale: language.to_string(),
                    domain: Domain::PluralRules,
                    reason,
                }
            })?;
            rules.push((category, condition));
        }
        Ok(PluralRules { rules })
    }

    /// First category whose condition matches, `Other` when none does
    pub fn category(&self, operands: &PluralOperands) -> PluralCategory {
        self.rules
            .iter()
            .find(|(_, condition)| condition_matches(condition, operands))
            .map_or(PluralCategory::Other, |(category, _)| *category)
    }
}

/// Per-language cache of parsed plural rules
#[derive(Debug, Default)]
pub struct PluralRuleCache {
    rules: RwLock<HashMap<String, Arc<PluralRules>>>,
}

impl PluralRuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for `locale`, taken from the most specific chain entry that
    /// has any; languages without rules only know `other`.
    pub fn rules_for(&self, resolver: &LocaleDataResolver, locale: &str) -> Result<Arc<PluralRules>> {
        if let Some(rules) = self
            .rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(locale)
        {
            return Ok(Arc::clone(rules));
        }

        let chain = resolver.inheritance_chain(locale)?;
        let mut ids: Vec<String> = chain
            .locales()
            .iter()
            .filter(|tag| !tag.is_root())
            .map(|tag| tag.cldr_id())
            .collect();
        ids.push(chain.requested().language().to_string());
        ids.push("root".to_string());

        let mut parsed = PluralRules::default();
        for id in ids {
            if let Some(Value::Table(table)) = resolver.supplemental(Domain::PluralRules, &id)? {
                trace!(locale, rules = %id, "loaded plural rules");
                parsed = PluralRules::from_table(&id, &table)?;
                break;
            }
        }

        let parsed = Arc::new(parsed);
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(locale.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }

    pub fn category(
        &self,
        resolver: &LocaleDataResolver,
        locale: &str,
        value: Decimal,
    ) -> Result<PluralCategory> {
        Ok(self
            .rules_for(resolver, locale)?
            .category(&PluralOperands::from_decimal(value)))
    }
}
