//! Parser for the CLDR plural rule condition syntax, e.g.
//! `i = 1 and v = 0` or `n % 10 = 2..4 and n % 100 != 12..14`.

use winnow::ascii::{dec_uint, space0, space1};
use winnow::combinator::{alt, opt, preceded, separated};
use winnow::{ModalResult, Parser};

/// Plural operand letters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Absolute value of the source number
    N,
    /// Integer digits
    I,
    /// Count of visible fraction digits, with trailing zeros
    V,
    /// Count of visible fraction digits, without trailing zeros
    W,
    /// Visible fraction digits as an integer, with trailing zeros
    F,
    /// Visible fraction digits as an integer, without trailing zeros
    T,
    /// Compact decimal exponent
    E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeItem {
    Value(u64),
    Range(u64, u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub operand: Operand,
    pub modulus: Option<u64>,
    pub negated: bool,
    /// `within` accepts non-integer values between the bounds
    pub within: bool,
    pub ranges: Vec<RangeItem>,
}

/// Disjunction of conjunctions of relations
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PluralCondition {
    pub or_groups: Vec<Vec<Relation>>,
}

fn integer(input: &mut &str) -> ModalResult<u64> {
    dec_uint.parse_next(input)
}

fn operand(input: &mut &str) -> ModalResult<Operand> {
    alt((
        'n'.value(Operand::N),
        'i'.value(Operand::I),
        'v'.value(Operand::V),
        'w'.value(Operand::W),
        'f'.value(Operand::F),
        't'.value(Operand::T),
        'e'.value(Operand::E),
        'c'.value(Operand::E),
    ))
    .parse_next(input)
}

fn modulus(input: &mut &str) -> ModalResult<Option<u64>> {
    opt(preceded((space0, alt(("%", "mod")), space0), integer)).parse_next(input)
}

/// Returns `(negated, within)`
fn operator(input: &mut &str) -> ModalResult<(bool, bool)> {
    alt((
        "!=".value((true, false)),
        "=".value((false, false)),
        ("is", space1, "not").value((true, false)),
        "is".value((false, false)),
        ("not", space1, "in").value((true, false)),
        ("not", space1, "within").value((true, true)),
        "in".value((false, false)),
        "within".value((false, true)),
    ))
    .parse_next(input)
}

fn range_item(input: &mut &str) -> ModalResult<RangeItem> {
    (integer, opt(preceded("..", integer)))
        .map(|(start, end)| match end {
            Some(end) => RangeItem::Range(start, end),
            None => RangeItem::Value(start),
        })
        .parse_next(input)
}

fn range_list(input: &mut &str) -> ModalResult<Vec<RangeItem>> {
    separated(1.., range_item, (space0, ',', space0)).parse_next(input)
}

fn relation(input: &mut &str) -> ModalResult<Relation> {
    (operand, modulus, space0, operator, space0, range_list)
        .map(|(operand, modulus, _, (negated, within), _, ranges)| Relation {
            operand,
            modulus,
            negated,
            within,
            ranges,
        })
        .parse_next(input)
}

fn and_condition(input: &mut &str) -> ModalResult<Vec<Relation>> {
    separated(1.., relation, (space1, "and", space1)).parse_next(input)
}

fn condition(input: &mut &str) -> ModalResult<Vec<Vec<Relation>>> {
    separated(1.., and_condition, (space1, "or", space1)).parse_next(input)
}

/// Parse one plural rule condition. Sample lists (`@integer ...`,
/// `@decimal ...`) are ignored; an empty condition never matches.
pub fn parse_plural_condition(rule: &str) -> Result<PluralCondition, String> {
    let body = rule.split('@').next().unwrap_or_default().trim();
    if body.is_empty() {
        return Ok(PluralCondition::default());
    }
    let mut input = body;
    let or_groups = condition
        .parse_next(&mut input)
        .map_err(|e| format!("Parse error: {e:?} at remaining input '{input}'"))?;
    if !input.trim().is_empty() {
        return Err(format!("unexpected trailing input '{input}' in plural rule '{body}'"));
    }
    Ok(PluralCondition { or_groups })
}
