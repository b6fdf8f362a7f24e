use winnow::combinator::{alt, opt, repeat};
use winnow::token::{any, one_of, take_while};
use winnow::{ModalResult, Parser};

use crate::parser::combinators::{QuotedRun, merge_adjacent, parse_quoted};
use crate::types::*;

fn parse_digit_run(input: &mut &str) -> ModalResult<PatternToken> {
    alt((
        take_while(1.., '0').map(|s: &str| PatternToken::Digit {
            required: true,
            count: s.len(),
        }),
        take_while(1.., '#').map(|s: &str| PatternToken::Digit {
            required: false,
            count: s.len(),
        }),
    ))
    .parse_next(input)
}

fn parse_currency(input: &mut &str) -> ModalResult<PatternToken> {
    take_while(1..=3, '¤')
        .map(|s: &str| {
            PatternToken::Currency(match s.chars().count() {
                1 => CurrencyWidth::Symbol,
                2 => CurrencyWidth::Code,
                _ => CurrencyWidth::Name,
            })
        })
        .parse_next(input)
}

fn parse_exponent(input: &mut &str) -> ModalResult<PatternToken> {
    ('E', opt('+'), take_while(1.., '0'))
        .map(|(_, plus, zeros): (char, Option<char>, &str)| PatternToken::Exponent {
            digits: zeros.len(),
            signed: plus.is_some(),
        })
        .parse_next(input)
}

fn parse_symbol(input: &mut &str) -> ModalResult<PatternToken> {
    one_of(['%', '‰', '+', '-', ';', ',', '.'])
        .map(|c: char| match c {
            '%' => PatternToken::Percent,
            '‰' => PatternToken::PerMille,
            '+' => PatternToken::Plus,
            '-' => PatternToken::Minus,
            ';' => PatternToken::PatternSeparator,
            ',' => PatternToken::Group,
            _ => PatternToken::Decimal,
        })
        .parse_next(input)
}

fn parse_quoted_token(input: &mut &str) -> ModalResult<PatternToken> {
    parse_quoted
        .map(|run| match run {
            QuotedRun::Closed(text) => PatternToken::Quoted(text),
            QuotedRun::Unterminated(raw) => PatternToken::Literal(raw),
        })
        .parse_next(input)
}

fn parse_number_token(input: &mut &str) -> ModalResult<PatternToken> {
    alt((
        parse_digit_run,
        parse_currency,
        parse_exponent,
        parse_quoted_token,
        parse_symbol,
        any.map(|c: char| PatternToken::Literal(c.to_string())),
    ))
    .parse_next(input)
}

/// Tokenize a CLDR decimal pattern.
///
/// Never fails: anything the grammar does not recognize becomes literal
/// text. Concatenating the `Display` form of the returned tokens
/// reproduces the input.
pub fn tokenize_number_pattern(pattern: &str) -> Vec<PatternToken> {
    let mut input = pattern;
    let raw: Vec<PatternToken> = match repeat(0.., parse_number_token).parse_next(&mut input) {
        Ok(tokens) => tokens,
        Err(_) => vec![PatternToken::Literal(pattern.to_string())],
    };
    let mut tokens = resolve_context(raw);
    if !input.is_empty() {
        tokens.push(PatternToken::Literal(input.to_string()));
    }
    merge_adjacent(tokens, |last, next| match (last, next) {
        (PatternToken::Literal(a), PatternToken::Literal(b)) => {
            a.push_str(b);
            true
        }
        _ => false,
    })
}

/// Demote separators that only have meaning in a specific position.
///
/// A `,` groups only between digit placeholders, a `.` is the decimal
/// separator only once per section and next to a digit run, and only the
/// first `;` splits the pattern.
fn resolve_context(raw: Vec<PatternToken>) -> Vec<PatternToken> {
    let is_digit = |t: Option<&PatternToken>| matches!(t, Some(PatternToken::Digit { .. }));
    let mut out = Vec::with_capacity(raw.len());
    let mut seen_separator = false;
    let mut seen_decimal = false;

    for (i, token) in raw.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|p| raw.get(p));
        let next = raw.get(i + 1);
        let resolved = match token {
            PatternToken::Group if !(is_digit(prev) && is_digit(next)) => {
                PatternToken::Literal(",".to_string())
            }
            PatternToken::Decimal if seen_decimal || !(is_digit(prev) || is_digit(next)) => {
                PatternToken::Literal(".".to_string())
            }
            PatternToken::Decimal => {
                seen_decimal = true;
                PatternToken::Decimal
            }
            PatternToken::PatternSeparator if seen_separator => PatternToken::Literal(";".to_string()),
            PatternToken::PatternSeparator => {
                seen_separator = true;
                seen_decimal = false;
                PatternToken::PatternSeparator
            }
            other => other.clone(),
        };
        out.push(resolved);
    }
    out
}

/// Parse a CLDR decimal pattern into its positive and negative sections
pub fn parse_number_pattern(pattern: &str) -> NumberPattern {
    let tokens = tokenize_number_pattern(pattern);
    let mut sections = tokens.split(|t| *t == PatternToken::PatternSeparator);
    let positive = PatternSection {
        tokens: sections.next().map(<[PatternToken]>::to_vec).unwrap_or_default(),
    };
    let negative = sections.next().map(|tokens| PatternSection {
        tokens: tokens.to_vec(),
    });
    NumberPattern { positive, negative }
}
