use winnow::combinator::{alt, repeat};
use winnow::token::{any, one_of, take_while};
use winnow::{ModalResult, Parser};

use crate::parser::combinators::{QuotedRun, merge_adjacent, parse_quoted};
use crate::types::DateTimeToken;

/// Letters that start a date/time field
pub const FIELD_LETTERS: &str = "yYMLdDEecHhKkmsSabBzZOvVxX";

fn parse_field(input: &mut &str) -> ModalResult<DateTimeToken> {
    let letter = one_of(|c: char| FIELD_LETTERS.contains(c)).parse_next(input)?;
    let rest: &str = take_while(0.., letter).parse_next(input)?;
    Ok(DateTimeToken::Field {
        letter,
        count: 1 + rest.chars().count(),
    })
}

fn parse_datetime_token(input: &mut &str) -> ModalResult<DateTimeToken> {
    alt((
        parse_field,
        parse_quoted.map(|run| match run {
            QuotedRun::Closed(text) => DateTimeToken::Quoted(text),
            QuotedRun::Unterminated(raw) => DateTimeToken::Literal(raw),
        }),
        any.map(|c: char| DateTimeToken::Literal(c.to_string())),
    ))
    .parse_next(input)
}

fn merge_literals(tokens: Vec<DateTimeToken>) -> Vec<DateTimeToken> {
    merge_adjacent(tokens, |last, next| match (last, next) {
        (DateTimeToken::Literal(a), DateTimeToken::Literal(b)) => {
            a.push_str(b);
            true
        }
        _ => false,
    })
}

fn ends_with_letter(token: Option<&DateTimeToken>) -> bool {
    matches!(token, Some(DateTimeToken::Literal(s)) if s.chars().next_back().is_some_and(|c| c.is_ascii_alphabetic()))
}

fn starts_with_letter(token: Option<&DateTimeToken>) -> bool {
    matches!(token, Some(DateTimeToken::Literal(s)) if s.chars().next().is_some_and(|c| c.is_ascii_alphabetic()))
}

/// Tokenize a CLDR date/time pattern.
///
/// A single field letter glued to unquoted ASCII words is treated as part
/// of the word, so `h 'o''clock'` and `h o clock` keep their hour field
/// while `at` in `h at m` stays text. Rejoining the tokens reproduces
/// the input.
pub fn tokenize_datetime_pattern(pattern: &str) -> Vec<DateTimeToken> {
    let mut input = pattern;
    let raw: Vec<DateTimeToken> = match repeat(0.., parse_datetime_token).parse_next(&mut input) {
        Ok(tokens) => tokens,
        Err(_) => vec![DateTimeToken::Literal(pattern.to_string())],
    };
    let mut tokens = merge_literals(raw);
    if !input.is_empty() {
        tokens.push(DateTimeToken::Literal(input.to_string()));
    }

    loop {
        let mut changed = false;
        for i in 0..tokens.len() {
            let DateTimeToken::Field { letter, count: 1 } = tokens[i] else {
                continue;
            };
            let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
            if ends_with_letter(prev) || starts_with_letter(tokens.get(i + 1)) {
                tokens[i] = DateTimeToken::Literal(letter.to_string());
                changed = true;
            }
        }
        if !changed {
            break;
        }
        tokens = merge_literals(tokens);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(letter: char, count: usize) -> DateTimeToken {
        DateTimeToken::Field { letter, count }
    }

    #[test]
    fn adjacent_fields_stay_fields() {
        assert_eq!(
            tokenize_datetime_pattern("yMd"),
            vec![field('y', 1), field('M', 1), field('d', 1)]
        );
    }

    #[test]
    fn words_are_not_fields() {
        let tokens = tokenize_datetime_pattern("h at mm");
        assert_eq!(
            tokens,
            vec![
                field('h', 1),
                DateTimeToken::Literal(" at ".into()),
                field('m', 2),
            ]
        );
    }

    #[test]
    fn quoted_words() {
        let tokens = tokenize_datetime_pattern("EEEE 'de' MMMM");
        assert_eq!(tokens[2], DateTimeToken::Quoted("de".into()));
    }
}
