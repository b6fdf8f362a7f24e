use winnow::combinator::opt;
use winnow::token::take_till;
use winnow::{ModalResult, Parser};

/// Outcome of scanning a quote-delimited literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotedRun {
    /// Properly closed literal, with `''` already unescaped
    Closed(String),
    /// No closing quote was found; holds the raw remainder including the opening quote
    Unterminated(String),
}

/// Parse a quoted literal shared by the number and date/time grammars.
///
/// `''` on its own is a literal apostrophe, and inside a quoted run it
/// stands for one apostrophe as well.
pub fn parse_quoted(input: &mut &str) -> ModalResult<QuotedRun> {
    let start = *input;
    '\''.parse_next(input)?;
    if opt('\'').parse_next(input)?.is_some() {
        return Ok(QuotedRun::Closed("'".to_string()));
    }

    let mut text = String::new();
    loop {
        let chunk: &str = take_till(0.., '\'').parse_next(input)?;
        text.push_str(chunk);
        if input.is_empty() {
            return Ok(QuotedRun::Unterminated(start.to_string()));
        }
        '\''.parse_next(input)?;
        if opt('\'').parse_next(input)?.is_some() {
            text.push('\'');
        } else {
            return Ok(QuotedRun::Closed(text));
        }
    }
}

/// Merge adjacent items for which `merge` returns the combined value.
pub fn merge_adjacent<T>(items: Vec<T>, mut merge: impl FnMut(&mut T, &T) -> bool) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if let Some(last) = out.last_mut() {
            if merge(last, &item) {
                continue;
            }
        }
        out.push(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubled_quote_is_apostrophe() {
        let mut input = "''rest";
        assert_eq!(parse_quoted(&mut input).unwrap(), QuotedRun::Closed("'".into()));
        assert_eq!(input, "rest");
    }

    #[test]
    fn escaped_quote_inside_run() {
        let mut input = "'o''clock' x";
        assert_eq!(
            parse_quoted(&mut input).unwrap(),
            QuotedRun::Closed("o'clock".into())
        );
        assert_eq!(input, " x");
    }

    #[test]
    fn unterminated_keeps_raw_text() {
        let mut input = "'abc";
        assert_eq!(
            parse_quoted(&mut input).unwrap(),
            QuotedRun::Unterminated("'abc".into())
        );
        assert!(input.is_empty());
    }
}
