//! Type definitions for CLDR pattern tokens
//!
//! This module defines the closed token sets produced by the number and
//! date/time pattern tokenizers, plus the section view of a number pattern.

use std::fmt;

/// Which currency text a `¤` run stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencyWidth {
    /// `¤` — localized symbol, e.g. `$`
    Symbol,
    /// `¤¤` — ISO 4217 code, e.g. `USD`
    Code,
    /// `¤¤¤` — plural-aware display name, e.g. `US dollars`
    Name,
}

/// A single token of a CLDR decimal pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Run of `0` (required) or `#` (optional) digit placeholders
    Digit { required: bool, count: usize },
    /// Grouping separator (`,`) inside a digit run
    Group,
    /// Decimal separator (`.`)
    Decimal,
    /// Currency placeholder (`¤`, `¤¤`, `¤¤¤`)
    Currency(CurrencyWidth),
    /// Percent sign, multiplies by 100
    Percent,
    /// Per-mille sign, multiplies by 1000
    PerMille,
    /// Scientific exponent, `E0` or `E+00`
    Exponent { digits: usize, signed: bool },
    /// Explicit plus sign
    Plus,
    /// Explicit minus sign
    Minus,
    /// Unquoted literal text
    Literal(String),
    /// Quoted literal text, unescaped
    Quoted(String),
    /// Positive/negative subpattern separator (`;`)
    PatternSeparator,
}

impl PatternToken {
    /// Whether the token belongs to the numeric block of a pattern
    pub fn is_number_part(&self) -> bool {
        matches!(
            self,
            PatternToken::Digit { .. }
                | PatternToken::Group
                | PatternToken::Decimal
                | PatternToken::Exponent { .. }
        )
    }
}

impl fmt::Display for PatternToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternToken::Digit { required, count } => {
                let c = if *required { "0" } else { "#" };
                f.write_str(&c.repeat(*count))
            }
            PatternToken::Group => f.write_str(","),
            PatternToken::Decimal => f.write_str("."),
            PatternToken::Currency(CurrencyWidth::Symbol) => f.write_str("¤"),
            PatternToken::Currency(CurrencyWidth::Code) => f.write_str("¤¤"),
            PatternToken::Currency(CurrencyWidth::Name) => f.write_str("¤¤¤"),
            PatternToken::Percent => f.write_str("%"),
            PatternToken::PerMille => f.write_str("‰"),
            PatternToken::Exponent { digits, signed } => {
                write!(f, "E{}{}", if *signed { "+" } else { "" }, "0".repeat(*digits))
            }
            PatternToken::Plus => f.write_str("+"),
            PatternToken::Minus => f.write_str("-"),
            PatternToken::Literal(text) => f.write_str(text),
            PatternToken::Quoted(text) => write_quoted(f, text),
            PatternToken::PatternSeparator => f.write_str(";"),
        }
    }
}

/// A single token of a CLDR date/time pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTimeToken {
    /// A run of one field letter, e.g. `MMMM` is `Field { letter: 'M', count: 4 }`
    Field { letter: char, count: usize },
    /// Unquoted literal text
    Literal(String),
    /// Quoted literal text, unescaped
    Quoted(String),
}

impl fmt::Display for DateTimeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeToken::Field { letter, count } => {
                for _ in 0..*count {
                    write!(f, "{letter}")?;
                }
                Ok(())
            }
            DateTimeToken::Literal(text) => f.write_str(text),
            DateTimeToken::Quoted(text) => write_quoted(f, text),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if text == "'" {
        return f.write_str("''");
    }
    write!(f, "'{}'", text.replace('\'', "''"))
}

/// One half of a number pattern (positive or negative subpattern)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternSection {
    /// Sequence of pattern tokens
    pub tokens: Vec<PatternToken>,
}

/// Digit layout derived from the number block of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitLayout {
    /// Count of `0` placeholders before the decimal separator
    pub min_integer_digits: usize,
    /// Size of the rightmost group, if the pattern groups at all
    pub primary_grouping: Option<usize>,
    /// Size of the remaining groups when it differs from the primary one
    pub secondary_grouping: Option<usize>,
    pub min_fraction_digits: usize,
    pub max_fraction_digits: usize,
    /// Minimum exponent digits and whether a plus sign is shown
    pub exponent: Option<(usize, bool)>,
}

impl PatternSection {
    /// Index range `[start, end)` of the numeric block, if the section has one
    pub fn number_span(&self) -> Option<(usize, usize)> {
        let start = self.tokens.iter().position(PatternToken::is_number_part)?;
        let end = self.tokens.iter().rposition(PatternToken::is_number_part)? + 1;
        Some((start, end))
    }

    /// Index at which a synthesized minus sign belongs.
    ///
    /// The sign goes immediately before the number block, or before a
    /// currency/percent token that directly abuts the block.
    pub fn sign_position(&self) -> usize {
        let Some((mut start, _)) = self.number_span() else {
            return 0;
        };
        while start > 0
            && matches!(
                self.tokens[start - 1],
                PatternToken::Currency(_) | PatternToken::Percent | PatternToken::PerMille
            )
        {
            start -= 1;
        }
        start
    }

    pub fn has_token(&self, predicate: impl Fn(&PatternToken) -> bool) -> bool {
        self.tokens.iter().any(predicate)
    }

    /// Compute the digit layout of the number block
    pub fn digit_layout(&self) -> DigitLayout {
        let mut layout = DigitLayout {
            min_integer_digits: 0,
            primary_grouping: None,
            secondary_grouping: None,
            min_fraction_digits: 0,
            max_fraction_digits: 0,
            exponent: None,
        };

        // digits seen since each group separator, right to left
        let mut groups: Vec<usize> = vec![0];
        let mut has_group = false;
        let mut in_fraction = false;

        for token in &self.tokens {
            match token {
                PatternToken::Digit { required, count } if !in_fraction => {
                    if let Some(last) = groups.last_mut() {
                        *last += count;
                    }
                    if *required {
                        layout.min_integer_digits += count;
                    }
                }
                PatternToken::Digit { required, count } => {
                    layout.max_fraction_digits += count;
                    if *required {
                        layout.min_fraction_digits += count;
                    }
                }
                PatternToken::Group if !in_fraction => {
                    has_group = true;
                    groups.push(0);
                }
                PatternToken::Decimal => in_fraction = true,
                PatternToken::Exponent { digits, signed } => {
                    layout.exponent = Some((*digits, *signed));
                    in_fraction = true;
                }
                _ => {}
            }
        }

        if has_group {
            let primary = groups.last().copied().unwrap_or(3);
            layout.primary_grouping = Some(primary);
            if groups.len() > 2 {
                let secondary = groups[groups.len() - 2];
                if secondary != primary && secondary > 0 {
                    layout.secondary_grouping = Some(secondary);
                }
            }
        }

        layout
    }

    /// Concatenated literal text of the section, used to compare compact suffixes
    pub fn literal_text(&self) -> String {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                PatternToken::Literal(s) | PatternToken::Quoted(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Represents a complete number pattern with positive and optional negative sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPattern {
    /// Positive subpattern (required)
    pub positive: PatternSection,
    /// Explicit negative subpattern (optional)
    pub negative: Option<PatternSection>,
}

impl NumberPattern {
    /// Rejoin all tokens into the pattern text they were parsed from
    pub fn to_pattern_string(&self) -> String {
        let mut out: String = self.positive.tokens.iter().map(|t| t.to_string()).collect();
        if let Some(negative) = &self.negative {
            out.push(';');
            out.extend(negative.tokens.iter().map(|t| t.to_string()));
        }
        out
    }
}
