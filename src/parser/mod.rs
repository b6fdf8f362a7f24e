//! Pattern parsing module
//!
//! Tokenizers for CLDR decimal patterns and date/time patterns, and the
//! parser for plural rule conditions. The tokenizers are total: any input
//! yields a token sequence whose text rejoins to the original pattern.

mod combinators;
mod datetime;
mod number;
pub mod plural;

pub use datetime::{FIELD_LETTERS, tokenize_datetime_pattern};
pub use number::{parse_number_pattern, tokenize_number_pattern};
pub use plural::parse_plural_condition;
