use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::error::{FormatError, Result};

/// A value accepted by the number formatter
#[derive(Debug, Clone, PartialEq)]
pub enum NumberValue {
    Decimal(Decimal),
    Float(f64),
    /// Decimal text, `Infinity`, `-Infinity`, `∞` or `NaN`
    Text(String),
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for NumberValue {
            fn from(value: $t) -> Self {
                NumberValue::Decimal(Decimal::from(value))
            }
        })*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl From<f64> for NumberValue {
    fn from(value: f64) -> Self {
        NumberValue::Float(value)
    }
}

impl From<f32> for NumberValue {
    fn from(value: f32) -> Self {
        NumberValue::Float(value as f64)
    }
}

impl From<Decimal> for NumberValue {
    fn from(value: Decimal) -> Self {
        NumberValue::Decimal(value)
    }
}

impl From<&str> for NumberValue {
    fn from(value: &str) -> Self {
        NumberValue::Text(value.to_string())
    }
}

impl From<String> for NumberValue {
    fn from(value: String) -> Self {
        NumberValue::Text(value)
    }
}

impl From<&String> for NumberValue {
    fn from(value: &String) -> Self {
        NumberValue::Text(value.clone())
    }
}

/// Number after coercion
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Finite(Decimal),
    Infinite { negative: bool },
    NaN,
}

impl Numeric {
    pub(crate) fn is_negative(&self) -> bool {
        match self {
            Numeric::Finite(d) => d.is_sign_negative() && !d.is_zero(),
            Numeric::Infinite { negative } => *negative,
            Numeric::NaN => false,
        }
    }
}

fn parse_text(text: &str) -> Result<Numeric> {
    let trimmed = text.trim();
    match trimmed {
        "NaN" => return Ok(Numeric::NaN),
        "Infinity" | "+Infinity" | "∞" => return Ok(Numeric::Infinite { negative: false }),
        "-Infinity" | "-∞" => return Ok(Numeric::Infinite { negative: true }),
        _ => {}
    }
    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    };
    parsed
        .map(Numeric::Finite)
        .map_err(|e| FormatError::InvalidValue(format!("`{text}` is not a number: {e}")))
}

fn from_float(value: f64) -> Result<Numeric> {
    if value.is_nan() {
        return Ok(Numeric::NaN);
    }
    if value.is_infinite() {
        return Ok(Numeric::Infinite {
            negative: value < 0.0,
        });
    }
    // shortest round-trip text keeps 0.1 as 0.1 rather than its binary expansion
    let text = value.to_string();
    Decimal::from_str(&text)
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .map(Numeric::Finite)
        .ok_or_else(|| FormatError::InvalidValue(format!("{value} is outside the decimal range")))
}

impl NumberValue {
    pub(crate) fn to_numeric(&self) -> Result<Numeric> {
        match self {
            NumberValue::Decimal(d) => Ok(Numeric::Finite(*d)),
            NumberValue::Float(f) => from_float(*f),
            NumberValue::Text(text) => parse_text(text),
        }
    }
}
