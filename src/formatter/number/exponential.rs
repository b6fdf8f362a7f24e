use rust_decimal::Decimal;

use super::digits::{DigitSpec, render_digits, round};
use super::{Symbols, pow10};

/// Count of decimal digits in `n`
fn digit_count(n: u128) -> i64 {
    let mut count = 1;
    let mut rest = n / 10;
    while rest > 0 {
        count += 1;
        rest /= 10;
    }
    count
}

/// Power of ten of the leading digit, `0` for zero
pub(super) fn magnitude(value: Decimal) -> i64 {
    if value.is_zero() {
        return 0;
    }
    digit_count(value.mantissa().unsigned_abs()) - 1 - i64::from(value.scale())
}

/// Exponent placeholder taken from the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ExponentSpec {
    pub digits: usize,
    pub signed: bool,
    /// Keep the exponent a multiple of three
    pub engineering: bool,
}

/// Split `value` into a mantissa and a power of ten.
fn normalize(value: Decimal, engineering: bool) -> Option<(Decimal, i64)> {
    if value.is_zero() {
        return Some((Decimal::ZERO, 0));
    }
    let mut exponent = magnitude(value);
    if engineering {
        exponent -= exponent.rem_euclid(3);
    }
    let mantissa = if exponent >= 0 {
        value.checked_div(pow10(exponent.unsigned_abs() as u32)?)?
    } else {
        value.checked_mul(pow10(exponent.unsigned_abs() as u32)?)?
    };
    Some((mantissa, exponent))
}

/// Render a non-negative value in scientific or engineering notation.
///
/// Returns `None` when the value cannot be normalized within decimal
/// precision.
pub(super) fn format_exponential(
    value: Decimal,
    digits: &DigitSpec,
    exponent_spec: ExponentSpec,
    symbols: &Symbols,
) -> Option<String> {
    let (mantissa, mut exponent) = normalize(value.abs(), exponent_spec.engineering)?;

    // rounding 9.99 up may produce 10, which belongs to the next exponent
    let step: u32 = if exponent_spec.engineering { 3 } else { 1 };
    let mut mantissa = round(mantissa, digits.max_fraction);
    if !mantissa.is_zero() && magnitude(mantissa) >= i64::from(step) {
        mantissa = mantissa.checked_div(pow10(step)?)?;
        exponent += i64::from(step);
    }

    let mantissa_spec = DigitSpec {
        min_integer: digits.min_integer.max(1),
        grouping: None,
        ..*digits
    };
    let mut out = render_digits(mantissa, &mantissa_spec, symbols);
    out.push_str(&symbols.exponential);
    if exponent < 0 {
        out.push_str(&symbols.minus);
    } else if exponent_spec.signed {
        out.push_str(&symbols.plus);
    }
    let magnitude_text = exponent.unsigned_abs().to_string();
    for _ in magnitude_text.len()..exponent_spec.digits {
        out.push('0');
    }
    out.push_str(&magnitude_text);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn default_digits() -> DigitSpec {
        DigitSpec {
            min_integer: 1,
            min_fraction: 0,
            max_fraction: 3,
            grouping: None,
        }
    }

    fn scientific() -> ExponentSpec {
        ExponentSpec {
            digits: 1,
            signed: false,
            engineering: false,
        }
    }

    #[test]
    fn magnitude_of_decimals() {
        assert_eq!(magnitude(dec("1234")), 3);
        assert_eq!(magnitude(dec("1.50")), 0);
        assert_eq!(magnitude(dec("0.0123")), -2);
    }

    #[test]
    fn scientific_mantissa() {
        let symbols = Symbols::default();
        let out = format_exponential(dec("1234"), &default_digits(), scientific(), &symbols);
        assert_eq!(out.as_deref(), Some("1.234E3"));
        let out = format_exponential(dec("0.00012"), &default_digits(), scientific(), &symbols);
        assert_eq!(out.as_deref(), Some("1.2E-4"));
    }

    #[test]
    fn rounding_carries_into_exponent() {
        let symbols = Symbols::default();
        let out = format_exponential(dec("99999"), &default_digits(), scientific(), &symbols);
        assert_eq!(out.as_deref(), Some("1E5"));
    }

    #[test]
    fn engineering_uses_multiples_of_three() {
        let symbols = Symbols::default();
        let spec = ExponentSpec {
            engineering: true,
            ..scientific()
        };
        let out = format_exponential(dec("12345"), &default_digits(), spec, &symbols);
        assert_eq!(out.as_deref(), Some("12.345E3"));
        let out = format_exponential(dec("0.05"), &default_digits(), spec, &symbols);
        assert_eq!(out.as_deref(), Some("50E-3"));
    }

    #[test]
    fn signed_padded_exponent() {
        let symbols = Symbols::default();
        let spec = ExponentSpec {
            digits: 2,
            signed: true,
            engineering: false,
        };
        let out = format_exponential(dec("5"), &default_digits(), spec, &symbols);
        assert_eq!(out.as_deref(), Some("5E+00"));
    }
}
