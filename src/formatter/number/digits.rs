use rust_decimal::{Decimal, RoundingStrategy};

use super::Symbols;

/// How the digits of a non-negative value are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DigitSpec {
    pub min_integer: usize,
    pub min_fraction: usize,
    pub max_fraction: usize,
    /// Primary and optional secondary group size
    pub grouping: Option<(usize, Option<usize>)>,
}

/// Round half away from zero to `max_fraction` digits
pub(crate) fn round(value: Decimal, max_fraction: usize) -> Decimal {
    value.round_dp_with_strategy(max_fraction as u32, RoundingStrategy::MidpointAwayFromZero)
}

fn group_integer(digits: &str, primary: usize, secondary: Option<usize>, separator: &str) -> String {
    if primary == 0 || digits.len() <= primary {
        return digits.to_string();
    }
    let secondary = secondary.filter(|s| *s > 0).unwrap_or(primary);
    let (head, tail) = digits.split_at(digits.len() - primary);

    let mut groups = vec![tail];
    let mut rest = head;
    while rest.len() > secondary {
        let (front, back) = rest.split_at(rest.len() - secondary);
        groups.push(back);
        rest = front;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    groups.join(separator)
}

/// Render a non-negative decimal with locale symbols.
///
/// The value is rounded at `max_fraction`; trailing fraction zeros beyond
/// `min_fraction` are dropped.
pub(crate) fn render_digits(value: Decimal, spec: &DigitSpec, symbols: &Symbols) -> String {
    let rounded = round(value.abs(), spec.max_fraction);
    let text = rounded.to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((&text, ""));

    let mut fraction = fraction.to_string();
    while fraction.len() > spec.min_fraction && fraction.ends_with('0') {
        fraction.pop();
    }
    while fraction.len() < spec.min_fraction {
        fraction.push('0');
    }

    let mut integer = if integer == "0" && spec.min_integer == 0 {
        String::new()
    } else {
        integer.to_string()
    };
    if integer.len() < spec.min_integer {
        integer = format!("{}{integer}", "0".repeat(spec.min_integer - integer.len()));
    }
    if integer.is_empty() && fraction.is_empty() {
        integer.push('0');
    }

    let mut out = match spec.grouping {
        Some((primary, secondary)) => group_integer(&integer, primary, secondary, &symbols.group),
        None => integer,
    };
    if !fraction.is_empty() {
        out.push_str(&symbols.decimal);
        out.push_str(&fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn spec(min_fraction: usize, max_fraction: usize) -> DigitSpec {
        DigitSpec {
            min_integer: 1,
            min_fraction,
            max_fraction,
            grouping: Some((3, None)),
        }
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let symbols = Symbols::default();
        assert_eq!(render_digits(dec("2.5"), &spec(0, 0), &symbols), "3");
        assert_eq!(render_digits(dec("1.005"), &spec(0, 2), &symbols), "1.01");
        assert_eq!(render_digits(dec("1234.5"), &spec(0, 3), &symbols), "1,234.5");
    }

    #[test]
    fn pads_fraction_and_integer() {
        let symbols = Symbols::default();
        let padded = DigitSpec {
            min_integer: 4,
            ..spec(2, 2)
        };
        assert_eq!(render_digits(dec("7"), &padded, &symbols), "0,007.00");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(group_integer("123456789", 3, Some(2), ","), "12,34,56,789");
        assert_eq!(group_integer("1234", 3, None, "."), "1.234");
        assert_eq!(group_integer("123", 3, None, ","), "123");
    }

    #[test]
    fn zero_without_integer_digits() {
        let symbols = Symbols::default();
        let bare = DigitSpec {
            min_integer: 0,
            min_fraction: 0,
            max_fraction: 2,
            grouping: None,
        };
        assert_eq!(render_digits(dec("0.5"), &bare, &symbols), ".5");
        assert_eq!(render_digits(Decimal::ZERO, &bare, &symbols), "0");
    }
}
