//! `NUMBER()` and `DATETIME()` as called by a message-formatting runtime.
//!
//! Arguments arrive as string pairs and are mapped onto the typed option
//! records; unknown keys are ignored.

use tracing::debug;

use crate::error::{FormatError, Result};
use crate::formatter::Formatter;
use crate::options::{DateTimeFormatOptions, NumberFormatOptions};

impl Formatter {
    /// Run builtin `function` (`NUMBER` or `DATETIME`, any case) on `value`
    pub fn call(&self, function: &str, value: &str, locale: &str, args: &[(&str, &str)]) -> Result<String> {
        debug!(function, locale, args = args.len(), "builtin call");
        if function.eq_ignore_ascii_case("NUMBER") {
            let options = NumberFormatOptions::from_args(args.iter().copied())?;
            self.format_number(value, locale, &options)
        } else if function.eq_ignore_ascii_case("DATETIME") {
            let options = DateTimeFormatOptions::from_args(args.iter().copied())?;
            self.format_datetime(value, locale, &options)
        } else {
            Err(FormatError::invalid_option(
                "function",
                format!("unknown builtin `{function}`"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_names_ignore_case() {
        let formatter = Formatter::embedded();
        assert_eq!(formatter.call("number", "1234.5", "en", &[]).unwrap(), "1,234.5");
        assert_eq!(formatter.call("Number", "1234.5", "en", &[]).unwrap(), "1,234.5");
    }

    #[test]
    fn unknown_function() {
        let formatter = Formatter::embedded();
        assert!(matches!(
            formatter.call("PLURAL", "1", "en", &[]),
            Err(FormatError::InvalidOption { .. })
        ));
    }
}
