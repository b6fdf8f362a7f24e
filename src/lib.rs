//! Locale-aware number and date/time formatting from CLDR data.
//!
//! ```
//! use cldr_format::{NumberFormatOptions, NumberStyle, format_number};
//!
//! let options = NumberFormatOptions::new().style(NumberStyle::Currency).currency("USD");
//! assert_eq!(format_number(100, "en-US", &options).unwrap(), "$100.00");
//! ```

pub mod builtins;
pub mod cache;
pub mod error;
pub mod formatter;
pub mod locale;
pub mod options;
pub mod parser;
pub mod plural;
pub mod types;

pub use error::{FormatError, Result};
pub use formatter::datetime::{DateTimeValue, HostZoneProbe, OffsetRecord, TargetZone, UNKNOWN_ZONE};
pub use formatter::number::NumberValue;
pub use formatter::{Formatter, format_datetime, format_number};
pub use locale::{
    DirectoryData, Domain, EmbeddedData, InMemoryData, InheritanceChain, LocaleDataResolver,
    LocaleDataSource, LocaleTag,
};
pub use options::{
    CompactDisplay, CurrencyDisplay, DateTimeFormatOptions, DateTimeStyle, MonthWidth, Notation,
    NumberFormatOptions, NumberStyle, NumericWidth, TextWidth, TimeZoneName,
};
pub use plural::{PluralCategory, PluralOperands};
pub use types::{DateTimeToken, NumberPattern, PatternSection, PatternToken};
