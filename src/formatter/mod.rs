//! The formatting entry points.
//!
//! A [`Formatter`] owns the pattern and plural caches and shares one
//! [`LocaleDataResolver`]. It is `Send + Sync`; one instance can serve any
//! number of threads.

pub mod datetime;
pub mod number;

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::cache::PatternCache;
use crate::error::Result;
use crate::locale::LocaleDataResolver;
use crate::options::{DateTimeFormatOptions, NumberFormatOptions};
use crate::plural::PluralRuleCache;
use crate::types::{DateTimeToken, NumberPattern};
use datetime::{DateTimeEngine, DateTimeValue, HostZoneProbe, TargetZone};
use number::{NumberEngine, NumberValue};

/// Locale-aware number and date/time formatter
#[derive(Debug)]
pub struct Formatter {
    resolver: Arc<LocaleDataResolver>,
    number_patterns: PatternCache<NumberPattern>,
    datetime_patterns: PatternCache<Vec<DateTimeToken>>,
    plurals: PluralRuleCache,
    host_zone: OnceLock<String>,
    host_probe: HostZoneProbe,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Formatter {
    pub fn new(resolver: Arc<LocaleDataResolver>) -> Self {
        Formatter {
            resolver,
            number_patterns: PatternCache::new(),
            datetime_patterns: PatternCache::new(),
            plurals: PluralRuleCache::new(),
            host_zone: OnceLock::new(),
            host_probe: HostZoneProbe::system(),
        }
    }

    /// Formatter over the data compiled into the crate
    pub fn embedded() -> Self {
        Self::new(Arc::new(LocaleDataResolver::embedded()))
    }

    /// Use `zone` whenever options carry no `timeZone`, skipping host
    /// detection
    pub fn with_host_timezone(self, zone: impl Into<String>) -> Self {
        let host_zone = OnceLock::new();
        let _ = host_zone.set(zone.into());
        Formatter { host_zone, ..self }
    }

    /// Detect the host zone with `probe` instead of the running system
    pub fn with_host_probe(self, probe: HostZoneProbe) -> Self {
        Formatter {
            host_probe: probe,
            host_zone: OnceLock::new(),
            ..self
        }
    }

    pub fn resolver(&self) -> &LocaleDataResolver {
        &self.resolver
    }

    /// Host zone id, detected once per formatter
    pub fn host_timezone(&self) -> &str {
        self.host_zone.get_or_init(|| self.host_probe.detect())
    }

    fn target_zone(&self, options: &DateTimeFormatOptions) -> Result<TargetZone> {
        match &options.time_zone {
            Some(id) => TargetZone::parse(id),
            None => {
                let host = self.host_timezone();
                TargetZone::parse(host).or_else(|_| {
                    debug!(zone = host, "host time zone not usable, rendering at offset zero");
                    Ok(TargetZone::Unknown)
                })
            }
        }
    }

    pub fn format_number(
        &self,
        value: impl Into<NumberValue>,
        locale: &str,
        options: &NumberFormatOptions,
    ) -> Result<String> {
        let engine = NumberEngine {
            resolver: &self.resolver,
            patterns: &self.number_patterns,
            plurals: &self.plurals,
        };
        engine.format(&value.into(), locale, options)
    }

    pub fn format_datetime(
        &self,
        value: impl Into<DateTimeValue>,
        locale: &str,
        options: &DateTimeFormatOptions,
    ) -> Result<String> {
        let zone = self.target_zone(options)?;
        let engine = DateTimeEngine {
            resolver: &self.resolver,
            patterns: &self.datetime_patterns,
        };
        engine.format(&value.into(), locale, options, zone)
    }
}

fn shared() -> &'static Formatter {
    static SHARED: OnceLock<Formatter> = OnceLock::new();
    SHARED.get_or_init(Formatter::embedded)
}

/// Format a number with the shared embedded-data formatter
pub fn format_number(
    value: impl Into<NumberValue>,
    locale: &str,
    options: &NumberFormatOptions,
) -> Result<String> {
    shared().format_number(value, locale, options)
}

/// Format a date/time with the shared embedded-data formatter
pub fn format_datetime(
    value: impl Into<DateTimeValue>,
    locale: &str,
    options: &DateTimeFormatOptions,
) -> Result<String> {
    shared().format_datetime(value, locale, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Formatter>();
    }

    #[test]
    fn explicit_host_zone_skips_detection() {
        let formatter = Formatter::embedded().with_host_timezone("Asia/Tokyo");
        assert_eq!(formatter.host_timezone(), "Asia/Tokyo");
    }

    #[test]
    fn unknown_host_zone_renders_at_utc() {
        let formatter = Formatter::embedded().with_host_timezone("Etc/Unknown");
        let text = formatter
            .format_datetime(0i64, "en", &DateTimeFormatOptions::new().pattern("HH:mm"))
            .unwrap();
        assert_eq!(text, "00:00");
    }
}
