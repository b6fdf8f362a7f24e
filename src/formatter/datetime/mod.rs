//! Date/time formatting.

mod conversion;
mod fields;
mod host;
mod skeleton;
mod timezone;

pub use conversion::DateTimeValue;
pub use host::HostZoneProbe;
pub use timezone::{OffsetRecord, TargetZone, UNKNOWN_ZONE};

use tracing::{debug, warn};

use crate::cache::PatternCache;
use crate::error::Result;
use crate::locale::{Domain, LocaleDataResolver};
use crate::options::{DateTimeFormatOptions, TimeZoneName};
use crate::parser::tokenize_datetime_pattern;
use crate::types::DateTimeToken;
use conversion::Moment;
use fields::FieldRenderer;
use skeleton::{Skeleton, resolve_skeleton};

fn is_hour(letter: char) -> bool {
    matches!(letter, 'h' | 'H' | 'K' | 'k')
}

fn is_day_period(letter: char) -> bool {
    matches!(letter, 'a' | 'b' | 'B')
}

fn is_zone(letter: char) -> bool {
    matches!(letter, 'z' | 'Z' | 'O' | 'v' | 'V' | 'x' | 'X')
}

fn field_letter(token: &DateTimeToken) -> Option<char> {
    match token {
        DateTimeToken::Field { letter, .. } => Some(*letter),
        _ => None,
    }
}

fn zone_token(name: TimeZoneName) -> DateTimeToken {
    let (letter, count) = match name {
        TimeZoneName::Short => ('z', 1),
        TimeZoneName::Long => ('z', 4),
        TimeZoneName::ShortOffset => ('O', 1),
        TimeZoneName::LongOffset => ('O', 4),
        TimeZoneName::ShortGeneric => ('v', 1),
        TimeZoneName::LongGeneric => ('v', 4),
    };
    DateTimeToken::Field { letter, count }
}

/// Append a zone field unless the pattern already shows one
fn append_zone(tokens: &mut Vec<DateTimeToken>, name: TimeZoneName) {
    if tokens.iter().filter_map(field_letter).any(is_zone) {
        return;
    }
    tokens.push(DateTimeToken::Literal(" ".to_string()));
    tokens.push(zone_token(name));
}

/// Strip one whitespace character from a literal edge; `None` when
/// nothing was removed
fn trim_space(token: &mut DateTimeToken, from_end: bool) -> Option<()> {
    let DateTimeToken::Literal(text) = token else {
        return None;
    };
    let c = if from_end { text.chars().next_back()? } else { text.chars().next()? };
    if !c.is_whitespace() {
        return None;
    }
    if from_end {
        text.pop();
    } else {
        text.remove(0);
    }
    Some(())
}

/// Force a pattern onto a 12-hour or 24-hour clock
fn convert_hour_cycle(tokens: &mut Vec<DateTimeToken>, hour12: bool) {
    if !tokens.iter().filter_map(field_letter).any(is_hour) {
        return;
    }
    for token in tokens.iter_mut() {
        if let DateTimeToken::Field { letter, count } = token {
            match (hour12, *letter) {
                (true, 'H' | 'k') => (*letter, *count) = ('h', 1),
                (false, 'h' | 'K') => (*letter, *count) = ('H', 2),
                _ => {}
            }
        }
    }

    if hour12 {
        if tokens.iter().filter_map(field_letter).any(is_day_period) {
            return;
        }
        let last_time = tokens
            .iter()
            .rposition(|t| matches!(field_letter(t), Some('h' | 'm' | 's' | 'S')));
        if let Some(index) = last_time {
            tokens.insert(index + 1, DateTimeToken::Literal(" ".to_string()));
            tokens.insert(index + 2, DateTimeToken::Field { letter: 'a', count: 1 });
        }
        return;
    }

    while let Some(index) = tokens
        .iter()
        .position(|t| field_letter(t).is_some_and(is_day_period))
    {
        tokens.remove(index);
        let trimmed_before = index
            .checked_sub(1)
            .and_then(|before| trim_space(&mut tokens[before], true));
        if trimmed_before.is_none() && index < tokens.len() {
            trim_space(&mut tokens[index], false);
        }
    }
    tokens.retain(|t| !matches!(t, DateTimeToken::Literal(text) if text.is_empty()));
}

/// Formats date/time values against locale calendar data
pub(crate) struct DateTimeEngine<'a> {
    pub resolver: &'a LocaleDataResolver,
    pub patterns: &'a PatternCache<Vec<DateTimeToken>>,
}

impl DateTimeEngine<'_> {
    fn tokens(&self, pattern: &str) -> Vec<DateTimeToken> {
        self.patterns
            .get_or_parse(pattern, tokenize_datetime_pattern)
            .as_ref()
            .clone()
    }

    fn calendar_pattern(&self, locale: &str, path: &str) -> Result<String> {
        self.resolver.require_str(locale, Domain::Calendar, path)
    }

    /// Whether the locale's short time pattern uses a 12-hour clock
    fn locale_hour12(&self, locale: &str) -> Result<bool> {
        let pattern = self.calendar_pattern(locale, "time_formats.short")?;
        Ok(self
            .tokens(&pattern)
            .iter()
            .filter_map(field_letter)
            .any(|letter| matches!(letter, 'h' | 'K')))
    }

    fn style_tokens(&self, locale: &str, options: &DateTimeFormatOptions) -> Result<Vec<DateTimeToken>> {
        let date = options
            .date_style
            .map(|style| self.calendar_pattern(locale, &format!("date_formats.{}", style.as_str())))
            .transpose()?;
        let time = options
            .time_style
            .map(|style| self.calendar_pattern(locale, &format!("time_formats.{}", style.as_str())))
            .transpose()?;
        let pattern = match (date, time, options.date_style) {
            (Some(date), Some(time), Some(style)) => self
                .calendar_pattern(locale, &format!("datetime_formats.{}", style.as_str()))?
                .replace("{1}", &date)
                .replace("{0}", &time),
            (Some(date), _, _) => date,
            (None, Some(time), _) => time,
            (None, None, _) => self.calendar_pattern(locale, "available_formats.yMd")?,
        };
        let mut tokens = self.tokens(&pattern);
        if let Some(hour12) = options.hour12 {
            convert_hour_cycle(&mut tokens, hour12);
        }
        Ok(tokens)
    }

    fn per_field(
        &self,
        renderer: &FieldRenderer<'_>,
        skeleton: &Skeleton,
        options: &DateTimeFormatOptions,
    ) -> Result<String> {
        warn!(
            locale = renderer.locale,
            skeleton = %skeleton.key(),
            "no pattern for the requested fields, formatting them one by one"
        );
        let field = |letter: char, count: usize| DateTimeToken::Field { letter, count };
        let mut groups: Vec<Vec<DateTimeToken>> = Vec::new();
        if let Some(count) = skeleton.weekday {
            groups.push(vec![field('c', if count == 1 { 3 } else { count })]);
        }
        if let Some(count) = skeleton.year {
            groups.push(vec![field('y', count)]);
        }
        if let Some(count) = skeleton.month {
            groups.push(vec![field('L', count)]);
        }
        if let Some(count) = skeleton.day {
            groups.push(vec![field('d', count)]);
        }

        let separator =
            self.resolver
                .require_str(renderer.locale, Domain::NumberFormats, "symbols.time_separator")?;
        let mut time = Vec::new();
        for (letter, count) in [
            (skeleton.hour_letter(), skeleton.hour),
            ('m', skeleton.minute),
            ('s', skeleton.second),
        ] {
            let Some(count) = count else { continue };
            if !time.is_empty() {
                time.push(DateTimeToken::Literal(separator.clone()));
            }
            time.push(field(letter, count));
        }
        if skeleton.hour.is_some() && skeleton.hour12 {
            time.push(DateTimeToken::Literal(" ".to_string()));
            time.push(field('a', 1));
        }
        if !time.is_empty() {
            groups.push(time);
        }
        if let Some(name) = options.time_zone_name {
            groups.push(vec![zone_token(name)]);
        }

        let parts = groups
            .iter()
            .map(|tokens| renderer.render(tokens))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(" "))
    }

    /// Format `value` for `locale` in `zone`.
    ///
    /// Values that are not a point in time (NaN, out of range, empty text)
    /// come back as text without formatting.
    pub(crate) fn format(
        &self,
        value: &DateTimeValue,
        locale: &str,
        options: &DateTimeFormatOptions,
        zone: TargetZone,
    ) -> Result<String> {
        options.validate()?;
        let instant = match value.interpret()? {
            Moment::Passthrough(text) => {
                debug!(text = %text, "date/time value is not an instant, passing through");
                return Ok(text);
            }
            Moment::Instant(instant) => instant,
            Moment::Wall(wall) => match zone.from_wall(&wall) {
                Some(instant) => instant,
                None => return Ok(wall.to_string()),
            },
        };
        let offset = zone.offset_at(&instant);
        let Some(wall) = zone.to_wall(&instant) else {
            return Ok(instant.to_rfc3339());
        };
        let renderer = FieldRenderer {
            resolver: self.resolver,
            locale,
            wall,
            zone,
            offset,
        };

        if let Some(pattern) = &options.pattern {
            return renderer.render(&self.tokens(pattern));
        }
        if options.date_style.is_some() || options.time_style.is_some() {
            return renderer.render(&self.style_tokens(locale, options)?);
        }

        let hour12 = match options.hour12 {
            Some(hour12) => hour12,
            None => self.locale_hour12(locale)?,
        };
        let skeleton = Skeleton::from_options(options, hour12);
        let lookup = |key: &str| -> Result<Option<Vec<DateTimeToken>>> {
            Ok(self
                .resolver
                .resolve_str(locale, Domain::Calendar, &format!("available_formats.{key}"))?
                .map(|pattern| self.tokens(&pattern)))
        };
        match resolve_skeleton(&skeleton, lookup)? {
            Some(mut tokens) => {
                if let Some(name) = options.time_zone_name {
                    append_zone(&mut tokens, name);
                }
                renderer.render(&tokens)
            }
            None => self.per_field(&renderer, &skeleton, options),
        }
    }
}
