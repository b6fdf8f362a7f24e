//! Substitution of date/time pattern fields.

use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use toml::Value;

use super::timezone::{OffsetRecord, TargetZone};
use crate::error::Result;
use crate::locale::{Domain, LocaleDataResolver, LocaleTag};
use crate::types::DateTimeToken;

fn pad(value: impl std::fmt::Display, width: usize) -> String {
    format!("{value:0>width$}")
}

/// Width name of month, weekday and day period texts
fn text_width(count: usize) -> &'static str {
    match count {
        4 => "wide",
        5 => "narrow",
        6 => "short",
        _ => "abbreviated",
    }
}

/// `+HH`, `+HHMM`, `+HH:MM` and friends; `Z` for zero when requested
fn iso_offset(seconds: i32, count: usize, zero_as_z: bool) -> String {
    if seconds == 0 && zero_as_z {
        return "Z".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let total = seconds.unsigned_abs();
    let (hours, minutes, secs) = (total / 3600, total / 60 % 60, total % 60);
    match count {
        1 if minutes == 0 => format!("{sign}{hours:02}"),
        1 | 2 => format!("{sign}{hours:02}{minutes:02}"),
        3 => format!("{sign}{hours:02}:{minutes:02}"),
        4 if secs != 0 => format!("{sign}{hours:02}{minutes:02}{secs:02}"),
        4 => format!("{sign}{hours:02}{minutes:02}"),
        _ if secs != 0 => format!("{sign}{hours:02}:{minutes:02}:{secs:02}"),
        _ => format!("{sign}{hours:02}:{minutes:02}"),
    }
}

/// Which family of zone names a field asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneStyle {
    Specific,
    Generic,
}

/// Renders the fields of one date/time value for one locale
pub(super) struct FieldRenderer<'a> {
    pub resolver: &'a LocaleDataResolver,
    pub locale: &'a str,
    pub wall: NaiveDateTime,
    pub zone: TargetZone,
    pub offset: OffsetRecord,
}

impl FieldRenderer<'_> {
    pub fn render(&self, tokens: &[DateTimeToken]) -> Result<String> {
        let mut out = String::new();
        for token in tokens {
            match token {
                DateTimeToken::Field { letter, count } => out.push_str(&self.field(*letter, *count)?),
                DateTimeToken::Literal(text) | DateTimeToken::Quoted(text) => out.push_str(text),
            }
        }
        Ok(out)
    }

    fn calendar_str(&self, path: &str) -> Result<Option<String>> {
        self.resolver.resolve_str(self.locale, Domain::Calendar, path)
    }

    fn zone_str(&self, path: &str) -> Result<Option<String>> {
        self.resolver.resolve_str(self.locale, Domain::TimezoneNames, path)
    }

    /// Entry `index` of a name list, falling back to abbreviated names
    fn name(&self, kind: &str, context: &str, width: &str, index: usize) -> Result<Option<String>> {
        for width in [width, "abbreviated"] {
            let path = format!("{kind}.{context}.{width}");
            if let Some(names) = self.resolver.resolve_strings(self.locale, Domain::Calendar, &path)? {
                if let Some(name) = names.get(index) {
                    return Ok(Some(name.clone()));
                }
            }
        }
        Ok(None)
    }

    fn month(&self, count: usize, context: &str) -> Result<String> {
        let month = self.wall.month();
        if count <= 2 {
            return Ok(pad(month, count));
        }
        let name = self.name("months", context, text_width(count), month0(month))?;
        Ok(name.unwrap_or_else(|| month.to_string()))
    }

    fn weekday(&self, count: usize, context: &str) -> Result<String> {
        let index = self.wall.weekday().num_days_from_sunday() as usize;
        let name = self.name("days", context, text_width(count), index)?;
        Ok(name.unwrap_or_else(|| self.wall.weekday().to_string()))
    }

    /// First day of the week for the locale's territory, or the language's
    /// likely territory when the tag names none
    fn first_weekday(&self) -> Result<Weekday> {
        let chain = self.resolver.inheritance_chain(self.locale)?;
        let requested = chain.requested();
        let territory = match requested.territory() {
            Some(territory) => Some(territory.to_string()),
            None => self
                .resolver
                .supplemental(Domain::LikelySubtags, requested.language())?
                .and_then(|v| v.as_str().and_then(|t| LocaleTag::parse(t).ok()))
                .and_then(|t| t.territory().map(str::to_string)),
        };
        for key in territory.iter().map(String::as_str).chain(["001"]) {
            if let Some(Value::String(day)) =
                self.resolver.supplemental(Domain::WeekData, &format!("first_day.{key}"))?
            {
                if let Ok(weekday) = Weekday::from_str(&day) {
                    return Ok(weekday);
                }
            }
        }
        Ok(Weekday::Mon)
    }

    /// Day of the week counted from the locale's first day, starting at 1
    fn local_weekday_number(&self) -> Result<u32> {
        let first = self.first_weekday()?.num_days_from_monday();
        let day = self.wall.weekday().num_days_from_monday();
        Ok((day + 7 - first) % 7 + 1)
    }

    fn day_period(&self, count: usize, flexible: bool) -> Result<String> {
        let width = text_width(count.min(5));
        let exact_hour = self.wall.minute() == 0 && self.wall.second() == 0 && self.wall.nanosecond() == 0;
        if flexible && exact_hour {
            let special = match self.wall.hour() {
                0 => Some("midnight"),
                12 => Some("noon"),
                _ => None,
            };
            if let Some(key) = special {
                if let Some(name) = self.calendar_str(&format!("day_periods.format.{width}.{key}"))? {
                    return Ok(name);
                }
            }
        }
        let key = if self.wall.hour() < 12 { "am" } else { "pm" };
        Ok(self
            .calendar_str(&format!("day_periods.format.{width}.{key}"))?
            .unwrap_or_else(|| key.to_ascii_uppercase()))
    }

    fn fraction(&self, count: usize) -> String {
        let mut digits = format!("{:09}", self.wall.nanosecond().min(999_999_999));
        if count <= digits.len() {
            digits.truncate(count);
        } else {
            digits.push_str(&"0".repeat(count - digits.len()));
        }
        digits
    }

    fn field(&self, letter: char, count: usize) -> Result<String> {
        let wall = &self.wall;
        let text = match letter {
            'y' if count == 2 => pad(wall.year().rem_euclid(100), 2),
            'y' => pad(wall.year(), count),
            'Y' if count == 2 => pad(wall.iso_week().year().rem_euclid(100), 2),
            'Y' => pad(wall.iso_week().year(), count),
            'M' => self.month(count, "format")?,
            'L' => self.month(count, "stand_alone")?,
            'd' => pad(wall.day(), count.min(2)),
            'D' => pad(wall.ordinal(), count.min(3)),
            'E' => self.weekday(count, "format")?,
            'e' if count <= 2 => pad(self.local_weekday_number()?, count),
            'e' => self.weekday(count, "format")?,
            'c' if count <= 2 => self.local_weekday_number()?.to_string(),
            'c' => self.weekday(count, "stand_alone")?,
            'a' => self.day_period(count, false)?,
            'b' | 'B' => self.day_period(count, true)?,
            'H' => pad(wall.hour(), count.min(2)),
            'h' => pad(match wall.hour() % 12 { 0 => 12, h => h }, count.min(2)),
            'K' => pad(wall.hour() % 12, count.min(2)),
            'k' => pad(match wall.hour() { 0 => 24, h => h }, count.min(2)),
            'm' => pad(wall.minute(), count.min(2)),
            's' => pad(wall.second(), count.min(2)),
            'S' => self.fraction(count),
            'z' => self.zone_name(ZoneStyle::Specific, count >= 4)?,
            'v' => self.zone_name(ZoneStyle::Generic, count >= 4)?,
            'O' => self.localized_gmt(count >= 4)?,
            'Z' if count == 4 => self.localized_gmt(true)?,
            'Z' if count == 5 => iso_offset(self.offset.utc_offset_seconds, 5, true),
            'Z' => iso_offset(self.offset.utc_offset_seconds, 2, false),
            'x' => iso_offset(self.offset.utc_offset_seconds, count, false),
            'X' => iso_offset(self.offset.utc_offset_seconds, count, true),
            'V' => self.zone_identifier(count)?,
            other => other.to_string().repeat(count),
        };
        Ok(text)
    }

    /// Offset in the locale's GMT format, `GMT-8` short or `GMT-08:00` long
    fn localized_gmt(&self, long: bool) -> Result<String> {
        let seconds = self.offset.utc_offset_seconds;
        let gmt_format = self.zone_str("gmt_format")?.unwrap_or_else(|| "GMT{0}".to_string());
        if seconds == 0 {
            return Ok(self
                .zone_str("gmt_zero_format")?
                .unwrap_or_else(|| gmt_format.replace("{0}", "")));
        }
        let hour_format = self
            .zone_str("hour_format")?
            .unwrap_or_else(|| "+HH:mm;-HH:mm".to_string());
        let (positive, negative) = hour_format
            .split_once(';')
            .unwrap_or((hour_format.as_str(), hour_format.as_str()));
        let mut pattern = if seconds < 0 { negative } else { positive }.to_string();

        let total = seconds.unsigned_abs() / 60;
        let (hours, minutes) = (total / 60, total % 60);
        if !long {
            pattern = pattern.replace("HH", "H");
            if minutes == 0 {
                pattern = pattern.replace(":mm", "").replace(".mm", "").replace("mm", "");
            }
        }
        let offset = pattern
            .replace("HH", &pad(hours, 2))
            .replace('H', &hours.to_string())
            .replace("mm", &pad(minutes, 2));
        Ok(gmt_format.replace("{0}", &offset))
    }

    fn exemplar_city(&self, id: &str) -> Result<String> {
        if let Some(city) = self.zone_str(&format!("zones.{id}.exemplar_city"))? {
            return Ok(city);
        }
        let last = id.rsplit('/').next().unwrap_or(id);
        Ok(last.replace('_', " "))
    }

    fn zone_identifier(&self, count: usize) -> Result<String> {
        let id = self.zone.id();
        match count {
            1 => Ok("unk".to_string()),
            2 => Ok(id),
            3 => self.exemplar_city(&id),
            _ => match self.location_name(&id)? {
                Some(name) => Ok(name),
                None => self.localized_gmt(true),
            },
        }
    }

    /// `{0} Time` with the exemplar city, when the locale names the city
    fn location_name(&self, id: &str) -> Result<Option<String>> {
        let Some(city) = self.zone_str(&format!("zones.{id}.exemplar_city"))? else {
            return Ok(None);
        };
        let region_format = self.zone_str("region_format")?.unwrap_or_else(|| "{0}".to_string());
        Ok(Some(region_format.replace("{0}", &city)))
    }

    /// Zone specific name, then metazone name, then localized offset
    fn zone_name(&self, style: ZoneStyle, long: bool) -> Result<String> {
        if !self.zone.is_named() {
            return self.localized_gmt(long);
        }
        let id = self.zone.id();
        let width = if long { "long" } else { "short" };
        let kind = match style {
            ZoneStyle::Generic => "generic",
            ZoneStyle::Specific if self.offset.is_daylight_saving => "daylight",
            ZoneStyle::Specific => "standard",
        };

        if let Some(name) = self.zone_str(&format!("zones.{id}.{width}.{kind}"))? {
            return Ok(name);
        }

        if let Some(Value::String(metazone)) = self.resolver.supplemental(Domain::Metazones, &id)? {
            if metazone == "GMT" {
                let gmt_format = self.zone_str("gmt_format")?.unwrap_or_default();
                if gmt_format.starts_with("UTC") {
                    return self.localized_gmt(long);
                }
            }
            let mut kinds = vec![kind];
            if style == ZoneStyle::Generic && !self.offset.is_daylight_saving {
                kinds.push("standard");
            }
            for kind in kinds {
                if let Some(name) = self.zone_str(&format!("metazones.{metazone}.{width}.{kind}"))? {
                    return Ok(name);
                }
            }
        }

        if style == ZoneStyle::Generic {
            if let Some(name) = self.location_name(&id)? {
                return Ok(name);
            }
        }
        self.localized_gmt(long)
    }
}

fn month0(month: u32) -> usize {
    month.saturating_sub(1) as usize
}
