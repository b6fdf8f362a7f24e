//! Target time zones and their offsets.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use winnow::combinator::{alt, opt, preceded};
use winnow::token::take_while;
use winnow::{ModalResult, Parser};

use crate::error::{FormatError, Result};

/// Zone id reported when the host zone cannot be determined
pub const UNKNOWN_ZONE: &str = "Etc/Unknown";

/// UTC offset of a zone at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetRecord {
    pub utc_offset_seconds: i32,
    pub is_daylight_saving: bool,
}

/// Zone a value is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetZone {
    Iana(Tz),
    Fixed(FixedOffset),
    /// `Etc/UTC` or `Etc/GMT`
    Utc { id: &'static str },
    /// Host zone that could not be detected, treated as offset zero
    Unknown,
}

fn two_digits(input: &mut &str) -> ModalResult<u32> {
    take_while(2, |c: char| c.is_ascii_digit())
        .try_map(u32::from_str)
        .parse_next(input)
}

fn offset_parts(input: &mut &str) -> ModalResult<(i32, u32, u32)> {
    let sign = alt(('+'.value(1), '-'.value(-1), '\u{2212}'.value(-1))).parse_next(input)?;
    let hours = two_digits.parse_next(input)?;
    let minutes = opt(preceded(opt(':'), two_digits)).parse_next(input)?;
    Ok((sign, hours, minutes.unwrap_or(0)))
}

/// Parse `+09:00`, `+0900` or `+09`
pub(crate) fn parse_fixed_offset(text: &str) -> Option<FixedOffset> {
    let mut input = text;
    let (sign, hours, minutes) = offset_parts.parse_next(&mut input).ok()?;
    if !input.is_empty() || hours > 23 || minutes > 59 {
        return None;
    }
    let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
    FixedOffset::east_opt(sign * seconds)
}

impl TargetZone {
    /// Resolve a zone id.
    ///
    /// Accepts IANA ids, `UTC`/`GMT` and their `Etc/` forms, fixed
    /// offsets and [`UNKNOWN_ZONE`].
    pub fn parse(id: &str) -> Result<Self> {
        let id = id.trim();
        for (alias, canonical) in [
            ("UTC", "Etc/UTC"),
            ("Etc/UTC", "Etc/UTC"),
            ("GMT", "Etc/GMT"),
            ("Etc/GMT", "Etc/GMT"),
        ] {
            if id.eq_ignore_ascii_case(alias) {
                return Ok(TargetZone::Utc { id: canonical });
            }
        }
        if id == UNKNOWN_ZONE {
            return Ok(TargetZone::Unknown);
        }
        if let Some(offset) = parse_fixed_offset(id) {
            return Ok(TargetZone::Fixed(offset));
        }
        Tz::from_str(id)
            .map(TargetZone::Iana)
            .map_err(|_| FormatError::invalid_option("timeZone", format!("unknown time zone `{id}`")))
    }

    /// Canonical id, used for zone name lookups
    pub fn id(&self) -> String {
        match self {
            TargetZone::Iana(tz) => tz.name().to_string(),
            TargetZone::Fixed(offset) => {
                let seconds = offset.local_minus_utc();
                let sign = if seconds < 0 { '-' } else { '+' };
                let minutes = seconds.unsigned_abs() / 60;
                format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
            }
            TargetZone::Utc { id } => (*id).to_string(),
            TargetZone::Unknown => UNKNOWN_ZONE.to_string(),
        }
    }

    /// Whether the zone carries named rules (as opposed to a bare offset)
    pub fn is_named(&self) -> bool {
        matches!(self, TargetZone::Iana(_) | TargetZone::Utc { .. })
    }

    pub fn offset_at(&self, instant: &DateTime<Utc>) -> OffsetRecord {
        match self {
            TargetZone::Iana(tz) => {
                let offset = tz.offset_from_utc_datetime(&instant.naive_utc());
                OffsetRecord {
                    utc_offset_seconds: offset.fix().local_minus_utc(),
                    is_daylight_saving: !offset.dst_offset().is_zero(),
                }
            }
            TargetZone::Fixed(offset) => OffsetRecord {
                utc_offset_seconds: offset.local_minus_utc(),
                is_daylight_saving: false,
            },
            TargetZone::Utc { .. } | TargetZone::Unknown => OffsetRecord {
                utc_offset_seconds: 0,
                is_daylight_saving: false,
            },
        }
    }

    /// Wall-clock time of `instant` in this zone
    pub fn to_wall(&self, instant: &DateTime<Utc>) -> Option<NaiveDateTime> {
        let offset = self.offset_at(instant).utc_offset_seconds;
        instant
            .naive_utc()
            .checked_add_signed(TimeDelta::seconds(i64::from(offset)))
    }

    /// Instant of a wall-clock time in this zone.
    ///
    /// Times skipped by a forward transition move one hour later; repeated
    /// times take the earlier instant.
    pub fn from_wall(&self, wall: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            TargetZone::Iana(tz) => match tz.from_local_datetime(wall) {
                LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(first, second) => {
                    Some(first.with_timezone(&Utc).min(second.with_timezone(&Utc)))
                }
                LocalResult::None => {
                    let shifted = wall.checked_add_signed(TimeDelta::hours(1))?;
                    tz.from_local_datetime(&shifted)
                        .earliest()
                        .map(|dt| dt.with_timezone(&Utc))
                }
            },
            TargetZone::Fixed(offset) => offset
                .from_local_datetime(wall)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            TargetZone::Utc { .. } | TargetZone::Unknown => Some(Utc.from_utc_datetime(wall)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wall(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn fixed_offset_forms() {
        let east = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(parse_fixed_offset("+09:00"), Some(east));
        assert_eq!(parse_fixed_offset("+0900"), Some(east));
        assert_eq!(parse_fixed_offset("+09"), Some(east));
        assert_eq!(
            parse_fixed_offset("-05:30"),
            FixedOffset::west_opt(5 * 3600 + 1800)
        );
        assert_eq!(parse_fixed_offset("+9"), None);
        assert_eq!(parse_fixed_offset("+25:00"), None);
    }

    #[test]
    fn utc_aliases() {
        assert_eq!(TargetZone::parse("utc").unwrap(), TargetZone::Utc { id: "Etc/UTC" });
        assert_eq!(TargetZone::parse("GMT").unwrap().id(), "Etc/GMT");
        assert!(TargetZone::parse("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn daylight_saving_from_zone_rules() {
        let zone = TargetZone::parse("America/New_York").unwrap();
        let summer = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let winter = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            zone.offset_at(&summer),
            OffsetRecord {
                utc_offset_seconds: -4 * 3600,
                is_daylight_saving: true
            }
        );
        assert!(!zone.offset_at(&winter).is_daylight_saving);
    }

    #[test]
    fn skipped_wall_time_moves_forward() {
        let zone = TargetZone::parse("America/New_York").unwrap();
        let instant = zone.from_wall(&wall(2024, 3, 10, 2, 30)).unwrap();
        assert_eq!(zone.to_wall(&instant), Some(wall(2024, 3, 10, 3, 30)));
    }

    #[test]
    fn repeated_wall_time_takes_earlier_instant() {
        let zone = TargetZone::parse("America/New_York").unwrap();
        let instant = zone.from_wall(&wall(2024, 11, 3, 1, 30)).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
    }
}
