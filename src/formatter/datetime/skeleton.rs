//! Skeleton reconciliation against `available_formats`.
//!
//! A skeleton is the set of requested fields with their widths. Lookup
//! tries the exact key first, then walks an ordered list of
//! simplifications, then composes ranked date and time skeletons. Every
//! field whose width was simplified gets the requested width back on the
//! tokens of the matched pattern.

use tracing::trace;

use crate::error::Result;
use crate::options::{DateTimeFormatOptions, MonthWidth, NumericWidth, TextWidth};
use crate::types::DateTimeToken;

/// Requested fields as CLDR letter counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct Skeleton {
    pub year: Option<usize>,
    pub month: Option<usize>,
    pub weekday: Option<usize>,
    pub day: Option<usize>,
    pub hour: Option<usize>,
    pub minute: Option<usize>,
    pub second: Option<usize>,
    /// `h` when true, `H` otherwise
    pub hour12: bool,
}

fn numeric_count(width: NumericWidth) -> usize {
    match width {
        NumericWidth::Numeric => 1,
        NumericWidth::TwoDigit => 2,
    }
}

fn month_count(width: MonthWidth) -> usize {
    match width {
        MonthWidth::Numeric => 1,
        MonthWidth::TwoDigit => 2,
        MonthWidth::Short => 3,
        MonthWidth::Long => 4,
        MonthWidth::Narrow => 5,
    }
}

fn weekday_count(width: TextWidth) -> usize {
    match width {
        TextWidth::Short => 1,
        TextWidth::Long => 4,
        TextWidth::Narrow => 5,
    }
}

impl Skeleton {
    /// Build the skeleton for a field request; no fields means `yMd`
    pub fn from_options(options: &DateTimeFormatOptions, hour12: bool) -> Self {
        let skeleton = Skeleton {
            year: options.year.map(numeric_count),
            month: options.month.map(month_count),
            weekday: options.weekday.map(weekday_count),
            day: options.day.map(numeric_count),
            hour: options.hour.map(numeric_count),
            minute: options.minute.map(numeric_count),
            second: options.second.map(numeric_count),
            hour12,
        };
        if skeleton.has_date() || skeleton.has_time() {
            skeleton
        } else {
            Skeleton {
                year: Some(1),
                month: Some(1),
                day: Some(1),
                ..skeleton
            }
        }
    }

    pub fn has_date(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.weekday.is_some() || self.day.is_some()
    }

    pub fn has_time(&self) -> bool {
        self.hour.is_some() || self.minute.is_some() || self.second.is_some()
    }

    pub fn hour_letter(&self) -> char {
        if self.hour12 { 'h' } else { 'H' }
    }

    /// Lookup key in the fixed order year, month, weekday, day, hour,
    /// minute, second
    pub fn key(&self) -> String {
        let mut key = String::new();
        for (letter, count) in [
            ('y', self.year),
            ('M', self.month),
            ('E', self.weekday),
            ('d', self.day),
            (self.hour_letter(), self.hour),
            ('m', self.minute),
            ('s', self.second),
        ] {
            for _ in 0..count.unwrap_or(0) {
                key.push(letter);
            }
        }
        key
    }

    fn date_part(&self) -> Skeleton {
        Skeleton {
            hour: None,
            minute: None,
            second: None,
            ..*self
        }
    }

    fn time_part(&self) -> Skeleton {
        Skeleton {
            year: None,
            month: None,
            weekday: None,
            day: None,
            ..*self
        }
    }

    fn fields(&self) -> [Option<usize>; 7] {
        [
            self.year,
            self.month,
            self.weekday,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }

    /// Whether `self` has every field of `request`, with a compatible month
    fn covers(&self, request: &Skeleton) -> bool {
        let present = self
            .fields()
            .iter()
            .zip(request.fields())
            .all(|(mine, wanted)| wanted.is_none() || mine.is_some());
        let textual = |count: Option<usize>| count.map(|c| c >= 3);
        let month_compatible = match (textual(self.month), textual(request.month)) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        present && month_compatible
    }

    fn extra_fields(&self, request: &Skeleton) -> usize {
        self.fields()
            .iter()
            .zip(request.fields())
            .filter(|(mine, wanted)| mine.is_some() && wanted.is_none())
            .count()
    }
}

fn collapse(field: &mut Option<usize>, from: &[usize], to: usize) -> bool {
    match field {
        Some(count) if from.contains(count) => {
            *count = to;
            true
        }
        _ => false,
    }
}

fn simplify_weekday(s: &mut Skeleton) -> bool {
    collapse(&mut s.weekday, &[4, 5], 1)
}

fn simplify_month_name(s: &mut Skeleton) -> bool {
    collapse(&mut s.month, &[4, 5], 3)
}

fn simplify_two_digit_fields(s: &mut Skeleton) -> bool {
    let mut changed = false;
    for field in [&mut s.month, &mut s.day, &mut s.hour, &mut s.minute, &mut s.second] {
        changed |= collapse(field, &[2], 1);
    }
    changed
}

fn simplify_two_digit_year(s: &mut Skeleton) -> bool {
    collapse(&mut s.year, &[2], 1)
}

fn simplify_minute_second(s: &mut Skeleton) -> bool {
    if s.minute.is_none() || s.second.is_none() {
        return false;
    }
    let minute = collapse(&mut s.minute, &[2], 1);
    let second = collapse(&mut s.second, &[2], 1);
    minute || second
}

/// Simplifications applied cumulatively, in order
const SIMPLIFICATIONS: &[(&str, fn(&mut Skeleton) -> bool)] = &[
    ("weekday to short", simplify_weekday),
    ("month name to short", simplify_month_name),
    ("two-digit fields to numeric", simplify_two_digit_fields),
    ("two-digit year to numeric", simplify_two_digit_year),
];

/// Put the requested widths back on the tokens of a matched pattern
fn restore_widths(tokens: &mut [DateTimeToken], requested: &Skeleton, matched: &Skeleton) {
    for token in tokens.iter_mut() {
        let DateTimeToken::Field { letter, count } = token else {
            continue;
        };
        let (wanted, found) = match letter {
            'y' => (requested.year, matched.year),
            'M' | 'L' => (requested.month, matched.month),
            'E' | 'c' | 'e' => (requested.weekday, matched.weekday),
            'd' => (requested.day, matched.day),
            'h' | 'H' | 'K' | 'k' => (requested.hour, matched.hour),
            'm' => (requested.minute, matched.minute),
            's' => (requested.second, matched.second),
            _ => continue,
        };
        let (Some(wanted), Some(found)) = (wanted, found) else {
            continue;
        };
        if wanted == found {
            continue;
        }
        *count = match letter {
            // one letter is numeric for `c` and `e`, so short names need three
            'E' | 'c' | 'e' if wanted == 1 => 3,
            _ => wanted,
        };
    }
}

fn date_candidates() -> [Skeleton; 7] {
    let s = |year: Option<usize>, month: usize, weekday: Option<usize>| Skeleton {
        year,
        month: Some(month),
        weekday,
        day: Some(1),
        ..Skeleton::default()
    };
    [
        s(Some(1), 3, Some(1)),
        s(Some(1), 3, None),
        s(Some(1), 1, None),
        s(None, 3, Some(1)),
        s(None, 3, None),
        s(None, 1, Some(1)),
        s(None, 1, None),
    ]
}

fn time_candidates(hour12: bool) -> [Skeleton; 4] {
    let s = |hour: Option<usize>, second: Option<usize>| Skeleton {
        hour,
        minute: Some(1),
        second,
        hour12,
        ..Skeleton::default()
    };
    [
        s(Some(1), Some(1)),
        s(Some(1), None),
        Skeleton {
            hour: Some(1),
            hour12,
            ..Skeleton::default()
        },
        s(None, Some(1)),
    ]
}

/// Ranked candidate with the fewest fields beyond the request
fn best_candidate(candidates: &[Skeleton], request: &Skeleton) -> Option<Skeleton> {
    candidates
        .iter()
        .filter(|c| c.covers(request))
        .min_by_key(|c| c.extra_fields(request))
        .copied()
}

/// Look up `candidate` and restore the widths of `request` on it
fn lookup_restored(
    lookup: &impl Fn(&str) -> Result<Option<Vec<DateTimeToken>>>,
    candidate: &Skeleton,
    request: &Skeleton,
) -> Result<Option<Vec<DateTimeToken>>> {
    let Some(mut tokens) = lookup(&candidate.key())? else {
        return Ok(None);
    };
    restore_widths(&mut tokens, request, candidate);
    Ok(Some(tokens))
}

/// Find a pattern for `requested`, or `None` when only per-field output
/// is left.
pub(super) fn resolve_skeleton(
    requested: &Skeleton,
    lookup: impl Fn(&str) -> Result<Option<Vec<DateTimeToken>>>,
) -> Result<Option<Vec<DateTimeToken>>> {
    if let Some(tokens) = lookup(&requested.key())? {
        return Ok(Some(tokens));
    }

    let mut current = *requested;
    for (name, simplify) in SIMPLIFICATIONS {
        if !simplify(&mut current) {
            continue;
        }
        trace!(rule = name, key = %current.key(), "simplified skeleton");
        if let Some(tokens) = lookup_restored(&lookup, &current, requested)? {
            return Ok(Some(tokens));
        }
    }

    let mut combined = *requested;
    if simplify_minute_second(&mut combined) {
        trace!(key = %combined.key(), "simplified minute and second together");
        if let Some(tokens) = lookup_restored(&lookup, &combined, requested)? {
            return Ok(Some(tokens));
        }
    }

    let date = if requested.has_date() {
        let request = requested.date_part();
        let Some(candidate) = best_candidate(&date_candidates(), &request) else {
            return Ok(None);
        };
        trace!(key = %candidate.key(), "ranked date skeleton");
        match lookup_restored(&lookup, &candidate, &request)? {
            Some(tokens) => Some(tokens),
            None => return Ok(None),
        }
    } else {
        None
    };
    let time = if requested.has_time() {
        let request = requested.time_part();
        let Some(candidate) = best_candidate(&time_candidates(requested.hour12), &request) else {
            return Ok(None);
        };
        trace!(key = %candidate.key(), "ranked time skeleton");
        match lookup_restored(&lookup, &candidate, &request)? {
            Some(tokens) => Some(tokens),
            None => return Ok(None),
        }
    } else {
        None
    };

    Ok(match (date, time) {
        (Some(mut date), Some(time)) => {
            date.push(DateTimeToken::Literal(", ".to_string()));
            date.extend(time);
            Some(date)
        }
        (date, time) => date.or(time),
    })
}
