//! Ordered phrase passes over a scratch copy of the utterance.
//!
//! Each pass blanks what it recognizes with spaces of equal byte length, so
//! match offsets stay valid and later passes never see consumed phrases.

use super::lexicon::{
    apply_day_period, weekday_from_name, BARE_HOUR_RE, CLOCK_TIME_RE, DATE_LITERAL_RE,
    DATE_MARKER_RE, FROM_NOW_RE, HOUR_TIME_RE, INTAKE_PHRASE_RE, MONTH_NAME_DATE_RE,
    OFFSET_BEFORE_RE, PRIORITY_PHRASES, REPEAT_KEYWORDS, WEEKDAY_RANGE_RE, WEEKDAY_RE,
    WHITESPACE_RE,
};
use super::{ParseFailure, ParseFailureReason, ParseOptions};
use crate::calendar::{jalali_month_from_name, normalize_digits, JalaliDate, WeekdayIndex};
use crate::model::parsed::ParsedReminder;
use crate::model::reminder::Priority;
use crate::model::repeat::{CustomDays, RepeatPattern, WeekendConvention};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use std::ops::Range;

/// Years at or above this in a date literal are read as Gregorian.
const GREGORIAN_YEAR_FLOOR: i32 = 1700;
const MESSAGE_TRIM_CHARS: &[char] = &['،', ',', '.', '!', '؟', '?', ':', '؛', ';', '-', '\u{200C}'];

/// Parses with default options (09:00 default time, Friday/Saturday weekend).
pub fn parse(raw_text: &str, now: NaiveDateTime) -> Result<ParsedReminder, ParseFailure> {
    parse_with(raw_text, now, &ParseOptions::default())
}

/// Parses one utterance relative to `now`.
///
/// # Errors
/// - [`ParseFailureReason::EmptyMessage`] when nothing remains to remind about.
/// - [`ParseFailureReason::ElapsedDate`] when an explicit date is still not
///   after `now` once rolled over by a day.
pub fn parse_with(
    raw_text: &str,
    now: NaiveDateTime,
    options: &ParseOptions,
) -> Result<ParsedReminder, ParseFailure> {
    let mut scratch = Scratch::new(raw_text);

    let offset = take_offset(&mut scratch);
    let from_now = take_from_now(&mut scratch);
    let date = take_date(&mut scratch, now.date());
    let time = take_time(&mut scratch).unwrap_or(options.default_time);
    let repeat = take_repeat(&mut scratch);
    let priority = take_priority(&mut scratch);
    scratch.take_all(&INTAKE_PHRASE_RE, |_| Some(()));

    let message = scratch.into_message();
    if message.is_empty() {
        return Err(ParseFailure::new(ParseFailureReason::EmptyMessage));
    }

    let (trigger_at, offset_minutes) = match from_now {
        Some(delta) => (now + delta, None),
        None => {
            let resolved = resolve_trigger(date, time, &repeat, now, options.weekend)?;
            apply_offset(resolved, offset, now)
        }
    };

    Ok(ParsedReminder {
        message,
        trigger_at,
        repeat,
        priority,
        offset_minutes,
    })
}

struct Scratch {
    text: String,
}

impl Scratch {
    fn new(raw_text: &str) -> Self {
        let text = normalize_digits(raw_text)
            .to_lowercase()
            .chars()
            .map(|ch| match ch {
                'ي' => 'ی',
                'ك' => 'ک',
                other => other,
            })
            .collect();
        Self { text }
    }

    /// Blanks and returns the first match for which `extract` yields a value.
    fn take_first<T>(
        &mut self,
        pattern: &Regex,
        mut extract: impl FnMut(&Captures<'_>) -> Option<T>,
    ) -> Option<T> {
        let (range, value) = pattern.captures_iter(&self.text).find_map(|caps| {
            let whole = caps.get(0)?;
            extract(&caps).map(|value| (whole.range(), value))
        })?;
        self.blank(range);
        Some(value)
    }

    fn take_all<T>(
        &mut self,
        pattern: &Regex,
        mut extract: impl FnMut(&Captures<'_>) -> Option<T>,
    ) -> Vec<T> {
        let mut taken = Vec::new();
        while let Some(value) = self.take_first(pattern, &mut extract) {
            taken.push(value);
        }
        taken
    }

    fn blank(&mut self, range: Range<usize>) {
        let spaces = " ".repeat(range.len());
        self.text.replace_range(range, &spaces);
    }

    fn into_message(self) -> String {
        let collapsed = WHITESPACE_RE.replace_all(&self.text, " ");
        collapsed
            .trim_matches(|ch: char| ch.is_whitespace() || MESSAGE_TRIM_CHARS.contains(&ch))
            .to_string()
    }
}

#[derive(Debug, Clone, Copy)]
struct ResolvedDate {
    date: NaiveDate,
    explicit: bool,
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}

fn take_offset(scratch: &mut Scratch) -> Option<u32> {
    scratch.take_first(&OFFSET_BEFORE_RE, |caps| {
        let amount = caps.name("amount")?.as_str();
        if amount.contains("ساعت") && !amount.contains("نیم") {
            Some(60)
        } else {
            Some(30)
        }
    })
}

fn take_from_now(scratch: &mut Scratch) -> Option<Duration> {
    scratch.take_first(&FROM_NOW_RE, |caps| {
        let amount = caps.name("amount")?.as_str();
        let unit_minutes = if &caps["unit"] == "ساعت" { 60 } else { 1 };
        let minutes = match amount {
            "نیم" => unit_minutes / 2,
            "یک" => unit_minutes,
            digits => digits.parse::<i64>().ok()? * unit_minutes,
        };
        (minutes > 0).then(|| Duration::minutes(minutes))
    })
}

fn take_date(scratch: &mut Scratch, today: NaiveDate) -> ResolvedDate {
    if let Some(days) = scratch.take_first(&DATE_MARKER_RE, |caps| {
        if caps.name("after").is_some() {
            Some(2)
        } else if caps.name("tomorrow").is_some() {
            Some(1)
        } else {
            Some(0)
        }
    }) {
        return ResolvedDate {
            date: today + Duration::days(days),
            explicit: true,
        };
    }

    if let Some(date) = scratch.take_first(&DATE_LITERAL_RE, |caps| {
        literal_date(number(caps, "y")?, number(caps, "m")?, number(caps, "d")?)
    }) {
        return ResolvedDate {
            date,
            explicit: true,
        };
    }

    if let Some(date) = scratch.take_first(&MONTH_NAME_DATE_RE, |caps| {
        let month = jalali_month_from_name(caps.name("month")?.as_str())?;
        let day: u32 = number(caps, "d")?;
        match number::<i32>(caps, "y") {
            Some(year) => JalaliDate::new(year, month, day)?.to_gregorian(),
            None => next_jalali_date(month, day, today),
        }
    }) {
        return ResolvedDate {
            date,
            explicit: true,
        };
    }

    ResolvedDate {
        date: today,
        explicit: false,
    }
}

fn literal_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if year >= GREGORIAN_YEAR_FLOOR {
        NaiveDate::from_ymd_opt(year, month, day)
    } else {
        JalaliDate::new(year, month, day)?.to_gregorian()
    }
}

/// The given Jalali day in the current Jalali year, or the next one if it has passed.
fn next_jalali_date(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = JalaliDate::from_gregorian(today).year;
    let this_year_date = JalaliDate::new(this_year, month, day).and_then(JalaliDate::to_gregorian);
    match this_year_date {
        Some(date) if date >= today => Some(date),
        _ => JalaliDate::new(this_year + 1, month, day)?.to_gregorian(),
    }
}

fn take_time(scratch: &mut Scratch) -> Option<NaiveTime> {
    let time_of = |caps: &Captures<'_>, minute: u32| {
        let hour: u32 = number(caps, "h")?;
        let hour = apply_day_period(hour, caps.name("period").map(|m| m.as_str()));
        NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0)
    };

    scratch
        .take_first(&CLOCK_TIME_RE, |caps| time_of(caps, number(caps, "m")?))
        .or_else(|| {
            scratch.take_first(&HOUR_TIME_RE, |caps| {
                let minute = if caps.name("half").is_some() {
                    30
                } else {
                    number(caps, "m").unwrap_or(0)
                };
                time_of(caps, minute)
            })
        })
        .or_else(|| scratch.take_first(&BARE_HOUR_RE, |caps| time_of(caps, 0)))
}

fn take_repeat(scratch: &mut Scratch) -> RepeatPattern {
    for (pattern, keyword) in REPEAT_KEYWORDS.iter() {
        if scratch.take_first(keyword, |_| Some(())).is_some() {
            return pattern.clone();
        }
    }

    let mut days: Vec<WeekdayIndex> = scratch
        .take_all(&WEEKDAY_RANGE_RE, |caps| {
            let from = weekday_from_name(caps.name("from")?.as_str())?;
            let to = weekday_from_name(caps.name("to")?.as_str())?;
            Some(weekday_span(from, to))
        })
        .into_iter()
        .flatten()
        .collect();
    days.extend(scratch.take_all(&WEEKDAY_RE, |caps| {
        weekday_from_name(caps.name("day")?.as_str())
    }));

    CustomDays::new(days)
        .map(RepeatPattern::Custom)
        .unwrap_or(RepeatPattern::Once)
}

/// Inclusive span from `from` to `to`, wrapping past Saturday.
fn weekday_span(from: WeekdayIndex, to: WeekdayIndex) -> Vec<WeekdayIndex> {
    let mut span = vec![from];
    let mut day = from;
    while day != to {
        day = day.succ();
        span.push(day);
    }
    span
}

fn take_priority(scratch: &mut Scratch) -> Priority {
    PRIORITY_PHRASES
        .iter()
        .find_map(|(priority, phrase)| scratch.take_first(phrase, |_| Some(*priority)))
        .unwrap_or_default()
}

fn resolve_trigger(
    date: ResolvedDate,
    time: NaiveTime,
    repeat: &RepeatPattern,
    now: NaiveDateTime,
    weekend: WeekendConvention,
) -> Result<NaiveDateTime, ParseFailure> {
    let mut candidate = date.date.and_time(time);
    if candidate <= now {
        candidate += Duration::days(1);
    }
    if !date.explicit && repeat.filters_weekdays() {
        candidate = align_to_pattern(candidate, repeat, weekend);
    }
    if candidate <= now {
        return Err(ParseFailure::new(ParseFailureReason::ElapsedDate));
    }
    Ok(candidate)
}

/// Moves `candidate` forward (at most six days) onto the first allowed weekday.
fn align_to_pattern(
    candidate: NaiveDateTime,
    repeat: &RepeatPattern,
    weekend: WeekendConvention,
) -> NaiveDateTime {
    (0..7)
        .map(|days| candidate + Duration::days(days))
        .find(|at| repeat.allows_day(WeekdayIndex::of(at.date()), weekend))
        .unwrap_or(candidate)
}

/// Applies a "before" offset unless that would land at or before `now`.
fn apply_offset(
    trigger_at: NaiveDateTime,
    offset: Option<u32>,
    now: NaiveDateTime,
) -> (NaiveDateTime, Option<u32>) {
    match offset {
        Some(minutes) => {
            let adjusted = trigger_at - Duration::minutes(i64::from(minutes));
            if adjusted > now {
                (adjusted, Some(minutes))
            } else {
                (trigger_at, None)
            }
        }
        None => (trigger_at, None),
    }
}
