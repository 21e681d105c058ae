//! Persian phrase patterns recognized by the temporal parser.
//!
//! Patterns run over digit-normalized text, so digits are always ASCII here.
//! Word patterns are wrapped in letter boundaries so `مهم` does not match
//! inside `مهمانی` and `شنبه` does not match inside `دوشنبه`.

use crate::calendar::{WeekdayIndex, JALALI_MONTH_NAMES};
use crate::model::reminder::Priority;
use crate::model::repeat::RepeatPattern;
use once_cell::sync::Lazy;
use regex::Regex;

const LETTER_START: &str = r"(?:^|[^\p{L}\p{M}])";
const LETTER_END: &str = r"(?:$|[^\p{L}\p{M}])";
const JOINER: &str = r"[\s\x{200C}]*";
const PERIOD: &str = r"بعد[\s\x{200C}]*از[\s\x{200C}]*ظهر|صبح|ظهر|عصر|شب";
const WEEKDAY_NAME: &str = r"یک[\s\x{200C}]*شنبه|دو[\s\x{200C}]*شنبه|سه[\s\x{200C}]*شنبه|چهار[\s\x{200C}]*شنبه|پنج[\s\x{200C}]*شنبه|شنبه|جمعه";

fn bounded(body: &str) -> Regex {
    Regex::new(&format!("{LETTER_START}(?:{body}){LETTER_END}")).expect("valid bounded regex")
}

/// "one hour before" / "half an hour before" / "30 minutes before".
pub(crate) static OFFSET_BEFORE_RE: Lazy<Regex> = Lazy::new(|| {
    bounded(r"(?P<amount>(?:یک|1)\s*ساعت|نیم\s*ساعت|30\s*دقیقه)\s*قبل(?:\s*از)?")
});

/// "N minutes later" / "N hours later" relative to now.
pub(crate) static FROM_NOW_RE: Lazy<Regex> = Lazy::new(|| {
    bounded(r"(?P<amount>[0-9]{1,3}|نیم|یک)\s*(?P<unit>دقیقه|ساعت)\s*(?:دیگه|دیگر|بعد)")
});

pub(crate) static DATE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    bounded(&format!(
        r"(?P<after>پس{JOINER}فردا)|(?P<tomorrow>فردا)|(?P<today>امروز)"
    ))
});

pub(crate) static DATE_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^|[^0-9])(?P<y>[0-9]{4})\s*[/\-]\s*(?P<m>[0-9]{1,2})\s*[/\-]\s*(?P<d>[0-9]{1,2})(?:$|[^0-9])",
    )
    .expect("valid date literal regex")
});

pub(crate) static MONTH_NAME_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    let months = JALALI_MONTH_NAMES.join("|");
    Regex::new(&format!(
        r"(?:^|[^0-9/])(?P<d>[0-9]{{1,2}})\s*(?:ام|م)?\s*(?P<month>{months})(?:\s*ماه)?(?:\s*(?:سال\s*)?(?P<y>[0-9]{{4}}))?(?:$|[^\p{{L}}\p{{M}}0-9])"
    ))
    .expect("valid month name regex")
});

/// `HH:MM` with `:` or the Persian decimal separator, optional `ساعت` prefix.
pub(crate) static CLOCK_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:^|[^0-9])(?:ساعت\s*)?(?P<h>[0-9]{{1,2}})\s*[:٫]\s*(?P<m>[0-9]{{1,2}})(?:\s*(?P<period>{PERIOD}))?(?:$|[^\p{{L}}\p{{M}}0-9])"
    ))
    .expect("valid clock regex")
});

/// `ساعت N`, optionally `و M دقیقه` / `و نیم`, optionally a day period.
pub(crate) static HOUR_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{LETTER_START}ساعت\s*(?P<h>[0-9]{{1,2}})(?:\s*و\s*(?:(?P<m>[0-9]{{1,2}})(?:\s*دقیقه)?|(?P<half>نیم)))?(?:\s*(?P<period>{PERIOD}))?(?:$|[^\p{{L}}\p{{M}}0-9])"
    ))
    .expect("valid hour regex")
});

/// Bare `N` followed by a day period, e.g. `7 صبح`.
pub(crate) static BARE_HOUR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:^|[^0-9:/٫])(?P<h>[0-9]{{1,2}})\s*(?P<period>{PERIOD}){LETTER_END}"
    ))
    .expect("valid bare hour regex")
});

/// Fixed repeat keywords in precedence order.
pub(crate) static REPEAT_KEYWORDS: Lazy<Vec<(RepeatPattern, Regex)>> = Lazy::new(|| {
    vec![
        (
            RepeatPattern::Weekdays,
            bounded(r"(?:هر\s*)?روز[\x{200C}]?(?:های|ای)\s*کاری"),
        ),
        (
            RepeatPattern::Weekends,
            bounded(&format!(r"(?:هر\s*)?آخر{JOINER}هفته(?:[\x{{200C}}\s]?ها)?")),
        ),
        (
            RepeatPattern::Daily,
            bounded(&format!(r"هر\s*روز|روزانه|همه{JOINER}روزه")),
        ),
        (RepeatPattern::Weekly, bounded(r"هر\s*هفته|هفتگی")),
        (RepeatPattern::Monthly, bounded(r"هر\s*ماه|ماهانه|ماهیانه")),
        (RepeatPattern::Yearly, bounded(r"هر\s*سال|سالانه|سالیانه")),
    ]
});

pub(crate) static WEEKDAY_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    bounded(&format!(
        r"(?:هر\s*)?از\s*(?P<from>{WEEKDAY_NAME})\s*تا\s*(?P<to>{WEEKDAY_NAME})(?:[\x{{200C}}\s]?ها)?"
    ))
});

pub(crate) static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    bounded(&format!(
        r"(?:هر\s*)?(?P<day>{WEEKDAY_NAME})(?:[\x{{200C}}\s]?ها)?"
    ))
});

/// Priority phrases; low is checked first because `غیر فوری` contains `فوری`.
pub(crate) static PRIORITY_PHRASES: Lazy<Vec<(Priority, Regex)>> = Lazy::new(|| {
    vec![
        (
            Priority::Low,
            bounded(&format!(r"کم{JOINER}اهمیت|غیر{JOINER}فوری|عجله\s*نیست")),
        ),
        (Priority::Urgent, bounded(r"خیلی\s*فوری|فوری|اضطراری")),
        (Priority::High, bounded(r"خیلی\s*مهم(?:ه)?|مهم(?:ه)?")),
    ]
});

/// Intake phrases ("remind me", "alarm") and fillers that carry no content.
pub(crate) static INTAKE_PHRASE_RE: Lazy<Regex> = Lazy::new(|| {
    bounded(&format!(
        r"یادم{JOINER}(?:بنداز|بیار|باشه|بده)|یاد{JOINER}آوری(?:\s*کن)?|یاد{JOINER}آور|هشدار(?:\s*بده)?|آلارم(?:\s*بذار)?|بیدارباش|که"
    ))
});

pub(crate) static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Resolves a matched weekday name (any spacing/ZWNJ variant) to its index.
pub(crate) fn weekday_from_name(name: &str) -> Option<WeekdayIndex> {
    let compact: String = name
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '\u{200C}')
        .collect();
    match compact.as_str() {
        "یکشنبه" => Some(WeekdayIndex::SUNDAY),
        "دوشنبه" => Some(WeekdayIndex::MONDAY),
        "سهشنبه" => Some(WeekdayIndex::TUESDAY),
        "چهارشنبه" => Some(WeekdayIndex::WEDNESDAY),
        "پنجشنبه" => Some(WeekdayIndex::THURSDAY),
        "جمعه" => Some(WeekdayIndex::FRIDAY),
        "شنبه" => Some(WeekdayIndex::SATURDAY),
        _ => None,
    }
}

/// Converts a 12-hour style hour to 24-hour using a day-period word.
pub(crate) fn apply_day_period(hour: u32, period: Option<&str>) -> u32 {
    let Some(period) = period else {
        return hour;
    };
    let compact: String = period
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '\u{200C}')
        .collect();
    match compact.as_str() {
        "شب" if hour == 12 => 0,
        "ظهر" | "بعدازظهر" | "عصر" | "شب" if (1..=11).contains(&hour) => hour + 12,
        _ => hour,
    }
}
