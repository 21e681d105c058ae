//! Jalali (solar Hijri) <-> Gregorian conversion.
//!
//! Uses the day-number method over the 33-year arithmetic cycle. Results are
//! exact for the years a reminder can realistically target (1300..1500 AP).

use chrono::{Datelike, NaiveDate};
use std::fmt::{Display, Formatter};

/// Persian month names, index 0 = Farvardin.
pub const JALALI_MONTH_NAMES: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

const GREGORIAN_DAYS_BEFORE_MONTH: [i64; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Returns whether the Jalali year has a 30-day Esfand.
pub fn is_jalali_leap_year(year: i32) -> bool {
    let cycle_position = (i64::from(year) + 1595).rem_euclid(33);
    cycle_position != 32 && cycle_position % 4 == 0
}

/// Number of days in a Jalali month, or 0 for a month outside 1..=12.
pub fn jalali_month_length(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 if is_jalali_leap_year(year) => 30,
        12 => 29,
        _ => 0,
    }
}

/// Resolves a Persian month name to its 1-based month number.
pub fn jalali_month_from_name(name: &str) -> Option<u32> {
    let trimmed = name.trim();
    JALALI_MONTH_NAMES
        .iter()
        .position(|candidate| *candidate == trimmed)
        .map(|index| index as u32 + 1)
}

/// Converts a Jalali date to a Gregorian `(year, month, day)` triple.
pub fn jalali_to_gregorian(year: i32, month: u32, day: u32) -> (i32, u32, u32) {
    let jy = i64::from(year) + 1595;
    let jm = i64::from(month);
    let month_offset = if jm < 7 {
        (jm - 1) * 31
    } else {
        (jm - 7) * 30 + 186
    };
    let mut days = -355_668
        + 365 * jy
        + (jy / 33) * 8
        + ((jy % 33) + 3) / 4
        + i64::from(day)
        + month_offset;

    let mut gy = 400 * (days / 146_097);
    days %= 146_097;
    if days > 36_524 {
        days -= 1;
        gy += 100 * (days / 36_524);
        days %= 36_524;
        if days >= 365 {
            days += 1;
        }
    }
    gy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        gy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let mut gd = days + 1;
    let february = if is_gregorian_leap_year(gy) { 29 } else { 28 };
    let month_lengths = [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut gm = 1;
    for length in month_lengths {
        if gd <= length {
            break;
        }
        gd -= length;
        gm += 1;
    }

    (gy as i32, gm as u32, gd as u32)
}

/// Converts a Gregorian date to a Jalali `(year, month, day)` triple.
pub fn gregorian_to_jalali(year: i32, month: u32, day: u32) -> (i32, u32, u32) {
    let gy = i64::from(year);
    let gy2 = if month > 2 { gy + 1 } else { gy };
    let month_index = month.clamp(1, 12) as usize - 1;
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100
        + (gy2 + 399) / 400
        + i64::from(day)
        + GREGORIAN_DAYS_BEFORE_MONTH[month_index];

    let mut jy = -1595 + 33 * (days / 12_053);
    days %= 12_053;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let (jm, jd) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };

    (jy as i32, jm as u32, jd as u32)
}

fn is_gregorian_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// A validated Jalali calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    /// Builds a date when `month` is 1..=12 and `day` fits that month.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        let length = jalali_month_length(year, month);
        if length == 0 || day == 0 || day > length {
            return None;
        }
        Some(Self { year, month, day })
    }

    pub fn from_gregorian(date: NaiveDate) -> Self {
        let (year, month, day) = gregorian_to_jalali(date.year(), date.month(), date.day());
        Self { year, month, day }
    }

    /// Gregorian equivalent. `None` only outside chrono's representable range.
    pub fn to_gregorian(self) -> Option<NaiveDate> {
        let (year, month, day) = jalali_to_gregorian(self.year, self.month, self.day);
        NaiveDate::from_ymd_opt(year, month, day)
    }

    pub fn month_name(self) -> &'static str {
        JALALI_MONTH_NAMES[(self.month.clamp(1, 12) - 1) as usize]
    }
}

impl Display for JalaliDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}
