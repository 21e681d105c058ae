//! Weekday index mapping used by custom repeat days.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const PERSIAN_WEEKDAY_NAMES: [&str; 7] = [
    "یکشنبه",
    "دوشنبه",
    "سه‌شنبه",
    "چهارشنبه",
    "پنج‌شنبه",
    "جمعه",
    "شنبه",
];

/// Weekday index in `0..=6`: Sunday=0, Monday=1, .. Friday=5, Saturday=6.
///
/// This numbering is persisted in custom repeat days and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekdayIndex(u8);

impl WeekdayIndex {
    pub const SUNDAY: Self = Self(0);
    pub const MONDAY: Self = Self(1);
    pub const TUESDAY: Self = Self(2);
    pub const WEDNESDAY: Self = Self(3);
    pub const THURSDAY: Self = Self(4);
    pub const FRIDAY: Self = Self(5);
    pub const SATURDAY: Self = Self(6);

    /// All seven indices in numeric order.
    pub const ALL: [Self; 7] = [
        Self::SUNDAY,
        Self::MONDAY,
        Self::TUESDAY,
        Self::WEDNESDAY,
        Self::THURSDAY,
        Self::FRIDAY,
        Self::SATURDAY,
    ];

    pub fn new(value: u8) -> Option<Self> {
        (value <= 6).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        Self(weekday.num_days_from_sunday() as u8)
    }

    /// Index of the weekday `date` falls on.
    pub fn of(date: NaiveDate) -> Self {
        Self::from_weekday(date.weekday())
    }

    /// Following day, wrapping Saturday back to Sunday.
    pub fn succ(self) -> Self {
        Self((self.0 + 1) % 7)
    }

    pub fn persian_name(self) -> &'static str {
        PERSIAN_WEEKDAY_NAMES[usize::from(self.0)]
    }
}

impl TryFrom<u8> for WeekdayIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("weekday index out of range: {value}"))
    }
}

impl From<WeekdayIndex> for u8 {
    fn from(value: WeekdayIndex) -> Self {
        value.0
    }
}

impl Display for WeekdayIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::WeekdayIndex;
    use chrono::{NaiveDate, Weekday};

    #[test]
    fn mapping_matches_sunday_zero_numbering() {
        assert_eq!(WeekdayIndex::from_weekday(Weekday::Sun).value(), 0);
        assert_eq!(WeekdayIndex::from_weekday(Weekday::Mon).value(), 1);
        assert_eq!(WeekdayIndex::from_weekday(Weekday::Fri).value(), 5);
        assert_eq!(WeekdayIndex::from_weekday(Weekday::Sat).value(), 6);
    }

    #[test]
    fn of_date_uses_calendar_weekday() {
        // 2024-01-05 is a Friday.
        let friday = NaiveDate::from_ymd_opt(2024, 1, 5).expect("valid date");
        assert_eq!(WeekdayIndex::of(friday), WeekdayIndex::FRIDAY);
        assert_eq!(WeekdayIndex::FRIDAY.persian_name(), "جمعه");
    }

    #[test]
    fn new_rejects_values_above_six() {
        assert!(WeekdayIndex::new(6).is_some());
        assert!(WeekdayIndex::new(7).is_none());
        assert_eq!(WeekdayIndex::SATURDAY.succ(), WeekdayIndex::SUNDAY);
    }
}
