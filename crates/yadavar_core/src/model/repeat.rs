//! Repeat patterns and weekend conventions.

use crate::calendar::WeekdayIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Non-empty set of weekday indices for `RepeatPattern::Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<WeekdayIndex>", into = "Vec<WeekdayIndex>")]
pub struct CustomDays(BTreeSet<WeekdayIndex>);

impl CustomDays {
    /// Returns `None` when `days` is empty.
    pub fn new(days: impl IntoIterator<Item = WeekdayIndex>) -> Option<Self> {
        let set: BTreeSet<WeekdayIndex> = days.into_iter().collect();
        (!set.is_empty()).then_some(Self(set))
    }

    pub fn contains(&self, day: WeekdayIndex) -> bool {
        self.0.contains(&day)
    }

    /// Days in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = WeekdayIndex> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<WeekdayIndex>> for CustomDays {
    type Error = &'static str;

    fn try_from(value: Vec<WeekdayIndex>) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("custom days cannot be empty")
    }
}

impl From<CustomDays> for Vec<WeekdayIndex> {
    fn from(value: CustomDays) -> Self {
        value.0.into_iter().collect()
    }
}

/// Which two days count as the weekend for `Weekdays`/`Weekends` patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekendConvention {
    /// Friday and Saturday.
    #[default]
    FridaySaturday,
    /// Thursday and Friday.
    ThursdayFriday,
    /// Saturday and Sunday.
    SaturdaySunday,
}

impl WeekendConvention {
    pub fn is_weekend(self, day: WeekdayIndex) -> bool {
        let (first, second) = match self {
            Self::FridaySaturday => (WeekdayIndex::FRIDAY, WeekdayIndex::SATURDAY),
            Self::ThursdayFriday => (WeekdayIndex::THURSDAY, WeekdayIndex::FRIDAY),
            Self::SaturdaySunday => (WeekdayIndex::SATURDAY, WeekdayIndex::SUNDAY),
        };
        day == first || day == second
    }
}

/// Recurrence rule attached to a reminder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum RepeatPattern {
    #[default]
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Weekdays,
    Weekends,
    Custom(CustomDays),
}

impl RepeatPattern {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::Once)
    }

    pub fn custom_days(&self) -> Option<&CustomDays> {
        match self {
            Self::Custom(days) => Some(days),
            _ => None,
        }
    }

    /// Whether occurrences are restricted to particular weekdays.
    pub fn filters_weekdays(&self) -> bool {
        matches!(self, Self::Weekdays | Self::Weekends | Self::Custom(_))
    }

    /// Whether an occurrence may land on `day`.
    ///
    /// Patterns that do not filter by weekday accept every day.
    pub fn allows_day(&self, day: WeekdayIndex, weekend: WeekendConvention) -> bool {
        match self {
            Self::Weekdays => !weekend.is_weekend(day),
            Self::Weekends => weekend.is_weekend(day),
            Self::Custom(days) => days.contains(day),
            _ => true,
        }
    }

    /// Stable snake_case name, as stored and exchanged with hosts.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Weekdays => "weekdays",
            Self::Weekends => "weekends",
            Self::Custom(_) => "custom",
        }
    }

    /// Inverse of [`RepeatPattern::kind`].
    ///
    /// `days` must be non-empty and in range for `custom` and empty for every
    /// other kind.
    pub fn from_kind(kind: &str, days: &[u8]) -> Option<Self> {
        if kind == "custom" {
            let days = days
                .iter()
                .map(|day| WeekdayIndex::new(*day))
                .collect::<Option<Vec<_>>>()?;
            return CustomDays::new(days).map(Self::Custom);
        }
        if !days.is_empty() {
            return None;
        }
        let pattern = match kind {
            "once" => Self::Once,
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "yearly" => Self::Yearly,
            "weekdays" => Self::Weekdays,
            "weekends" => Self::Weekends,
            _ => return None,
        };
        Some(pattern)
    }

    /// Persian display label.
    pub fn persian_label(&self) -> &'static str {
        match self {
            Self::Once => "یکبار",
            Self::Daily => "روزانه",
            Self::Weekly => "هفتگی",
            Self::Monthly => "ماهانه",
            Self::Yearly => "سالانه",
            Self::Weekdays => "روزهای کاری",
            Self::Weekends => "آخر هفته",
            Self::Custom(_) => "سفارشی",
        }
    }
}
