//! Next-occurrence arithmetic for repeat patterns.
//!
//! # Invariants
//! - For every recurring pattern the result is strictly after the input.
//! - Weekday-filtered patterns land within seven days on a member day and
//!   keep the time of day.
//! - `Once` returns its input unchanged.

use crate::calendar::WeekdayIndex;
use crate::model::repeat::{RepeatPattern, WeekendConvention};
use chrono::{Duration, Months, NaiveDateTime};

/// Computes the occurrence following `t` under `repeat`.
///
/// Monthly and yearly steps clamp the day to the end of the target month,
/// so Jan 31 goes to Feb 28/29 and Feb 29 goes to Feb 28.
pub fn next_occurrence(
    t: NaiveDateTime,
    repeat: &RepeatPattern,
    weekend: WeekendConvention,
) -> NaiveDateTime {
    match repeat {
        RepeatPattern::Once => t,
        RepeatPattern::Daily => t + Duration::days(1),
        RepeatPattern::Weekly => t + Duration::weeks(1),
        RepeatPattern::Monthly => add_months(t, 1),
        RepeatPattern::Yearly => add_months(t, 12),
        RepeatPattern::Weekdays | RepeatPattern::Weekends | RepeatPattern::Custom(_) => (1..=7)
            .map(|days| t + Duration::days(days))
            .find(|at| repeat.allows_day(WeekdayIndex::of(at.date()), weekend))
            .unwrap_or(t + Duration::weeks(1)),
    }
}

/// Steps `t` forward until it is after `now`.
///
/// Returns `t` untouched when it is already in the future or when the pattern
/// cannot advance (`Once`).
pub fn advance_past(
    t: NaiveDateTime,
    repeat: &RepeatPattern,
    weekend: WeekendConvention,
    now: NaiveDateTime,
) -> NaiveDateTime {
    let mut current = t;
    while current <= now {
        let next = next_occurrence(current, repeat, weekend);
        if next <= current {
            break;
        }
        current = next;
    }
    current
}

fn add_months(t: NaiveDateTime, months: u32) -> NaiveDateTime {
    t.checked_add_months(Months::new(months))
        .unwrap_or(t + Duration::days(30 * i64::from(months)))
}

#[cfg(test)]
mod tests {
    use super::{advance_past, next_occurrence};
    use crate::calendar::WeekdayIndex;
    use crate::model::repeat::{CustomDays, RepeatPattern, WeekendConvention};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 30, 0)
            .unwrap()
    }

    const WEEKEND: WeekendConvention = WeekendConvention::FridaySaturday;

    #[test]
    fn fixed_steps() {
        let t = at(2024, 1, 1, 9);
        assert_eq!(next_occurrence(t, &RepeatPattern::Once, WEEKEND), t);
        assert_eq!(next_occurrence(t, &RepeatPattern::Daily, WEEKEND), at(2024, 1, 2, 9));
        assert_eq!(next_occurrence(t, &RepeatPattern::Weekly, WEEKEND), at(2024, 1, 8, 9));
    }

    #[test]
    fn monthly_and_yearly_clamp_to_month_end() {
        assert_eq!(
            next_occurrence(at(2024, 1, 31, 9), &RepeatPattern::Monthly, WEEKEND),
            at(2024, 2, 29, 9)
        );
        assert_eq!(
            next_occurrence(at(2023, 1, 31, 9), &RepeatPattern::Monthly, WEEKEND),
            at(2023, 2, 28, 9)
        );
        assert_eq!(
            next_occurrence(at(2024, 2, 29, 9), &RepeatPattern::Yearly, WEEKEND),
            at(2025, 2, 28, 9)
        );
    }

    #[test]
    fn weekdays_skip_the_configured_weekend() {
        // 2024-01-04 is a Thursday.
        let thursday = at(2024, 1, 4, 7);
        assert_eq!(
            next_occurrence(thursday, &RepeatPattern::Weekdays, WEEKEND),
            at(2024, 1, 7, 7)
        );
        assert_eq!(
            next_occurrence(thursday, &RepeatPattern::Weekdays, WeekendConvention::SaturdaySunday),
            at(2024, 1, 5, 7)
        );
        assert_eq!(
            next_occurrence(thursday, &RepeatPattern::Weekends, WEEKEND),
            at(2024, 1, 5, 7)
        );
    }

    #[test]
    fn custom_days_land_within_a_week_on_a_member_day() {
        let days = CustomDays::new([WeekdayIndex::SUNDAY, WeekdayIndex::FRIDAY]).unwrap();
        let repeat = RepeatPattern::Custom(days.clone());
        let mut t = at(2024, 1, 1, 6);
        for _ in 0..30 {
            let next = next_occurrence(t, &repeat, WEEKEND);
            assert!(next > t);
            assert!(next - t <= chrono::Duration::days(7));
            assert!(days.contains(WeekdayIndex::of(next.date())));
            assert_eq!(next.time(), t.time());
            t = next;
        }
    }

    #[test]
    fn single_custom_day_repeats_weekly() {
        let repeat = RepeatPattern::Custom(CustomDays::new([WeekdayIndex::FRIDAY]).unwrap());
        let friday = at(2024, 1, 5, 7);
        assert_eq!(next_occurrence(friday, &repeat, WEEKEND), at(2024, 1, 12, 7));
    }

    #[test]
    fn advance_past_skips_missed_occurrences() {
        let now = at(2024, 1, 10, 12);
        assert_eq!(
            advance_past(at(2024, 1, 1, 9), &RepeatPattern::Daily, WEEKEND, now),
            at(2024, 1, 11, 9)
        );
        let once = at(2024, 1, 1, 9);
        assert_eq!(advance_past(once, &RepeatPattern::Once, WEEKEND, now), once);
    }
}
