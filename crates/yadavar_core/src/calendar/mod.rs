//! Calendar conversion primitives shared by parsing and recurrence.
//!
//! # Responsibility
//! - Convert between Jalali (solar Hijri) and Gregorian calendar dates.
//! - Normalize Persian and Arabic-Indic digit glyphs to ASCII.
//! - Own the weekday index mapping used by custom repeat days.
//!
//! # Invariants
//! - Every function here is pure and total over valid calendar inputs.
//! - `WeekdayIndex` numbering is Sunday=0 .. Saturday=6, not ISO.

mod digits;
mod jalali;
mod wall_clock;
mod weekday;

pub use digits::{normalize_digits, persian_digits};
pub use jalali::{
    gregorian_to_jalali, is_jalali_leap_year, jalali_month_from_name, jalali_month_length,
    jalali_to_gregorian, JalaliDate, JALALI_MONTH_NAMES,
};
pub use wall_clock::{from_epoch_ms, to_epoch_ms};
pub use weekday::WeekdayIndex;
