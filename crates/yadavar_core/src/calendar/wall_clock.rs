//! Wall-clock instants as epoch milliseconds.
//!
//! Reminder times are local wall-clock values with no zone attached; they are
//! stored as if they were UTC so the round trip is lossless to the millisecond.

use chrono::{DateTime, NaiveDateTime};

pub fn to_epoch_ms(at: NaiveDateTime) -> i64 {
    at.and_utc().timestamp_millis()
}

/// `None` when `ms` is outside chrono's representable range.
pub fn from_epoch_ms(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|at| at.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::{from_epoch_ms, to_epoch_ms};
    use chrono::NaiveDate;

    #[test]
    fn epoch_ms_round_trips_wall_clock() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 20)
            .unwrap()
            .and_hms_milli_opt(9, 30, 15, 250)
            .unwrap();
        assert_eq!(to_epoch_ms(at), 1_710_927_015_250);
        assert_eq!(from_epoch_ms(to_epoch_ms(at)), Some(at));
    }

    #[test]
    fn out_of_range_epoch_is_rejected() {
        assert_eq!(from_epoch_ms(i64::MAX), None);
    }
}
