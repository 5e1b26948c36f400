//! Taiwan-year arithmetic
//!
//! The portal numbers years from 1911 (Minguo calendar). Callers may hand us
//! either representation; anything at or past 1911 is treated as Gregorian.

use chrono::Datelike;

/// Offset between the Gregorian and Taiwan calendars
pub const YEAR_BEGIN: i32 = 1911;

/// Converts a year to its Taiwan representation
pub fn taiwanize(year: i32) -> i32 {
    if year >= YEAR_BEGIN {
        year - YEAR_BEGIN
    } else {
        year
    }
}

/// Converts a year to its Gregorian representation
pub fn centuryze(year: i32) -> i32 {
    if year < YEAR_BEGIN {
        year + YEAR_BEGIN
    } else {
        year
    }
}

/// The current year in Taiwan numbering
pub fn current_taiwan_year() -> i32 {
    taiwanize(chrono::Local::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taiwanize_gregorian_year() {
        assert_eq!(taiwanize(2024), 113);
    }

    #[test]
    fn taiwanize_is_idempotent() {
        assert_eq!(taiwanize(taiwanize(2024)), 113);
        assert_eq!(taiwanize(113), 113);
    }

    #[test]
    fn centuryze_round_trips() {
        assert_eq!(centuryze(113), 2024);
        assert_eq!(centuryze(2024), 2024);
        assert_eq!(taiwanize(centuryze(106)), 106);
    }

    #[test]
    fn current_year_is_taiwanized() {
        assert!(current_taiwan_year() < YEAR_BEGIN);
    }
}
