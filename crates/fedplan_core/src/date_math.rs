//! Day-count helpers for ages and service lengths.
//!
//! Career dates are `jiff::civil::Date`s, but every figure the engine consumes is a decimal
//! number of years. The helpers here use Rata Die day-numbering so that a day difference is a
//! plain integer subtraction with no `Span` normalisation involved.

use jiff::civil::Date;

/// Average Gregorian year length used to turn day counts into decimal years.
pub const DAYS_PER_YEAR: f64 = 365.25;

#[inline]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[inline]
pub fn days_in_year(year: i16) -> i32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Convert a civil date to a Rata Die day number (days since 0001-01-01).
///
/// Uses the proleptic Gregorian calendar algorithm from Baum (2017).
#[inline]
fn rata_die(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    // Shift March = month 1 so Feb (end of "year") is month 12
    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Number of days between two dates (`to - from`), positive when `to > from`.
#[inline]
pub fn days_between(from: Date, to: Date) -> i32 {
    rata_die(to) - rata_die(from)
}

/// Decimal years between two dates, e.g. a service length or an age.
#[inline]
pub fn decimal_years_between(from: Date, to: Date) -> f64 {
    f64::from(days_between(from, to)) / DAYS_PER_YEAR
}

/// Fraction of the calendar year that has elapsed before `date` (Jan 1 → 0.0).
#[inline]
pub fn fraction_of_year_elapsed(date: Date) -> f64 {
    let jan_1 = jiff::civil::date(date.year(), 1, 1);
    f64::from(days_between(jan_1, date)) / f64::from(days_in_year(date.year()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_days_between_matches_jiff() {
        let pairs = [
            (date(1970, 3, 15), date(2027, 3, 15)),
            (date(2024, 2, 28), date(2024, 3, 1)),
            (date(1999, 12, 31), date(2000, 1, 1)),
            (date(2025, 6, 1), date(2020, 6, 1)),
        ];
        for (a, b) in pairs {
            let expected = (b - a).get_days();
            assert_eq!(days_between(a, b), expected, "{a} -> {b}");
        }
    }

    #[test]
    fn test_decimal_years_between() {
        let years = decimal_years_between(date(1970, 1, 1), date(2027, 1, 1));
        assert!((years - 57.0).abs() < 0.01, "got {years}");
    }

    #[test]
    fn test_fraction_of_year_elapsed() {
        assert_eq!(fraction_of_year_elapsed(date(2025, 1, 1)), 0.0);
        let mid = fraction_of_year_elapsed(date(2025, 7, 2));
        assert!((mid - 182.0 / 365.0).abs() < 1e-12);
        let leap = fraction_of_year_elapsed(date(2024, 12, 31));
        assert!((leap - 365.0 / 366.0).abs() < 1e-12);
    }
}
