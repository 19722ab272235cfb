//! Tests for the shared elective-deferral limit
//!
//! Traditional and Roth draw from one annual ceiling; catch-up raises it from the catch-up age.

use crate::contribution::{allocate, allocate_roth, allocate_traditional};
use crate::error::ValidationError;
use crate::model::{ContributionLimitEntry, ContributionLimitTable};

#[test]
fn test_published_limits() {
    let table = ContributionLimitTable::irs_published();
    assert_eq!(table.limit(2023, false).unwrap(), 22_500.0);
    assert_eq!(table.limit(2024, false).unwrap(), 23_000.0);
    assert_eq!(table.limit(2025, false).unwrap(), 23_500.0);
    assert_eq!(table.limit(2025, true).unwrap(), 31_000.0);
}

#[test]
fn test_years_outside_table() {
    let table = ContributionLimitTable::irs_published();
    // Last published values carry forward
    assert_eq!(table.limit(2040, false).unwrap(), 24_500.0);
    assert_eq!(table.limit(2040, true).unwrap(), 32_500.0);
    // Years before the table use the first entry
    assert_eq!(table.limit(2010, false).unwrap(), 19_500.0);
}

#[test]
fn test_empty_table_rejected() {
    let table = ContributionLimitTable {
        entries: Vec::new(),
    };
    assert!(matches!(
        table.limit(2025, false),
        Err(ValidationError::EmptyTable(_))
    ));
}

#[test]
fn test_custom_table() {
    let table = ContributionLimitTable {
        entries: vec![ContributionLimitEntry {
            year: 2030,
            elective_deferral: 30_000.0,
            catch_up: 10_000.0,
        }],
    };
    let a = allocate(25_000.0, 25_000.0, 2030, true, &table).unwrap();
    assert_eq!(a.traditional, 25_000.0);
    assert_eq!(a.roth, 15_000.0);
}

#[test]
fn test_traditional_then_roth_threading() {
    let table = ContributionLimitTable::irs_published();

    let (traditional, state) = allocate_traditional(999_999.0, 2025, false, &table).unwrap();
    assert_eq!(traditional, 23_500.0);
    assert_eq!(allocate_roth(5_000.0, state).unwrap(), 0.0);

    let (traditional, state) = allocate_traditional(10_000.0, 2025, false, &table).unwrap();
    assert_eq!(traditional, 10_000.0);
    assert_eq!(allocate_roth(20_000.0, state).unwrap(), 13_500.0);
}

#[test]
fn test_combined_never_exceeds_limit() {
    let table = ContributionLimitTable::irs_published();
    for year in 2020..=2030 {
        for catch_up in [false, true] {
            let limit = table.limit(year, catch_up).unwrap();
            for (t, r) in [(0.0, 50_000.0), (15_000.0, 15_000.0), (40_000.0, 0.0)] {
                let a = allocate(t, r, year, catch_up, &table).unwrap();
                assert!(
                    a.total() <= limit + 1e-9,
                    "Year {year}: allocated {} over limit {limit}",
                    a.total()
                );
                assert!(a.roth >= 0.0);
            }
        }
    }
}
