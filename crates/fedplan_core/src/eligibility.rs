//! FERS retirement eligibility
//!
//! Rules are checked top to bottom and the first match wins:
//!
//! | age      | service | category            |
//! |----------|---------|---------------------|
//! | ≥ 62     | ≥ 5     | full immediate      |
//! | ≥ 60     | ≥ 20    | full immediate      |
//! | ≥ MRA    | ≥ 30    | full immediate      |
//! | ≥ MRA    | ≥ 10    | MRA+10, reduced     |
//! | any      | ≥ 5     | deferred            |
//! | any      | < 5     | not eligible        |

use crate::error::{ValidationError, non_negative};
use crate::model::{EligibilityKind, EligibilityResult, Mra, MraTable};

/// Minimum service for any annuity right (vesting)
pub const VESTING_YEARS: f64 = 5.0;

struct Rule {
    min_age: Threshold,
    min_service: f64,
    kind: EligibilityKind,
}

enum Threshold {
    Age(f64),
    Mra,
}

const RULES: [Rule; 4] = [
    Rule {
        min_age: Threshold::Age(62.0),
        min_service: VESTING_YEARS,
        kind: EligibilityKind::FullImmediate,
    },
    Rule {
        min_age: Threshold::Age(60.0),
        min_service: 20.0,
        kind: EligibilityKind::FullImmediate,
    },
    Rule {
        min_age: Threshold::Mra,
        min_service: 30.0,
        kind: EligibilityKind::FullImmediate,
    },
    Rule {
        min_age: Threshold::Mra,
        min_service: 10.0,
        kind: EligibilityKind::MraPlus10Reduced,
    },
];

/// Minimum Retirement Age for a birth year.
pub fn mra(birth_year: i16, table: &MraTable) -> Result<Mra, ValidationError> {
    table.lookup(birth_year)
}

/// Determine the retirement category for a separation at `age_at_separation` with
/// `service_years` of eligibility service. Fractional inputs are used as given.
pub fn evaluate(
    age_at_separation: f64,
    service_years: f64,
    birth_year: i16,
    table: &MraTable,
) -> Result<EligibilityResult, ValidationError> {
    let age = non_negative("age_at_separation", age_at_separation)?;
    let service = non_negative("service_years", service_years)?;
    let mra = mra(birth_year, table)?.decimal_age();

    let matched = RULES.iter().find(|rule| {
        let min_age = match rule.min_age {
            Threshold::Age(a) => a,
            Threshold::Mra => mra,
        };
        age >= min_age && service >= rule.min_service
    });

    let kind = match matched {
        Some(rule) => rule.kind,
        None if service >= VESTING_YEARS => EligibilityKind::Deferred,
        None => EligibilityKind::NotEligible,
    };

    Ok(EligibilityResult {
        eligible: matches!(
            kind,
            EligibilityKind::FullImmediate | EligibilityKind::MraPlus10Reduced
        ),
        kind,
        decimal_age: age,
        mra,
    })
}
