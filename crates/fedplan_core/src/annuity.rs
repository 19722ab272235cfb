//! FERS basic annuity, special retirement supplement and COLA

use crate::error::{ValidationError, finite, non_negative};
use crate::model::{AnnuityResult, AnnuityRules, CareerRecord, EligibilityKind};

/// Compute the annual annuity payable at separation.
///
/// Only MRA+10 retirements are reduced: 5% for each whole year the retiree is under the
/// unreduced age, clamped to [0, 1].
pub fn compute_annuity(
    high3: f64,
    service_years: f64,
    age_at_separation: f64,
    kind: EligibilityKind,
    rules: &AnnuityRules,
) -> Result<AnnuityResult, ValidationError> {
    let high3 = non_negative("high3", high3)?;
    let service_years = non_negative("service_years", service_years)?;
    let age = finite("age_at_separation", age_at_separation)?;
    let multiplier = non_negative("multiplier", rules.multiplier)?;

    let gross_annual_annuity = high3 * service_years * multiplier;

    let reduction_factor = match kind {
        EligibilityKind::MraPlus10Reduced if age < rules.unreduced_age => {
            let years_under = (rules.unreduced_age - age).floor();
            (1.0 - rules.reduction_per_year * years_under).clamp(0.0, 1.0)
        }
        _ => 1.0,
    };

    Ok(AnnuityResult {
        multiplier,
        gross_annual_annuity,
        reduction_factor,
        net_annual_annuity: gross_annual_annuity * reduction_factor,
    })
}

/// Annual special retirement supplement.
///
/// Paid only to full immediate retirees who separate before the unreduced age, approximating
/// the Social Security earned during federal service: `ss_at_62 * floor(service) / 40`.
pub fn fers_supplement(
    kind: EligibilityKind,
    age_at_separation: f64,
    service_years: f64,
    annual_ss_at_62: f64,
    rules: &AnnuityRules,
) -> Result<f64, ValidationError> {
    let service_years = non_negative("service_years", service_years)?;
    let annual_ss_at_62 = non_negative("annual_ss_at_62", annual_ss_at_62)?;
    if kind != EligibilityKind::FullImmediate || age_at_separation >= rules.unreduced_age {
        return Ok(0.0);
    }
    if rules.supplement_divisor <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "supplement_divisor",
            value: rules.supplement_divisor,
            reason: "must be positive",
        });
    }
    Ok(annual_ss_at_62 * service_years.floor() / rules.supplement_divisor)
}

/// FERS "diet" COLA for a year with the given CPI change.
///
/// CPI up to 2% passes through; 2-3% is held at 2%; above 3% the retiree gets CPI minus one
/// point. Deflation never cuts the annuity.
#[must_use]
pub fn diet_cola(inflation: f64) -> f64 {
    if inflation <= 0.0 {
        0.0
    } else if inflation <= 0.02 {
        inflation
    } else if inflation <= 0.03 {
        0.02
    } else {
        inflation - 0.01
    }
}

/// First calendar year in which the annuity is paid, if ever.
///
/// Immediate retirements start in the separation year; deferred annuities start in the year
/// the former employee reaches the unreduced age.
#[must_use]
pub fn annuity_start_year(
    career: &CareerRecord,
    kind: EligibilityKind,
    rules: &AnnuityRules,
) -> Option<i16> {
    match kind {
        EligibilityKind::FullImmediate | EligibilityKind::MraPlus10Reduced => {
            Some(career.separation_year())
        }
        EligibilityKind::Deferred => {
            let unreduced_year = career.birth_year() + rules.unreduced_age.ceil() as i16;
            Some(unreduced_year.max(career.separation_year()))
        }
        EligibilityKind::NotEligible => None,
    }
}
