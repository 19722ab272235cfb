//! Career record: the fixed facts a projection starts from

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::decimal_years_between;
use crate::error::{ValidationError, non_negative};
use crate::model::LeaveRules;

/// Dates and pay history of one federal career.
///
/// Built once per projection run and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub birth_date: Date,
    pub hire_date: Date,
    /// Separation (retirement) date
    pub separation_date: Date,
    /// Service counted in the annuity computation, in (possibly fractional) years
    pub creditable_service_years: f64,
    /// Service counted toward eligibility when it differs from the computation figure
    /// (unused sick leave only counts toward the latter)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility_service_years: Option<f64>,
    pub high3_salary: f64,
}

impl CareerRecord {
    pub fn new(
        birth_date: Date,
        hire_date: Date,
        separation_date: Date,
        creditable_service_years: f64,
        high3_salary: f64,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            birth_date,
            hire_date,
            separation_date,
            creditable_service_years,
            eligibility_service_years: None,
            high3_salary,
        };
        record.validate()?;
        Ok(record)
    }

    /// Build a record whose service figures come from a [`CreditableService`] breakdown.
    pub fn from_service(
        birth_date: Date,
        separation_date: Date,
        service: &CreditableService,
        rules: &LeaveRules,
        high3_salary: f64,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            birth_date,
            hire_date: service.hire_date,
            separation_date,
            creditable_service_years: service.computation_years(separation_date, rules)?,
            eligibility_service_years: Some(service.eligibility_years(separation_date)?),
            high3_salary,
        };
        record.validate()?;
        Ok(record)
    }

    /// Records loaded from configuration bypass [`CareerRecord::new`], so every consumer
    /// validates again before use.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hire_date <= self.birth_date {
            return Err(ValidationError::InvalidCareer(
                "hire date must be after birth date",
            ));
        }
        if self.separation_date < self.hire_date {
            return Err(ValidationError::InvalidCareer(
                "separation date must not precede hire date",
            ));
        }
        non_negative("creditable_service_years", self.creditable_service_years)?;
        if let Some(years) = self.eligibility_service_years {
            non_negative("eligibility_service_years", years)?;
        }
        non_negative("high3_salary", self.high3_salary)?;
        Ok(())
    }

    #[must_use]
    pub fn birth_year(&self) -> i16 {
        self.birth_date.year()
    }

    #[must_use]
    pub fn separation_year(&self) -> i16 {
        self.separation_date.year()
    }

    /// Decimal age on the separation date
    #[must_use]
    pub fn age_at_separation(&self) -> f64 {
        decimal_years_between(self.birth_date, self.separation_date)
    }

    #[must_use]
    pub fn eligibility_years(&self) -> f64 {
        self.eligibility_service_years
            .unwrap_or(self.creditable_service_years)
    }

    /// Age attained during calendar `year`
    #[must_use]
    pub fn age_in_year(&self, year: i16) -> i16 {
        year - self.birth_year()
    }
}

/// Components of creditable service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditableService {
    pub hire_date: Date,
    /// Military service whose deposit has been paid
    #[serde(default)]
    pub military_buyback_years: f64,
    /// Sick leave left unused at separation
    #[serde(default)]
    pub unused_sick_leave_hours: f64,
}

impl CreditableService {
    fn civilian_years(&self, separation_date: Date) -> Result<f64, ValidationError> {
        if separation_date < self.hire_date {
            return Err(ValidationError::InvalidCareer(
                "separation date must not precede hire date",
            ));
        }
        Ok(decimal_years_between(self.hire_date, separation_date))
    }

    /// Civilian plus bought-back military service
    pub fn eligibility_years(&self, separation_date: Date) -> Result<f64, ValidationError> {
        let military = non_negative("military_buyback_years", self.military_buyback_years)?;
        Ok(self.civilian_years(separation_date)? + military)
    }

    /// Eligibility service plus sick leave converted at the work-year rate
    pub fn computation_years(
        &self,
        separation_date: Date,
        rules: &LeaveRules,
    ) -> Result<f64, ValidationError> {
        let sick = crate::leave::sick_leave_service_credit(self.unused_sick_leave_hours, rules)?;
        Ok(self.eligibility_years(separation_date)? + sick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_new_rejects_inverted_dates() {
        let err = CareerRecord::new(
            date(1970, 1, 1),
            date(2000, 1, 1),
            date(1999, 1, 1),
            10.0,
            100_000.0,
        );
        assert!(matches!(err, Err(ValidationError::InvalidCareer(_))));
    }

    #[test]
    fn test_new_rejects_negative_high3() {
        let err = CareerRecord::new(
            date(1970, 1, 1),
            date(2000, 1, 1),
            date(2027, 1, 1),
            27.0,
            -1.0,
        );
        assert!(matches!(
            err,
            Err(ValidationError::Negative {
                field: "high3_salary",
                ..
            })
        ));
    }

    #[test]
    fn test_from_service_adds_buyback_and_sick_leave() {
        let service = CreditableService {
            hire_date: date(2000, 1, 1),
            military_buyback_years: 2.0,
            unused_sick_leave_hours: 2087.0,
        };
        let record = CareerRecord::from_service(
            date(1970, 1, 1),
            date(2027, 1, 1),
            &service,
            &LeaveRules::default(),
            110_000.0,
        )
        .unwrap();

        let civilian = decimal_years_between(date(2000, 1, 1), date(2027, 1, 1));
        assert!((record.eligibility_years() - (civilian + 2.0)).abs() < 1e-9);
        assert!((record.creditable_service_years - (civilian + 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_age_helpers() {
        let record = CareerRecord::new(
            date(1970, 6, 1),
            date(2000, 1, 1),
            date(2027, 6, 1),
            27.4,
            110_000.0,
        )
        .unwrap();
        assert_eq!(record.birth_year(), 1970);
        assert_eq!(record.age_in_year(2027), 57);
        assert!((record.age_at_separation() - 57.0).abs() < 0.01);
        assert_eq!(record.eligibility_years(), 27.4);
    }
}
