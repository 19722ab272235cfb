//! Regulatory constant tables
//!
//! Contribution limits, MRA brackets, annuity rules and leave rules change by statute or by
//! yearly IRS/OPM publication. They live here as data so a new year's values are a
//! configuration change; the engine never embeds them as literals.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Published elective-deferral limits for one calendar year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionLimitEntry {
    pub year: i16,
    pub elective_deferral: f64,
    pub catch_up: f64,
}

/// IRS elective-deferral limits, shared by the Traditional and Roth TSP accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionLimitTable {
    pub entries: Vec<ContributionLimitEntry>,
}

impl ContributionLimitTable {
    /// IRS 402(g) and 414(v) limits as published through 2026
    #[must_use]
    pub fn irs_published() -> Self {
        let rows: [(i16, f64, f64); 7] = [
            (2020, 19_500.0, 6_500.0),
            (2021, 19_500.0, 6_500.0),
            (2022, 20_500.0, 6_500.0),
            (2023, 22_500.0, 7_500.0),
            (2024, 23_000.0, 7_500.0),
            (2025, 23_500.0, 7_500.0),
            (2026, 24_500.0, 8_000.0),
        ];
        ContributionLimitTable {
            entries: rows
                .iter()
                .map(|&(year, elective_deferral, catch_up)| ContributionLimitEntry {
                    year,
                    elective_deferral,
                    catch_up,
                })
                .collect(),
        }
    }

    /// Limits in force for `year`.
    ///
    /// Years after the last published entry carry that entry forward; years before the first
    /// entry use the first one.
    pub fn entry_for(&self, year: i16) -> Result<ContributionLimitEntry, ValidationError> {
        let latest_on_or_before = self
            .entries
            .iter()
            .filter(|e| e.year <= year)
            .max_by_key(|e| e.year);
        latest_on_or_before
            .or_else(|| self.entries.iter().min_by_key(|e| e.year))
            .copied()
            .ok_or(ValidationError::EmptyTable("contribution limit"))
    }

    /// Combined employee limit for `year`, including catch-up when eligible.
    pub fn limit(&self, year: i16, catch_up_eligible: bool) -> Result<f64, ValidationError> {
        let entry = self.entry_for(year)?;
        Ok(if catch_up_eligible {
            entry.elective_deferral + entry.catch_up
        } else {
            entry.elective_deferral
        })
    }
}

impl Default for ContributionLimitTable {
    fn default() -> Self {
        Self::irs_published()
    }
}

/// Minimum Retirement Age, expressed in whole years plus months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mra {
    pub years: u8,
    pub months: u8,
}

impl Mra {
    #[must_use]
    pub fn decimal_age(&self) -> f64 {
        f64::from(self.years) + f64::from(self.months) / 12.0
    }
}

/// MRA for everyone born in `birth_year` and later, until the next entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MraBracket {
    pub birth_year: i16,
    pub mra: Mra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MraTable {
    pub brackets: Vec<MraBracket>,
}

impl MraTable {
    /// OPM schedule: 55 before 1948, two months more per birth year to 56 (1953-1964),
    /// then two months more per year to 57 for 1970 and later.
    #[must_use]
    pub fn opm() -> Self {
        let rows: [(i16, u8, u8); 13] = [
            (1947, 55, 0),
            (1948, 55, 2),
            (1949, 55, 4),
            (1950, 55, 6),
            (1951, 55, 8),
            (1952, 55, 10),
            (1953, 56, 0),
            (1965, 56, 2),
            (1966, 56, 4),
            (1967, 56, 6),
            (1968, 56, 8),
            (1969, 56, 10),
            (1970, 57, 0),
        ];
        MraTable {
            brackets: rows
                .iter()
                .map(|&(birth_year, years, months)| MraBracket {
                    birth_year,
                    mra: Mra { years, months },
                })
                .collect(),
        }
    }

    /// Birth years before the first bracket use the first bracket.
    pub fn lookup(&self, birth_year: i16) -> Result<Mra, ValidationError> {
        self.brackets
            .iter()
            .filter(|b| b.birth_year <= birth_year)
            .max_by_key(|b| b.birth_year)
            .or_else(|| self.brackets.iter().min_by_key(|b| b.birth_year))
            .map(|b| b.mra)
            .ok_or(ValidationError::EmptyTable("MRA"))
    }
}

impl Default for MraTable {
    fn default() -> Self {
        Self::opm()
    }
}

/// Basic-annuity computation rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnuityRules {
    /// Fraction of high-3 earned per year of service
    pub multiplier: f64,
    /// Reduction per whole year under `unreduced_age` for MRA+10 retirements
    pub reduction_per_year: f64,
    pub unreduced_age: f64,
    /// Years of service that earn a full Social Security equivalent in the supplement
    pub supplement_divisor: f64,
}

impl Default for AnnuityRules {
    fn default() -> Self {
        Self {
            multiplier: 0.01,
            reduction_per_year: 0.05,
            unreduced_age: 62.0,
            supplement_divisor: 40.0,
        }
    }
}

/// Annual leave accrued per biweekly pay period once `min_years_of_service` is reached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccrualTier {
    pub min_years_of_service: f64,
    pub hours_per_period: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRules {
    pub tiers: Vec<AccrualTier>,
    pub rollover_cap_hours: f64,
    /// Work hours that convert to one year of service credit
    pub hours_per_service_year: f64,
}

impl Default for LeaveRules {
    fn default() -> Self {
        Self {
            tiers: vec![
                AccrualTier {
                    min_years_of_service: 0.0,
                    hours_per_period: 4.0,
                },
                AccrualTier {
                    min_years_of_service: 3.0,
                    hours_per_period: 6.0,
                },
                AccrualTier {
                    min_years_of_service: 15.0,
                    hours_per_period: 8.0,
                },
            ],
            rollover_cap_hours: 240.0,
            hours_per_service_year: 2087.0,
        }
    }
}

/// Every regulatory table the engine consults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatoryTables {
    pub contribution_limits: ContributionLimitTable,
    pub mra: MraTable,
    pub annuity: AnnuityRules,
    pub leave: LeaveRules,
    /// Age (reached during the calendar year) from which catch-up contributions are allowed
    pub catch_up_age: i16,
}

impl Default for RegulatoryTables {
    fn default() -> Self {
        Self {
            contribution_limits: ContributionLimitTable::default(),
            mra: MraTable::default(),
            annuity: AnnuityRules::default(),
            leave: LeaveRules::default(),
            catch_up_age: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_lookup_published_year() {
        let table = ContributionLimitTable::irs_published();
        assert_eq!(table.limit(2025, false).unwrap(), 23_500.0);
        assert_eq!(table.limit(2025, true).unwrap(), 31_000.0);
        assert_eq!(table.limit(2026, false).unwrap(), 24_500.0);
    }

    #[test]
    fn test_limit_lookup_outside_table() {
        let table = ContributionLimitTable::irs_published();
        // Carried forward from the last published year
        assert_eq!(table.limit(2040, false).unwrap(), 24_500.0);
        // Falls back to the earliest entry
        assert_eq!(table.limit(2010, false).unwrap(), 19_500.0);
    }

    #[test]
    fn test_limit_lookup_unsorted_entries() {
        let mut table = ContributionLimitTable::irs_published();
        table.entries.reverse();
        assert_eq!(table.limit(2023, false).unwrap(), 22_500.0);
    }

    #[test]
    fn test_empty_limit_table() {
        let table = ContributionLimitTable { entries: vec![] };
        assert_eq!(
            table.limit(2025, false),
            Err(ValidationError::EmptyTable("contribution limit"))
        );
    }

    #[test]
    fn test_mra_brackets() {
        let table = MraTable::opm();
        assert_eq!(table.lookup(1940).unwrap().decimal_age(), 55.0);
        assert_eq!(table.lookup(1950).unwrap(), Mra { years: 55, months: 6 });
        assert_eq!(table.lookup(1960).unwrap().decimal_age(), 56.0);
        assert_eq!(table.lookup(1964).unwrap().decimal_age(), 56.0);
        let mra_1967 = table.lookup(1967).unwrap().decimal_age();
        assert!((mra_1967 - 56.5).abs() < 1e-12);
        assert_eq!(table.lookup(1970).unwrap().decimal_age(), 57.0);
        assert_eq!(table.lookup(1995).unwrap().decimal_age(), 57.0);
    }
}
