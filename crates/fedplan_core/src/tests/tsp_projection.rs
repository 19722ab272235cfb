//! Tests for the per-account TSP projector

use crate::model::{ContributionLimitTable, YearlySnapshot};
use crate::tsp::{AgencyContributionPolicy, ContributionInputs, TspProjector};

fn projector(
    limits: &ContributionLimitTable,
    opening_balance: f64,
    salary: f64,
    employee_rate: f64,
    growth_rate: f64,
    years: u32,
) -> TspProjector<'_> {
    TspProjector {
        opening_balance,
        inputs: ContributionInputs {
            salary,
            salary_growth_rate: 0.0,
            employee_rate,
        },
        growth_rate,
        years,
        start_year: 2025,
        catch_up_eligible: false,
        limits,
    }
}

#[test]
fn test_zero_years_returns_opening_balance() {
    let limits = ContributionLimitTable::irs_published();
    let p = projector(&limits, 50_000.0, 100_000.0, 0.05, 0.07, 0);

    let agency = AgencyContributionPolicy::default();
    assert_eq!(p.project_traditional_balance(&agency).unwrap(), 50_000.0);
    assert_eq!(p.project_roth_balance(None).unwrap(), 50_000.0);
    assert!(p.project_traditional_detailed(&agency).unwrap().is_empty());
    assert!(p.project_roth_detailed(None).unwrap().is_empty());
}

#[test]
fn test_growth_without_contributions() {
    let limits = ContributionLimitTable::irs_published();
    let p = projector(&limits, 10_000.0, 0.0, 0.0, 0.05, 3);

    let snapshots = p
        .project_traditional_detailed(&AgencyContributionPolicy::none())
        .unwrap();
    assert_eq!(snapshots.len(), 3);
    for (i, s) in snapshots.iter().enumerate() {
        let expected = 10_000.0 * 1.05_f64.powi(i as i32 + 1);
        assert!(
            (s.closing_balance - expected).abs() < 1e-6,
            "Year {}: expected {}, got {}",
            s.year,
            expected,
            s.closing_balance
        );
        assert!((s.closing_balance / s.opening_balance - 1.05).abs() < 1e-12);
    }
}

#[test]
fn test_roth_matches_traditional_without_agency_money() {
    let limits = ContributionLimitTable::irs_published();
    let p = projector(&limits, 25_000.0, 90_000.0, 0.08, 0.06, 10);

    let traditional = p
        .project_traditional_detailed(&AgencyContributionPolicy::none())
        .unwrap();
    let roth = p.project_roth_detailed(None).unwrap();

    assert_eq!(traditional.len(), roth.len());
    for (t, r) in traditional.iter().zip(&roth) {
        assert_eq!(t.year, r.year);
        assert_eq!(t.employee_contribution, r.employee_contribution);
        assert!((t.closing_balance - r.closing_balance).abs() < 1e-9);
    }
}

#[test]
fn test_snapshots_chain_exactly() {
    let limits = ContributionLimitTable::irs_published();
    let mut p = projector(&limits, 80_000.0, 95_000.0, 0.10, 0.065, 12);
    p.inputs.salary_growth_rate = 0.03;

    let snapshots = p
        .project_traditional_detailed(&AgencyContributionPolicy::default())
        .unwrap();
    assert_eq!(snapshots[0].opening_balance, 80_000.0);
    for pair in snapshots.windows(2) {
        assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        assert_eq!(pair[0].year + 1, pair[1].year);
    }

    let balance = p
        .project_traditional_balance(&AgencyContributionPolicy::default())
        .unwrap();
    assert_eq!(balance, snapshots.last().unwrap().closing_balance);
}

#[test]
fn test_closing_formula() {
    let limits = ContributionLimitTable::irs_published();
    let p = projector(&limits, 100_000.0, 100_000.0, 0.05, 0.10, 1);

    let s = p
        .project_traditional_detailed(&AgencyContributionPolicy::default())
        .unwrap()[0];
    // 100k * 1.10 + 5k employee + 1k automatic + 4k match
    assert!((s.closing_balance - 120_000.0).abs() < 1e-6);
    assert!((s.growth - 10_000.0).abs() < 1e-6);
    assert!((s.total_contributions() - 10_000.0).abs() < 1e-6);
    assert_eq!(s.withdrawal, 0.0);
}

#[test]
fn test_huge_request_capped_at_2025_limit() {
    let limits = ContributionLimitTable::irs_published();
    let p = projector(&limits, 0.0, 999_999.0, 1.0, 0.0, 1);

    let s = p
        .project_traditional_detailed(&AgencyContributionPolicy::none())
        .unwrap()[0];
    assert_eq!(s.year, 2025);
    assert_eq!(s.employee_contribution, 23_500.0);
}

#[test]
fn test_roth_gets_nothing_after_traditional_uses_limit() {
    let limits = ContributionLimitTable::irs_published();
    let p = projector(&limits, 0.0, 200_000.0, 0.20, 0.0, 2);

    let traditional = p
        .project_traditional_detailed(&AgencyContributionPolicy::none())
        .unwrap();
    let peer: Vec<f64> = traditional.iter().map(|s| s.employee_contribution).collect();
    assert_eq!(peer, vec![23_500.0, 24_500.0]);

    let roth = p.project_roth_detailed(Some(&peer)).unwrap();
    assert!(roth.iter().all(|s| s.employee_contribution == 0.0));
    assert_eq!(p.project_roth_balance(Some(&peer)).unwrap(), 0.0);
}

#[test]
fn test_short_peer_slice_counts_as_zero() {
    let limits = ContributionLimitTable::irs_published();
    let p = projector(&limits, 0.0, 100_000.0, 0.10, 0.0, 2);

    let roth = p.project_roth_detailed(Some(&[23_500.0])).unwrap();
    assert_eq!(roth[0].employee_contribution, 0.0);
    assert_eq!(roth[1].employee_contribution, 10_000.0);
}

#[test]
fn test_invalid_inputs_rejected() {
    let limits = ContributionLimitTable::irs_published();

    let negative_opening = projector(&limits, -1.0, 0.0, 0.0, 0.05, 1);
    assert!(negative_opening.project_roth_balance(None).is_err());

    let nan_growth = projector(&limits, 1_000.0, 0.0, 0.0, f64::NAN, 1);
    assert!(nan_growth.project_roth_detailed(None).is_err());

    let negative_rate = projector(&limits, 1_000.0, 50_000.0, -0.01, 0.05, 1);
    assert!(
        negative_rate
            .project_traditional_balance(&AgencyContributionPolicy::default())
            .is_err()
    );
}
