//! Plain-text rendering of engine results

use std::fmt::Write;

use fedplan_core::model::{
    AnnuityResult, EligibilityKind, EligibilityResult, MonteCarloResult, Phase, ProjectionResult,
};
use fedplan_core::percentiles::PercentileSet;

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn sign(value: f64) -> &'static str {
    if value < 0.0 { "-" } else { "" }
}

/// Format a currency value
pub fn format_currency(value: f64) -> String {
    let total_cents = (value.abs() * 100.0).round() as u64;
    format!(
        "{}${}.{:02}",
        sign(value),
        group_thousands(total_cents / 100),
        total_cents % 100
    )
}

/// Format a currency value without cents (shorter format for tight columns)
pub fn format_currency_short(value: f64) -> String {
    let dollars = value.abs().round() as u64;
    if dollars == 0 {
        return "$0".to_string();
    }
    format!("{}${}", sign(value), group_thousands(dollars))
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Format a currency value in compact form (e.g., $2.1M, $450K, $50)
pub fn format_compact_currency(value: f64) -> String {
    let abs_value = value.abs();
    let sign = sign(value);

    if abs_value >= 1_000_000.0 {
        format!("{}${:.1}M", sign, abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{}${:.0}K", sign, abs_value / 1_000.0)
    } else {
        format!("{}${:.0}", sign, abs_value)
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Working => "work",
        Phase::Separation => "sep",
        Phase::Retired => "ret",
    }
}

pub fn render_eligibility(eligibility: &EligibilityResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Retirement category: {}", eligibility.kind.label());
    let _ = writeln!(
        out,
        "Age at separation:   {:.2} (MRA {:.2})",
        eligibility.decimal_age, eligibility.mra
    );
    let immediate = if eligibility.eligible { "yes" } else { "no" };
    let _ = writeln!(out, "Immediate annuity:   {immediate}");
    out
}

pub fn render_annuity(annuity: &AnnuityResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Multiplier:          {:.1}%", annuity.multiplier * 100.0);
    let _ = writeln!(
        out,
        "Gross annuity:       {}",
        format_currency(annuity.gross_annual_annuity)
    );
    let _ = writeln!(
        out,
        "Reduction factor:    {:.2}",
        annuity.reduction_factor
    );
    let _ = writeln!(
        out,
        "Net annuity:         {}",
        format_currency(annuity.net_annual_annuity)
    );
    out
}

/// Year-by-year table of a deterministic projection.
pub fn render_projection(result: &ProjectionResult) -> String {
    let mut out = render_eligibility(&result.eligibility);
    out.push_str(&render_annuity(&result.annuity));
    if result.supplement > 0.0 {
        let _ = writeln!(
            out,
            "FERS supplement:     {} / year until 62",
            format_currency(result.supplement)
        );
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "{:>4} {:>3} {:>4} {:>10} {:>12} {:>12} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Year",
        "Age",
        "",
        "Salary",
        "Traditional",
        "Roth",
        "Annuity",
        "Suppl.",
        "Withdraw",
        "Expenses",
        "Surplus"
    );
    for y in &result.years {
        let _ = writeln!(
            out,
            "{:>4} {:>3} {:>4} {:>10} {:>12} {:>12} {:>10} {:>10} {:>10} {:>10} {:>12}",
            y.year,
            y.age,
            phase_label(y.phase),
            format_currency_short(y.salary),
            format_currency_short(y.traditional.closing_balance),
            format_currency_short(y.roth.closing_balance),
            format_currency_short(y.annuity),
            format_currency_short(y.supplement),
            format_currency_short(y.withdrawal),
            format_currency_short(y.expenses),
            format_currency_short(y.surplus),
        );
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "Terminal balance:    {}",
        format_currency(result.terminal_balance())
    );
    let _ = writeln!(
        out,
        "Lifetime surplus:    {}",
        format_currency(result.lifetime_surplus)
    );
    match result.depletion_age {
        Some(age) => {
            let _ = writeln!(out, "Savings depleted at age {age}");
        }
        None => {
            let _ = writeln!(out, "Savings last the full horizon");
        }
    }
    out
}

/// Summary of a Monte Carlo run with P5/P50/P95 balance bands every `stride` years.
pub fn render_monte_carlo(result: &MonteCarloResult, stride: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Monte Carlo: {} iterations (seed {})",
        result.iterations, result.seed
    );
    let _ = writeln!(
        out,
        "Success rate:           {}",
        format_percentage(result.success_rate)
    );
    let _ = writeln!(
        out,
        "Shortfall probability:  {}",
        format_percentage(result.probability_of_shortfall)
    );
    if let Some(age) = result.depletion.earliest_age {
        let median = PercentileSet::from_values(&result.depletion.age_percentiles)
            .map(|p| format!("{:.0}", p.p50))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "Depletion:              earliest age {age}, median age {median}"
        );
    }

    let terminal = PercentileSet::from_values_or_default(&result.terminal_balance.percentiles);
    let _ = writeln!(
        out,
        "Terminal balance:       P5 {} / P50 {} / P95 {}",
        format_compact_currency(terminal.p5),
        format_compact_currency(terminal.p50),
        format_compact_currency(terminal.p95)
    );
    let _ = writeln!(
        out,
        "Terminal balance mean:  {}",
        format_currency_short(result.terminal_balance.mean)
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "{:>4} {:>3} {:>10} {:>10} {:>10} {:>10}",
        "Year", "Age", "P5", "P50", "P95", "Income P50"
    );
    let stride = stride.max(1);
    let last = result.balance_bands.len().saturating_sub(1);
    for (i, (balance, income)) in result
        .balance_bands
        .iter()
        .zip(&result.income_bands)
        .enumerate()
    {
        if i % stride != 0 && i != last {
            continue;
        }
        let b = PercentileSet::from_values_or_default(&balance.values);
        let inc = PercentileSet::from_values_or_default(&income.values);
        let _ = writeln!(
            out,
            "{:>4} {:>3} {:>10} {:>10} {:>10} {:>10}",
            balance.year,
            balance.age,
            format_compact_currency(b.p5),
            format_compact_currency(b.p50),
            format_compact_currency(b.p95),
            format_compact_currency(inc.p50),
        );
    }
    out
}

/// One-line reading of a retirement category
pub fn verdict(kind: EligibilityKind) -> &'static str {
    match kind {
        EligibilityKind::FullImmediate => "eligible for an unreduced immediate annuity",
        EligibilityKind::MraPlus10Reduced => "eligible for a reduced immediate annuity",
        EligibilityKind::Deferred => "vested; annuity deferred",
        EligibilityKind::NotEligible => "not vested",
    }
}
