//! Percentile extraction for Monte Carlo aggregates

/// Two percentiles closer than this are the same percentile
pub const PERCENTILE_TOLERANCE: f64 = 0.001;

/// Standard percentiles used when reporting
pub mod standard {
    pub const P5: f64 = 0.05;
    pub const P50: f64 = 0.50;
    pub const P95: f64 = 0.95;
}

/// Nearest-rank value of `p` (in [0, 1]) from an ascending slice.
///
/// Returns 0.0 for an empty slice.
#[inline]
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Sort `values` in place and return `(p, value)` for every requested percentile.
pub fn percentiles(values: &mut [f64], ps: &[f64]) -> Vec<(f64, f64)> {
    values.sort_by(f64::total_cmp);
    ps.iter().map(|&p| (p, percentile_of_sorted(values, p))).collect()
}

/// Value recorded for `target` in a `(percentile, value)` list, matching within
/// [`PERCENTILE_TOLERANCE`].
#[inline]
pub fn find_percentile_value(values: &[(f64, f64)], target: f64) -> Option<f64> {
    values
        .iter()
        .find_map(|&(p, v)| ((p - target).abs() < PERCENTILE_TOLERANCE).then_some(v))
}

/// The three percentiles the reports show
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PercentileSet {
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}

impl PercentileSet {
    /// `None` unless P5, P50 and P95 are all present.
    pub fn from_values(values: &[(f64, f64)]) -> Option<Self> {
        let at = |p| find_percentile_value(values, p);
        Some(Self {
            p5: at(standard::P5)?,
            p50: at(standard::P50)?,
            p95: at(standard::P95)?,
        })
    }

    /// Missing percentiles read as zero.
    pub fn from_values_or_default(values: &[(f64, f64)]) -> Self {
        let at = |p| find_percentile_value(values, p).unwrap_or_default();
        Self {
            p5: at(standard::P5),
            p50: at(standard::P50),
            p95: at(standard::P95),
        }
    }
}
