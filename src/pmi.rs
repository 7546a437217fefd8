//! Pointwise mutual information
//!
//! PMI = log(p(x,y) / (p(x) p(y))) = ln(n_xy) + ln(N) - ln(n_x) - ln(n_y)

use crate::stats::Stats;

/// Added to the pair count only, so an unobserved pair scores very low
/// instead of `ln(0)`.
pub const EPS: f64 = 1e-100;

/// PMI for a pair whose marginals are known to be positive.
#[inline]
pub fn pmi(stats: &Stats) -> f64 {
    (stats.pair_count + EPS).ln() + stats.total.ln() - stats.count_1.ln() - stats.count_2.ln()
}
