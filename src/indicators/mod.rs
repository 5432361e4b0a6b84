//! Indicator calculations
//!
//! - `vol`: intraday volatility percent, level and colour token
//! - `aggregate`: weekly / monthly period summaries

pub mod aggregate;
pub mod vol;

/// Percent change from `from` to `to`.
///
/// `None` when `from` is zero or either side is not finite, so callers never
/// see an infinite or NaN performance figure.
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() || !to.is_finite() {
        return None;
    }
    Some((to - from) / from * 100.0)
}
