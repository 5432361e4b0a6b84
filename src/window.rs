//! Selected-day detail: the bar itself and a small window of neighbours for
//! the trend charts.

use chrono::NaiveDate;

use crate::models::{Bar, DateIndex, Series};

/// Neighbours on each side of the selected day.
pub const DEFAULT_RADIUS: usize = 3;

/// Bars around `selected`: `[i - radius, i + radius]` clamped to the series,
/// where `i` is the selected day's index. Empty when the day is not in the
/// series.
pub fn nearby_window(series: &Series, selected: NaiveDate, radius: usize) -> &[Bar] {
    let Some(i) = series.position(selected) else {
        return &[];
    };
    let bars = series.bars();
    let start = i.saturating_sub(radius);
    let end = i.saturating_add(radius).saturating_add(1).min(bars.len());
    &bars[start..end]
}

/// One point of the nearby volatility / volume charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub volatility_percent: f64,
    pub volume: f64,
}

impl From<&Bar> for TrendPoint {
    fn from(bar: &Bar) -> Self {
        Self { date: bar.date, volatility_percent: bar.volatility_percent(), volume: bar.volume }
    }
}

/// Detail panel for one selected day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayDetail {
    pub bar: Bar,
    /// Open → close, in percent.
    pub performance: Option<f64>,
    pub intraday_volatility: f64,
    pub trend: Vec<TrendPoint>,
}

impl DayDetail {
    /// `None` when the selected day has no bar; the panel stays closed.
    ///
    /// The bar comes from `index`, the same lookup the day cells use, so a
    /// duplicated day shows the bar its cell was coloured by.
    pub fn resolve(series: &Series, index: &DateIndex, selected: NaiveDate, radius: usize) -> Option<Self> {
        let bar = *index.get(selected)?;
        let trend = nearby_window(series, selected, radius).iter().map(TrendPoint::from).collect();
        Some(Self {
            bar,
            performance: bar.performance(),
            intraday_volatility: bar.volatility_percent(),
            trend,
        })
    }
}
