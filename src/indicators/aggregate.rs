//! Weekly / monthly bucketing of a daily series.
//!
//! Both granularities share one reduction: sort the bucket by date, take the
//! first open and last close, max/min the extremes and sum the volume.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use super::percent_change;
use crate::error::CalendarError;
use crate::models::{Bar, Series};

/// Aggregation bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// ISO week (Monday-based, ISO week-year).
    Week,
    /// Calendar month.
    Month,
}

impl Granularity {
    /// Bucket key for `date`: `2024-W01` for weeks, `2024-01` for months.
    pub fn period_key(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Week => {
                let iso = date.iso_week();
                format!("{}-W{:02}", iso.year(), iso.week())
            }
            Granularity::Month => format!("{}-{:02}", date.year(), date.month()),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Week => f.write_str("week"),
            Granularity::Month => f.write_str("month"),
        }
    }
}

impl FromStr for Granularity {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(CalendarError::Config(format!("unknown granularity '{}'", other))),
        }
    }
}

/// OHLCV summary of one week or month.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    /// Mean of the per-day volatility percent.
    pub avg_volatility_percent: f64,
    /// First open → last close, in percent. `None` when the first open is zero.
    pub performance: Option<f64>,
    pub bar_count: usize,
}

impl PeriodSummary {
    /// Reduces a non-empty bucket. Returns `None` for an empty one.
    fn from_bucket(period: String, mut bars: Vec<Bar>) -> Option<Self> {
        bars.sort_by_key(|b| b.date);
        let first = *bars.first()?;
        let last = *bars.last()?;

        let mut high = first.high;
        let mut low = first.low;
        let mut volume = 0.0_f64;
        let mut vol_sum = 0.0_f64;
        for b in &bars {
            high = high.max(b.high);
            low = low.min(b.low);
            volume += b.volume;
            vol_sum += b.volatility_percent();
        }

        Some(Self {
            period,
            start_date: first.date,
            end_date: last.date,
            open: first.open,
            close: last.close,
            high,
            low,
            volume,
            avg_volatility_percent: vol_sum / bars.len() as f64,
            performance: percent_change(first.open, last.close),
            bar_count: bars.len(),
        })
    }
}

/// Groups `series` into weekly or monthly buckets.
///
/// One summary per distinct period key present in the input, sorted by
/// `start_date` ascending. An empty series yields an empty list.
pub fn aggregate(series: &Series, granularity: Granularity) -> Vec<PeriodSummary> {
    let mut buckets: HashMap<String, Vec<Bar>> = HashMap::new();
    for bar in series {
        buckets
            .entry(granularity.period_key(bar.date))
            .or_default()
            .push(*bar);
    }

    let mut summaries: Vec<PeriodSummary> = buckets
        .into_iter()
        .filter_map(|(period, bars)| PeriodSummary::from_bucket(period, bars))
        .collect();
    summaries.sort_by_key(|s| s.start_date);
    summaries
}

/// Volume / volatility / performance over an arbitrary run of bars.
///
/// Used for calendar rows and whole grids, where the bars are whatever the
/// displayed dates happen to match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSummary {
    pub bar_count: usize,
    /// Mean volatility percent; `0.0` when no bar matched.
    pub avg_volatility: f64,
    pub total_volume: f64,
    /// First open → last close. `None` with fewer than two bars or a zero
    /// first open.
    pub performance: Option<f64>,
}

impl RangeSummary {
    /// Summarises bars that are already in date order.
    pub fn from_ordered<'a, I>(bars: I) -> Self
    where
        I: IntoIterator<Item = &'a Bar>,
    {
        let mut bar_count = 0usize;
        let mut total_volume = 0.0_f64;
        let mut vol_sum = 0.0_f64;
        let mut first_open: Option<f64> = None;
        let mut last_close = 0.0_f64;

        for bar in bars {
            bar_count += 1;
            total_volume += bar.volume;
            vol_sum += bar.volatility_percent();
            first_open.get_or_insert(bar.open);
            last_close = bar.close;
        }

        let avg_volatility = if bar_count > 0 { vol_sum / bar_count as f64 } else { 0.0 };
        let performance = match first_open {
            Some(open) if bar_count > 1 => percent_change(open, last_close),
            _ => None,
        };

        Self { bar_count, avg_volatility, total_volume, performance }
    }

    pub fn has_data(&self) -> bool {
        self.bar_count > 0
    }
}
