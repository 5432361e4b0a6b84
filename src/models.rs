//! Daily market data models.
//!
//! A [`Bar`] is one day's OHLCV record, a [`Series`] is the chronological run
//! of bars for one symbol, and a [`DateIndex`] is the day-keyed lookup the
//! calendar uses for its cells.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::indicators::vol::{volatility_level, volatility_percent, VolatilityLevel};
use crate::indicators::percent_change;

/// Calendar-day key format (`YYYY-MM-DD`).
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// One day of OHLCV data.
///
/// `low <= open, close <= high` is expected but never checked; whatever the
/// exchange sends is carried through as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { date, open, high, low, close, volume }
    }

    /// Intraday range relative to the open, in percent.
    pub fn volatility_percent(&self) -> f64 {
        volatility_percent(self.open, self.high, self.low)
    }

    pub fn volatility_level(&self) -> VolatilityLevel {
        volatility_level(self.open, self.high, self.low)
    }

    /// Open → close change in percent. `None` when the open is zero.
    pub fn performance(&self) -> Option<f64> {
        percent_change(self.open, self.close)
    }

    /// Body change (close - open) in price units.
    pub fn change(&self) -> f64 {
        self.close - self.open
    }
}

/// Bars for one symbol, ascending by date.
///
/// Built once per fetch and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Builds a series, sorting the bars by date. The sort is stable, so
    /// same-day duplicates keep their upstream order.
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self { bars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Index of the bar for `date`, if any.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.bars.iter().position(|b| b.date == date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

/// Formats a date as its `YYYY-MM-DD` lookup key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Day-keyed lookup over a [`Series`].
///
/// Lookup only: iteration order carries no meaning. If the series holds two
/// bars for one day, the later one wins.
#[derive(Debug, Clone, Default)]
pub struct DateIndex {
    by_date: HashMap<NaiveDate, Bar>,
}

impl DateIndex {
    pub fn from_series(series: &Series) -> Self {
        let by_date = series.iter().map(|b| (b.date, *b)).collect();
        Self { by_date }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Bar> {
        self.by_date.get(&date)
    }

    /// Lookup by `YYYY-MM-DD` key. Unparseable keys simply miss.
    pub fn get_key(&self, key: &str) -> Option<&Bar> {
        let date = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()?;
        self.get(date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.by_date.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
