use chrono::NaiveDate;

use crate::calendar::grid::{build_grid, CalendarGrid, DayCell, RowSummary};
use crate::calendar::navigation::CalendarState;
use crate::indicators::aggregate::{aggregate, Granularity, PeriodSummary, RangeSummary};
use crate::models::{DateIndex, Series};
use crate::store::Snapshot;
use crate::window::DayDetail;

/// Everything one frame of the dashboard shows, computed from an immutable
/// series and the navigation state.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub symbol: String,
    pub state: CalendarState,
    pub today: NaiveDate,
    pub grid: CalendarGrid,
    pub cells: Vec<DayCell>,
    pub rows: Vec<RowSummary>,
    pub grid_summary: RangeSummary,
    pub weekly: Vec<PeriodSummary>,
    pub monthly: Vec<PeriodSummary>,
    pub detail: Option<DayDetail>,
    pub bar_count: usize,
}

impl DashboardView {
    pub fn build(
        symbol: &str,
        series: &Series,
        index: &DateIndex,
        state: &CalendarState,
        today: NaiveDate,
        radius: usize,
    ) -> Self {
        let grid = build_grid(state.month);
        let cells = grid.cells(index, today);
        let rows = grid.row_summaries(index);
        let grid_summary = grid.grid_summary(index);
        let detail = state.selected.and_then(|d| DayDetail::resolve(series, index, d, radius));

        Self {
            symbol: symbol.to_string(),
            state: *state,
            today,
            grid,
            cells,
            rows,
            grid_summary,
            weekly: aggregate(series, Granularity::Week),
            monthly: aggregate(series, Granularity::Month),
            detail,
            bar_count: series.len(),
        }
    }

    /// Builds from the store's current snapshot; no snapshot renders as an
    /// empty calendar.
    pub fn from_snapshot(
        symbol: &str,
        snapshot: Option<&Snapshot>,
        state: &CalendarState,
        today: NaiveDate,
        radius: usize,
    ) -> Self {
        match snapshot {
            Some(s) => Self::build(symbol, &s.series, &s.index, state, today, radius),
            None => Self::build(symbol, &Series::empty(), &DateIndex::default(), state, today, radius),
        }
    }

    pub fn has_data(&self) -> bool {
        self.bar_count > 0
    }
}
