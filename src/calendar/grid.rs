use chrono::{Datelike, Days, NaiveDate};

use crate::indicators::aggregate::RangeSummary;
use crate::indicators::vol::{volatility_color, VolatilityLevel, TODAY_COLOR};
use crate::models::{Bar, DateIndex};

pub const DAYS_PER_WEEK: usize = 7;
pub const WEEKS_PER_GRID: usize = 6;
pub const GRID_CELLS: usize = DAYS_PER_WEEK * WEEKS_PER_GRID;

/// First day of the month `date` falls in.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Fixed 6×7 Sunday-first month layout.
///
/// Always 42 consecutive days starting on the Sunday on or before the first
/// of the month, so every month renders at the same height. The grid depends
/// only on the month; bar data is joined in at consumption time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    month_start: NaiveDate,
    dates: [NaiveDate; GRID_CELLS],
}

/// Builds the grid for the month containing `reference`.
///
/// At the two ends of chrono's date range the padding days saturate at
/// `NaiveDate::MIN` / `NaiveDate::MAX` instead of overflowing.
pub fn build_grid(reference: NaiveDate) -> CalendarGrid {
    let month_start = start_of_month(reference);
    let start_day = u64::from(month_start.weekday().num_days_from_sunday());
    let first = month_start.checked_sub_days(Days::new(start_day)).unwrap_or(NaiveDate::MIN);
    let dates = std::array::from_fn(|i| {
        first.checked_add_days(Days::new(i as u64)).unwrap_or(NaiveDate::MAX)
    });
    CalendarGrid { month_start, dates }
}

impl CalendarGrid {
    pub fn month_start(&self) -> NaiveDate {
        self.month_start
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[GRID_CELLS - 1]
    }

    /// The six week rows, each Sunday → Saturday.
    pub fn rows(&self) -> impl Iterator<Item = &[NaiveDate]> {
        self.dates.chunks(DAYS_PER_WEEK)
    }

    pub fn row(&self, idx: usize) -> Option<&[NaiveDate]> {
        self.rows().nth(idx)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_date() && date <= self.last_date()
    }

    pub fn is_current_month(&self, date: NaiveDate) -> bool {
        date.year() == self.month_start.year() && date.month() == self.month_start.month()
    }

    pub fn is_today(&self, date: NaiveDate, today: NaiveDate) -> bool {
        date == today
    }

    /// Per-cell view for the day layout.
    pub fn cells(&self, index: &DateIndex, today: NaiveDate) -> Vec<DayCell> {
        self.dates
            .iter()
            .map(|&date| {
                DayCell::new(
                    date,
                    index.get(date).copied(),
                    self.is_current_month(date),
                    self.is_today(date, today),
                )
            })
            .collect()
    }

    /// One summary per week row, top to bottom.
    pub fn row_summaries(&self, index: &DateIndex) -> Vec<RowSummary> {
        self.rows()
            .enumerate()
            .map(|(row, dates)| RowSummary {
                row,
                first_date: dates[0],
                last_date: dates[dates.len() - 1],
                summary: summarize_dates(dates, index),
            })
            .collect()
    }

    /// Summary over all 42 cells, including the padding days.
    pub fn grid_summary(&self, index: &DateIndex) -> RangeSummary {
        summarize_dates(&self.dates, index)
    }
}

/// Aggregates whatever bars `dates` match in `index`, in the given order.
/// Dates without a bar are skipped.
pub fn summarize_dates(dates: &[NaiveDate], index: &DateIndex) -> RangeSummary {
    RangeSummary::from_ordered(dates.iter().filter_map(|d| index.get(*d)))
}

/// Weekly view line: one grid row and its summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSummary {
    pub row: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub summary: RangeSummary,
}

/// Everything a renderer needs for one day cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub bar: Option<Bar>,
    pub level: Option<VolatilityLevel>,
    pub volatility_percent: Option<f64>,
    /// Open → close of the day, in percent.
    pub performance: Option<f64>,
    pub is_current_month: bool,
    pub is_today: bool,
}

impl DayCell {
    fn new(date: NaiveDate, bar: Option<Bar>, is_current_month: bool, is_today: bool) -> Self {
        Self {
            date,
            bar,
            level: bar.map(|b| b.volatility_level()),
            volatility_percent: bar.map(|b| b.volatility_percent()),
            performance: bar.and_then(|b| b.performance()),
            is_current_month,
            is_today,
        }
    }

    pub fn has_data(&self) -> bool {
        self.bar.is_some()
    }

    /// Background token: today wins over the volatility colour.
    pub fn color(&self) -> &'static str {
        if self.is_today {
            TODAY_COLOR
        } else {
            volatility_color(self.level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Series;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grid_starts_on_sunday_before_the_first() {
        // 2024-03-01 is a Friday.
        let grid = build_grid(date(2024, 3, 15));
        assert_eq!(grid.month_start(), date(2024, 3, 1));
        assert_eq!(grid.first_date(), date(2024, 2, 25));
        assert_eq!(grid.first_date().weekday(), Weekday::Sun);
        assert_eq!(grid.last_date(), date(2024, 4, 6));
    }

    #[test]
    fn month_starting_on_sunday_has_no_leading_padding() {
        // 2024-09-01 is a Sunday.
        let grid = build_grid(date(2024, 9, 1));
        assert_eq!(grid.first_date(), date(2024, 9, 1));
        assert_eq!(grid.rows().count(), WEEKS_PER_GRID);
    }

    #[test]
    fn grid_saturates_at_the_ends_of_the_date_range() {
        let last = build_grid(NaiveDate::MAX);
        assert_eq!(last.dates().len(), GRID_CELLS);
        assert_eq!(last.last_date(), NaiveDate::MAX);
        assert!(last.is_current_month(NaiveDate::MAX));
        assert!(last.dates().windows(2).all(|w| w[0] <= w[1]));

        let first = build_grid(NaiveDate::MIN);
        assert_eq!(first.dates().len(), GRID_CELLS);
        assert!(first.contains(NaiveDate::MIN));
        assert!(first.dates().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn rows_are_sunday_to_saturday() {
        let grid = build_grid(date(2023, 2, 1));
        for row in grid.rows() {
            assert_eq!(row.len(), DAYS_PER_WEEK);
            assert_eq!(row[0].weekday(), Weekday::Sun);
            assert_eq!(row[6].weekday(), Weekday::Sat);
        }
        assert!(grid.row(6).is_none());
    }

    #[test]
    fn month_flags() {
        let grid = build_grid(date(2024, 3, 1));
        assert!(!grid.is_current_month(date(2024, 2, 29)));
        assert!(grid.is_current_month(date(2024, 3, 31)));
        assert!(!grid.is_current_month(date(2023, 3, 31)));
        assert!(grid.is_today(date(2024, 3, 4), date(2024, 3, 4)));
        assert!(!grid.is_today(date(2024, 3, 5), date(2024, 3, 4)));
    }

    #[test]
    fn row_and_grid_summaries_skip_missing_days() {
        let series = Series::from_bars(vec![
            Bar::new(date(2024, 3, 3), 100.0, 110.0, 95.0, 105.0, 1000.0),
            Bar::new(date(2024, 3, 5), 105.0, 108.0, 102.0, 107.0, 1500.0),
            Bar::new(date(2024, 3, 12), 107.0, 109.0, 106.0, 108.0, 500.0),
        ]);
        let index = DateIndex::from_series(&series);
        let grid = build_grid(date(2024, 3, 1));

        let rows = grid.row_summaries(&index);
        assert_eq!(rows.len(), 6);
        // row 0: Feb 25 - Mar 2, nothing
        assert!(!rows[0].summary.has_data());
        assert_eq!(rows[0].summary.performance, None);
        // row 1: Mar 3 - Mar 9, two bars
        assert_eq!(rows[1].first_date, date(2024, 3, 3));
        assert_eq!(rows[1].summary.bar_count, 2);
        assert_eq!(rows[1].summary.total_volume, 2500.0);
        assert!((rows[1].summary.performance.unwrap() - 7.0).abs() < 1e-9);
        // row 2: one bar, no performance figure
        assert_eq!(rows[2].summary.bar_count, 1);
        assert_eq!(rows[2].summary.performance, None);

        let whole = grid.grid_summary(&index);
        assert_eq!(whole.bar_count, 3);
        assert_eq!(whole.total_volume, 3000.0);
        assert!((whole.performance.unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn cells_join_bars_and_flags() {
        let series = Series::from_bars(vec![Bar::new(date(2024, 3, 4), 100.0, 106.0, 100.0, 103.0, 10.0)]);
        let index = DateIndex::from_series(&series);
        let grid = build_grid(date(2024, 3, 1));
        let cells = grid.cells(&index, date(2024, 3, 5));
        assert_eq!(cells.len(), GRID_CELLS);

        let with_bar = cells.iter().find(|c| c.date == date(2024, 3, 4)).unwrap();
        assert_eq!(with_bar.level, Some(VolatilityLevel::High));
        assert_eq!(with_bar.color(), "#f8d7da");
        assert!((with_bar.performance.unwrap() - 3.0).abs() < 1e-9);

        let today = cells.iter().find(|c| c.date == date(2024, 3, 5)).unwrap();
        assert!(today.is_today);
        assert!(!today.has_data());
        assert_eq!(today.color(), TODAY_COLOR);

        assert!(!cells[0].is_current_month);
        assert_eq!(cells[0].color(), "white");
    }
}
