//! Month calendar
//!
//! - `grid`: 6×7 date layout plus per-row / whole-grid aggregation
//! - `navigation`: month / view-mode / selection transitions

pub mod grid;
pub mod navigation;

pub use grid::{build_grid, CalendarGrid, DayCell, RowSummary};
pub use navigation::{
    apply_key, advance_month, cycle_view_mode, follow_today, CalendarState, Direction, NavKey, ViewMode,
};
