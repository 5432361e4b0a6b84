//! Calendar navigation state.
//!
//! Every transition takes the current state by reference and returns the
//! next one. The input layer maps keys to [`NavKey`] and calls [`apply_key`];
//! nothing here reads the clock.

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::Deserialize;

use super::grid::start_of_month;
use crate::error::CalendarError;

/// Which calendar layout is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Day,
    Week,
    Month,
}

impl ViewMode {
    /// Next coarser view, saturating at `Month`.
    pub fn coarser(self) -> Self {
        match self {
            ViewMode::Day => ViewMode::Week,
            ViewMode::Week | ViewMode::Month => ViewMode::Month,
        }
    }

    /// Next finer view, saturating at `Day`.
    pub fn finer(self) -> Self {
        match self {
            ViewMode::Month => ViewMode::Week,
            ViewMode::Week | ViewMode::Day => ViewMode::Day,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewMode::Day => "DAILY",
            ViewMode::Week => "WEEKLY",
            ViewMode::Month => "MONTHLY",
        };
        f.write_str(s)
    }
}

impl FromStr for ViewMode {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(ViewMode::Day),
            "week" | "weekly" => Ok(ViewMode::Week),
            "month" | "monthly" => Ok(ViewMode::Month),
            other => Err(CalendarError::Config(format!("unknown view mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Previous month / finer view.
    Backward,
    /// Next month / coarser view.
    Forward,
}

/// Keys the calendar reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Escape,
}

/// Displayed month, layout and selected day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarState {
    /// Always the first day of the displayed month.
    pub month: NaiveDate,
    pub view_mode: ViewMode,
    pub selected: Option<NaiveDate>,
}

impl CalendarState {
    pub fn new(today: NaiveDate, view_mode: ViewMode) -> Self {
        Self { month: start_of_month(today), view_mode, selected: None }
    }
}

/// Moves one month back or forward. Out-of-range dates leave the state as is.
pub fn advance_month(state: &CalendarState, direction: Direction) -> CalendarState {
    let one = Months::new(1);
    let next = match direction {
        Direction::Backward => state.month.checked_sub_months(one),
        Direction::Forward => state.month.checked_add_months(one),
    };
    CalendarState { month: next.unwrap_or(state.month), ..*state }
}

/// Steps the view mode: `Forward` goes coarser (day → week → month),
/// `Backward` goes finer. Both ends saturate.
pub fn cycle_view_mode(state: &CalendarState, direction: Direction) -> CalendarState {
    let view_mode = match direction {
        Direction::Forward => state.view_mode.coarser(),
        Direction::Backward => state.view_mode.finer(),
    };
    CalendarState { view_mode, ..*state }
}

pub fn set_view_mode(state: &CalendarState, view_mode: ViewMode) -> CalendarState {
    CalendarState { view_mode, ..*state }
}

/// Jumps back to the month containing `today`. Selection is kept.
pub fn reset_to_today(state: &CalendarState, today: NaiveDate) -> CalendarState {
    CalendarState { month: start_of_month(today), ..*state }
}

/// Day rollover: a state still showing the month of `previous_today` follows
/// `today` into its month. A state the user navigated away from is left alone.
pub fn follow_today(state: &CalendarState, previous_today: NaiveDate, today: NaiveDate) -> CalendarState {
    if state.month == start_of_month(previous_today) {
        reset_to_today(state, today)
    } else {
        *state
    }
}

pub fn select_date(state: &CalendarState, date: NaiveDate) -> CalendarState {
    CalendarState { selected: Some(date), ..*state }
}

pub fn clear_selection(state: &CalendarState) -> CalendarState {
    CalendarState { selected: None, ..*state }
}

/// Keyboard mapping: arrows move month / view, Enter selects today,
/// Escape closes the detail panel.
pub fn apply_key(state: &CalendarState, key: NavKey, today: NaiveDate) -> CalendarState {
    match key {
        NavKey::Left => advance_month(state, Direction::Backward),
        NavKey::Right => advance_month(state, Direction::Forward),
        NavKey::Up => cycle_view_mode(state, Direction::Forward),
        NavKey::Down => cycle_view_mode(state, Direction::Backward),
        NavKey::Enter => select_date(state, today),
        NavKey::Escape => clear_selection(state),
    }
}
