//! Line commands typed into the running dashboard.
//!
//! Each stdin line parses into a [`Command`]; [`apply_command`] turns it into
//! the next navigation state, switching the store's symbol where asked.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::calendar::navigation::{
    apply_key, reset_to_today, select_date, set_view_mode, CalendarState, NavKey, ViewMode,
};
use crate::error::{CalendarError, Result};
use crate::models::DATE_KEY_FORMAT;
use crate::store::SnapshotStore;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Key(NavKey),
    Today,
    View(ViewMode),
    Select(NaiveDate),
    Symbol(String),
    /// Blank line: just draw again.
    Redraw,
    Quit,
}

impl FromStr for Command {
    type Err = CalendarError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Command::Redraw);
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(CalendarError::Config(format!("too many words in '{}'", line.trim())));
        }

        let cmd = match (head.to_ascii_lowercase().as_str(), arg) {
            ("left" | "prev" | "h", None) => Command::Key(NavKey::Left),
            ("right" | "next" | "l", None) => Command::Key(NavKey::Right),
            ("up" | "k", None) => Command::Key(NavKey::Up),
            ("down" | "j", None) => Command::Key(NavKey::Down),
            ("enter", None) => Command::Key(NavKey::Enter),
            ("esc" | "escape", None) => Command::Key(NavKey::Escape),
            ("today" | "t", None) => Command::Today,
            ("quit" | "exit" | "q", None) => Command::Quit,
            ("view" | "v", Some(mode)) => Command::View(mode.parse()?),
            ("select" | "d", Some(day)) => Command::Select(parse_day(day)?),
            ("symbol" | "s", Some(symbol)) => Command::Symbol(symbol.to_ascii_uppercase()),
            // a bare date or symbol
            (_, None) => match parse_day(head) {
                Ok(day) => Command::Select(day),
                Err(_) => Command::Symbol(head.to_ascii_uppercase()),
            },
            _ => return Err(CalendarError::Config(format!("unknown command '{}'", line.trim()))),
        };
        Ok(cmd)
    }
}

fn parse_day(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_KEY_FORMAT)
        .map_err(|e| CalendarError::Config(format!("bad date '{}': {}", text, e)))
}

/// Applies `cmd` and returns the next state. `Symbol` only accepts entries of
/// `symbols`; `Quit` and `Redraw` leave the state unchanged.
pub fn apply_command(
    cmd: &Command,
    state: &CalendarState,
    store: &mut SnapshotStore,
    symbols: &[String],
    today: NaiveDate,
) -> Result<CalendarState> {
    let next = match cmd {
        Command::Key(key) => apply_key(state, *key, today),
        Command::Today => reset_to_today(state, today),
        Command::View(mode) => set_view_mode(state, *mode),
        Command::Select(day) => select_date(state, *day),
        Command::Symbol(symbol) => {
            let Some(known) = symbols.iter().find(|s| s.eq_ignore_ascii_case(symbol)) else {
                return Err(CalendarError::Config(format!(
                    "symbol '{}' is not one of {:?}",
                    symbol, symbols
                )));
            };
            store.switch_symbol(known.as_str());
            *state
        }
        Command::Redraw | Command::Quit => *state,
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn symbols() -> Vec<String> {
        vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]
    }

    #[test]
    fn parses_keys_and_words() {
        assert_eq!("left".parse::<Command>().unwrap(), Command::Key(NavKey::Left));
        assert_eq!(" L ".parse::<Command>().unwrap(), Command::Key(NavKey::Right));
        assert_eq!("esc".parse::<Command>().unwrap(), Command::Key(NavKey::Escape));
        assert_eq!("today".parse::<Command>().unwrap(), Command::Today);
        assert_eq!("".parse::<Command>().unwrap(), Command::Redraw);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("view week".parse::<Command>().unwrap(), Command::View(ViewMode::Week));
        assert_eq!(
            "select 2024-01-02".parse::<Command>().unwrap(),
            Command::Select(date(2024, 1, 2))
        );
        assert_eq!("2024-01-02".parse::<Command>().unwrap(), Command::Select(date(2024, 1, 2)));
        assert_eq!("symbol ethusdt".parse::<Command>().unwrap(), Command::Symbol("ETHUSDT".into()));
        assert_eq!("bnbusdt".parse::<Command>().unwrap(), Command::Symbol("BNBUSDT".into()));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!("view hourly".parse::<Command>().is_err());
        assert!("select 2024-13-01".parse::<Command>().is_err());
        assert!("left right up".parse::<Command>().is_err());
        assert!("today please".parse::<Command>().is_err());
    }

    #[test]
    fn navigation_commands_move_the_state() {
        let today = date(2024, 6, 10);
        let mut store = SnapshotStore::new("BTCUSDT");
        let state = CalendarState::new(date(2024, 3, 2), ViewMode::Day);

        let prev = apply_command(&Command::Key(NavKey::Left), &state, &mut store, &symbols(), today).unwrap();
        assert_eq!(prev.month, date(2024, 2, 1));

        let back = apply_command(&Command::Today, &prev, &mut store, &symbols(), today).unwrap();
        assert_eq!(back.month, date(2024, 6, 1));

        let monthly = apply_command(&Command::View(ViewMode::Month), &back, &mut store, &symbols(), today).unwrap();
        assert_eq!(monthly.view_mode, ViewMode::Month);

        let picked = apply_command(&Command::Select(date(2024, 6, 3)), &monthly, &mut store, &symbols(), today).unwrap();
        assert_eq!(picked.selected, Some(date(2024, 6, 3)));
        assert_eq!(store.symbol(), "BTCUSDT");
    }

    #[test]
    fn symbol_switch_is_limited_to_the_configured_list() {
        let today = date(2024, 6, 10);
        let mut store = SnapshotStore::new("BTCUSDT");
        let state = CalendarState::new(today, ViewMode::Day);

        let same = apply_command(&Command::Symbol("ETHUSDT".into()), &state, &mut store, &symbols(), today).unwrap();
        assert_eq!(same, state);
        assert_eq!(store.symbol(), "ETHUSDT");

        assert!(apply_command(&Command::Symbol("DOGEUSDT".into()), &state, &mut store, &symbols(), today).is_err());
        assert_eq!(store.symbol(), "ETHUSDT");
    }
}
