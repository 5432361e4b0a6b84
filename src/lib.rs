// src/lib.rs

pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod indicators;
pub mod input;
pub mod models;
pub mod report;
pub mod source;
pub mod store;
pub mod window;

use crate::calendar::navigation::{follow_today, select_date, CalendarState};
use crate::config::CalendarConfig;
use crate::dashboard::DashboardView;
use crate::error::Result;
use crate::input::{apply_command, Command};
use crate::source::{BinanceClient, KlineSource};
use crate::store::SnapshotStore;

use chrono::{FixedOffset, NaiveDate, Utc};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Runs one refresh step: starts a fetch if the store wants one and installs
/// the result. Returns `true` when a new snapshot was committed.
///
/// The request is built for the symbol the fetch ticket was issued under, so
/// the snapshot is always labelled with the symbol that was fetched. A failed
/// fetch is logged and leaves the previous snapshot (or the empty state) in
/// place.
pub async fn refresh<S: KlineSource>(source: &S, store: &mut SnapshotStore, cfg: &CalendarConfig) -> bool {
    let Some(ticket) = store.try_begin_fetch(Instant::now(), cfg.refresh_interval()) else {
        debug!("Snapshot for {} still fresh, skipping fetch", store.symbol());
        return false;
    };
    let request = cfg.request_for(ticket.symbol());

    match source.fetch_klines(&request).await {
        Ok(series) => {
            let (bars, first, last) = (series.len(), series.first_date(), series.last_date());
            let applied = store.commit(ticket, series, Instant::now());
            if applied {
                info!("✅ Loaded {} bars for {} ({:?} .. {:?})", bars, request.symbol, first, last);
            }
            applied
        }
        Err(e) => {
            warn!("⚠️ Fetch for {} failed, keeping previous data: {}", request.symbol, e);
            store.abandon(ticket);
            false
        }
    }
}

/// Today's calendar day in the configured offset.
pub fn today_in(offset: &FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(offset).date_naive()
}

/// Initial navigation state from config: start month, view mode, selection.
pub fn initial_state(cfg: &CalendarConfig, today: NaiveDate) -> Result<CalendarState> {
    let month = cfg.start_month()?.unwrap_or(today);
    let mut state = CalendarState::new(month, cfg.view_mode);
    if let Some(selected) = cfg.selected()? {
        state = select_date(&state, selected);
    }
    Ok(state)
}

/// Main loop: fetch on schedule, rebuild the view from the current snapshot
/// and print it. Stdin lines (see [`input::Command`]) navigate the calendar,
/// switch symbol or quit; the view is redrawn after each one. When stdin
/// closes the dashboard keeps refreshing without input.
pub async fn run_dashboard(cfg: &CalendarConfig) -> Result<()> {
    let offset = cfg.offset()?;
    let client = BinanceClient::new(cfg.base_url.clone(), offset)?;
    let mut store = SnapshotStore::new(cfg.symbol.clone());
    let symbols = cfg.selectable_symbols();
    let mut today = today_in(&offset);
    let mut state = initial_state(cfg, today)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    info!(
        "✅ Watching {} ({}, limit {}, refresh {}s, symbols: {:?})",
        cfg.symbol, cfg.interval, cfg.limit, cfg.refresh_secs, symbols
    );
    info!("⌨️ Commands: left/right, up/down, enter, esc, today, view <mode>, select <date>, symbol <name>, quit");

    loop {
        let now = today_in(&offset);
        if now != today {
            state = follow_today(&state, today, now);
            today = now;
        }

        refresh(&client, &mut store, cfg).await;

        let snapshot = store.current();
        let view = DashboardView::from_snapshot(store.symbol(), snapshot.as_deref(), &state, today, cfg.nearby_radius);
        println!("{}", report::render(&view));

        tokio::select! {
            _ = sleep(cfg.refresh_interval()) => {}
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => match line.parse::<Command>() {
                    Ok(Command::Quit) => {
                        info!("👋 Quit requested, stopping dashboard");
                        return Ok(());
                    }
                    Ok(cmd) => match apply_command(&cmd, &state, &mut store, &symbols, today) {
                        Ok(next) => state = next,
                        Err(e) => warn!("⚠️ Ignoring command: {}", e),
                    },
                    Err(e) => warn!("⚠️ Ignoring input: {}", e),
                },
                Ok(None) => {
                    debug!("Stdin closed, continuing without input");
                    input_open = false;
                }
                Err(e) => {
                    warn!("⚠️ Stdin read failed, continuing without input: {}", e);
                    input_open = false;
                }
            },
        }
    }
}
