//! Snapshot holder for fetched series.
//!
//! Each successful fetch becomes a new immutable [`Snapshot`] that replaces
//! the previous one in a single assignment. Fetches are tagged with a
//! generation; a result whose generation is no longer current (the symbol
//! changed while it was in flight) is dropped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::models::{DateIndex, Series};

/// Fetched data for one symbol plus its day index.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub symbol: String,
    pub series: Series,
    pub index: DateIndex,
    pub fetched_at: Instant,
}

impl Snapshot {
    pub fn new(symbol: impl Into<String>, series: Series, fetched_at: Instant) -> Self {
        let index = DateIndex::from_series(&series);
        Self { symbol: symbol.into(), series, index, fetched_at }
    }
}

/// Proof that a fetch was started; hand it back to `commit` or `abandon`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    symbol: String,
}

impl FetchTicket {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

pub struct SnapshotStore {
    symbol: String,
    generation: u64,
    in_flight: Option<u64>,
    current: Option<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), generation: 0, in_flight: None, current: None }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.clone()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True when there is no snapshot yet or it is at least `refresh` old.
    pub fn needs_refresh(&self, now: Instant, refresh: Duration) -> bool {
        match &self.current {
            None => true,
            Some(s) => now.saturating_duration_since(s.fetched_at) >= refresh,
        }
    }

    /// Starts a fetch unless one is already running or the snapshot is still
    /// fresh.
    pub fn try_begin_fetch(&mut self, now: Instant, refresh: Duration) -> Option<FetchTicket> {
        if self.in_flight.is_some() || !self.needs_refresh(now, refresh) {
            return None;
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        Some(FetchTicket { generation: self.generation, symbol: self.symbol.clone() })
    }

    /// Installs the result of `ticket`'s fetch. Returns `false` and drops the
    /// series when the ticket has been superseded.
    pub fn commit(&mut self, ticket: FetchTicket, series: Series, now: Instant) -> bool {
        if self.in_flight != Some(ticket.generation) {
            debug!("Discarding stale fetch for {} (gen {})", ticket.symbol, ticket.generation);
            return false;
        }
        self.in_flight = None;
        self.current = Some(Arc::new(Snapshot::new(ticket.symbol, series, now)));
        true
    }

    /// Ends a failed fetch. The previous snapshot, if any, stays visible.
    pub fn abandon(&mut self, ticket: FetchTicket) {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }
    }

    /// Switches symbol: the old snapshot is dropped and any in-flight fetch is
    /// orphaned.
    pub fn switch_symbol(&mut self, symbol: impl Into<String>) {
        let symbol = symbol.into();
        if symbol == self.symbol {
            return;
        }
        self.symbol = symbol;
        self.generation += 1;
        self.in_flight = None;
        self.current = None;
    }
}
