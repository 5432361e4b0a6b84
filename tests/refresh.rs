//! Refresh loop behaviour against an in-memory kline source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;

use volatility_calendar::calendar::navigation::ViewMode;
use volatility_calendar::config::CalendarConfig;
use volatility_calendar::error::{CalendarError, Result};
use volatility_calendar::models::{Bar, Series};
use volatility_calendar::source::{fetch_or_empty, KlineRequest, KlineSource};
use volatility_calendar::store::SnapshotStore;
use volatility_calendar::{initial_state, refresh};

struct StubSource {
    bars: Vec<Bar>,
    fail: bool,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl StubSource {
    fn ok(bars: Vec<Bar>) -> Self {
        Self { bars, fail: false, calls: AtomicUsize::new(0), requested: Mutex::new(Vec::new()) }
    }

    fn failing() -> Self {
        Self { bars: Vec::new(), fail: true, calls: AtomicUsize::new(0), requested: Mutex::new(Vec::new()) }
    }
}

impl KlineSource for StubSource {
    async fn fetch_klines(&self, request: &KlineRequest) -> Result<Series> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(request.symbol.clone());
        if self.fail {
            return Err(CalendarError::MalformedResponse("stub failure".into()));
        }
        Ok(Series::from_bars(self.bars.iter().take(request.limit as usize).copied().collect()))
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bars() -> Vec<Bar> {
    vec![
        Bar::new(date(2024, 1, 2), 105.0, 108.0, 102.0, 107.0, 1500.0),
        Bar::new(date(2024, 1, 1), 100.0, 110.0, 95.0, 105.0, 1000.0),
    ]
}

fn config() -> CalendarConfig {
    CalendarConfig::from_yaml_str("symbol: BTCUSDT\nrefresh_secs: 3600\n").unwrap()
}

#[tokio::test]
async fn refresh_installs_snapshot_once_per_interval() {
    let cfg = config();
    let source = StubSource::ok(bars());
    let mut store = SnapshotStore::new("BTCUSDT");

    assert!(refresh(&source, &mut store, &cfg).await);
    let snap = store.current().unwrap();
    assert_eq!(snap.series.len(), 2);
    assert_eq!(snap.series.first_date(), Some(date(2024, 1, 1)));
    assert!(snap.index.contains(date(2024, 1, 2)));

    // still fresh: no second network call
    assert!(!refresh(&source, &mut store, &cfg).await);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_refresh_leaves_empty_state() {
    let cfg = config();
    let source = StubSource::failing();
    let mut store = SnapshotStore::new("BTCUSDT");

    assert!(!refresh(&source, &mut store, &cfg).await);
    assert!(store.current().is_none());
    assert!(!store.is_fetching());
}

#[tokio::test]
async fn switched_symbol_is_the_one_fetched() {
    let cfg = config();
    let source = StubSource::ok(bars());
    let mut store = SnapshotStore::new("BTCUSDT");

    assert!(refresh(&source, &mut store, &cfg).await);
    store.switch_symbol("ETHUSDT");
    assert!(store.current().is_none());

    // the old snapshot is gone, so this fetches straight away
    assert!(refresh(&source, &mut store, &cfg).await);
    assert_eq!(*source.requested.lock().unwrap(), vec!["BTCUSDT", "ETHUSDT"]);
    assert_eq!(store.current().unwrap().symbol, "ETHUSDT");
}

#[tokio::test]
async fn fetch_or_empty_degrades_errors() {
    let req = KlineRequest::daily("BTCUSDT");
    assert!(fetch_or_empty(&StubSource::failing(), &req).await.is_empty());
    assert_eq!(fetch_or_empty(&StubSource::ok(bars()), &req).await.len(), 2);

    let limited = KlineRequest { limit: 1, ..req };
    assert_eq!(fetch_or_empty(&StubSource::ok(bars()), &limited).await.len(), 1);
}

#[test]
fn initial_state_follows_config() {
    let cfg = CalendarConfig::from_yaml_str(
        "symbol: BTCUSDT\nview_mode: week\nmonth: \"2024-01\"\nselected_date: \"2024-01-02\"\n",
    )
    .unwrap();
    let state = initial_state(&cfg, date(2026, 10, 18)).unwrap();
    assert_eq!(state.month, date(2024, 1, 1));
    assert_eq!(state.view_mode, ViewMode::Week);
    assert_eq!(state.selected, Some(date(2024, 1, 2)));

    let state = initial_state(&config(), date(2026, 10, 18)).unwrap();
    assert_eq!(state.month, date(2026, 10, 1));
    assert_eq!(state.selected, None);
}
