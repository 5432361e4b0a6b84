//! Binance REST kline source.
//!
//! `GET /api/v3/klines?symbol=..&interval=..&limit=..` answers with an array
//! of rows:
//!
//! ```text
//! [ openTime, "open", "high", "low", "close", "volume", closeTime, ... ]
//! ```
//!
//! Only the first six columns are used. Prices arrive as strings and are
//! parsed to `f64`; the open time (ms) becomes the bar's calendar day in the
//! configured UTC offset.

use std::future::Future;

use chrono::{FixedOffset, NaiveDate, TimeZone};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CalendarError, Result};
use crate::models::{Bar, Series};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com/api/v3";
pub const DEFAULT_INTERVAL: &str = "1d";
pub const DEFAULT_LIMIT: u16 = 90;
/// Largest `limit` the klines endpoint accepts.
pub const MAX_LIMIT: u16 = 1000;

/// Parameters of one kline fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineRequest {
    pub symbol: String,
    pub interval: String,
    pub limit: u16,
}

impl KlineRequest {
    pub fn daily(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), interval: DEFAULT_INTERVAL.to_string(), limit: DEFAULT_LIMIT }
    }
}

/// Anything that can produce a daily series for a symbol.
pub trait KlineSource {
    /// Fetches up to `request.limit` bars, ascending by date.
    fn fetch_klines(&self, request: &KlineRequest) -> impl Future<Output = Result<Series>> + Send;
}

/// Fetches and degrades any failure to an empty series.
pub async fn fetch_or_empty<S: KlineSource>(source: &S, request: &KlineRequest) -> Series {
    match source.fetch_klines(request).await {
        Ok(series) => series,
        Err(e) => {
            warn!("⚠️ Fetch for {} failed, showing no data: {}", request.symbol, e);
            Series::empty()
        }
    }
}

pub struct BinanceClient {
    client: Client,
    base_url: String,
    offset: FixedOffset,
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>, offset: FixedOffset) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, base_url: base_url.into(), offset })
    }

    fn klines_url(&self) -> String {
        format!("{}/klines", self.base_url.trim_end_matches('/'))
    }
}

impl KlineSource for BinanceClient {
    async fn fetch_klines(&self, request: &KlineRequest) -> Result<Series> {
        let limit = request.limit.to_string();
        let response = self
            .client
            .get(self.klines_url())
            .query(&[
                ("symbol", request.symbol.as_str()),
                ("interval", request.interval.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(CalendarError::Api { status: status.as_u16(), body });
        }

        let body = response.text().await?;
        let series = parse_klines(&body, &self.offset)?;
        debug!("Fetched {} bars for {} ({})", series.len(), request.symbol, request.interval);
        Ok(series)
    }
}

/// Builds a fixed offset from whole hours east of UTC.
pub fn utc_offset(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| CalendarError::Config(format!("UTC offset {}h out of range", hours)))
}

/// Parses a klines response body into a series.
pub fn parse_klines(body: &str, offset: &FixedOffset) -> Result<Series> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)
        .map_err(|e| CalendarError::MalformedResponse(format!("expected an array of kline rows: {}", e)))?;

    let bars = rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_kline_row(row, offset).map_err(|e| annotate(e, i)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Series::from_bars(bars))
}

/// Parses one `[openTime, open, high, low, close, volume, ...]` row.
pub fn parse_kline_row(row: &[Value], offset: &FixedOffset) -> Result<Bar> {
    if row.len() < 6 {
        return Err(CalendarError::MalformedResponse(format!(
            "kline row has {} fields, need at least 6",
            row.len()
        )));
    }

    let open_time = row[0]
        .as_i64()
        .ok_or_else(|| CalendarError::MalformedResponse("open time is not an integer".into()))?;

    Ok(Bar {
        date: bar_date(open_time, offset)?,
        open: number_field(&row[1], "open")?,
        high: number_field(&row[2], "high")?,
        low: number_field(&row[3], "low")?,
        close: number_field(&row[4], "close")?,
        volume: number_field(&row[5], "volume")?,
    })
}

/// Calendar day of a millisecond timestamp in `offset`.
pub fn bar_date(open_time_ms: i64, offset: &FixedOffset) -> Result<NaiveDate> {
    offset
        .timestamp_millis_opt(open_time_ms)
        .single()
        .map(|dt| dt.date_naive())
        .ok_or_else(|| CalendarError::MalformedResponse(format!("open time {} out of range", open_time_ms)))
}

fn number_field(value: &Value, name: &str) -> Result<f64> {
    match value {
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| CalendarError::MalformedResponse(format!("{} '{}' is not a number", name, s))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CalendarError::MalformedResponse(format!("{} is not representable", name))),
        other => Err(CalendarError::MalformedResponse(format!("{} has unexpected type: {}", name, other))),
    }
}

fn annotate(err: CalendarError, row: usize) -> CalendarError {
    match err {
        CalendarError::MalformedResponse(msg) => CalendarError::MalformedResponse(format!("row {}: {}", row, msg)),
        other => other,
    }
}
