use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate};
use serde::Deserialize;

use crate::calendar::navigation::ViewMode;
use crate::error::{CalendarError, Result};
use crate::source::{self, KlineRequest, DEFAULT_BASE_URL, DEFAULT_INTERVAL, DEFAULT_LIMIT, MAX_LIMIT};
use crate::window::DEFAULT_RADIUS;

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Deserialize, Clone)]
pub struct CalendarConfig {
    /// Symbol shown at startup.
    pub symbol: String,

    /// Symbols the user can switch between.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_limit")]
    pub limit: u16,

    /// Seconds between re-fetches.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Hours east of UTC used to turn kline open times into calendar days.
    #[serde(default)]
    pub utc_offset_hours: i32,

    #[serde(default = "default_radius")]
    pub nearby_radius: usize,

    #[serde(default)]
    pub view_mode: ViewMode,

    /// Month to open on (`YYYY-MM`); defaults to today's month.
    #[serde(default)]
    pub month: Option<String>,

    /// Day whose detail panel is shown (`YYYY-MM-DD`).
    #[serde(default)]
    pub selected_date: Option<String>,
}

fn default_symbols() -> Vec<String> {
    ["BTCUSDT", "ETHUSDT", "BNBUSDT"].iter().map(|s| s.to_string()).collect()
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

fn default_limit() -> u16 {
    DEFAULT_LIMIT
}

fn default_refresh_secs() -> u64 {
    60
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_radius() -> usize {
    DEFAULT_RADIUS
}

impl CalendarConfig {
    /// Loads configuration from `config.yaml` in the current working directory.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml_content = fs::read_to_string(path).map_err(|e| {
            CalendarError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml_content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: CalendarConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(CalendarError::Config("symbol in config.yaml is empty".into()));
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(CalendarError::Config(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, self.limit
            )));
        }
        if self.refresh_secs == 0 {
            return Err(CalendarError::Config("refresh_secs must be positive".into()));
        }
        self.offset()?;
        self.start_month()?;
        self.selected()?;
        Ok(())
    }

    pub fn request_for(&self, symbol: &str) -> KlineRequest {
        KlineRequest { symbol: symbol.to_string(), interval: self.interval.clone(), limit: self.limit }
    }

    /// Symbols the running dashboard accepts: the configured list, with the
    /// startup symbol first when the list leaves it out.
    pub fn selectable_symbols(&self) -> Vec<String> {
        let mut symbols = self.symbols.clone();
        if !symbols.iter().any(|s| s.eq_ignore_ascii_case(&self.symbol)) {
            symbols.insert(0, self.symbol.clone());
        }
        symbols
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        source::utc_offset(self.utc_offset_hours)
    }

    /// First day of the configured start month, if one is set.
    pub fn start_month(&self) -> Result<Option<NaiveDate>> {
        self.month
            .as_deref()
            .map(|m| {
                NaiveDate::parse_from_str(&format!("{}-01", m.trim()), "%Y-%m-%d")
                    .map_err(|_| CalendarError::Config(format!("month '{}' is not YYYY-MM", m)))
            })
            .transpose()
    }

    pub fn selected(&self) -> Result<Option<NaiveDate>> {
        self.selected_date
            .as_deref()
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                    .map_err(|_| CalendarError::Config(format!("selected_date '{}' is not YYYY-MM-DD", d)))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = CalendarConfig::from_yaml_str("symbol: BTCUSDT\n").unwrap();
        assert_eq!(cfg.interval, "1d");
        assert_eq!(cfg.limit, 90);
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(60));
        assert_eq!(cfg.symbols, vec!["BTCUSDT", "ETHUSDT", "BNBUSDT"]);
        assert_eq!(cfg.nearby_radius, 3);
        assert_eq!(cfg.view_mode, ViewMode::Day);
        assert_eq!(cfg.start_month().unwrap(), None);
        assert_eq!(cfg.request_for(&cfg.symbol), KlineRequest::daily("BTCUSDT"));
    }

    #[test]
    fn full_config_parses() {
        let yaml = r#"
symbol: ETHUSDT
symbols: [ETHUSDT, SOLUSDT]
interval: 1d
limit: 180
refresh_secs: 30
base_url: http://localhost:9000/api/v3
utc_offset_hours: 8
nearby_radius: 5
view_mode: month
month: "2024-02"
selected_date: "2024-02-14"
"#;
        let cfg = CalendarConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.limit, 180);
        assert_eq!(cfg.view_mode, ViewMode::Month);
        assert_eq!(cfg.start_month().unwrap(), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(cfg.selected().unwrap(), NaiveDate::from_ymd_opt(2024, 2, 14));
        assert_eq!(cfg.offset().unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(cfg.request_for("SOLUSDT").symbol, "SOLUSDT");
        assert_eq!(cfg.selectable_symbols(), vec!["ETHUSDT", "SOLUSDT"]);
    }

    #[test]
    fn startup_symbol_is_always_selectable() {
        let cfg = CalendarConfig::from_yaml_str("symbol: XRPUSDT
symbols: [BTCUSDT]
").unwrap();
        assert_eq!(cfg.selectable_symbols(), vec!["XRPUSDT", "BTCUSDT"]);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(CalendarConfig::from_yaml_str("symbol: ''\n").is_err());
        assert!(CalendarConfig::from_yaml_str("symbol: BTCUSDT\nlimit: 0\n").is_err());
        assert!(CalendarConfig::from_yaml_str("symbol: BTCUSDT\nlimit: 5000\n").is_err());
        assert!(CalendarConfig::from_yaml_str("symbol: BTCUSDT\nrefresh_secs: 0\n").is_err());
        assert!(CalendarConfig::from_yaml_str("symbol: BTCUSDT\nmonth: March\n").is_err());
        assert!(CalendarConfig::from_yaml_str("symbol: BTCUSDT\nutc_offset_hours: 99\n").is_err());
        assert!(matches!(
            CalendarConfig::from_yaml_str("limit: 10\n"),
            Err(CalendarError::Yaml(_))
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(matches!(
            CalendarConfig::load_from("/definitely/not/here/config.yaml"),
            Err(CalendarError::Config(_))
        ));
    }
}
