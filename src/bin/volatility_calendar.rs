use tracing::{error, info};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

use volatility_calendar::config::CalendarConfig;
use volatility_calendar::run_dashboard;

/// Formats log timestamps in the system's local timezone instead of UTC.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

#[tokio::main]
async fn main() {
    // RUST_LOG controls the level; defaults to "info".
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(LocalTimer)
        .init();

    // Fail fast: nothing works without a valid config.
    let cfg = match CalendarConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("❌ Critical Error: Failed to load configuration: {}", e);
            return;
        }
    };

    info!("🚀 Starting volatility calendar for {}...", cfg.symbol);

    if let Err(e) = run_dashboard(&cfg).await {
        error!("❌ Dashboard stopped: {}", e);
    }
}
