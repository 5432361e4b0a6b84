//! Plain-text rendering of a [`DashboardView`] for the terminal.

use chrono::{Datelike, NaiveDate};

use crate::calendar::navigation::ViewMode;
use crate::dashboard::DashboardView;
use crate::indicators::aggregate::PeriodSummary;
use crate::window::DayDetail;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const NO_DATA_ICON: &str = "⚪";

/// Renders the active view, followed by the detail panel when a day with
/// data is selected.
pub fn render(view: &DashboardView) -> String {
    let mut report = format!(
        "📅 *{} | {}* ({})\n",
        view.symbol,
        view.grid.month_start().format("%B %Y"),
        view.state.view_mode
    );

    if !view.has_data() {
        report.push_str("   (No market data loaded)\n");
    }

    match view.state.view_mode {
        ViewMode::Day => report.push_str(&render_day_grid(view)),
        ViewMode::Week => report.push_str(&render_weekly(view)),
        ViewMode::Month => report.push_str(&render_monthly(view)),
    }

    if let Some(detail) = &view.detail {
        report.push('\n');
        report.push_str(&render_detail(detail));
    }
    report
}

/// 6×7 heatmap. `*` marks today, `.` marks days outside the month.
pub fn render_day_grid(view: &DashboardView) -> String {
    let mut out = String::from("```\n");
    for name in WEEKDAYS {
        out.push_str(&format!("{:<7}", name));
    }
    out.push('\n');

    for week in view.cells.chunks(7) {
        for cell in week {
            let icon = cell.level.map(|l| l.icon()).unwrap_or(NO_DATA_ICON);
            let mark = if cell.is_today {
                '*'
            } else if !cell.is_current_month {
                '.'
            } else {
                ' '
            };
            out.push_str(&format!("{}{:>3}{} ", icon, cell.date.day(), mark));
        }
        out.push('\n');
    }
    out.push_str("```\n🟢 Low  🟡 Medium  🔴 High Volatility\n");
    out
}

pub fn render_weekly(view: &DashboardView) -> String {
    let mut out = String::from("*Weekly Summary (Avg Volatility + Total Volume + Performance)*\n");
    for row in &view.rows {
        out.push_str(&format!(
            "Week {}: {} - {} | Volatility: {:.2}% | Volume: {} | Perf: {}\n",
            row.row + 1,
            short_date(row.first_date),
            short_date(row.last_date),
            row.summary.avg_volatility,
            group_thousands(row.summary.total_volume),
            fmt_perf(row.summary.performance),
        ));
    }
    if !view.weekly.is_empty() {
        out.push_str("\n*ISO weeks in series*\n");
        out.push_str(&render_periods(&view.weekly));
    }
    out
}

pub fn render_monthly(view: &DashboardView) -> String {
    let s = &view.grid_summary;
    let mut out = format!(
        "*Monthly Summary (Volatility + Liquidity + Performance)*\n\
        > Avg Volatility: {:.2}%\n\
        > Total Volume: {}\n\
        > Monthly Performance: {}\n",
        s.avg_volatility,
        group_thousands(s.total_volume),
        fmt_perf(s.performance),
    );
    if !view.monthly.is_empty() {
        out.push_str("\n*Months in series*\n");
        out.push_str(&render_periods(&view.monthly));
    }
    out
}

pub fn render_periods(periods: &[PeriodSummary]) -> String {
    let mut out = String::new();
    for p in periods {
        out.push_str(&format!(
            "{:<9} {} - {} | O {:.2} H {:.2} L {:.2} C {:.2} | Vol {} | Avg Volatility {:.2}% | Perf {}\n",
            p.period,
            short_date(p.start_date),
            short_date(p.end_date),
            p.open,
            p.high,
            p.low,
            p.close,
            group_thousands(p.volume),
            p.avg_volatility_percent,
            fmt_perf(p.performance),
        ));
    }
    out
}

/// Selected-day panel with an ASCII volume / volatility trend.
pub fn render_detail(detail: &DayDetail) -> String {
    let b = &detail.bar;
    let arrow = match detail.performance {
        Some(p) if p >= 0.0 => "📈",
        Some(_) => "📉",
        None => "➡️",
    };

    let mut out = format!(
        "*{}*\n\
        > Open: `{:.2}`  High: `{:.2}`  Low: `{:.2}`  Close: `{:.2}`\n\
        > Volume: `{}`\n\
        > {} Daily Performance: {}\n\
        > Intraday Volatility: {:.2}%\n",
        b.date.format("%B %-d, %Y"),
        b.open,
        b.high,
        b.low,
        b.close,
        group_thousands(b.volume),
        arrow,
        fmt_perf(detail.performance),
        detail.intraday_volatility,
    );

    if detail.trend.is_empty() {
        return out;
    }

    let max_volume = detail.trend.iter().map(|t| t.volume).fold(0.0_f64, f64::max);
    out.push_str("```\n");
    for t in &detail.trend {
        // 20 chars for the busiest day in the window
        let bar_len = if max_volume > 0.0 { (t.volume / max_volume * 20.0).round() as usize } else { 0 };
        let marker = if t.date == b.date { '>' } else { ' ' };
        out.push_str(&format!(
            "{}{:<7} vol {:>6.2}% {}\n",
            marker,
            short_date(t.date),
            t.volatility_percent,
            "█".repeat(bar_len),
        ));
    }
    out.push_str("```");
    out
}

fn short_date(d: NaiveDate) -> String {
    d.format("%b %-d").to_string()
}

fn fmt_perf(perf: Option<f64>) -> String {
    match perf {
        Some(p) if p > 0.0 => format!("↑ {:.2}%", p),
        Some(p) if p < 0.0 => format!("↓ {:.2}%", p.abs()),
        Some(_) => "0.00%".to_string(),
        None => "n/a".to_string(),
    }
}

/// `1234567.8` → `1,234,567.8`; fractional part trimmed to 2 places.
pub fn group_thousands(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let text = format!("{:.2}", v.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // a value that rounds to zero prints unsigned
    let rounds_to_zero = text.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if v < 0.0 && !rounds_to_zero { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}
