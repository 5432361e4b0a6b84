use std::fmt;

/// Level below which a day counts as calm, in percent.
pub const LOW_THRESHOLD_PCT: f64 = 2.0;
/// Level at or above which a day counts as volatile, in percent.
pub const HIGH_THRESHOLD_PCT: f64 = 5.0;

/// Cell colour for a day without data.
pub const NEUTRAL_COLOR: &str = "white";
/// Cell colour that overrides the volatility colour on today's date.
pub const TODAY_COLOR: &str = "lightblue";

/// Discrete intraday volatility bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

impl VolatilityLevel {
    /// Buckets a volatility percentage. Boundaries belong to the upper tier.
    pub fn from_percent(pct: f64) -> Self {
        if pct.is_nan() || pct < LOW_THRESHOLD_PCT {
            VolatilityLevel::Low
        } else if pct < HIGH_THRESHOLD_PCT {
            VolatilityLevel::Medium
        } else {
            VolatilityLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityLevel::Low => "low",
            VolatilityLevel::Medium => "medium",
            VolatilityLevel::High => "high",
        }
    }

    /// Terminal heatmap glyph.
    pub fn icon(&self) -> &'static str {
        match self {
            VolatilityLevel::Low => "🟢",
            VolatilityLevel::Medium => "🟡",
            VolatilityLevel::High => "🔴",
        }
    }
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intraday range relative to the open: `(high - low) / open * 100`.
///
/// Returns `0.0` when any input is zero or NaN; a missing price reads as
/// "no movement" rather than an error.
pub fn volatility_percent(open: f64, high: f64, low: f64) -> f64 {
    if is_missing(open) || is_missing(high) || is_missing(low) {
        return 0.0;
    }
    (high - low) * 100.0 / open
}

/// Classifies a day's volatility.
///
/// A zero open with a positive range is an unbounded move and lands in
/// `High`. Every other degenerate input goes through the guarded
/// [`volatility_percent`] and reads as `Low`.
pub fn volatility_level(open: f64, high: f64, low: f64) -> VolatilityLevel {
    if open == 0.0 && high - low > 0.0 {
        return VolatilityLevel::High;
    }
    VolatilityLevel::from_percent(volatility_percent(open, high, low))
}

/// Maps a level to its fixed colour token; no level maps to the neutral one.
pub fn volatility_color(level: Option<VolatilityLevel>) -> &'static str {
    match level {
        Some(VolatilityLevel::Low) => "#d4edda",
        Some(VolatilityLevel::Medium) => "#fff3cd",
        Some(VolatilityLevel::High) => "#f8d7da",
        None => NEUTRAL_COLOR,
    }
}

fn is_missing(v: f64) -> bool {
    v == 0.0 || v.is_nan()
}
