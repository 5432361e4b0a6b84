use thiserror::Error;

/// Errors raised by the data source and configuration layers.
///
/// Nothing in the calendar/aggregation core returns these; they stop at the
/// refresh loop, where a failed fetch degrades to an empty series.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// Transport failure (DNS, timeout, connection reset, undecodable body).
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The exchange answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A kline row could not be turned into a bar.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
