use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Malformed record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Unknown month token: {0}")]
    UnknownMonth(String),

    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),

    #[error("No lessons found in the whole week cycle")]
    NoLessons,

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
