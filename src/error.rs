use thiserror::Error;

#[derive(Error, Debug)]
pub enum RciError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Insufficient data: need {needed} samples, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Malformed event on line {line}: {message}")]
    MalformedEvent { line: usize, message: String },

    #[error("Record delivery failed: {0}")]
    Delivery(String),

    #[error("{0} queue disconnected")]
    Disconnected(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RciError>;
