use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("No data for {symbol}")]
    NoData { symbol: String },

    #[error("Insufficient history: need at least {required} bars, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Data loading error: {0}")]
    DataLoadError(String),

    #[error("CSV parse error: {0}")]
    CsvError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StrategyError>;
