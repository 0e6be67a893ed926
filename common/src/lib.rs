pub mod config;
pub mod error;
pub mod types;

pub use config::StrategyParameters;
pub use error::{Result, StrategyError};
pub use types::*;
