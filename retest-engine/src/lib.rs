pub mod data;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod signals;
pub mod simulator;

pub use data::{generate_synthetic_bars, load_file, load_instrument};
pub use engine::{BacktestEngine, InstrumentReport};
pub use metrics::PerformanceAnalyzer;
pub use signals::SignalDetector;
pub use simulator::TradeSimulator;

// Re-export common types
pub use common::{
    Bar, Direction, EquityPoint, EvaluationResult, Instrument, PerformanceMetrics, Result,
    SimulationResult, StrategyError, StrategyParameters, TradeOutcome, TradeRecord,
};
