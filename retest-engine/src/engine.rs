use std::time::Instant;

use common::{Bar, EvaluationResult, Instrument, Result, StrategyError, StrategyParameters};
use rayon::prelude::*;

use crate::metrics::PerformanceAnalyzer;
use crate::signals::SignalDetector;
use crate::simulator::TradeSimulator;

/// Per-instrument evaluation outcome.
///
/// Failures stay isolated here as explicit values; one bad instrument never
/// aborts the evaluation of the rest.
#[derive(Debug)]
pub struct InstrumentReport {
    pub symbol: String,
    pub outcome: Result<EvaluationResult>,
}

/// Breakout-and-retest backtest pipeline: detect, simulate, analyze
pub struct BacktestEngine {
    params: StrategyParameters,
}

impl BacktestEngine {
    pub fn new(params: StrategyParameters) -> Self {
        Self { params }
    }

    /// Run the full pipeline over one instrument's series
    pub fn run(&self, symbol: &str, bars: &[Bar]) -> Result<EvaluationResult> {
        let start_time = Instant::now();

        self.params.validate()?;
        if bars.is_empty() {
            return Err(StrategyError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let detector = SignalDetector::new(&self.params);
        let signals = detector.detect(bars)?;

        let simulator = TradeSimulator::new(&self.params);
        let simulation = simulator.run(bars, &signals)?;

        let metrics = PerformanceAnalyzer::analyze(&simulation.equity)?;

        let final_balance = simulation
            .equity
            .last()
            .map(|p| p.balance)
            .unwrap_or(self.params.initial_balance);

        Ok(EvaluationResult {
            symbol: symbol.to_string(),
            metrics,
            wins: simulation.wins,
            losses: simulation.losses,
            unresolved: simulation.unresolved,
            equity: simulation.equity,
            trades: simulation.trades,
            start_time: bars[0].timestamp,
            end_time: bars[bars.len() - 1].timestamp,
            initial_balance: self.params.initial_balance,
            final_balance,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Evaluate a list of instruments, one isolated pipeline run each.
    ///
    /// Instruments are independent, so runs go wide across the thread pool;
    /// report order matches input order.
    pub fn run_all(&self, instruments: &[Instrument]) -> Vec<InstrumentReport> {
        instruments
            .par_iter()
            .map(|instrument| InstrumentReport {
                symbol: instrument.symbol.clone(),
                outcome: self.run(&instrument.symbol, &instrument.bars),
            })
            .collect()
    }
}
