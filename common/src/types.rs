use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLC bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

/// Trade direction (source labels were "buy"/"sell")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

/// How a simulated trade ended.
///
/// `StillOpenAtSeriesEnd` marks a trade whose resolution scan ran out of
/// bars: no balance change, no equity point, excluded from win/loss counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOutcome {
    WonByTarget,
    LostByStop,
    StillOpenAtSeriesEnd,
}

/// Record of one consumed signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub stop: f64,
    pub target: f64,
    pub outcome: TradeOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    pub pnl: f64,
}

/// Account balance after a settlement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub balance: f64,
}

/// Output of one simulation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Seed point at the start of the scan window, then one point per
    /// resolved trade, in resolution order.
    pub equity: Vec<EquityPoint>,
    pub wins: u32,
    pub losses: u32,
    pub unresolved: u32,
    pub trades: Vec<TradeRecord>,
}

impl SimulationResult {
    pub fn resolved(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        let resolved = self.resolved();
        if resolved == 0 {
            0.0
        } else {
            self.wins as f64 / resolved as f64 * 100.0
        }
    }
}

/// Risk-adjusted performance metrics, full precision.
///
/// Undefined values (zero elapsed time, zero return variance, no drawdown)
/// are NaN rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annual_return: f64,
    pub trades_per_year: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    pub trades: u32,
}

impl PerformanceMetrics {
    /// Reporting map: metric name to value, percentages scaled and everything
    /// rounded to 2 decimals. Internal fields keep full precision.
    pub fn report(&self) -> BTreeMap<&'static str, f64> {
        let mut map = BTreeMap::new();
        map.insert("Total Return (%)", round2(self.total_return * 100.0));
        map.insert("Annual Return (%)", round2(self.annual_return * 100.0));
        map.insert("Sharpe Ratio", round2(self.sharpe_ratio));
        map.insert("Max Drawdown (%)", round2(self.max_drawdown * 100.0));
        map.insert("Calmar Ratio", round2(self.calmar_ratio));
        map.insert("Trades", self.trades as f64);
        map
    }
}

/// Round to 2 decimal places; NaN passes through
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One instrument's evaluation, start to finish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub symbol: String,
    pub metrics: PerformanceMetrics,
    pub equity: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub wins: u32,
    pub losses: u32,
    pub unresolved: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub execution_time_ms: u64,
}

impl EvaluationResult {
    pub fn win_rate(&self) -> f64 {
        let resolved = self.wins + self.losses;
        if resolved == 0 {
            0.0
        } else {
            self.wins as f64 / resolved as f64 * 100.0
        }
    }
}

/// Named price series, as handed over by the acquisition side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.004), 2.0);
        assert_eq!(round2(2.0051), 2.01);
        assert_eq!(round2(-18.184), -18.18);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn test_report_keys() {
        let metrics = PerformanceMetrics {
            total_return: 0.02,
            annual_return: 0.1234567,
            trades_per_year: 12.0,
            sharpe_ratio: 1.456,
            max_drawdown: -0.1818,
            calmar_ratio: f64::NAN,
            trades: 3,
        };
        let report = metrics.report();

        assert_eq!(report["Total Return (%)"], 2.0);
        assert_eq!(report["Annual Return (%)"], 12.35);
        assert_eq!(report["Sharpe Ratio"], 1.46);
        assert_eq!(report["Max Drawdown (%)"], -18.18);
        assert!(report["Calmar Ratio"].is_nan());
        assert_eq!(report["Trades"], 3.0);
    }

    #[test]
    fn test_win_rate() {
        let result = SimulationResult {
            equity: vec![],
            wins: 3,
            losses: 1,
            unresolved: 2,
            trades: vec![],
        };
        assert_eq!(result.resolved(), 4);
        assert_eq!(result.win_rate(), 75.0);
    }
}
