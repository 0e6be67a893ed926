use common::{
    Bar, Direction, EquityPoint, Result, SimulationResult, StrategyError, StrategyParameters,
    TradeOutcome, TradeRecord,
};

use crate::indicators::{rolling_max, rolling_min};

/// Walks a labeled series and turns signals into simulated position outcomes
/// against a running account balance.
pub struct TradeSimulator {
    params: StrategyParameters,
}

impl TradeSimulator {
    pub fn new(params: &StrategyParameters) -> Self {
        Self {
            params: params.clone(),
        }
    }

    /// Consume signals sequentially against a running balance.
    ///
    /// At most one trade is open at a time: signals arriving while a prior
    /// trade is mid-resolution are not consumed, and scanning resumes at the
    /// bar after the resolution bar. Entry is the signal bar close, the stop
    /// the trailing-window extreme over the same window detection used, the
    /// target the stop distance scaled by `reward_risk`. The risk amount is
    /// fixed at entry. On each resolution bar the stop is checked before the
    /// target.
    ///
    /// A trade the series cannot resolve is `StillOpenAtSeriesEnd`: balance
    /// and equity curve are untouched, only the `unresolved` tally and the
    /// trade tape record it.
    pub fn run(&self, bars: &[Bar], signals: &[Option<Direction>]) -> Result<SimulationResult> {
        let lookback = self.params.lookback;
        let required = self.params.min_bars();

        if bars.len() < required {
            return Err(StrategyError::InsufficientHistory {
                required,
                actual: bars.len(),
            });
        }
        if signals.len() != bars.len() {
            return Err(StrategyError::InvalidParameter(format!(
                "signal map length {} does not match series length {}",
                signals.len(),
                bars.len()
            )));
        }

        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let window_highs = rolling_max(&highs, lookback);
        let window_lows = rolling_min(&lows, lookback);

        let mut balance = self.params.initial_balance;
        let mut equity = vec![EquityPoint {
            timestamp: bars[lookback].timestamp,
            balance,
        }];
        let mut wins = 0u32;
        let mut losses = 0u32;
        let mut unresolved = 0u32;
        let mut trades: Vec<TradeRecord> = Vec::new();

        let mut i = lookback + 1;
        while i < bars.len() {
            let Some(direction) = signals[i] else {
                i += 1;
                continue;
            };
            let (Some(window_high), Some(window_low)) = (window_highs[i], window_lows[i]) else {
                i += 1;
                continue;
            };

            let entry = bars[i].close;
            let stop = match direction {
                Direction::Long => window_low,
                Direction::Short => window_high,
            };
            let target = match direction {
                Direction::Long => entry + (entry - stop) * self.params.reward_risk,
                Direction::Short => entry - (stop - entry) * self.params.reward_risk,
            };
            let risk = balance * self.params.risk_per_trade;

            let mut record = TradeRecord {
                direction,
                entry_index: i,
                entry_time: bars[i].timestamp,
                entry_price: entry,
                stop,
                target,
                outcome: TradeOutcome::StillOpenAtSeriesEnd,
                exit_time: None,
                exit_price: None,
                pnl: 0.0,
            };

            let mut next = bars.len();
            for j in i + 1..bars.len() {
                let bar = &bars[j];
                let (stopped, reached_target) = match direction {
                    Direction::Long => (bar.low <= stop, bar.close >= target),
                    Direction::Short => (bar.high >= stop, bar.close <= target),
                };

                // Stop has priority when both fire on the same bar
                if stopped {
                    balance -= risk;
                    losses += 1;
                    record.outcome = TradeOutcome::LostByStop;
                    record.exit_price = Some(stop);
                    record.pnl = -risk;
                } else if reached_target {
                    balance += risk * self.params.reward_risk;
                    wins += 1;
                    record.outcome = TradeOutcome::WonByTarget;
                    record.exit_price = Some(bar.close);
                    record.pnl = risk * self.params.reward_risk;
                } else {
                    continue;
                }

                record.exit_time = Some(bar.timestamp);
                equity.push(EquityPoint {
                    timestamp: bar.timestamp,
                    balance,
                });
                next = j + 1;
                break;
            }

            if record.outcome == TradeOutcome::StillOpenAtSeriesEnd {
                unresolved += 1;
            }
            trades.push(record);
            i = next;
        }

        Ok(SimulationResult {
            equity,
            wins,
            losses,
            unresolved,
            trades,
        })
    }
}
