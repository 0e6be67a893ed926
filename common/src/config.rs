use serde::{Deserialize, Serialize};

use crate::error::{Result, StrategyError};

/// Breakout-and-retest strategy parameters.
///
/// One explicit structure passed into each component entry point; detection
/// and simulation share the same trailing window definition through
/// `lookback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyParameters {
    /// Bars in the trailing zone window
    pub lookback: usize,
    /// Bars to wait for a retest after a breakout
    pub retest_lookahead: usize,
    /// Starting account balance
    pub initial_balance: f64,
    /// Fraction of the current balance risked per trade, in (0, 1]
    pub risk_per_trade: f64,
    /// Reward:risk multiple applied to the stop distance
    pub reward_risk: f64,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Self {
            lookback: 40,
            retest_lookahead: 20,
            initial_balance: 10_000.0,
            risk_per_trade: 0.01,
            reward_risk: 2.0,
        }
    }
}

impl StrategyParameters {
    /// Shortest series detection and simulation can work with
    pub fn min_bars(&self) -> usize {
        self.lookback + self.retest_lookahead + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookback == 0 {
            return Err(StrategyError::InvalidParameter(
                "lookback must be greater than 0".to_string(),
            ));
        }
        if self.retest_lookahead == 0 {
            return Err(StrategyError::InvalidParameter(
                "retest_lookahead must be greater than 0".to_string(),
            ));
        }
        if !(self.initial_balance > 0.0) {
            return Err(StrategyError::InvalidParameter(
                "initial_balance must be positive".to_string(),
            ));
        }
        if !(self.risk_per_trade > 0.0 && self.risk_per_trade <= 1.0) {
            return Err(StrategyError::InvalidParameter(
                "risk_per_trade must be in (0, 1]".to_string(),
            ));
        }
        if !(self.reward_risk > 0.0) {
            return Err(StrategyError::InvalidParameter(
                "reward_risk must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.initial_balance = balance;
        self
    }

    pub fn with_windows(mut self, lookback: usize, retest_lookahead: usize) -> Self {
        self.lookback = lookback;
        self.retest_lookahead = retest_lookahead;
        self
    }

    pub fn with_risk(mut self, risk_per_trade: f64, reward_risk: f64) -> Self {
        self.risk_per_trade = risk_per_trade;
        self.reward_risk = reward_risk;
        self
    }
}
