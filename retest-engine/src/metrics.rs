use common::{EquityPoint, PerformanceMetrics, Result, StrategyError};

const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;

/// Derives risk-adjusted performance metrics from an equity trajectory
pub struct PerformanceAnalyzer;

impl PerformanceAnalyzer {
    /// Compute the full metric set.
    ///
    /// Degenerate inputs make individual metrics NaN without aborting the
    /// rest: zero elapsed time undefines the annualized figures, zero return
    /// variance undefines the Sharpe ratio, and the Calmar ratio exists only
    /// when there is a drawdown.
    pub fn analyze(equity: &[EquityPoint]) -> Result<PerformanceMetrics> {
        if equity.is_empty() {
            return Err(StrategyError::InvalidParameter(
                "equity curve is empty".to_string(),
            ));
        }

        let returns = Self::step_returns(equity);

        let first = equity[0].balance;
        let last = equity[equity.len() - 1].balance;
        let total_return = if first != 0.0 { last / first - 1.0 } else { 0.0 };

        let years = Self::elapsed_years(equity);
        let annual_return = if years > 0.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            f64::NAN
        };
        let trades_per_year = if years > 0.0 {
            returns.len() as f64 / years
        } else {
            f64::NAN
        };

        let sharpe_ratio = Self::sharpe_ratio(&returns, trades_per_year);
        let max_drawdown = Self::max_drawdown(equity);
        let calmar_ratio = if max_drawdown < 0.0 {
            annual_return / max_drawdown.abs()
        } else {
            f64::NAN
        };

        Ok(PerformanceMetrics {
            total_return,
            annual_return,
            trades_per_year,
            sharpe_ratio,
            max_drawdown,
            calmar_ratio,
            trades: returns.len() as u32,
        })
    }

    /// Per-step returns between consecutive settlements
    fn step_returns(equity: &[EquityPoint]) -> Vec<f64> {
        equity
            .windows(2)
            .map(|w| {
                let prev = w[0].balance;
                if prev != 0.0 {
                    w[1].balance / prev - 1.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn elapsed_years(equity: &[EquityPoint]) -> f64 {
        let span = equity[equity.len() - 1].timestamp - equity[0].timestamp;
        span.num_seconds() as f64 / SECONDS_PER_YEAR
    }

    /// Mean step return over its sample (n-1) standard deviation, scaled by
    /// the square root of the trade frequency
    fn sharpe_ratio(returns: &[f64], trades_per_year: f64) -> f64 {
        if returns.len() < 2 {
            return f64::NAN;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let stdev = variance.sqrt();

        if stdev > 0.0 {
            mean / stdev * trades_per_year.sqrt()
        } else {
            f64::NAN
        }
    }

    /// Largest decline from the running equity peak, as a fraction <= 0
    fn max_drawdown(equity: &[EquityPoint]) -> f64 {
        let mut peak = equity[0].balance;
        let mut max_dd = 0.0f64;

        for point in equity {
            if point.balance > peak {
                peak = point.balance;
            }
            if peak > 0.0 {
                let drawdown = (point.balance - peak) / peak;
                if drawdown < max_dd {
                    max_dd = drawdown;
                }
            }
        }

        max_dd
    }
}
