use common::{Bar, Direction, Result, StrategyError, StrategyParameters};

use crate::indicators::{rolling_max, rolling_min};

/// Breakout-and-retest signal detector
pub struct SignalDetector {
    params: StrategyParameters,
}

impl SignalDetector {
    pub fn new(params: &StrategyParameters) -> Self {
        Self {
            params: params.clone(),
        }
    }

    /// Scan a series and label retest bars with a direction.
    ///
    /// For every bar `i` with a complete trailing window: a close above the
    /// window high is an upward breakout, and the first of the following
    /// `retest_lookahead` bars whose low touches the broken level is labeled
    /// `Long`. A close below the window low mirrors to `Short`. Scanning
    /// stops at the first retest per breakout. When overlapping breakouts
    /// retest at the same bar, the most recent breakout wins.
    ///
    /// Returns an annotation array parallel to `bars`.
    pub fn detect(&self, bars: &[Bar]) -> Result<Vec<Option<Direction>>> {
        let lookback = self.params.lookback;
        let lookahead = self.params.retest_lookahead;
        let required = self.params.min_bars();

        if bars.len() < required {
            return Err(StrategyError::InsufficientHistory {
                required,
                actual: bars.len(),
            });
        }

        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let zone_highs = rolling_max(&highs, lookback);
        let zone_lows = rolling_min(&lows, lookback);

        let mut signals = vec![None; bars.len()];

        for i in lookback..bars.len() - lookahead {
            let (Some(zone_high), Some(zone_low)) = (zone_highs[i], zone_lows[i]) else {
                continue;
            };

            if bars[i].close > zone_high {
                for j in i + 1..=i + lookahead {
                    if bars[j].low <= zone_high {
                        signals[j] = Some(Direction::Long);
                        break;
                    }
                }
            } else if bars[i].close < zone_low {
                for j in i + 1..=i + lookahead {
                    if bars[j].high >= zone_low {
                        signals[j] = Some(Direction::Short);
                        break;
                    }
                }
            }
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Bar::new(start + Duration::hours(i as i64), open, high, low, close)
    }

    fn flat_series(n: usize, price: f64) -> Vec<Bar> {
        (0..n)
            .map(|i| bar(i, price, price + 0.5, price - 0.5, price))
            .collect()
    }

    /// Flat range, upward breakout at bar 41, retest at bar 45
    fn breakout_retest_series() -> Vec<Bar> {
        let mut bars = flat_series(41, 100.0);
        bars.push(bar(41, 104.6, 105.5, 104.5, 105.0));
        for i in 42..45 {
            bars.push(bar(i, 105.0, 105.5, 104.0, 105.0));
        }
        // Dips back to exactly the broken level (trailing high = 100.5)
        bars.push(bar(45, 105.0, 105.2, 100.5, 104.8));
        for i in 46..100 {
            bars.push(bar(i, 104.8, 105.3, 104.3, 104.8));
        }
        bars
    }

    #[test]
    fn test_no_breakout_no_signals() {
        let params = StrategyParameters::default();
        let detector = SignalDetector::new(&params);
        let bars = flat_series(100, 100.0);

        let signals = detector.detect(&bars).unwrap();

        assert!(signals.iter().all(|s| s.is_none()));
    }

    #[test]
    fn test_long_signal_at_retest_bar() {
        let params = StrategyParameters::default();
        let detector = SignalDetector::new(&params);
        let bars = breakout_retest_series();

        let signals = detector.detect(&bars).unwrap();

        assert_eq!(signals[45], Some(Direction::Long));
        let labeled: Vec<usize> = signals
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|_| i))
            .collect();
        assert_eq!(labeled, vec![45]);
    }

    #[test]
    fn test_short_signal_mirror() {
        let mut bars = flat_series(41, 100.0);
        // Breakdown below the trailing low (99.5)
        bars.push(bar(41, 95.4, 95.5, 94.5, 95.0));
        for i in 42..45 {
            bars.push(bar(i, 95.0, 96.0, 94.5, 95.0));
        }
        // Retest: high touches the broken level
        bars.push(bar(45, 95.0, 99.5, 94.8, 95.2));
        for i in 46..100 {
            bars.push(bar(i, 95.2, 95.7, 94.7, 95.2));
        }

        let params = StrategyParameters::default();
        let detector = SignalDetector::new(&params);
        let signals = detector.detect(&bars).unwrap();

        assert_eq!(signals[45], Some(Direction::Short));
        assert_eq!(signals.iter().filter(|s| s.is_some()).count(), 1);
    }

    #[test]
    fn test_insufficient_history() {
        let params = StrategyParameters::default();
        let detector = SignalDetector::new(&params);
        let bars = flat_series(60, 100.0);

        let err = detector.detect(&bars).unwrap_err();
        assert!(matches!(
            err,
            StrategyError::InsufficientHistory {
                required: 61,
                actual: 60
            }
        ));
    }

    #[test]
    fn test_signals_stay_within_lookahead_window() {
        // Zigzag series with many breakouts
        let bars: Vec<Bar> = (0..300)
            .map(|i| {
                let base = 100.0 + ((i * 29 % 97) as f64) * 0.4 - ((i % 11) as f64) * 0.9;
                bar(i, base, base + 1.0, base - 1.0, base + 0.3)
            })
            .collect();

        let params = StrategyParameters::default().with_windows(15, 6);
        let detector = SignalDetector::new(&params);
        let signals = detector.detect(&bars).unwrap();

        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let zone_highs = rolling_max(&highs, params.lookback);
        let zone_lows = rolling_min(&lows, params.lookback);

        // Every labeled bar must have a qualifying breakout origin at most
        // retest_lookahead bars earlier
        for (j, signal) in signals.iter().enumerate() {
            let Some(direction) = signal else { continue };
            let earliest = j.saturating_sub(params.retest_lookahead).max(params.lookback);
            let has_origin = (earliest..j).any(|i| match direction {
                Direction::Long => {
                    zone_highs[i].is_some_and(|zh| bars[i].close > zh && bars[j].low <= zh)
                }
                Direction::Short => {
                    zone_lows[i].is_some_and(|zl| bars[i].close < zl && bars[j].high >= zl)
                }
            });
            assert!(has_origin, "signal at {} has no breakout origin", j);
        }
    }

    #[test]
    fn test_detection_is_deterministic() {
        let params = StrategyParameters::default();
        let detector = SignalDetector::new(&params);
        let bars = breakout_retest_series();

        let first = detector.detect(&bars).unwrap();
        let second = detector.detect(&bars).unwrap();

        assert_eq!(first, second);
    }
}
