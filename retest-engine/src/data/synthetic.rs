use chrono::{Duration, TimeZone, Utc};
use common::Bar;
use rand::Rng;

/// Generate a random-walk series of hourly OHLC bars
pub fn generate_synthetic_bars(count: usize, initial_price: f64) -> Vec<Bar> {
    let mut rng = rand::thread_rng();
    let mut bars = Vec::with_capacity(count);

    let mut price = initial_price;
    let start = Utc::now() - Duration::hours(count as i64);

    let hourly_volatility = 0.008;
    let drift = 0.00005;

    for i in 0..count {
        let timestamp = start + Duration::hours(i as i64);

        let shock: f64 = rng.gen_range(-1.0..1.0);
        let hourly_return = drift + hourly_volatility * shock;
        let new_price = price * (1.0 + hourly_return);

        let range = price * rng.gen_range(0.002..0.01);
        let open = price + rng.gen_range(-range / 2.0..range / 2.0);
        let close = new_price;
        let high = open.max(close) + rng.gen_range(0.0..range / 2.0);
        let low = open.min(close) - rng.gen_range(0.0..range / 2.0);

        bars.push(Bar::new(timestamp, open, high, low, close));

        price = new_price;
    }

    bars
}

/// Deterministic breakout-then-retest pattern for testing.
///
/// Flat range until `breakout_at`, where the close jumps above the range
/// high; the price holds above until `retest_delay` bars later, when a
/// single bar dips back to exactly the broken level; flat above afterwards.
pub fn generate_breakout_series(
    count: usize,
    base_price: f64,
    breakout_at: usize,
    retest_delay: usize,
) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let half_range = base_price * 0.005;
    let range_high = base_price + half_range;
    let breakout_price = base_price * 1.05;
    let retest_at = breakout_at + retest_delay;

    (0..count)
        .map(|i| {
            let timestamp = start + Duration::hours(i as i64);
            if i < breakout_at {
                Bar::new(
                    timestamp,
                    base_price,
                    range_high,
                    base_price - half_range,
                    base_price,
                )
            } else if i == breakout_at {
                Bar::new(
                    timestamp,
                    breakout_price - half_range,
                    breakout_price + half_range,
                    breakout_price - half_range,
                    breakout_price,
                )
            } else if i == retest_at {
                // The dip back to the broken level
                Bar::new(
                    timestamp,
                    breakout_price,
                    breakout_price + half_range,
                    range_high,
                    breakout_price - half_range,
                )
            } else {
                Bar::new(
                    timestamp,
                    breakout_price,
                    breakout_price + half_range,
                    breakout_price - half_range,
                    breakout_price,
                )
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_bars_honor_invariants() {
        let bars = generate_synthetic_bars(500, 100.0);

        assert_eq!(bars.len(), 500);
        for bar in &bars {
            assert!(bar.high >= bar.low);
            assert!(bar.high >= bar.open && bar.high >= bar.close);
            assert!(bar.low <= bar.open && bar.low <= bar.close);
            assert!(bar.close.is_finite());
        }
        for pair in bars.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_breakout_series_shape() {
        let bars = generate_breakout_series(100, 100.0, 41, 4);

        // Breakout bar closes above the prior range high
        assert!(bars[41].close > bars[40].high);
        // Retest bar dips back to exactly the broken level
        assert_eq!(bars[45].low, 100.5);
        // Bars in between hold above it
        assert!(bars[42].low > 100.5);
        assert!(bars[44].low > 100.5);

        for bar in &bars {
            assert!(bar.high >= bar.low);
            assert!(bar.low <= bar.open && bar.open <= bar.high);
            assert!(bar.low <= bar.close && bar.close <= bar.high);
        }
    }
}
