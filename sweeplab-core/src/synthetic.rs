//! Deterministic synthetic price series.
//!
//! A seeded random walk over weekdays starting at 100.0. Used for demos,
//! benchmarks and tests; the output always passes validation.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::ValidationError;
use crate::domain::{Bar, PriceSeries};

pub const START_PRICE: f64 = 100.0;

/// Random-walk parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalk {
    pub seed: u64,
    /// Maximum absolute daily return (uniform in `-max_move..max_move`).
    pub max_move: f64,
    pub start_price: f64,
}

impl RandomWalk {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_move: 0.03,
            start_price: START_PRICE,
        }
    }

    /// Generate `trading_days` weekday bars starting on or after `start`.
    pub fn bars(&self, start: NaiveDate, trading_days: usize) -> Vec<Bar> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let max_move = self.max_move.clamp(0.0, 0.5);
        let mut bars = Vec::with_capacity(trading_days);
        let mut price = self.start_price;
        let mut current = start;

        while bars.len() < trading_days {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += Duration::days(1);
                continue;
            }

            let daily_return: f64 = if max_move > 0.0 {
                rng.gen_range(-max_move..max_move)
            } else {
                0.0
            };
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000i64);

            bars.push(Bar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            current += Duration::days(1);
        }

        bars
    }

    /// Generate and validate a named series.
    pub fn series(
        &self,
        symbol: &str,
        start: NaiveDate,
        trading_days: usize,
    ) -> Result<PriceSeries, ValidationError> {
        PriceSeries::new(symbol, self.bars(start, trading_days))
    }
}
