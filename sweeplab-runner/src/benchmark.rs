//! Passive buy-and-hold comparison curve.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use sweeplab_core::domain::PriceSeries;
use sweeplab_core::engine::SimulationConfig;

/// One dated point on an equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Buy the maximum whole shares at the first close, pay entry commission,
/// hold to the end. There is no exit leg, so no levy is charged.
///
/// If not even one share is affordable the curve stays at initial cash.
pub fn buy_and_hold(series: &PriceSeries, config: &SimulationConfig) -> Vec<EquityPoint> {
    let costs = config.costs();
    let first_close = series.first().close;
    let shares = costs.max_affordable_shares(config.initial_cash(), first_close);
    let gross = shares as f64 * first_close;
    let cash = (config.initial_cash() - gross - costs.commission(gross)).max(0.0);

    series
        .bars()
        .iter()
        .map(|bar| EquityPoint {
            date: bar.date,
            equity: cash + shares as f64 * bar.close,
        })
        .collect()
}

/// Attach dates to a bare equity curve.
pub fn dated_curve(series: &PriceSeries, values: &[f64]) -> Vec<EquityPoint> {
    series
        .bars()
        .iter()
        .zip(values)
        .map(|(bar, &equity)| EquityPoint {
            date: bar.date,
            equity,
        })
        .collect()
}
