//! Performance metrics: pure functions that score one simulation.
//!
//! Every metric is a pure function: equity curve and/or trade ledger in,
//! scalar out. Sums run sequentially in index order, so identical inputs give
//! bit-identical outputs.

use serde::{Deserialize, Serialize};
use sweeplab_core::domain::Trade;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Upper bound reported for profit factor when there are no losing trades.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

/// Aggregate performance metrics for one window's simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    /// Risk-adjusted ratio; `None` when it cannot be computed.
    pub ratio: Option<f64>,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub trade_count: usize,
    pub cagr: f64,
    pub profit_factor: f64,
    pub total_costs: f64,
    pub avg_bars_held: f64,
    pub exposure: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from a daily equity curve and the closed trades.
    pub fn compute(equity_curve: &[f64], trades: &[Trade], risk_free_rate: f64) -> Self {
        let returns = daily_returns(equity_curve);
        let annualized_return = annualized_return(&returns);
        let annualized_volatility = annualized_volatility(&returns);
        Self {
            total_return: total_return(equity_curve),
            annualized_return,
            annualized_volatility,
            ratio: risk_adjusted_ratio(&returns, trades.len(), risk_free_rate),
            max_drawdown: max_drawdown(equity_curve),
            win_rate: win_rate(trades),
            trade_count: trades.len(),
            cagr: cagr(equity_curve),
            profit_factor: profit_factor(trades),
            total_costs: total_costs(trades),
            avg_bars_held: avg_bars_held(trades),
            exposure: exposure(trades, equity_curve.len()),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(&initial), Some(&final_eq)) if initial > 0.0 => (final_eq - initial) / initial,
        _ => 0.0,
    }
}

/// Mean daily return × 252.
pub fn annualized_return(returns: &[f64]) -> f64 {
    mean_f64(returns) * TRADING_DAYS_PER_YEAR
}

/// Sample standard deviation of daily returns × √252.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    std_dev(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// (annualized return − rf) / annualized volatility.
///
/// Undefined with fewer than two returns, with zero volatility, or when the
/// strategy never traded.
pub fn risk_adjusted_ratio(returns: &[f64], trade_count: usize, risk_free_rate: f64) -> Option<f64> {
    if returns.len() < 2 || trade_count == 0 {
        return None;
    }
    let vol = annualized_volatility(returns);
    if vol == 0.0 {
        return None;
    }
    let ratio = (annualized_return(returns) - risk_free_rate) / vol;
    ratio.is_finite().then_some(ratio)
}

/// Compound Annual Growth Rate over `len - 1` daily periods.
///
/// Returns 0.0 for single-point curves or non-positive endpoints.
pub fn cagr(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let initial = equity_curve[0];
    let final_eq = equity_curve[equity_curve.len() - 1];
    if initial <= 0.0 || final_eq <= 0.0 {
        return 0.0;
    }
    let years = (equity_curve.len() - 1) as f64 / TRADING_DAYS_PER_YEAR;
    (final_eq / initial).powf(1.0 / years) - 1.0
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = match equity_curve.first() {
        Some(&first) => first,
        None => return 0.0,
    };
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = eq / peak - 1.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Fraction of trades whose net proceeds exceed the capital committed.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Profit factor: gross profits / gross losses, capped.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.net_pnl > 0.0)
        .map(|t| t.net_pnl)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| t.net_pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { PROFIT_FACTOR_CAP } else { 0.0 };
    }
    (gross_profit / gross_loss).min(PROFIT_FACTOR_CAP)
}

/// Commission plus levy paid across all trades.
pub fn total_costs(trades: &[Trade]) -> f64 {
    trades.iter().map(Trade::total_costs).sum()
}

pub fn avg_bars_held(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.bars_held as f64).sum::<f64>() / trades.len() as f64
}

/// Fraction of days that closed HOLDING.
///
/// A trade holds overnight on `bars_held` closes: entry bar up to, not
/// including, the exit bar.
pub fn exposure(trades: &[Trade], bar_count: usize) -> f64 {
    if bar_count == 0 {
        return 0.0;
    }
    let held: usize = trades.iter().map(|t| t.bars_held).sum();
    held as f64 / bar_count as f64
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Percentage change between consecutive equity points.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sweeplab_core::domain::ExitReason;

    fn make_trade(entry: f64, exit: f64, bars_held: usize) -> Trade {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let shares = 10;
        let gross_entry = entry * shares as f64;
        let gross_exit = exit * shares as f64;
        Trade {
            entry_bar: 0,
            entry_date: date,
            entry_price: entry,
            exit_bar: bars_held,
            exit_date: date + chrono::Duration::days(bars_held as i64),
            exit_price: exit,
            exit_reason: ExitReason::Signal,
            shares,
            gross_entry,
            gross_exit,
            entry_commission: 1.0,
            exit_commission: 1.0,
            levy: 0.5,
            net_proceeds: gross_exit - 1.5,
            net_pnl: gross_exit - gross_entry - 2.5,
            holding_days: bars_held as i64,
            bars_held,
        }
    }

    // ── Total return ──

    #[test]
    fn total_return_positive() {
        let eq = vec![100_000.0, 100_500.0, 101_000.0, 110_000.0];
        assert!((total_return(&eq) - 0.1).abs() < 1e-10);
    }

    #[test]
    fn total_return_negative() {
        let eq = vec![100_000.0, 95_000.0, 90_000.0];
        assert!((total_return(&eq) - (-0.1)).abs() < 1e-10);
    }

    #[test]
    fn total_return_empty() {
        assert_eq!(total_return(&[]), 0.0);
        assert_eq!(total_return(&[100.0]), 0.0);
    }

    // ── Annualization ──

    #[test]
    fn annualized_return_scales_mean() {
        let returns = [0.01, -0.01, 0.02];
        let expected = (0.02 / 3.0) * 252.0;
        assert!((annualized_return(&returns) - expected).abs() < 1e-12);
    }

    #[test]
    fn annualized_volatility_uses_sample_std() {
        // mean 0, deviations ±0.01 → sample variance = 2e-4 / 1
        let returns = [0.01, -0.01];
        let expected = (2e-4_f64).sqrt() * 252.0_f64.sqrt();
        assert!((annualized_volatility(&returns) - expected).abs() < 1e-12);
    }

    // ── Ratio ──

    #[test]
    fn ratio_undefined_without_trades() {
        let returns = [0.01, -0.01, 0.02];
        assert_eq!(risk_adjusted_ratio(&returns, 0, 0.02), None);
    }

    #[test]
    fn ratio_undefined_with_zero_volatility() {
        let returns = [0.25, 0.25, 0.25];
        assert_eq!(risk_adjusted_ratio(&returns, 1, 0.02), None);
    }

    #[test]
    fn ratio_undefined_with_one_return() {
        assert_eq!(risk_adjusted_ratio(&[0.05], 1, 0.0), None);
    }

    #[test]
    fn ratio_known_value() {
        let returns = [0.01, -0.01, 0.02];
        let ann = annualized_return(&returns);
        let vol = annualized_volatility(&returns);
        let ratio = risk_adjusted_ratio(&returns, 2, 0.02).unwrap();
        assert!((ratio - (ann - 0.02) / vol).abs() < 1e-12);
    }

    // ── CAGR ──

    #[test]
    fn cagr_one_year() {
        // 253 points = 252 daily periods = one year, 10% total return
        let mut eq = vec![100_000.0];
        let daily = 1.1_f64.powf(1.0 / 252.0);
        for i in 1..253 {
            eq.push(eq[i - 1] * daily);
        }
        assert!((cagr(&eq) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn cagr_constant_equity() {
        assert_eq!(cagr(&[100_000.0; 252]), 0.0);
        assert_eq!(cagr(&[100_000.0]), 0.0);
    }

    // ── Max drawdown ──

    #[test]
    fn max_drawdown_known() {
        let eq = vec![100.0, 120.0, 90.0, 110.0, 60.0, 130.0];
        assert!((max_drawdown(&eq) - (-0.5)).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_monotonic_is_zero() {
        assert_eq!(max_drawdown(&[100.0, 101.0, 102.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    // ── Trade statistics ──

    #[test]
    fn win_rate_counts_net_winners() {
        // 100 → 101 on 10 shares: +10 gross, -2.5 costs → winner
        // 100 → 100.1: +1 gross, -2.5 costs → loser
        let trades = vec![make_trade(100.0, 101.0, 3), make_trade(100.0, 100.1, 2)];
        assert!((win_rate(&trades) - 0.5).abs() < 1e-12);
        assert_eq!(win_rate(&[]), 0.0);
    }

    #[test]
    fn profit_factor_caps_without_losses() {
        let trades = vec![make_trade(100.0, 110.0, 3)];
        assert_eq!(profit_factor(&trades), PROFIT_FACTOR_CAP);
        assert_eq!(profit_factor(&[]), 0.0);
    }

    #[test]
    fn profit_factor_ratio() {
        // +97.5 and -52.5
        let trades = vec![make_trade(100.0, 110.0, 3), make_trade(100.0, 95.0, 3)];
        assert!((profit_factor(&trades) - 97.5 / 52.5).abs() < 1e-12);
    }

    #[test]
    fn costs_bars_and_exposure() {
        let trades = vec![make_trade(100.0, 110.0, 4), make_trade(100.0, 95.0, 2)];
        assert!((total_costs(&trades) - 5.0).abs() < 1e-12);
        assert!((avg_bars_held(&trades) - 3.0).abs() < 1e-12);
        assert!((exposure(&trades, 12) - 0.5).abs() < 1e-12);
        assert_eq!(exposure(&trades, 0), 0.0);
    }

    #[test]
    fn compute_flat_curve_without_trades() {
        let m = PerformanceMetrics::compute(&[1_000.0; 10], &[], 0.02);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.annualized_volatility, 0.0);
        assert_eq!(m.ratio, None);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.trade_count, 0);
    }

    #[test]
    fn compute_is_bit_identical() {
        let eq = vec![100.0, 103.0, 99.5, 104.2, 101.1, 108.9];
        let trades = vec![make_trade(100.0, 108.9, 5)];
        let a = PerformanceMetrics::compute(&eq, &trades, 0.02);
        let b = PerformanceMetrics::compute(&eq, &trades, 0.02);
        assert_eq!(a, b);
        assert_eq!(a.ratio.map(f64::to_bits), b.ratio.map(f64::to_bits));
    }
}
