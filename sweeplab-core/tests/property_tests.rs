//! Property tests for simulation invariants.
//!
//! Uses proptest to verify:
//! 1. Cash invariant: cash never goes negative; shares are zero iff FLAT
//! 2. Equity identity: equity == cash + shares * close on every day
//! 3. Ledger consistency: each trade's P&L reconciles with its cost legs
//! 4. Threshold boundary: exact threshold values never trigger
//! 5. Every run ends FLAT

use chrono::NaiveDate;
use proptest::prelude::*;
use sweeplab_core::components::signal::{Signal, SignalRule};
use sweeplab_core::domain::{Bar, PriceSeries};
use sweeplab_core::engine::{run_simulation, CostModel, SimulationConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 2..80)
        .prop_map(|v| v.into_iter().map(|p| (p * 100.0).round() / 100.0).collect())
}

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Enter), Just(Signal::Exit), Just(Signal::Hold)]
}

fn arb_rate() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.0..0.01_f64, 0.0..0.1_f64]
}

fn series(closes: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        })
        .collect();
    PriceSeries::new("PROP", bars).unwrap()
}

fn scenario() -> impl Strategy<Value = (Vec<f64>, Vec<Signal>, f64, f64, f64)> {
    arb_closes().prop_flat_map(|closes| {
        let n = closes.len();
        (
            Just(closes),
            prop::collection::vec(arb_signal(), n),
            arb_rate(),
            arb_rate(),
            10.0..1_000_000.0_f64,
        )
    })
}

proptest! {
    #[test]
    fn cash_never_negative_and_equity_identity(
        (closes, signals, commission, levy, cash) in scenario()
    ) {
        let s = series(&closes);
        let config = SimulationConfig::new(cash, CostModel::new(commission, levy).unwrap()).unwrap();
        let result = run_simulation(&s, &signals, &config).unwrap();

        prop_assert_eq!(result.marks.len(), closes.len());
        for mark in &result.marks {
            prop_assert!(mark.cash >= 0.0, "negative cash on {}: {}", mark.date, mark.cash);
            let expected = mark.cash + mark.shares as f64 * mark.close;
            prop_assert!((mark.equity - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn every_run_ends_flat((closes, signals, commission, levy, cash) in scenario()) {
        let s = series(&closes);
        let config = SimulationConfig::new(cash, CostModel::new(commission, levy).unwrap()).unwrap();
        let result = run_simulation(&s, &signals, &config).unwrap();
        let last = result.marks.last().unwrap();
        prop_assert_eq!(last.shares, 0);
        prop_assert!((last.equity - last.cash).abs() < 1e-12);
    }

    #[test]
    fn ledger_is_consistent((closes, signals, commission, levy, cash) in scenario()) {
        let s = series(&closes);
        let config = SimulationConfig::new(cash, CostModel::new(commission, levy).unwrap()).unwrap();
        let result = run_simulation(&s, &signals, &config).unwrap();

        let mut previous_exit: Option<usize> = None;
        for trade in &result.trades {
            prop_assert!(trade.shares >= 1);
            prop_assert!(trade.exit_bar >= trade.entry_bar);
            prop_assert!(trade.exit_date >= trade.entry_date);
            if let Some(prev) = previous_exit {
                prop_assert!(trade.entry_bar > prev, "overlapping trades");
            }
            previous_exit = Some(trade.exit_bar);

            let tol = 1e-9 * trade.gross_entry.max(trade.gross_exit).max(1.0);
            let shares = trade.shares as f64;
            prop_assert!((trade.gross_entry - shares * trade.entry_price).abs() <= tol);
            prop_assert!((trade.gross_exit - shares * trade.exit_price).abs() <= tol);
            prop_assert!((trade.entry_commission - trade.gross_entry * commission).abs() <= tol);
            prop_assert!((trade.exit_commission - trade.gross_exit * commission).abs() <= tol);
            prop_assert!((trade.levy - trade.gross_exit * levy).abs() <= tol);

            let expected_pnl = trade.gross_exit
                - trade.gross_entry
                - trade.entry_commission
                - trade.exit_commission
                - trade.levy;
            prop_assert!((trade.net_pnl - expected_pnl).abs() <= tol);

            let expected_proceeds = trade.gross_exit - trade.exit_commission - trade.levy;
            prop_assert!((trade.net_proceeds - expected_proceeds).abs() <= tol);
            prop_assert_eq!(
                trade.is_winner(),
                trade.net_proceeds > trade.gross_entry + trade.entry_commission
            );
        }

        // Final cash reconciles with the sum of trade P&L.
        let total_pnl: f64 = result.trades.iter().map(|t| t.net_pnl).sum();
        let final_cash = result.marks.last().unwrap().cash;
        prop_assert!((final_cash - (cash + total_pnl)).abs() <= 1e-6 * cash.max(1.0));
    }

    #[test]
    fn thresholds_never_trigger_at_equality(
        enter in 0.0..50.0_f64,
        gap in 0.001..50.0_f64,
    ) {
        let exit = enter + gap;
        let rule = SignalRule::new(enter, exit).unwrap();
        prop_assert_eq!(rule.evaluate(Some(enter)), Signal::Hold);
        prop_assert_eq!(rule.evaluate(Some(exit)), Signal::Hold);
        prop_assert_eq!(rule.evaluate(None), Signal::Hold);
    }

    #[test]
    fn thresholds_partition_values(value in 0.0..=100.0_f64) {
        let rule = SignalRule::default();
        let expected = if value < 30.0 {
            Signal::Enter
        } else if value > 70.0 {
            Signal::Exit
        } else {
            Signal::Hold
        };
        prop_assert_eq!(rule.evaluate(Some(value)), expected);
    }
}
