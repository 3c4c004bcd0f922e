//! Simulation configuration, mutable position state, and run result types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cost_model::CostModel;
use super::SimulationError;
use crate::domain::{ExitReason, Trade};

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;

/// Validated inputs for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    initial_cash: f64,
    costs: CostModel,
}

impl SimulationConfig {
    pub fn new(initial_cash: f64, costs: CostModel) -> Result<Self, SimulationError> {
        if !initial_cash.is_finite() || initial_cash <= 0.0 {
            return Err(SimulationError::NonPositiveCash(initial_cash));
        }
        Ok(Self {
            initial_cash,
            costs,
        })
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn costs(&self) -> &CostModel {
        &self.costs
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_cash: DEFAULT_INITIAL_CASH,
            costs: CostModel::default(),
        }
    }
}

/// FLAT or HOLDING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionFlag {
    Flat,
    Holding,
}

/// The open leg of a position while HOLDING.
#[derive(Debug, Clone, PartialEq)]
struct OpenPosition {
    entry_bar: usize,
    entry_date: NaiveDate,
    entry_price: f64,
    shares: u64,
    gross_entry: f64,
    entry_commission: f64,
}

/// Mutable single-position state, created FLAT and walked bar by bar.
///
/// Invariants: `cash >= 0`; shares are zero iff FLAT;
/// `equity == cash + shares * last_close`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionState {
    cash: f64,
    open: Option<OpenPosition>,
    equity: f64,
}

impl PositionState {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            open: None,
            equity: initial_cash,
        }
    }

    pub fn flag(&self) -> PositionFlag {
        match self.open {
            Some(_) => PositionFlag::Holding,
            None => PositionFlag::Flat,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn shares(&self) -> u64 {
        self.open.as_ref().map_or(0, |p| p.shares)
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    /// Mark equity to the given close.
    pub fn mark(&mut self, close: f64) {
        self.equity = self.cash + self.shares() as f64 * close;
    }

    /// Move from FLAT to HOLDING. Returns false (and stays FLAT) when not even
    /// one share is affordable.
    pub(crate) fn enter(
        &mut self,
        bar_index: usize,
        date: NaiveDate,
        price: f64,
        costs: &CostModel,
    ) -> bool {
        debug_assert!(self.open.is_none(), "enter while holding");
        let shares = costs.max_affordable_shares(self.cash, price);
        if shares == 0 {
            return false;
        }
        let gross_entry = shares as f64 * price;
        let entry_commission = costs.commission(gross_entry);
        // Same sum `max_affordable_shares` checked against cash, so this stays >= 0.
        self.cash -= gross_entry + entry_commission;
        self.open = Some(OpenPosition {
            entry_bar: bar_index,
            entry_date: date,
            entry_price: price,
            shares,
            gross_entry,
            entry_commission,
        });
        true
    }

    /// Move from HOLDING to FLAT and produce the closed trade.
    pub(crate) fn exit(
        &mut self,
        bar_index: usize,
        date: NaiveDate,
        price: f64,
        reason: ExitReason,
        costs: &CostModel,
    ) -> Option<Trade> {
        let open = self.open.take()?;
        let gross_exit = open.shares as f64 * price;
        let exit_commission = costs.commission(gross_exit);
        let levy = costs.levy(gross_exit);
        let net_proceeds = gross_exit - exit_commission - levy;
        let net_pnl =
            gross_exit - open.gross_entry - open.entry_commission - exit_commission - levy;
        self.cash += net_proceeds;

        Some(Trade {
            entry_bar: open.entry_bar,
            entry_date: open.entry_date,
            entry_price: open.entry_price,
            exit_bar: bar_index,
            exit_date: date,
            exit_price: price,
            exit_reason: reason,
            shares: open.shares,
            gross_entry: open.gross_entry,
            gross_exit,
            entry_commission: open.entry_commission,
            exit_commission,
            levy,
            net_proceeds,
            net_pnl,
            holding_days: (date - open.entry_date).num_days(),
            bars_held: bar_index - open.entry_bar,
        })
    }
}

/// End-of-day snapshot of the position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMark {
    pub date: NaiveDate,
    pub close: f64,
    pub cash: f64,
    pub shares: u64,
    pub equity: f64,
}

/// Output of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub trades: Vec<Trade>,
    pub marks: Vec<DailyMark>,
}

impl SimulationResult {
    /// Daily equity values, one per bar.
    pub fn equity_values(&self) -> Vec<f64> {
        self.marks.iter().map(|m| m.equity).collect()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.marks.last().map(|m| m.equity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn config_rejects_non_positive_cash() {
        assert!(SimulationConfig::new(0.0, CostModel::default()).is_err());
        assert!(SimulationConfig::new(-5.0, CostModel::default()).is_err());
        assert!(SimulationConfig::new(f64::INFINITY, CostModel::default()).is_err());
        assert!(SimulationConfig::new(1.0, CostModel::default()).is_ok());
    }

    #[test]
    fn new_state_is_flat() {
        let state = PositionState::new(1_000.0);
        assert_eq!(state.flag(), PositionFlag::Flat);
        assert_eq!(state.shares(), 0);
        assert_eq!(state.equity(), 1_000.0);
    }

    #[test]
    fn enter_then_exit_round_trip() {
        let costs = CostModel::frictionless();
        let mut state = PositionState::new(1_000.0);
        assert!(state.enter(0, d(2), 10.0, &costs));
        assert_eq!(state.flag(), PositionFlag::Holding);
        assert_eq!(state.shares(), 100);
        assert_eq!(state.cash(), 0.0);

        state.mark(12.0);
        assert_eq!(state.equity(), 1_200.0);

        let trade = state.exit(3, d(5), 12.0, ExitReason::Signal, &costs).unwrap();
        assert_eq!(state.flag(), PositionFlag::Flat);
        assert_eq!(state.cash(), 1_200.0);
        assert_eq!(trade.net_pnl, 200.0);
        assert_eq!(trade.holding_days, 3);
        assert_eq!(trade.bars_held, 3);
    }

    #[test]
    fn enter_without_enough_cash_stays_flat() {
        let mut state = PositionState::new(5.0);
        assert!(!state.enter(0, d(2), 10.0, &CostModel::default()));
        assert_eq!(state.flag(), PositionFlag::Flat);
        assert_eq!(state.cash(), 5.0);
    }

    #[test]
    fn entry_never_overdraws_cash() {
        let costs = CostModel::new(0.0013, 0.001).unwrap();
        for cash in [100_000.0, 99_999.99, 12_345.67, 1_000.01, 0.1 + 0.2] {
            for price in [0.07, 0.1, 3.3, 9.99, 17.31, 101.01, 333.33] {
                let mut state = PositionState::new(cash);
                if state.enter(0, d(2), price, &costs) {
                    assert!(state.cash() >= 0.0, "cash {cash} price {price}: {}", state.cash());
                } else {
                    assert_eq!(state.cash(), cash);
                }
            }
        }
    }

    #[test]
    fn exit_while_flat_is_none() {
        let mut state = PositionState::new(5.0);
        assert!(state
            .exit(0, d(2), 10.0, ExitReason::Signal, &CostModel::default())
            .is_none());
    }
}
