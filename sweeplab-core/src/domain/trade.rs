//! Trade: a completed round trip in the append-only ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// An EXIT signal fired while holding.
    Signal,
    /// Forced close on the final bar of the series.
    EndOfSeries,
}

/// A closed long round trip: entry → exit.
///
/// Cost fields are absolute currency amounts. `net_proceeds` is the cash the
/// exit leg returns; `net_pnl` is the round-trip profit after every cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Size ──
    pub shares: u64,

    // ── Amounts ──
    pub gross_entry: f64,
    pub gross_exit: f64,
    pub entry_commission: f64,
    pub exit_commission: f64,
    pub levy: f64,
    pub net_proceeds: f64,
    pub net_pnl: f64,

    // ── Duration ──
    /// Calendar days between entry and exit.
    pub holding_days: i64,
    pub bars_held: usize,
}

impl Trade {
    /// Cash committed at entry: gross cost plus entry commission.
    pub fn capital_committed(&self) -> f64 {
        self.gross_entry + self.entry_commission
    }

    /// Total transaction costs over both legs.
    pub fn total_costs(&self) -> f64 {
        self.entry_commission + self.exit_commission + self.levy
    }

    /// Net proceeds exceed the capital committed at entry.
    pub fn is_winner(&self) -> bool {
        self.net_proceeds > self.capital_committed()
    }
}
