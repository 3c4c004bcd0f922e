//! Bar-by-bar simulation loop: the FLAT/HOLDING state machine.
//!
//! Per bar, in order:
//! 1. Apply the bar's signal at the close (enter, exit, or nothing)
//! 2. On the final bar, force-close any open position
//! 3. Mark to market and record the daily snapshot

use crate::components::signal::Signal;
use crate::domain::{ExitReason, PriceSeries, Trade};

use super::state::{DailyMark, PositionFlag, PositionState, SimulationConfig, SimulationResult};
use super::SimulationError;

/// Run one simulation over a validated series and an aligned signal stream.
///
/// Every run ends FLAT: a position still open on the final bar is closed at
/// the last close and recorded as a regular trade. When an EXIT signal fires
/// on the final bar the position is closed once, with `ExitReason::Signal`.
pub fn run_simulation(
    series: &PriceSeries,
    signals: &[Signal],
    config: &SimulationConfig,
) -> Result<SimulationResult, SimulationError> {
    let bars = series.bars();
    if signals.len() != bars.len() {
        return Err(SimulationError::LengthMismatch {
            bars: bars.len(),
            signals: signals.len(),
        });
    }

    let costs = config.costs();
    let last = bars.len() - 1;
    let mut state = PositionState::new(config.initial_cash());
    let mut trades: Vec<Trade> = Vec::new();
    let mut marks = Vec::with_capacity(bars.len());

    for (t, (bar, signal)) in bars.iter().zip(signals).enumerate() {
        match (state.flag(), signal) {
            // An ENTER on the final bar still fills; the forced close below then
            // exits at the same close, so the trade only pays costs.
            (PositionFlag::Flat, Signal::Enter) => {
                state.enter(t, bar.date, bar.close, costs);
            }
            (PositionFlag::Holding, Signal::Exit) => {
                trades.extend(state.exit(t, bar.date, bar.close, ExitReason::Signal, costs));
            }
            // HOLDING + HOLD/ENTER: keep the position. FLAT + HOLD/EXIT: nothing to do.
            _ => {}
        }

        if t == last && state.flag() == PositionFlag::Holding {
            trades.extend(state.exit(t, bar.date, bar.close, ExitReason::EndOfSeries, costs));
        }

        state.mark(bar.close);
        marks.push(DailyMark {
            date: bar.date,
            close: bar.close,
            cash: state.cash(),
            shares: state.shares(),
            equity: state.equity(),
        });
    }

    Ok(SimulationResult { trades, marks })
}
