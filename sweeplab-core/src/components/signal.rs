//! Signal generation: maps one day's oscillator value to an action.
//!
//! The rule sees a single `Option<f64>` and nothing else: no bar history,
//! no neighbouring indicator values, no position state. A decision for day t
//! therefore cannot depend on data after t.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::indicator::IndicatorSeries;

pub const DEFAULT_ENTER_BELOW: f64 = 30.0;
pub const DEFAULT_EXIT_ABOVE: f64 = 70.0;

/// Discrete daily action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Enter,
    Exit,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalRuleError {
    #[error("{name} must be within [0, 100], got {value}")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("enter threshold {enter_below} must be below exit threshold {exit_above}")]
    Crossed { enter_below: f64, exit_above: f64 },
}

/// Fixed threshold rule: enter strictly below one level, exit strictly above another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRule {
    enter_below: f64,
    exit_above: f64,
}

impl SignalRule {
    pub fn new(enter_below: f64, exit_above: f64) -> Result<Self, SignalRuleError> {
        check_level("enter_below", enter_below)?;
        check_level("exit_above", exit_above)?;
        if enter_below >= exit_above {
            return Err(SignalRuleError::Crossed {
                enter_below,
                exit_above,
            });
        }
        Ok(Self {
            enter_below,
            exit_above,
        })
    }

    pub fn enter_below(&self) -> f64 {
        self.enter_below
    }

    pub fn exit_above(&self) -> f64 {
        self.exit_above
    }

    /// Decide today's action from today's value only.
    ///
    /// Exact threshold values and undefined values map to HOLD.
    pub fn evaluate(&self, value: Option<f64>) -> Signal {
        match value {
            Some(v) if v < self.enter_below => Signal::Enter,
            Some(v) if v > self.exit_above => Signal::Exit,
            _ => Signal::Hold,
        }
    }

    /// Apply the rule to every day of an indicator series, one value at a time.
    pub fn signals(&self, indicator: &IndicatorSeries) -> Vec<Signal> {
        indicator
            .values()
            .iter()
            .map(|&value| self.evaluate(value))
            .collect()
    }
}

impl Default for SignalRule {
    fn default() -> Self {
        Self {
            enter_below: DEFAULT_ENTER_BELOW,
            exit_above: DEFAULT_EXIT_ABOVE,
        }
    }
}

fn check_level(name: &'static str, value: f64) -> Result<(), SignalRuleError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(SignalRuleError::OutOfRange { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_enter_is_enter() {
        let rule = SignalRule::default();
        assert_eq!(rule.evaluate(Some(29.999)), Signal::Enter);
        assert_eq!(rule.evaluate(Some(0.0)), Signal::Enter);
    }

    #[test]
    fn above_exit_is_exit() {
        let rule = SignalRule::default();
        assert_eq!(rule.evaluate(Some(70.001)), Signal::Exit);
        assert_eq!(rule.evaluate(Some(100.0)), Signal::Exit);
    }

    #[test]
    fn thresholds_themselves_hold() {
        let rule = SignalRule::default();
        assert_eq!(rule.evaluate(Some(30.0)), Signal::Hold);
        assert_eq!(rule.evaluate(Some(70.0)), Signal::Hold);
        assert_eq!(rule.evaluate(Some(50.0)), Signal::Hold);
    }

    #[test]
    fn undefined_holds() {
        assert_eq!(SignalRule::default().evaluate(None), Signal::Hold);
    }

    #[test]
    fn rejects_crossed_thresholds() {
        assert!(matches!(
            SignalRule::new(70.0, 30.0),
            Err(SignalRuleError::Crossed { .. })
        ));
        assert!(SignalRule::new(50.0, 50.0).is_err());
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        assert!(matches!(
            SignalRule::new(-1.0, 70.0),
            Err(SignalRuleError::OutOfRange { name: "enter_below", .. })
        ));
        assert!(SignalRule::new(30.0, 100.5).is_err());
        assert!(SignalRule::new(0.0, 100.0).is_ok());
    }
}
