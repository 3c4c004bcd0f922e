//! Cost model: commission on both legs, levy on exits only.
//!
//! Both rates are fractions of gross trade value (0.001 = 0.1%).

use serde::{Deserialize, Serialize};

use super::SimulationError;

/// Largest accepted commission or levy rate.
pub const MAX_COST_RATE: f64 = 0.1;

pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;
pub const DEFAULT_LEVY_RATE: f64 = 0.001;

/// Transaction cost rates, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    commission_rate: f64,
    levy_rate: f64,
}

impl CostModel {
    pub fn new(commission_rate: f64, levy_rate: f64) -> Result<Self, SimulationError> {
        check_rate("commission_rate", commission_rate)?;
        check_rate("levy_rate", levy_rate)?;
        Ok(Self {
            commission_rate,
            levy_rate,
        })
    }

    pub fn frictionless() -> Self {
        Self {
            commission_rate: 0.0,
            levy_rate: 0.0,
        }
    }

    pub fn commission_rate(&self) -> f64 {
        self.commission_rate
    }

    pub fn levy_rate(&self) -> f64 {
        self.levy_rate
    }

    /// Commission charged on either leg.
    pub fn commission(&self, gross: f64) -> f64 {
        gross * self.commission_rate
    }

    /// Sell-side levy, charged on exits only.
    pub fn levy(&self, gross: f64) -> f64 {
        gross * self.levy_rate
    }

    /// Largest whole-share count whose gross cost plus commission fits in `cash`.
    pub fn max_affordable_shares(&self, cash: f64, price: f64) -> u64 {
        if cash <= 0.0 || price <= 0.0 {
            return 0;
        }
        let per_share = price * (1.0 + self.commission_rate);
        let mut shares = (cash / per_share).floor() as u64;
        // Float division can land one share over budget; step back until it fits.
        while shares > 0 {
            let gross = shares as f64 * price;
            if gross + self.commission(gross) <= cash {
                break;
            }
            shares -= 1;
        }
        shares
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            commission_rate: DEFAULT_COMMISSION_RATE,
            levy_rate: DEFAULT_LEVY_RATE,
        }
    }
}

fn check_rate(name: &'static str, rate: f64) -> Result<(), SimulationError> {
    if !rate.is_finite() || !(0.0..=MAX_COST_RATE).contains(&rate) {
        return Err(SimulationError::CostRateOutOfRange { name, rate });
    }
    Ok(())
}
