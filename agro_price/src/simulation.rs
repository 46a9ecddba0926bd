//! What-if profit simulation
//!
//! A deterministic formula over slider-style inputs. It does not touch the
//! forecasters; the caller supplies the base price (normally the live
//! market average).

use crate::error::{ForecastError, Result};
use agro_math::round_to;
use serde::{Deserialize, Serialize};

/// Yield (units per acre) before the rainfall adjustment
pub const BASE_YIELD: f64 = 1000.0;
/// Base price used when no live market data exists (₹/quintal)
pub const FALLBACK_PRICE: f64 = 2000.0;
/// Linear sensitivity of yield to the rainfall adjustment
pub const RAINFALL_SENSITIVITY: f64 = 0.5;

/// Scenario parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationInputs {
    /// Rainfall adjustment in percent, -100..=100
    pub rainfall_percent: f64,
    /// Market price adjustment in percent, -100..=100
    pub market_price_percent: f64,
    /// Acres
    pub land_size: f64,
    pub fertilizer_cost: f64,
    pub labour_cost: f64,
}

impl Default for SimulationInputs {
    fn default() -> Self {
        Self {
            rainfall_percent: 0.0,
            market_price_percent: 0.0,
            land_size: 1.0,
            fertilizer_cost: 0.0,
            labour_cost: 0.0,
        }
    }
}

impl SimulationInputs {
    pub fn validate(&self) -> Result<()> {
        let percent = |name: &str, value: f64| {
            if (-100.0..=100.0).contains(&value) {
                Ok(())
            } else {
                Err(ForecastError::InvalidParameter(format!(
                    "{} must be between -100 and 100, got {}",
                    name, value
                )))
            }
        };
        let non_negative = |name: &str, value: f64| {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ForecastError::InvalidParameter(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )))
            }
        };

        percent("rainfall_percent", self.rainfall_percent)?;
        percent("market_price_percent", self.market_price_percent)?;
        non_negative("land_size", self.land_size)?;
        non_negative("fertilizer_cost", self.fertilizer_cost)?;
        non_negative("labour_cost", self.labour_cost)
    }
}

/// Every intermediate value of the simulation, rounded for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub base_price: f64,
    pub adjusted_price: f64,
    pub rainfall_factor: f64,
    pub adjusted_yield: f64,
    pub gross_revenue: f64,
    pub total_cost: f64,
    pub predicted_profit: f64,
}

/// Run the profit formula for `base_price`
pub fn simulate_profit(base_price: f64, inputs: &SimulationInputs) -> Result<SimulationOutcome> {
    inputs.validate()?;
    if !(base_price.is_finite() && base_price >= 0.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Base price must be non-negative, got {}",
            base_price
        )));
    }

    let adjusted_price = base_price * (1.0 + inputs.market_price_percent / 100.0);
    let rainfall_factor = 1.0 + inputs.rainfall_percent / 100.0 * RAINFALL_SENSITIVITY;
    let adjusted_yield = BASE_YIELD * rainfall_factor;
    let total_cost = inputs.fertilizer_cost + inputs.labour_cost;
    let gross_revenue = adjusted_price * adjusted_yield * inputs.land_size;

    Ok(SimulationOutcome {
        base_price: round_to(base_price, 2),
        adjusted_price: round_to(adjusted_price, 2),
        rainfall_factor: round_to(rainfall_factor, 4),
        adjusted_yield: round_to(adjusted_yield, 2),
        gross_revenue: round_to(gross_revenue, 2),
        total_cost: round_to(total_cost, 2),
        predicted_profit: round_to(gross_revenue - total_cost, 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_sliders() {
        let outcome = simulate_profit(FALLBACK_PRICE, &SimulationInputs::default()).unwrap();

        assert_eq!(outcome.adjusted_price, 2000.0);
        assert_eq!(outcome.rainfall_factor, 1.0);
        assert_eq!(outcome.gross_revenue, 2_000_000.0);
        assert_eq!(outcome.predicted_profit, 2_000_000.0);
    }

    #[test]
    fn test_adjustments() {
        let inputs = SimulationInputs {
            rainfall_percent: -40.0,
            market_price_percent: 10.0,
            land_size: 2.0,
            fertilizer_cost: 5000.0,
            labour_cost: 7000.0,
        };
        let outcome = simulate_profit(100.0, &inputs).unwrap();

        assert_eq!(outcome.adjusted_price, 110.0);
        assert_eq!(outcome.rainfall_factor, 0.8);
        assert_eq!(outcome.adjusted_yield, 800.0);
        assert_eq!(outcome.gross_revenue, 176_000.0);
        assert_eq!(outcome.total_cost, 12_000.0);
        assert_eq!(outcome.predicted_profit, 164_000.0);
    }

    #[test]
    fn test_out_of_range_inputs() {
        let inputs = SimulationInputs {
            rainfall_percent: 150.0,
            ..SimulationInputs::default()
        };
        assert!(simulate_profit(100.0, &inputs).is_err());

        let inputs = SimulationInputs {
            land_size: -1.0,
            ..SimulationInputs::default()
        };
        assert!(simulate_profit(100.0, &inputs).is_err());
    }
}
