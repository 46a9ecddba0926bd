//! Engine and pipeline configuration
//!
//! Every struct uses `#[serde(default)]`, so a JSON file only has to name
//! the fields it overrides.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Settings for the hybrid fusion engine and its two forecasters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Weight of the seasonal forecaster in the fused price
    pub seasonal_weight: f64,
    /// Weight of the shock forecaster in the fused price
    pub shock_weight: f64,
    /// Look-back window of the shock forecaster (days)
    pub shock_window: usize,
    /// Seasonal horizon used when rebasing onto a live quote (days)
    pub live_seasonal_horizon: usize,
    /// Deviation (percent) above which a shock alert is raised
    pub shock_alert_percent: f64,
    /// Number of yearly Fourier harmonics in the seasonal forecaster
    pub fourier_order: usize,
    pub shock_hidden_units: usize,
    pub shock_epochs: usize,
    pub shock_learning_rate: f64,
    pub shock_batch_size: usize,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seasonal_weight: 0.7,
            shock_weight: 0.3,
            shock_window: 30,
            live_seasonal_horizon: 30,
            shock_alert_percent: 15.0,
            fourier_order: 3,
            shock_hidden_units: 16,
            shock_epochs: 20,
            shock_learning_rate: 0.05,
            shock_batch_size: 32,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Check weights and hyper-parameters
    pub fn validate(&self) -> Result<()> {
        if self.seasonal_weight < 0.0 || self.shock_weight < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Fusion weights must be non-negative".to_string(),
            ));
        }
        if (self.seasonal_weight + self.shock_weight - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ForecastError::InvalidParameter(format!(
                "Fusion weights must sum to 1.0, got {} + {}",
                self.seasonal_weight, self.shock_weight
            )));
        }
        if self.shock_window == 0 || self.live_seasonal_horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Shock window and live seasonal horizon must be positive".to_string(),
            ));
        }
        if self.shock_alert_percent < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Shock alert threshold must be non-negative".to_string(),
            ));
        }
        validate_training(
            self.shock_hidden_units,
            self.shock_epochs,
            self.shock_learning_rate,
            self.shock_batch_size,
        )
    }
}

/// Settings for the simulated federated pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FederatedConfig {
    /// Length of each synthetic regional series (days)
    pub days: usize,
    /// Look-back window of the regional models
    pub window: usize,
    /// Number of autoregressive forecast steps per region
    pub forecast_horizon: usize,
    /// Leading forecast days averaged for the region recommendation
    pub recommendation_days: usize,
    pub hidden_units: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub seed: u64,
    /// First day of the synthetic series
    pub start_date: NaiveDate,
}

impl Default for FederatedConfig {
    fn default() -> Self {
        Self {
            days: 365,
            window: 30,
            forecast_horizon: 30,
            recommendation_days: 7,
            hidden_units: 16,
            epochs: 5,
            learning_rate: 0.05,
            batch_size: 16,
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl FederatedConfig {
    /// Check series lengths and hyper-parameters
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 || self.days <= self.window {
            return Err(ForecastError::InvalidParameter(format!(
                "Synthetic series length ({}) must exceed the window ({}) and the window must be positive",
                self.days, self.window
            )));
        }
        if self.forecast_horizon == 0 || self.recommendation_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon and recommendation days must be positive".to_string(),
            ));
        }
        validate_training(
            self.hidden_units,
            self.epochs,
            self.learning_rate,
            self.batch_size,
        )
    }
}

fn validate_training(hidden: usize, epochs: usize, learning_rate: f64, batch: usize) -> Result<()> {
    if hidden == 0 || epochs == 0 || batch == 0 {
        return Err(ForecastError::InvalidParameter(
            "Hidden units, epochs and batch size must be positive".to_string(),
        ));
    }
    if !(learning_rate > 0.0 && learning_rate.is_finite()) {
        return Err(ForecastError::InvalidParameter(
            "Learning rate must be a positive finite number".to_string(),
        ));
    }
    Ok(())
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub federated: FederatedConfig,
}

impl AppConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.federated.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(r#"{"federated": {"epochs": 2}}"#).unwrap();

        assert_eq!(config.federated.epochs, 2);
        assert_eq!(config.federated.window, 30);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let result = AppConfig::from_json_str(
            r#"{"engine": {"seasonal_weight": 0.6, "shock_weight": 0.3}}"#,
        );

        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }

    #[test]
    fn test_window_must_fit_series() {
        let config = FederatedConfig {
            days: 20,
            window: 30,
            ..FederatedConfig::default()
        };

        assert!(config.validate().is_err());
    }
}
