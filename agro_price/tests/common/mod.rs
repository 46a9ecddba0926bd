#![allow(dead_code)]

use agro_price::config::{EngineConfig, FederatedConfig};
use agro_price::{ForecastError, Forecaster, HybridFusionEngine, PredictionInput, Result, TrainingSeries};
use chrono::NaiveDate;

/// Forecaster returning a fixed value, or failing on demand
#[derive(Debug)]
pub struct FixedForecaster {
    value: Option<f64>,
    trainable: bool,
    /// Successful trainings left before training starts failing
    train_budget: Option<usize>,
    trained: bool,
    last_known: Option<f64>,
}

impl FixedForecaster {
    pub fn returning(value: f64) -> Box<dyn Forecaster> {
        Box::new(Self {
            value: Some(value),
            trainable: true,
            train_budget: None,
            trained: false,
            last_known: None,
        })
    }

    /// Trains fine, but every prediction fails
    pub fn failing() -> Box<dyn Forecaster> {
        Box::new(Self {
            value: None,
            trainable: true,
            train_budget: None,
            trained: false,
            last_known: None,
        })
    }

    /// Trains once, fails every later training, and every prediction fails
    pub fn trains_once() -> Box<dyn Forecaster> {
        Box::new(Self {
            value: None,
            trainable: true,
            train_budget: Some(1),
            trained: false,
            last_known: None,
        })
    }

    /// Training always fails
    pub fn untrainable() -> Box<dyn Forecaster> {
        Box::new(Self {
            value: Some(0.0),
            trainable: false,
            train_budget: None,
            trained: false,
            last_known: None,
        })
    }
}

impl Forecaster for FixedForecaster {
    fn train(&mut self, series: &TrainingSeries) -> Result<()> {
        if !self.trainable || self.train_budget == Some(0) {
            return Err(ForecastError::DataError("training failed".to_string()));
        }
        if let Some(budget) = self.train_budget.as_mut() {
            *budget -= 1;
        }
        self.trained = true;
        self.last_known = series.last_price();
        Ok(())
    }

    fn predict(&self, _input: PredictionInput<'_>) -> Result<f64> {
        if !self.trained {
            return Err(ForecastError::NotTrained("fixed".to_string()));
        }
        self.value
            .ok_or_else(|| ForecastError::DataError("prediction failed".to_string()))
    }

    fn last_known(&self) -> Option<f64> {
        self.last_known
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Daily series whose last price is `last`
pub fn series_ending_at(last: f64) -> TrainingSeries {
    let mut prices: Vec<f64> = (0..40).map(|i| 2000.0 + i as f64 * 10.0).collect();
    prices.push(last);
    TrainingSeries::from_daily_prices(start_date(), prices).unwrap()
}

pub fn engine_with(seasonal: Box<dyn Forecaster>, shock: Box<dyn Forecaster>) -> HybridFusionEngine {
    HybridFusionEngine::with_forecasters(EngineConfig::default(), seasonal, shock).unwrap()
}

/// Small federated configuration that trains quickly
pub fn quick_federated_config() -> FederatedConfig {
    FederatedConfig {
        days: 120,
        window: 10,
        forecast_horizon: 12,
        hidden_units: 4,
        epochs: 2,
        ..FederatedConfig::default()
    }
}
