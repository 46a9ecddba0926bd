//! Forecasting models and the stateful forecaster contract
//!
//! A [`ForecastModel`] is an untrained configuration that produces an
//! immutable [`TrainedForecastModel`]. [`ModelForecaster`] wraps one of them
//! into the stateful [`Forecaster`] the fusion engine and the federated
//! pipeline drive: it is either untrained or trained, and it remembers the
//! last observed price of its most recent successful training run.

use crate::error::{ForecastError, Result};
use crate::series::TrainingSeries;
use std::fmt::Debug;
use tracing::debug;

pub mod harmonic;
pub mod tensor;
pub mod window_net;

pub use harmonic::{HarmonicTrend, TrainedHarmonicTrend};
pub use tensor::{LayerTensor, ModelWeights};
pub use window_net::{TrainedWindowNet, WindowNet, WindowNetParams};

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    values: Vec<f64>,
    horizon: usize,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizon: usize) -> Result<Self> {
        if values.len() != horizon {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }

        Ok(Self { values, horizon })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Value at the far end of the horizon
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// What a forecaster is asked to predict from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionInput<'a> {
    /// Value `n` days after the last training observation
    Horizon(usize),
    /// Next value following an explicit window of recent prices
    Window(&'a [f64]),
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug + Send + Sync {
    /// Generate forecast for future periods
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// Predict the value that follows `window`
    fn predict_next(&self, window: &[f64]) -> Result<f64> {
        let _ = window;
        Err(ForecastError::InvalidParameter(format!(
            "{} does not accept an input window",
            self.name()
        )))
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a price series
pub trait ForecastModel: Debug + Clone + Send + Sync {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a price series
    fn train(&self, data: &TrainingSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Stateful forecaster driven by the fusion engine
pub trait Forecaster: Debug + Send + Sync {
    /// Train (or retrain) on a series. An empty series is rejected and the
    /// previous state is kept.
    fn train(&mut self, series: &TrainingSeries) -> Result<()>;

    /// Predict one value; fails with `NotTrained` before the first
    /// successful `train`
    fn predict(&self, input: PredictionInput<'_>) -> Result<f64>;

    /// Last observed price of the most recent successful training run
    fn last_known(&self) -> Option<f64>;

    fn is_trained(&self) -> bool;

    fn name(&self) -> &str;
}

/// Untrained or trained model state
#[derive(Debug, Clone)]
pub enum ForecasterState<T> {
    Untrained,
    Trained(T),
}

/// Adapter turning a [`ForecastModel`] into a stateful [`Forecaster`]
#[derive(Debug)]
pub struct ModelForecaster<M: ForecastModel> {
    model: M,
    state: ForecasterState<M::Trained>,
    last_known: Option<f64>,
}

impl<M: ForecastModel> ModelForecaster<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            state: ForecasterState::Untrained,
            last_known: None,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// The trained model, if training has succeeded
    pub fn trained(&self) -> Option<&M::Trained> {
        match &self.state {
            ForecasterState::Untrained => None,
            ForecasterState::Trained(trained) => Some(trained),
        }
    }
}

impl<M: ForecastModel> Forecaster for ModelForecaster<M> {
    fn train(&mut self, series: &TrainingSeries) -> Result<()> {
        if series.is_empty() {
            return Err(ForecastError::DataError(format!(
                "Cannot train {} on an empty series",
                self.model.name()
            )));
        }

        let trained = self.model.train(series)?;
        self.state = ForecasterState::Trained(trained);
        self.last_known = series.last_price();
        debug!(
            model = self.model.name(),
            observations = series.len(),
            "forecaster trained"
        );

        Ok(())
    }

    fn predict(&self, input: PredictionInput<'_>) -> Result<f64> {
        let trained = self
            .trained()
            .ok_or_else(|| ForecastError::NotTrained(self.model.name().to_string()))?;

        match input {
            PredictionInput::Horizon(horizon) => trained.forecast(horizon)?.last().ok_or_else(|| {
                ForecastError::InvalidParameter("Forecast horizon must be positive".to_string())
            }),
            PredictionInput::Window(window) => trained.predict_next(window),
        }
    }

    fn last_known(&self) -> Option<f64> {
        self.last_known
    }

    fn is_trained(&self) -> bool {
        matches!(self.state, ForecasterState::Trained(_))
    }

    fn name(&self) -> &str {
        self.model.name()
    }
}
