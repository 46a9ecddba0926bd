//! Hybrid fusion of the seasonal and shock forecasters
//!
//! The engine owns one seasonal and one shock [`Forecaster`]. Each request
//! asks both for a value; a failing sub-model is replaced by its last known
//! price (or, failing that, the last price of the training series) and the
//! substitution is recorded as [`PredictionOutcome::FallbackUsed`]. Fusion
//! only fails when no training has ever succeeded.

use crate::analytics::Analytics;
use crate::attribution::{explain, AttributionRecord};
use crate::config::EngineConfig;
use crate::crop::{title_case, Crop};
use crate::error::{ForecastError, Result};
use crate::models::{
    Forecaster, HarmonicTrend, ModelForecaster, PredictionInput, WindowNet, WindowNetParams,
};
use crate::series::TrainingSeries;
use crate::utils::serialize_money;
use serde::Serialize;
use tracing::{debug, info, warn};

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Fixed fusion weights; non-negative and summing to one
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionWeights {
    seasonal: f64,
    shock: f64,
}

impl FusionWeights {
    pub fn new(seasonal: f64, shock: f64) -> Result<Self> {
        if seasonal < 0.0 || shock < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Fusion weights must be non-negative".to_string(),
            ));
        }
        if (seasonal + shock - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ForecastError::InvalidParameter(format!(
                "Fusion weights must sum to 1.0, got {} + {}",
                seasonal, shock
            )));
        }

        Ok(Self { seasonal, shock })
    }

    pub fn seasonal(&self) -> f64 {
        self.seasonal
    }

    pub fn shock(&self) -> f64 {
        self.shock
    }

    /// `seasonal * w_seasonal + shock * w_shock`
    pub fn combine(&self, seasonal: f64, shock: f64) -> f64 {
        seasonal * self.seasonal + shock * self.shock
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            seasonal: 0.7,
            shock: 0.3,
        }
    }
}

/// How the two sub-model values become one price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FusionMode {
    /// Weighted sum of the two predicted prices
    Absolute,
    /// Weighted sum of the predicted/last-known multipliers applied to a
    /// live market price, scaled by an advisory bias
    LiveRebased { live_base: f64, advisory_bias: f64 },
}

/// Result of asking one sub-model for a value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Predicted {
        #[serde(serialize_with = "serialize_money")]
        value: f64,
    },
    FallbackUsed {
        #[serde(serialize_with = "serialize_money")]
        value: f64,
        cause: String,
    },
}

impl PredictionOutcome {
    pub fn value(&self) -> f64 {
        match self {
            PredictionOutcome::Predicted { value } | PredictionOutcome::FallbackUsed { value, .. } => *value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, PredictionOutcome::FallbackUsed { .. })
    }
}

/// Fused price snapshot, produced fresh per request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionResult {
    pub crop_id: String,
    pub crop_name: String,
    #[serde(flatten)]
    pub mode: FusionMode,
    pub seasonal: PredictionOutcome,
    pub shock: PredictionOutcome,
    pub weights: FusionWeights,
    #[serde(serialize_with = "serialize_money")]
    pub fused_price: f64,
    /// Set only when a sub-model fell back
    #[serde(serialize_with = "serialize_optional_money")]
    pub last_known_price: Option<f64>,
    pub attribution: AttributionRecord,
}

impl FusionResult {
    pub fn used_fallback(&self) -> bool {
        self.seasonal.is_fallback() || self.shock.is_fallback()
    }
}

fn serialize_optional_money<S: serde::Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(v) => serialize_money(v, serializer),
        None => serializer.serialize_none(),
    }
}

/// Which sub-models completed a training pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrainingSummary {
    pub observations: usize,
    pub seasonal_trained: bool,
    pub shock_trained: bool,
}

/// Sub-model values and fused price before annotation
#[derive(Debug, Clone, PartialEq)]
pub struct FusedPrices {
    pub seasonal: PredictionOutcome,
    pub shock: PredictionOutcome,
    pub fused_price: f64,
    pub last_known: f64,
}

/// Seasonal + shock fusion engine
#[derive(Debug)]
pub struct HybridFusionEngine {
    config: EngineConfig,
    weights: FusionWeights,
    seasonal: Box<dyn Forecaster>,
    shock: Box<dyn Forecaster>,
    series: Option<TrainingSeries>,
}

impl HybridFusionEngine {
    /// Engine with the default harmonic seasonal model and window-net shock model
    pub fn new(config: EngineConfig) -> Result<Self> {
        let seasonal = ModelForecaster::new(HarmonicTrend::new(config.fourier_order)?);
        let shock = ModelForecaster::new(WindowNet::new(WindowNetParams::shock(&config))?);

        Self::with_forecasters(config, Box::new(seasonal), Box::new(shock))
    }

    /// Engine over caller-supplied forecasters
    pub fn with_forecasters(
        config: EngineConfig,
        seasonal: Box<dyn Forecaster>,
        shock: Box<dyn Forecaster>,
    ) -> Result<Self> {
        config.validate()?;
        let weights = FusionWeights::new(config.seasonal_weight, config.shock_weight)?;

        Ok(Self {
            config,
            weights,
            seasonal,
            shock,
            series: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// The series of the last successful training pass
    pub fn series(&self) -> Option<&TrainingSeries> {
        self.series.as_ref()
    }

    /// Last price of the training series
    pub fn last_known(&self) -> Option<f64> {
        self.series.as_ref().and_then(TrainingSeries::last_price)
    }

    /// Whether at least one sub-model has been trained
    pub fn is_trained(&self) -> bool {
        self.seasonal.is_trained() || self.shock.is_trained()
    }

    /// Train both sub-models on `series`.
    ///
    /// One failing sub-model is logged and left to the fallback chain; the
    /// call fails only when both fail, in which case the engine keeps its
    /// previous state.
    pub fn train(&mut self, series: TrainingSeries) -> Result<TrainingSummary> {
        if series.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot train on an empty series".to_string(),
            ));
        }

        let seasonal = self.seasonal.train(&series);
        let shock = self.shock.train(&series);

        let summary = TrainingSummary {
            observations: series.len(),
            seasonal_trained: seasonal.is_ok(),
            shock_trained: shock.is_ok(),
        };

        match (seasonal, shock) {
            (Err(err), Err(_)) => return Err(err),
            (Err(err), Ok(())) => warn!(model = self.seasonal.name(), error = %err, "seasonal training failed"),
            (Ok(()), Err(err)) => warn!(model = self.shock.name(), error = %err, "shock training failed"),
            (Ok(()), Ok(())) => {}
        }

        info!(
            observations = summary.observations,
            seasonal = summary.seasonal_trained,
            shock = summary.shock_trained,
            "hybrid engine trained"
        );
        self.series = Some(series);
        Ok(summary)
    }

    /// Ask one sub-model for a value, falling back to a last-known price
    fn predict_with_fallback(
        forecaster: &dyn Forecaster,
        input: PredictionInput<'_>,
        engine_last_known: f64,
    ) -> PredictionOutcome {
        match forecaster.predict(input) {
            Ok(value) if value.is_finite() => PredictionOutcome::Predicted { value },
            Ok(value) => Self::fallback(forecaster, engine_last_known, format!("non-finite prediction {}", value)),
            Err(err) => Self::fallback(forecaster, engine_last_known, err.to_string()),
        }
    }

    /// The substitute is always the engine's current last price; a sub-model's
    /// own snapshot may predate a retrain it failed.
    fn fallback(forecaster: &dyn Forecaster, engine_last_known: f64, cause: String) -> PredictionOutcome {
        let value = engine_last_known;
        warn!(model = forecaster.name(), %cause, fallback = value, "sub-model prediction replaced by last known price");
        PredictionOutcome::FallbackUsed { value, cause }
    }

    /// Compute both sub-model values and the fused price
    pub fn fuse(&self, mode: FusionMode) -> Result<FusedPrices> {
        let (series, last_known) = match (&self.series, self.last_known()) {
            (Some(series), Some(last)) if self.is_trained() => (series, last),
            _ => {
                return Err(ForecastError::NotTrained(
                    "Hybrid engine has no trained sub-model and no last known price".to_string(),
                ))
            }
        };

        let horizon = match mode {
            FusionMode::Absolute => 1,
            FusionMode::LiveRebased { .. } => self.config.live_seasonal_horizon,
        };
        let recent = series.recent_prices(self.config.shock_window);

        let seasonal = Self::predict_with_fallback(
            self.seasonal.as_ref(),
            PredictionInput::Horizon(horizon),
            last_known,
        );
        let shock = Self::predict_with_fallback(
            self.shock.as_ref(),
            PredictionInput::Window(&recent),
            last_known,
        );

        let fused_price = match mode {
            FusionMode::Absolute => self.weights.combine(seasonal.value(), shock.value()),
            FusionMode::LiveRebased {
                live_base,
                advisory_bias,
            } => {
                let multiplier = |value: f64| if last_known > 0.0 { value / last_known } else { 1.0 };
                live_base
                    * self
                        .weights
                        .combine(multiplier(seasonal.value()), multiplier(shock.value()))
                    * advisory_bias
            }
        };
        debug!(
            seasonal = seasonal.value(),
            shock = shock.value(),
            fused = fused_price,
            "fused prediction"
        );

        Ok(FusedPrices {
            seasonal,
            shock,
            fused_price,
            last_known,
        })
    }

    fn annotate(&self, crop_id: &str, mode: FusionMode, fused: FusedPrices) -> Result<FusionResult> {
        let series = self
            .series
            .as_ref()
            .ok_or_else(|| ForecastError::NotTrained("Hybrid engine has no training series".to_string()))?;
        let attribution = explain(fused.seasonal.value(), fused.shock.value(), series);
        let fell_back = fused.seasonal.is_fallback() || fused.shock.is_fallback();

        Ok(FusionResult {
            crop_id: crop_id.to_string(),
            crop_name: crop_display_name(crop_id),
            mode,
            seasonal: fused.seasonal,
            shock: fused.shock,
            weights: self.weights,
            fused_price: fused.fused_price,
            last_known_price: fell_back.then_some(fused.last_known),
            attribution,
        })
    }

    /// Absolute-mode prediction
    pub fn predict(&self, crop_id: &str) -> Result<FusionResult> {
        let mode = FusionMode::Absolute;
        let fused = self.fuse(mode)?;
        self.annotate(crop_id, mode, fused)
    }

    /// Live-rebased prediction anchored on `current_price`
    pub fn predict_hybrid(&self, crop_id: &str, current_price: f64, advisory_bias: f64) -> Result<FusionResult> {
        if !(current_price.is_finite() && current_price > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Current price must be a positive number, got {}",
                current_price
            )));
        }
        if !(advisory_bias.is_finite() && advisory_bias > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Advisory bias must be a positive number, got {}",
                advisory_bias
            )));
        }

        let mode = FusionMode::LiveRebased {
            live_base: current_price,
            advisory_bias,
        };
        let fused = self.fuse(mode)?;
        self.annotate(crop_id, mode, fused)
    }

    /// Divergence analytics for the absolute-mode values
    pub fn analytics(&self) -> Result<Analytics> {
        let fused = self.fuse(FusionMode::Absolute)?;

        Ok(Analytics::new(
            fused.seasonal.value(),
            fused.shock.value(),
            self.config.shock_alert_percent,
            self.series.as_ref().map_or(0, TrainingSeries::len),
            self.config.shock_window,
            self.weights,
        ))
    }
}

/// Catalogue name, or the title-cased input for crops outside it
fn crop_display_name(crop_id: &str) -> String {
    Crop::resolve(crop_id)
        .map(|crop| crop.display_name().to_string())
        .unwrap_or_else(|| title_case(crop_id))
}
