//! Application context
//!
//! [`AppContext`] is built once at startup and handed to whatever serves
//! requests. It owns the hybrid engine behind a read/write lock (training
//! excludes predictions, predictions run concurrently with each other), the
//! advisory table, the federated aggregator and the live-data collaborators.

use crate::advisory::{AdvisoryResult, AgronomicAdvisoryEngine, WeatherSnapshot};
use crate::analytics::Analytics;
use crate::config::AppConfig;
use crate::crop::Crop;
use crate::error::Result;
use crate::federated::{FederatedReport, RegionRecommendation, RegionalFederatedAggregator};
use crate::fusion::{FusionResult, HybridFusionEngine, TrainingSummary};
use crate::live::{LiveMarketQuote, LiveWeather, MarketSnapshot};
use crate::series::{demo_series, TrainingSeries};
use crate::simulation::{simulate_profit, SimulationInputs, SimulationOutcome, FALLBACK_PRICE};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Length of the bundled demo series (three years of daily prices)
pub const DEMO_DAYS: usize = 3 * 365;

/// Result of a live prediction request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LivePrediction {
    /// The market returned no records for the crop
    NoLiveData { crop_id: String },
    Predicted {
        quote: MarketSnapshot,
        /// Absent when the weather could not be fetched
        advisory: Option<AdvisoryResult>,
        result: FusionResult,
    },
}

/// Profit simulation with the base price it used
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub crop_id: String,
    pub live_price_used: bool,
    pub inputs: SimulationInputs,
    pub simulation: SimulationOutcome,
}

/// Shared state of a running service
pub struct AppContext {
    config: AppConfig,
    engine: RwLock<HybridFusionEngine>,
    advisory: AgronomicAdvisoryEngine,
    federated: RegionalFederatedAggregator,
    market: Arc<dyn LiveMarketQuote>,
    weather: Arc<dyn LiveWeather>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("trained", &self.engine.read().is_trained())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Context with the default engine
    pub fn new(
        config: AppConfig,
        market: Arc<dyn LiveMarketQuote>,
        weather: Arc<dyn LiveWeather>,
    ) -> Result<Self> {
        let engine = HybridFusionEngine::new(config.engine.clone())?;
        Self::with_engine(config, engine, market, weather)
    }

    /// Context around an already constructed engine
    pub fn with_engine(
        config: AppConfig,
        engine: HybridFusionEngine,
        market: Arc<dyn LiveMarketQuote>,
        weather: Arc<dyn LiveWeather>,
    ) -> Result<Self> {
        config.validate()?;
        let federated = RegionalFederatedAggregator::new(config.federated.clone())?;

        Ok(Self {
            config,
            engine: RwLock::new(engine),
            advisory: AgronomicAdvisoryEngine::new(),
            federated,
            market,
            weather,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Retrain the hybrid engine; blocks until in-flight predictions finish
    pub fn train(&self, series: TrainingSeries) -> Result<TrainingSummary> {
        self.engine.write().train(series)
    }

    /// Train on the bundled synthetic series
    pub fn bootstrap_demo(&self) -> Result<TrainingSummary> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN);
        let series = demo_series(DEMO_DAYS, start, self.config.engine.seed)?;
        info!(days = DEMO_DAYS, "training on synthetic demo series");
        self.train(series)
    }

    pub fn is_trained(&self) -> bool {
        self.engine.read().is_trained()
    }

    /// Absolute-mode prediction against the training baseline
    pub fn get_prediction(&self, crop_id: &str) -> Result<FusionResult> {
        self.engine.read().predict(crop_id)
    }

    /// Live-rebased prediction
    pub fn predict_hybrid(&self, crop_id: &str, current_price: f64, advisory_bias: f64) -> Result<FusionResult> {
        self.engine
            .read()
            .predict_hybrid(crop_id, current_price, advisory_bias)
    }

    pub fn get_analytics(&self) -> Result<Analytics> {
        self.engine.read().analytics()
    }

    pub fn evaluate_advisory(&self, crop_id: &str, weather: &WeatherSnapshot) -> AdvisoryResult {
        self.advisory.evaluate(crop_id, weather)
    }

    pub fn run_federated_pipeline(&self, crop_id: &str) -> Result<FederatedReport> {
        self.federated.run_pipeline(crop_id)
    }

    pub fn recommend_best_region(
        &self,
        crop_id: &str,
        current_price: f64,
        current_region: &str,
    ) -> Result<RegionRecommendation> {
        self.federated
            .recommend_best_region(crop_id, current_price, current_region)
    }

    /// Fetch quote and weather concurrently, apply the advisory bias and
    /// rebase the fused forecast on the live average price.
    ///
    /// A weather failure only drops the advisory (bias 1.0); a quote with no
    /// records yields [`LivePrediction::NoLiveData`].
    pub async fn predict_live(&self, crop_id: &str, lat: f64, lon: f64) -> Result<LivePrediction> {
        let (quote, weather) = tokio::join!(self.market.fetch(crop_id), self.weather.fetch(lat, lon));
        let quote = quote?;

        if !quote.has_data() {
            info!(crop = crop_id, "no live market records");
            return Ok(LivePrediction::NoLiveData {
                crop_id: Crop::normalize(crop_id),
            });
        }

        let advisory = match weather {
            Ok(snapshot) => Some(self.advisory.evaluate(crop_id, &snapshot)),
            Err(err) => {
                warn!(crop = crop_id, error = %err, "weather unavailable, advisory skipped");
                None
            }
        };
        let bias = advisory.as_ref().map_or(1.0, |a| a.bias);
        let result = self.predict_hybrid(crop_id, quote.avg_price, bias)?;

        Ok(LivePrediction::Predicted {
            quote,
            advisory,
            result,
        })
    }

    /// Profit simulation on the live average price, or the fallback price
    /// when the market has no data or cannot be reached
    pub async fn simulate(&self, crop_id: &str, inputs: SimulationInputs) -> Result<SimulationReport> {
        inputs.validate()?;

        let base_price = match self.market.fetch(crop_id).await {
            Ok(quote) if quote.has_data() => Some(quote.avg_price),
            Ok(_) => None,
            Err(err) => {
                warn!(crop = crop_id, error = %err, "live price fetch failed, using fallback");
                None
            }
        };
        let simulation = simulate_profit(base_price.unwrap_or(FALLBACK_PRICE), &inputs)?;

        Ok(SimulationReport {
            crop_id: crop_id.trim().to_lowercase(),
            live_price_used: base_price.is_some(),
            inputs,
            simulation,
        })
    }
}
