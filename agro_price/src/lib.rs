//! # Agro Price
//!
//! Crop price forecasting for the farmer dashboard.
//!
//! ## Features
//!
//! - Hybrid fusion of a seasonal trend forecaster and a short-horizon shock
//!   forecaster, with a last-known-price fallback chain
//! - Live rebasing of the fused forecast onto a market quote
//! - Agronomic advisory rules that bias prices on risky weather
//! - Heuristic attribution of every prediction (shock factor, input anomalies)
//! - Simulated federated training across regional markets (FedAvg) with
//!   autoregressive regional forecasts and a best-region recommendation
//! - A what-if profit simulator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agro_price::{AppConfig, AppContext, StaticMarketQuote, StaticWeather};
//! use std::sync::Arc;
//!
//! fn main() -> agro_price::Result<()> {
//!     agro_price::logging::init();
//!
//!     let context = AppContext::new(
//!         AppConfig::default(),
//!         Arc::new(StaticMarketQuote::default()),
//!         Arc::new(StaticWeather::default()),
//!     )?;
//!     context.bootstrap_demo()?;
//!
//!     let prediction = context.get_prediction("rubber")?;
//!     println!("{}", serde_json::to_string_pretty(&prediction)?);
//!
//!     let recommendation = context.recommend_best_region("rubber", 160.0, "Kottayam")?;
//!     println!("{}", recommendation.recommendation);
//!     Ok(())
//! }
//! ```

pub mod advisory;
pub mod analytics;
pub mod attribution;
pub mod config;
pub mod crop;
pub mod error;
pub mod federated;
pub mod fusion;
pub mod live;
pub mod logging;
pub mod models;
pub mod series;
pub mod service;
pub mod simulation;
pub mod utils;

// Re-export commonly used types
pub use crate::advisory::{AdvisoryResult, AgronomicAdvisoryEngine, WeatherSnapshot};
pub use crate::analytics::Analytics;
pub use crate::attribution::{AttributionRecord, Anomaly};
pub use crate::config::{AppConfig, EngineConfig, FederatedConfig};
pub use crate::crop::Crop;
pub use crate::error::{ForecastError, Result};
pub use crate::federated::{FederatedReport, Region, RegionRecommendation, RegionalFederatedAggregator};
pub use crate::fusion::{FusionMode, FusionResult, FusionWeights, HybridFusionEngine, PredictionOutcome};
pub use crate::live::{LiveMarketQuote, LiveWeather, MarketSnapshot, StaticMarketQuote, StaticWeather};
pub use crate::models::{Forecaster, PredictionInput};
pub use crate::series::TrainingSeries;
pub use crate::service::{AppContext, LivePrediction};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
