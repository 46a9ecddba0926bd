//! Simulated federated training across regional markets
//!
//! Each run generates one synthetic series per region, trains an
//! independent [`WindowNet`] per region in parallel, averages the regional
//! parameters (FedAvg) once every region has finished, and rolls the
//! averaged model forward from each region's latest window. Raw regional
//! prices never leave their region's training task.

use crate::config::FederatedConfig;
use crate::crop::{Crop, CropProfile};
use crate::error::{ForecastError, Result};
use crate::models::{Forecaster, ModelForecaster, ModelWeights, TrainedWindowNet, WindowNet, WindowNetParams};
use crate::series::TrainingSeries;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

pub mod aggregate;
pub mod forecast;
pub mod pipeline;
pub mod recommend;
pub mod region;
pub mod synthetic;

pub use aggregate::federated_average;
pub use forecast::{forecast_regions, RegionForecast};
pub use pipeline::{PipelineRun, PipelineStage};
pub use recommend::{near_term_averages, recommend, RegionRecommendation};
pub use region::Region;
pub use synthetic::{generate_regional_data, regional_prices};

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FederatedReport {
    pub crop: Crop,
    pub regions: BTreeMap<Region, RegionForecast>,
    /// Number of averaged parameter tensors
    pub layers: usize,
    pub stages: Vec<PipelineStage>,
}

/// Runs the federated pipeline for one crop at a time
#[derive(Debug, Clone)]
pub struct RegionalFederatedAggregator {
    config: FederatedConfig,
}

impl RegionalFederatedAggregator {
    pub fn new(config: FederatedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FederatedConfig {
        &self.config
    }

    fn model(&self) -> Result<WindowNet> {
        WindowNet::new(WindowNetParams::federated(&self.config))
    }

    /// Train one fresh model per region on that region's data only.
    ///
    /// All regions start from the same seeded initialisation. The call
    /// returns once every region has finished, or with the first error.
    pub fn train_local_models(
        &self,
        data: &BTreeMap<Region, TrainingSeries>,
    ) -> Result<BTreeMap<Region, ModelWeights>> {
        let model = self.model()?;

        data.par_iter()
            .map(|(region, series)| -> Result<(Region, ModelWeights)> {
                let mut forecaster = ModelForecaster::new(model.clone());
                forecaster.train(series)?;
                let weights = forecaster
                    .trained()
                    .map(TrainedWindowNet::weights)
                    .ok_or_else(|| ForecastError::NotTrained(format!("{} local model", region)))?;
                info!(
                    region = %region,
                    samples = series.len().saturating_sub(self.config.window),
                    "local model trained"
                );
                Ok((*region, weights))
            })
            .collect()
    }

    /// Execute every stage for `crop_id`
    pub fn run_pipeline(&self, crop_id: &str) -> Result<FederatedReport> {
        let (crop, profile) = Crop::resolve_federated(crop_id)?;
        self.run_for(crop, &profile)
    }

    fn run_for(&self, crop: Crop, profile: &CropProfile) -> Result<FederatedReport> {
        let mut run = PipelineRun::start(crop);

        let data = generate_regional_data(profile, &self.config)?;
        info!(records = data.values().map(TrainingSeries::len).sum::<usize>(), "synthetic records generated");
        run.advance(PipelineStage::DataGenerated)?;

        let local = self.train_local_models(&data)?;
        run.advance(PipelineStage::LocallyTrained)?;

        let regional: Vec<ModelWeights> = local.into_values().collect();
        let global = federated_average(&regional)?;
        info!(layers = global.len(), regions = regional.len(), "federated averaging complete");
        run.advance(PipelineStage::Averaged)?;

        let model = TrainedWindowNet::from_weights("Federated global model", &global)?;
        let regions = forecast_regions(&model, &data, self.config.forecast_horizon)?;
        run.advance(PipelineStage::Forecasted)?;

        run.advance(PipelineStage::Done)?;
        Ok(FederatedReport {
            crop,
            regions,
            layers: global.len(),
            stages: run.into_trail(),
        })
    }

    /// Run the pipeline and compare near-term regional averages with the
    /// seller's current price and location
    pub fn recommend_best_region(
        &self,
        crop_id: &str,
        current_price: f64,
        current_location: &str,
    ) -> Result<RegionRecommendation> {
        let (crop, profile) = Crop::resolve_federated(crop_id)?;
        let current_region = Region::parse(current_location)?;
        if !(current_price.is_finite() && current_price >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Current price must be a non-negative number, got {}",
                current_price
            )));
        }

        let report = self.run_for(crop, &profile)?;
        let averages = near_term_averages(&report.regions, self.config.recommendation_days)?;
        recommend(crop, &averages, current_price, current_region)
    }
}
