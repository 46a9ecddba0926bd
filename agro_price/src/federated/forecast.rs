//! Autoregressive regional forecasts from the averaged model

use crate::error::Result;
use crate::federated::Region;
use crate::models::TrainedWindowNet;
use crate::series::TrainingSeries;
use crate::utils::round_money;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Forecast sequence of one region, rounded to two decimals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionForecast {
    pub forecast: Vec<f64>,
}

/// Roll the shared model forward from each region's latest window.
///
/// Regions run in parallel; steps within a region are sequential. Rounding
/// applies to the published values only, the rolling buffer keeps full
/// precision.
pub fn forecast_regions(
    model: &TrainedWindowNet,
    data: &BTreeMap<Region, TrainingSeries>,
    horizon: usize,
) -> Result<BTreeMap<Region, RegionForecast>> {
    data.par_iter()
        .map(|(region, series)| -> Result<(Region, RegionForecast)> {
            let seed = series.recent_prices(model.window());
            let forecast = model
                .roll_forward(&seed, horizon)?
                .into_iter()
                .map(round_money)
                .collect();
            debug!(region = %region, horizon, "regional forecast complete");
            Ok((*region, RegionForecast { forecast }))
        })
        .collect()
}
