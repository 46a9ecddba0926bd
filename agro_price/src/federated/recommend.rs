//! Best-region selection from near-term forecasts

use crate::crop::Crop;
use crate::error::{ForecastError, Result};
use crate::federated::{Region, RegionForecast};
use crate::utils::{round_money, serialize_money};
use agro_math::stats::mean_of_first;
use serde::Serialize;
use std::collections::BTreeMap;

/// Where to sell, and by how much it beats the current price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRecommendation {
    pub crop: Crop,
    pub current_location: Region,
    pub current_price: f64,
    pub best_region: Region,
    #[serde(serialize_with = "serialize_money")]
    pub expected_avg_price: f64,
    /// `round2(expected_avg_price - current_price)`
    pub price_difference: f64,
    pub all_region_averages: BTreeMap<Region, f64>,
    pub recommendation: String,
}

impl RegionRecommendation {
    pub fn is_current_optimal(&self) -> bool {
        self.best_region == self.current_location
    }
}

/// Mean of each region's first `days` forecast values, rounded to two decimals
pub fn near_term_averages(
    forecasts: &BTreeMap<Region, RegionForecast>,
    days: usize,
) -> Result<BTreeMap<Region, f64>> {
    forecasts
        .iter()
        .map(|(region, forecast)| -> Result<(Region, f64)> {
            Ok((*region, round_money(mean_of_first(&forecast.forecast, days)?)))
        })
        .collect()
}

/// Pick the region with the highest near-term average.
///
/// Ties go to the earliest region in canonical order.
pub fn recommend(
    crop: Crop,
    averages: &BTreeMap<Region, f64>,
    current_price: f64,
    current_region: Region,
) -> Result<RegionRecommendation> {
    let mut best: Option<(Region, f64)> = None;
    for (region, average) in averages {
        match best {
            Some((_, top)) if *average <= top => {}
            _ => best = Some((*region, *average)),
        }
    }
    let (best_region, expected_avg_price) = best.ok_or_else(|| {
        ForecastError::DataError("No regional averages to compare".to_string())
    })?;

    let recommendation = if best_region == current_region {
        "Current location is optimal for selling".to_string()
    } else {
        format!("Sell in {} for higher expected returns", best_region)
    };

    Ok(RegionRecommendation {
        crop,
        current_location: current_region,
        current_price,
        best_region,
        expected_avg_price,
        price_difference: round_money(expected_avg_price - current_price),
        all_region_averages: averages.clone(),
        recommendation,
    })
}
