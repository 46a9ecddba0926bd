//! Synthetic regional price series
//!
//! `price = base + amplitude·sin(2π·day/days + phase) + region bias + noise`,
//! rounded to two decimals. One seeded generator is drawn from sequentially,
//! region by region in canonical order, so a run is fully reproducible.

use crate::config::FederatedConfig;
use crate::crop::CropProfile;
use crate::error::{ForecastError, Result};
use crate::federated::Region;
use crate::series::TrainingSeries;
use crate::utils::round_money;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Raw daily prices per region
pub fn regional_prices(profile: &CropProfile, config: &FederatedConfig) -> Result<BTreeMap<Region, Vec<f64>>> {
    let amplitude = profile.seasonal_amplitude * profile.base_price;
    let noise = Normal::new(0.0, profile.noise_scale * profile.base_price)
        .map_err(|e| ForecastError::InvalidParameter(format!("noise distribution: {}", e)))?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut prices = BTreeMap::new();
    for region in Region::ALL {
        let series: Vec<f64> = (0..config.days)
            .map(|day| {
                let seasonal = amplitude * (2.0 * PI * day as f64 / config.days as f64 + profile.phase).sin();
                round_money(profile.base_price + seasonal + region.bias() + noise.sample(&mut rng))
            })
            .collect();
        prices.insert(region, series);
    }

    Ok(prices)
}

/// Regional prices as dated training series
pub fn generate_regional_data(
    profile: &CropProfile,
    config: &FederatedConfig,
) -> Result<BTreeMap<Region, TrainingSeries>> {
    regional_prices(profile, config)?
        .into_iter()
        .map(|(region, prices)| -> Result<(Region, TrainingSeries)> {
            Ok((region, TrainingSeries::from_daily_prices(config.start_date, prices)?))
        })
        .collect()
}
