//! Seasonal trend model: linear drift plus yearly Fourier harmonics

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::series::TrainingSeries;
use crate::utils::days_between;
use agro_math::least_squares;
use std::f64::consts::PI;

const DAYS_PER_YEAR: f64 = 365.25;
const MAX_ORDER: usize = 10;

/// Linear trend with `order` yearly sine/cosine pairs, fitted by ridge
/// least squares on the day offset from the first observation
#[derive(Debug, Clone)]
pub struct HarmonicTrend {
    name: String,
    order: usize,
    ridge: f64,
}

/// Fitted harmonic trend
#[derive(Debug, Clone)]
pub struct TrainedHarmonicTrend {
    name: String,
    order: usize,
    coefficients: Vec<f64>,
    /// Day offset of the last training observation
    last_day: f64,
}

impl HarmonicTrend {
    /// Create a model with `order` yearly harmonics (1..=10)
    pub fn new(order: usize) -> Result<Self> {
        if order == 0 || order > MAX_ORDER {
            return Err(ForecastError::InvalidParameter(format!(
                "Fourier order must be between 1 and {}",
                MAX_ORDER
            )));
        }

        Ok(Self {
            name: format!("Harmonic Trend (order={})", order),
            order,
            ridge: 1e-6,
        })
    }

    /// Override the ridge penalty
    pub fn with_ridge(mut self, ridge: f64) -> Result<Self> {
        if !(ridge >= 0.0 && ridge.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Ridge penalty must be a non-negative finite number".to_string(),
            ));
        }
        self.ridge = ridge;
        Ok(self)
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

fn features(day: f64, order: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + 2 * order);
    row.push(1.0);
    row.push(day / DAYS_PER_YEAR);
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * day / DAYS_PER_YEAR;
        row.push(angle.sin());
        row.push(angle.cos());
    }
    row
}

impl ForecastModel for HarmonicTrend {
    type Trained = TrainedHarmonicTrend;

    fn train(&self, data: &TrainingSeries) -> Result<Self::Trained> {
        let prices = data.prices();
        let timestamps = data.timestamps();
        let origin = *timestamps
            .first()
            .ok_or_else(|| ForecastError::DataError("Empty time series data".to_string()))?;

        let days: Vec<f64> = timestamps
            .iter()
            .map(|ts| days_between(origin, *ts))
            .collect();
        let design: Vec<Vec<f64>> = days.iter().map(|day| features(*day, self.order)).collect();
        let coefficients = least_squares(&design, &prices, self.ridge)?;

        Ok(TrainedHarmonicTrend {
            name: self.name.clone(),
            order: self.order,
            coefficients,
            last_day: days.last().copied().unwrap_or(0.0),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedHarmonicTrend {
    /// Fitted value at a day offset from the first training observation
    pub fn value_at(&self, day: f64) -> f64 {
        features(day, self.order)
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, beta)| x * beta)
            .sum()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl TrainedForecastModel for TrainedHarmonicTrend {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be positive".to_string(),
            ));
        }

        let values = (1..=horizon)
            .map(|step| self.value_at(self.last_day + step as f64))
            .collect();

        ForecastResult::new(values, horizon)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn test_recovers_trend_and_cycle() {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let price = |day: f64| 1000.0 + 50.0 * day / DAYS_PER_YEAR + 80.0 * (2.0 * PI * day / DAYS_PER_YEAR).sin();
        let prices: Vec<f64> = (0..730).map(|d| price(d as f64)).collect();
        let series = TrainingSeries::from_daily_prices(start, prices).unwrap();

        let trained = HarmonicTrend::new(2).unwrap().train(&series).unwrap();
        let forecast = trained.forecast(10).unwrap();

        assert_eq!(forecast.horizon(), 10);
        assert_relative_eq!(forecast.values()[0], price(730.0), epsilon = 1e-3);
        assert_relative_eq!(forecast.last().unwrap(), price(739.0), epsilon = 1e-3);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(HarmonicTrend::new(0).is_err());
        assert!(HarmonicTrend::new(MAX_ORDER + 1).is_err());
        assert!(HarmonicTrend::new(1).unwrap().with_ridge(-1.0).is_err());
    }

    #[test]
    fn test_window_input_is_not_supported() {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let series = TrainingSeries::from_daily_prices(start, vec![10.0; 40]).unwrap();
        let trained = HarmonicTrend::new(1).unwrap().train(&series).unwrap();

        assert!(trained.predict_next(&[1.0, 2.0]).is_err());
        assert!(trained.forecast(0).is_err());
    }
}
