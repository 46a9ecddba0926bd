//! Divergence analytics between the seasonal and shock forecasts

use crate::fusion::FusionWeights;
use crate::utils::serialize_money;
use serde::Serialize;

/// Relative divergence of the shock forecast from the seasonal one, in
/// percent. Zero when the seasonal value is zero.
pub fn deviation_percent(seasonal: f64, shock: f64) -> f64 {
    if seasonal == 0.0 {
        return 0.0;
    }
    (shock - seasonal).abs() / seasonal.abs() * 100.0
}

/// Alert when the deviation strictly exceeds the threshold
pub fn shock_alert(deviation: f64, threshold_percent: f64) -> bool {
    deviation > threshold_percent
}

/// `100 - deviation`, clamped to `[0, 100]`
pub fn confidence_score(deviation: f64) -> f64 {
    (100.0 - deviation).clamp(0.0, 100.0)
}

/// Model metadata returned alongside predictions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    #[serde(serialize_with = "serialize_money")]
    pub confidence_score: f64,
    pub shock_alert: bool,
    #[serde(serialize_with = "serialize_money")]
    pub deviation_percent: f64,
    #[serde(serialize_with = "serialize_money")]
    pub seasonal_value: f64,
    #[serde(serialize_with = "serialize_money")]
    pub shock_value: f64,
    pub data_points_used: usize,
    pub shock_window_days: usize,
    pub weights: FusionWeights,
}

impl Analytics {
    pub fn new(
        seasonal: f64,
        shock: f64,
        alert_threshold: f64,
        data_points_used: usize,
        shock_window_days: usize,
        weights: FusionWeights,
    ) -> Self {
        let deviation = deviation_percent(seasonal, shock);

        Self {
            confidence_score: confidence_score(deviation),
            shock_alert: shock_alert(deviation, alert_threshold),
            deviation_percent: deviation,
            seasonal_value: seasonal,
            shock_value: shock,
            data_points_used,
            shock_window_days,
            weights,
        }
    }
}
