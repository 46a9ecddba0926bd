//! Heuristic explanation of a fused prediction
//!
//! The explainer compares the two sub-model outputs and scans the training
//! series' auxiliary columns for input anomalies, then picks exactly one
//! natural-language insight.

use crate::series::{TrainingSeries, DEMAND_COLUMN, RAINFALL_COLUMN};
use crate::utils::serialize_ratio;
use agro_math::round_to;
use serde::{Serialize, Serializer};
use statrs::statistics::Statistics;
use std::fmt;

const RAINFALL_DEFICIT_RATIO: f64 = 0.80;
const DEMAND_SURGE_RATIO: f64 = 1.20;
const SIGNIFICANT_SHOCK_FACTOR: f64 = 0.15;

/// Input anomaly found in an auxiliary column
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// Latest rainfall below 80% of the column mean
    LowPrecipitation { deficit_pct: f64 },
    /// Latest demand above 120% of the column mean
    HighDemandVolatility,
}

impl Anomaly {
    pub fn label(&self) -> &'static str {
        match self {
            Anomaly::LowPrecipitation { .. } => "Low Precipitation",
            Anomaly::HighDemandVolatility => "High Demand Volatility",
        }
    }

    /// Fragment used in the insight sentence
    pub fn cause(&self) -> String {
        match self {
            Anomaly::LowPrecipitation { deficit_pct } => {
                format!("{:.1}% rainfall deficit", deficit_pct)
            }
            Anomaly::HighDemandVolatility => "high demand volatility".to_string(),
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Explainability annotation of one fused prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionRecord {
    /// `|shock - seasonal| / |seasonal|`, rounded to 4 decimals
    #[serde(serialize_with = "serialize_ratio")]
    pub shock_factor: f64,
    /// `1 - shock_factor`
    #[serde(serialize_with = "serialize_ratio")]
    pub seasonal_contribution: f64,
    #[serde(rename = "anomaly_detected", serialize_with = "serialize_labels")]
    pub anomalies: Vec<Anomaly>,
    pub insight: String,
}

impl AttributionRecord {
    /// Anomaly labels joined by `", "`, or `"None"`
    pub fn anomaly_detected(&self) -> String {
        anomaly_summary(&self.anomalies)
    }
}

fn anomaly_summary(anomalies: &[Anomaly]) -> String {
    if anomalies.is_empty() {
        return "None".to_string();
    }
    anomalies
        .iter()
        .map(Anomaly::label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn serialize_labels<S: Serializer>(anomalies: &[Anomaly], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&anomaly_summary(anomalies))
}

/// Shock factor rounded to 4 decimals; zero when the seasonal value is zero
pub fn shock_factor(seasonal: f64, shock: f64) -> f64 {
    if seasonal == 0.0 {
        return 0.0;
    }
    round_to((shock - seasonal).abs() / seasonal.abs(), 4)
}

/// Latest row value and mean of the finite values of a column.
///
/// `None` when the column is absent or the latest reading is missing.
fn latest_and_mean(series: &TrainingSeries, column: &str) -> Option<(f64, f64)> {
    let latest = series.latest_value(column).filter(|v| v.is_finite())?;
    let values = series.column(column)?;
    Some((latest, values.iter().mean()))
}

/// Scan the auxiliary columns for input anomalies
pub fn detect_anomalies(series: &TrainingSeries) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    if let Some((recent, mean)) = latest_and_mean(series, RAINFALL_COLUMN) {
        if mean > 0.0 && recent < RAINFALL_DEFICIT_RATIO * mean {
            anomalies.push(Anomaly::LowPrecipitation {
                deficit_pct: round_to((1.0 - recent / mean) * 100.0, 1),
            });
        }
    }

    if let Some((recent, mean)) = latest_and_mean(series, DEMAND_COLUMN) {
        if mean > 0.0 && recent > DEMAND_SURGE_RATIO * mean {
            anomalies.push(Anomaly::HighDemandVolatility);
        }
    }

    anomalies
}

/// Build the attribution record for a seasonal/shock pair
pub fn explain(seasonal: f64, shock: f64, series: &TrainingSeries) -> AttributionRecord {
    let factor = shock_factor(seasonal, shock);
    let anomalies = detect_anomalies(series);
    let direction = if shock >= seasonal { "increase" } else { "decrease" };

    let insight = if !anomalies.is_empty() {
        let causes: Vec<String> = anomalies.iter().map(Anomaly::cause).collect();
        format!("Price {} driven by {}.", direction, causes.join(" and "))
    } else if factor > SIGNIFICANT_SHOCK_FACTOR {
        format!(
            "Significant short-term price {} detected (shock factor {:.1}%). \
             No single input anomaly identified; likely a combination of minor market shifts.",
            direction,
            factor * 100.0
        )
    } else {
        "Price is within normal seasonal expectations. No significant anomalies detected."
            .to_string()
    };

    AttributionRecord {
        shock_factor: factor,
        seasonal_contribution: 1.0 - factor,
        anomalies,
        insight,
    }
}
