//! Agronomic advisory rules
//!
//! A fixed table maps each crop to one weather rule. When the live weather
//! crosses the rule's threshold the fused price is scaled by the rule's bias
//! (a supply-side risk premium). Crops without a rule, and crop names that
//! cannot be resolved, get a neutral result.

use crate::crop::Crop;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Comparison applied as `actual <op> threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::Less => "<",
            Comparison::GreaterOrEqual => ">=",
            Comparison::LessOrEqual => "<=",
        }
    }

    pub fn apply(self, actual: f64, threshold: f64) -> bool {
        match self {
            Comparison::Greater => actual > threshold,
            Comparison::Less => actual < threshold,
            Comparison::GreaterOrEqual => actual >= threshold,
            Comparison::LessOrEqual => actual <= threshold,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Weather field a rule reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherMetric {
    #[serde(rename = "temp")]
    Temperature,
    Humidity,
    #[serde(rename = "precip")]
    Precipitation,
    Rain,
    WindSpeed,
    #[serde(rename = "rain_24h")]
    Rain24h,
}

impl WeatherMetric {
    pub fn key(self) -> &'static str {
        match self {
            WeatherMetric::Temperature => "temp",
            WeatherMetric::Humidity => "humidity",
            WeatherMetric::Precipitation => "precip",
            WeatherMetric::Rain => "rain",
            WeatherMetric::WindSpeed => "wind_speed",
            WeatherMetric::Rain24h => "rain_24h",
        }
    }

    fn unit(self) -> &'static str {
        match self {
            WeatherMetric::Temperature => "°C",
            WeatherMetric::Humidity => "%",
            WeatherMetric::WindSpeed => "km/h",
            WeatherMetric::Precipitation | WeatherMetric::Rain | WeatherMetric::Rain24h => "mm",
        }
    }
}

/// Live weather at a location; absent fields read as zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSnapshot {
    #[serde(rename = "temp")]
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    #[serde(rename = "precip")]
    pub precipitation: Option<f64>,
    pub rain: Option<f64>,
    pub wind_speed: Option<f64>,
    pub rain_24h: Option<f64>,
}

impl WeatherSnapshot {
    pub fn metric(&self, metric: WeatherMetric) -> f64 {
        let value = match metric {
            WeatherMetric::Temperature => self.temperature,
            WeatherMetric::Humidity => self.humidity,
            WeatherMetric::Precipitation => self.precipitation,
            WeatherMetric::Rain => self.rain,
            WeatherMetric::WindSpeed => self.wind_speed,
            WeatherMetric::Rain24h => self.rain_24h,
        };
        value.unwrap_or(0.0)
    }
}

/// One crop's weather risk rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdvisoryRule {
    pub crop: Crop,
    pub metric: WeatherMetric,
    pub comparison: Comparison,
    pub threshold: f64,
    pub bias: f64,
    pub impact: &'static str,
}

impl AdvisoryRule {
    const fn new(
        crop: Crop,
        metric: WeatherMetric,
        comparison: Comparison,
        threshold: f64,
        bias: f64,
        impact: &'static str,
    ) -> Self {
        Self {
            crop,
            metric,
            comparison,
            threshold,
            bias,
            impact,
        }
    }

    /// e.g. `rain_24h > 20 mm`
    pub fn description(&self) -> String {
        format!(
            "{} {} {} {}",
            self.metric.key(),
            self.comparison,
            self.threshold,
            self.metric.unit()
        )
    }
}

static RULES: [AdvisoryRule; 10] = [
    AdvisoryRule::new(
        Crop::Rubber,
        WeatherMetric::Rain24h,
        Comparison::Greater,
        20.0,
        1.08,
        "Heavy rain halts latex tapping; expect tighter supply and firmer prices.",
    ),
    AdvisoryRule::new(
        Crop::Tea,
        WeatherMetric::Temperature,
        Comparison::Greater,
        32.0,
        1.05,
        "Heat stress slows leaf flush; plucking volumes likely to drop.",
    ),
    AdvisoryRule::new(
        Crop::Coffee,
        WeatherMetric::Humidity,
        Comparison::Greater,
        90.0,
        1.06,
        "High humidity raises berry rot and leaf rust risk.",
    ),
    AdvisoryRule::new(
        Crop::BlackPepper,
        WeatherMetric::Rain24h,
        Comparison::Greater,
        50.0,
        1.07,
        "Waterlogging favours quick wilt; vine losses may cut supply.",
    ),
    AdvisoryRule::new(
        Crop::Cardamom,
        WeatherMetric::Temperature,
        Comparison::GreaterOrEqual,
        31.0,
        1.10,
        "Cardamom capsules abort above 31°C; yield loss expected.",
    ),
    AdvisoryRule::new(
        Crop::Banana,
        WeatherMetric::WindSpeed,
        Comparison::Greater,
        40.0,
        1.12,
        "Strong winds topple bunched plants; arrivals will fall.",
    ),
    AdvisoryRule::new(
        Crop::Coconut,
        WeatherMetric::Precipitation,
        Comparison::LessOrEqual,
        0.5,
        1.04,
        "Dry spell reduces nut set over the coming months.",
    ),
    AdvisoryRule::new(
        Crop::Mango,
        WeatherMetric::Humidity,
        Comparison::GreaterOrEqual,
        85.0,
        1.05,
        "Humid conditions favour anthracnose during flowering.",
    ),
    AdvisoryRule::new(
        Crop::Rice,
        WeatherMetric::Rain24h,
        Comparison::Greater,
        100.0,
        1.09,
        "Flooding of paddy fields threatens standing crop.",
    ),
    AdvisoryRule::new(
        Crop::Tomato,
        WeatherMetric::Temperature,
        Comparison::Greater,
        35.0,
        1.15,
        "Extreme heat causes flower drop and poor fruit set.",
    ),
];

/// Outcome of evaluating a crop against the live weather
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryResult {
    pub crop: String,
    pub triggered: bool,
    pub bias: f64,
    pub message: String,
    /// Rule description, absent when the crop has no rule
    pub rule: Option<String>,
    /// Metric value the rule was evaluated against
    pub actual_value: Option<f64>,
}

impl AdvisoryResult {
    fn neutral(crop: String, message: String) -> Self {
        Self {
            crop,
            triggered: false,
            bias: 1.0,
            message,
            rule: None,
            actual_value: None,
        }
    }
}

/// Stateless evaluator over the fixed rule table
#[derive(Debug, Clone, Copy, Default)]
pub struct AgronomicAdvisoryEngine;

impl AgronomicAdvisoryEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn rules(&self) -> &'static [AdvisoryRule] {
        &RULES
    }

    pub fn rule_for(&self, crop: Crop) -> Option<&'static AdvisoryRule> {
        RULES.iter().find(|rule| rule.crop == crop)
    }

    /// Evaluate `crop_id` against `weather`. Never fails.
    pub fn evaluate(&self, crop_id: &str, weather: &WeatherSnapshot) -> AdvisoryResult {
        let normalized = Crop::normalize(crop_id);
        let Some(rule) = Crop::resolve(crop_id).and_then(|crop| self.rule_for(crop)) else {
            return AdvisoryResult::neutral(
                normalized.clone(),
                format!("No agronomic advisory rule defined for '{}'.", normalized),
            );
        };

        let actual = weather.metric(rule.metric);
        let description = rule.description();

        if rule.comparison.apply(actual, rule.threshold) {
            info!(crop = rule.crop.key(), rule = %description, actual, bias = rule.bias, "advisory triggered");
            AdvisoryResult {
                crop: rule.crop.key().to_string(),
                triggered: true,
                bias: rule.bias,
                message: rule.impact.to_string(),
                rule: Some(description),
                actual_value: Some(actual),
            }
        } else {
            AdvisoryResult {
                crop: rule.crop.key().to_string(),
                triggered: false,
                bias: 1.0,
                message: format!(
                    "{} conditions are within safe thresholds.",
                    rule.crop.display_name()
                ),
                rule: Some(description),
                actual_value: Some(actual),
            }
        }
    }
}
