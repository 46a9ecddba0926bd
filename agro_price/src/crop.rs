//! Crop catalogue
//!
//! Crop identifiers arrive as free text. They are normalised once (trimmed,
//! lowercased, underscores turned into spaces) and resolved against a fixed
//! alias table into the closed [`Crop`] type.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Crops known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crop {
    Rubber,
    Tea,
    Coffee,
    Mango,
    Banana,
    Coconut,
    BlackPepper,
    Cardamom,
    Rice,
    Wheat,
    Tomato,
    Onion,
    Potato,
}

/// Normalised alias → crop
const ALIASES: &[(&str, Crop)] = &[
    ("rubber", Crop::Rubber),
    ("natural rubber", Crop::Rubber),
    ("tea", Crop::Tea),
    ("tea leaf", Crop::Tea),
    ("coffee", Crop::Coffee),
    ("coffee beans", Crop::Coffee),
    ("mango", Crop::Mango),
    ("banana", Crop::Banana),
    ("nendran", Crop::Banana),
    ("plantain", Crop::Banana),
    ("coconut", Crop::Coconut),
    ("copra", Crop::Coconut),
    ("black pepper", Crop::BlackPepper),
    ("pepper", Crop::BlackPepper),
    ("cardamom", Crop::Cardamom),
    ("small cardamom", Crop::Cardamom),
    ("rice", Crop::Rice),
    ("paddy", Crop::Rice),
    ("wheat", Crop::Wheat),
    ("tomato", Crop::Tomato),
    ("onion", Crop::Onion),
    ("potato", Crop::Potato),
];

/// Parameters of the synthetic regional price generator for one crop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropProfile {
    /// Base price (₹/kg)
    pub base_price: f64,
    /// Seasonal amplitude as a fraction of the base price
    pub seasonal_amplitude: f64,
    /// Phase shift of the yearly sinusoid (radians)
    pub phase: f64,
    /// Noise standard deviation as a fraction of the base price
    pub noise_scale: f64,
}

impl Crop {
    /// All crops in catalogue order
    pub const ALL: [Crop; 13] = [
        Crop::Rubber,
        Crop::Tea,
        Crop::Coffee,
        Crop::Mango,
        Crop::Banana,
        Crop::Coconut,
        Crop::BlackPepper,
        Crop::Cardamom,
        Crop::Rice,
        Crop::Wheat,
        Crop::Tomato,
        Crop::Onion,
        Crop::Potato,
    ];

    /// Crops that have a synthetic regional profile
    pub const FEDERATED: [Crop; 5] = [
        Crop::Rubber,
        Crop::Tea,
        Crop::Coffee,
        Crop::Mango,
        Crop::Banana,
    ];

    /// Normalise free-text crop input: trim, lowercase, `_` → space
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase().replace('_', " ")
    }

    /// Resolve free text through the alias table
    pub fn resolve(raw: &str) -> Option<Crop> {
        let key = Self::normalize(raw);
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, crop)| *crop)
    }

    /// Resolve a crop that the federated pipeline can simulate
    pub fn resolve_federated(raw: &str) -> Result<(Crop, CropProfile)> {
        Self::resolve(raw)
            .and_then(|crop| crop.federated_profile().map(|profile| (crop, profile)))
            .ok_or_else(|| ForecastError::UnsupportedCrop {
                crop: Self::normalize(raw),
                supported: Self::FEDERATED
                    .iter()
                    .map(|c| c.key())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Stable snake_case identifier
    pub fn key(self) -> &'static str {
        match self {
            Crop::Rubber => "rubber",
            Crop::Tea => "tea",
            Crop::Coffee => "coffee",
            Crop::Mango => "mango",
            Crop::Banana => "banana",
            Crop::Coconut => "coconut",
            Crop::BlackPepper => "black_pepper",
            Crop::Cardamom => "cardamom",
            Crop::Rice => "rice",
            Crop::Wheat => "wheat",
            Crop::Tomato => "tomato",
            Crop::Onion => "onion",
            Crop::Potato => "potato",
        }
    }

    /// Human readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Crop::Rubber => "Rubber",
            Crop::Tea => "Tea",
            Crop::Coffee => "Coffee",
            Crop::Mango => "Mango",
            Crop::Banana => "Banana",
            Crop::Coconut => "Coconut",
            Crop::BlackPepper => "Black Pepper",
            Crop::Cardamom => "Cardamom",
            Crop::Rice => "Rice",
            Crop::Wheat => "Wheat",
            Crop::Tomato => "Tomato",
            Crop::Onion => "Onion",
            Crop::Potato => "Potato",
        }
    }

    /// Synthetic generator profile, if the crop takes part in the federated pipeline
    pub fn federated_profile(self) -> Option<CropProfile> {
        let (base_price, seasonal_amplitude, phase, noise_scale) = match self {
            Crop::Rubber => (160.0, 0.10, 0.0, 0.03),
            Crop::Tea => (85.0, 0.12, PI / 4.0, 0.04),
            Crop::Coffee => (250.0, 0.12, PI / 3.0, 0.04),
            // peaks in early summer
            Crop::Mango => (60.0, 0.25, -PI / 3.0, 0.05),
            Crop::Banana => (35.0, 0.05, 0.0, 0.02),
            _ => return None,
        };

        Some(CropProfile {
            base_price,
            seasonal_amplitude,
            phase,
            noise_scale,
        })
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Title-case free text, used when a crop is not in the catalogue
pub fn title_case(raw: &str) -> String {
    raw.trim()
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    format!("{}{}", first.to_uppercase(), chars.as_str().to_lowercase())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
