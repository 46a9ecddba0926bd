//! Regions taking part in the federated simulation

use crate::crop::title_case;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kerala districts, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    Kottayam,
    Idukki,
    Ernakulam,
}

impl Region {
    /// Canonical order; also the tie-break order for recommendations
    pub const ALL: [Region; 3] = [Region::Kottayam, Region::Idukki, Region::Ernakulam];

    pub fn name(self) -> &'static str {
        match self {
            Region::Kottayam => "Kottayam",
            Region::Idukki => "Idukki",
            Region::Ernakulam => "Ernakulam",
        }
    }

    /// Additive price offset (₹) of the regional market
    pub fn bias(self) -> f64 {
        match self {
            Region::Kottayam => 0.0,
            Region::Idukki => 5.0,
            Region::Ernakulam => -3.0,
        }
    }

    /// Parse free text such as `" idukki "`
    pub fn parse(raw: &str) -> Result<Region> {
        let wanted = title_case(raw);
        Self::ALL
            .into_iter()
            .find(|region| region.name() == wanted)
            .ok_or_else(|| ForecastError::UnknownRegion {
                region: wanted,
                supported: Self::ALL
                    .iter()
                    .map(|r| r.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
