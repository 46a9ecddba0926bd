//! Live market and weather collaborators
//!
//! Retrieval itself (HTTP clients, API keys) lives outside this crate. The
//! engine only needs the two async traits below; [`MarketSnapshot`] also
//! knows how to summarise raw market records.

use crate::advisory::WeatherSnapshot;
use crate::error::Result;
use crate::utils::round_money;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One raw market arrival record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub district: String,
    pub market: String,
    pub min_price: f64,
    pub max_price: f64,
    pub modal_price: f64,
}

/// Aggregated live quote for one crop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Zero means "no live data", not an error
    pub record_count: usize,
    pub markets: Vec<String>,
    pub districts: Vec<String>,
}

impl MarketSnapshot {
    /// Summarise records: mean modal price, lowest minimum, highest maximum,
    /// distinct markets and districts in sorted order
    pub fn from_records(records: &[MarketRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let count = records.len() as f64;
        let avg_price = records.iter().map(|r| r.modal_price).sum::<f64>() / count;
        let min_price = records.iter().map(|r| r.min_price).fold(f64::INFINITY, f64::min);
        let max_price = records.iter().map(|r| r.max_price).fold(f64::NEG_INFINITY, f64::max);
        let distinct = |field: fn(&MarketRecord) -> &str| {
            records
                .iter()
                .map(field)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect::<Vec<_>>()
        };

        Self {
            avg_price: round_money(avg_price),
            min_price: round_money(min_price),
            max_price: round_money(max_price),
            record_count: records.len(),
            markets: distinct(|r| r.market.as_str()),
            districts: distinct(|r| r.district.as_str()),
        }
    }

    pub fn has_data(&self) -> bool {
        self.record_count > 0
    }
}

/// Source of live market quotes
#[async_trait]
pub trait LiveMarketQuote: Send + Sync {
    async fn fetch(&self, crop_id: &str) -> Result<MarketSnapshot>;
}

/// Source of live weather at a coordinate
#[async_trait]
pub trait LiveWeather: Send + Sync {
    async fn fetch(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot>;
}

/// Fixed quote, for offline runs
#[derive(Debug, Clone, Default)]
pub struct StaticMarketQuote {
    pub snapshot: MarketSnapshot,
}

#[async_trait]
impl LiveMarketQuote for StaticMarketQuote {
    async fn fetch(&self, _crop_id: &str) -> Result<MarketSnapshot> {
        Ok(self.snapshot.clone())
    }
}

/// Fixed weather, for offline runs
#[derive(Debug, Clone, Default)]
pub struct StaticWeather {
    pub snapshot: WeatherSnapshot,
}

#[async_trait]
impl LiveWeather for StaticWeather {
    async fn fetch(&self, _lat: f64, _lon: f64) -> Result<WeatherSnapshot> {
        Ok(self.snapshot.clone())
    }
}
