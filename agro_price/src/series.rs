//! Training series handling
//!
//! A [`TrainingSeries`] is a chronologically sorted price series backed by a
//! polars `DataFrame`. Besides the time (`ds`, epoch milliseconds) and price
//! (`y`) columns it may carry auxiliary numeric columns such as `rainfall`
//! and `demand`, which the attribution explainer inspects.

use crate::error::{ForecastError, Result};
use crate::utils::{daily_timestamps, to_utc_midnight};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp, Normal};
use std::f64::consts::PI;
use std::fs::File;
use std::path::Path;

/// Name of the time column (epoch milliseconds)
pub const TIME_COLUMN: &str = "ds";
/// Name of the price column
pub const PRICE_COLUMN: &str = "y";
/// Auxiliary rainfall column (mm)
pub const RAINFALL_COLUMN: &str = "rainfall";
/// Auxiliary demand column (index 0-100)
pub const DEMAND_COLUMN: &str = "demand";

const DATE_ALIASES: [&str; 4] = ["ds", "date", "arrival_date", "timestamp"];
const PRICE_ALIASES: [&str; 4] = ["y", "price", "modal_price", "value"];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Chronologically sorted price series with optional auxiliary columns
#[derive(Debug, Clone)]
pub struct TrainingSeries {
    df: DataFrame,
}

impl TrainingSeries {
    /// Create a series from timestamps and prices.
    ///
    /// Timestamps must be strictly increasing (sorted, no duplicates).
    pub fn new(dates: Vec<DateTime<Utc>>, prices: Vec<f64>) -> Result<Self> {
        if dates.len() != prices.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match prices length ({})",
                dates.len(),
                prices.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ForecastError::DataError(format!(
                "Timestamps must be strictly increasing: {} is followed by {}",
                pair[0], pair[1]
            )));
        }
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(ForecastError::DataError(
                "Prices must be finite numbers".to_string(),
            ));
        }

        let date_series = Series::new(
            TIME_COLUMN,
            dates
                .iter()
                .map(|d| d.timestamp_millis())
                .collect::<Vec<i64>>(),
        );
        let price_series = Series::new(PRICE_COLUMN, prices);
        let df = DataFrame::new(vec![date_series, price_series])?;

        Ok(Self { df })
    }

    /// Create a series of consecutive daily prices starting at `start`
    pub fn from_daily_prices(start: NaiveDate, prices: Vec<f64>) -> Result<Self> {
        let dates = daily_timestamps(start, prices.len());
        Self::new(dates, prices)
    }

    /// Attach an auxiliary numeric column
    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Result<Self> {
        if name == TIME_COLUMN || name == PRICE_COLUMN {
            return Err(ForecastError::InvalidParameter(format!(
                "Column '{}' is reserved",
                name
            )));
        }
        if values.len() != self.len() {
            return Err(ForecastError::DataError(format!(
                "Column '{}' has {} values, series has {}",
                name,
                values.len(),
                self.len()
            )));
        }

        self.df.with_column(Series::new(name, values))?;
        Ok(self)
    }

    /// Load a market-price CSV (Agmarknet style or `ds`/`y`).
    ///
    /// Date and price columns are detected by alias, unparseable rows are
    /// dropped and the result is sorted chronologically. `rainfall` and
    /// `demand` columns are carried along when present.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Build a series from an arbitrary DataFrame by detecting its columns
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let date_column = detect_column(df, &DATE_ALIASES).ok_or_else(|| {
            ForecastError::DataError(format!("No date column found. Tried: {:?}", DATE_ALIASES))
        })?;
        let price_column = detect_column(df, &PRICE_ALIASES).ok_or_else(|| {
            ForecastError::DataError(format!(
                "No price column found. Tried: {:?}",
                PRICE_ALIASES
            ))
        })?;

        let dates = parse_time_column(df.column(&date_column)?)?;
        let prices = optional_f64(df.column(&price_column)?)?;

        let auxiliary: Vec<(&'static str, Vec<Option<f64>>)> = [RAINFALL_COLUMN, DEMAND_COLUMN]
            .into_iter()
            .filter_map(|name| detect_column(df, &[name]).map(|column| (name, column)))
            .map(|(name, column)| -> Result<(&'static str, Vec<Option<f64>>)> {
                Ok((name, optional_f64(df.column(&column)?)?))
            })
            .collect::<Result<_>>()?;

        // Keep rows with a parsed date and price, then sort chronologically
        let mut rows: Vec<(usize, DateTime<Utc>, f64)> = dates
            .into_iter()
            .zip(prices)
            .enumerate()
            .filter_map(|(i, (date, price))| Some((i, date?, price?)))
            .collect();
        rows.sort_by_key(|(_, date, _)| *date);

        let mut series = Self::new(
            rows.iter().map(|(_, date, _)| *date).collect(),
            rows.iter().map(|(_, _, price)| *price).collect(),
        )?;

        for (name, values) in auxiliary {
            let aligned = rows
                .iter()
                .map(|(i, _, _)| values[*i].unwrap_or(f64::NAN))
                .collect();
            series = series.with_column(name, aligned)?;
        }

        Ok(series)
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Prices in chronological order
    pub fn prices(&self) -> Vec<f64> {
        self.numeric_column(PRICE_COLUMN).unwrap_or_default()
    }

    /// Timestamps in chronological order
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.df
            .column(TIME_COLUMN)
            .and_then(|column| column.i64().map(|ca| ca.into_iter().flatten().collect()))
            .unwrap_or_else(|_| Vec::new())
            .into_iter()
            .filter_map(|millis: i64| Utc.timestamp_millis_opt(millis).single())
            .collect()
    }

    /// Most recent price
    pub fn last_price(&self) -> Option<f64> {
        self.prices().last().copied()
    }

    /// Most recent timestamp
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps().last().copied()
    }

    /// The last `n` prices (fewer if the series is shorter)
    pub fn recent_prices(&self, n: usize) -> Vec<f64> {
        let prices = self.prices();
        let start = prices.len().saturating_sub(n);
        prices[start..].to_vec()
    }

    /// Check whether an auxiliary column is present
    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_names().iter().any(|c| *c == name)
    }

    /// Names of the auxiliary columns
    pub fn auxiliary_columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .filter(|name| *name != TIME_COLUMN && *name != PRICE_COLUMN)
            .map(str::to_string)
            .collect()
    }

    /// Finite values of a numeric column, `None` if the column is absent
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        if !self.has_column(name) {
            return None;
        }
        self.numeric_column(name)
            .ok()
            .map(|values| values.into_iter().filter(|v| v.is_finite()).collect())
    }

    /// Value of a numeric column in the most recent row, possibly NaN.
    ///
    /// `None` if the column is absent, the series is empty or the cell is null.
    pub fn latest_value(&self, name: &str) -> Option<f64> {
        let column = self.df.column(name).ok()?;
        let casted = column.cast(&DataType::Float64).ok()?;
        let values = casted.f64().ok()?;
        values.get(values.len().checked_sub(1)?)
    }

    fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.df.column(name)?;
        let casted = column.cast(&DataType::Float64)?;
        let values = casted.f64()?.into_iter().flatten().collect();
        Ok(values)
    }
}

/// Find a column whose lowercase name equals one of the aliases
fn detect_column(df: &DataFrame, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        df.get_column_names()
            .into_iter()
            .find(|name| name.trim().to_lowercase() == *alias)
            .map(str::to_string)
    })
}

fn optional_f64(column: &Series) -> Result<Vec<Option<f64>>> {
    let casted = column.cast(&DataType::Float64)?;
    let values = casted.f64()?.into_iter().collect();
    Ok(values)
}

fn parse_time_column(column: &Series) -> Result<Vec<Option<DateTime<Utc>>>> {
    let parsed = match column.dtype() {
        DataType::Utf8 => column
            .utf8()?
            .into_iter()
            .map(|value| value.and_then(parse_date_str))
            .collect(),
        DataType::Int64 => column
            .i64()?
            .into_iter()
            .map(|value| value.and_then(|millis| Utc.timestamp_millis_opt(millis).single()))
            .collect(),
        DataType::Date => column
            .date()?
            .into_iter()
            .map(|value| {
                value.and_then(|days| {
                    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
                        .map(to_utc_midnight)
                })
            })
            .collect(),
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            column
                .datetime()?
                .into_iter()
                .map(|value| {
                    value.and_then(|ts| {
                        let millis = match unit {
                            TimeUnit::Nanoseconds => ts / 1_000_000,
                            TimeUnit::Microseconds => ts / 1_000,
                            TimeUnit::Milliseconds => ts,
                        };
                        Utc.timestamp_millis_opt(millis).single()
                    })
                })
                .collect()
        }
        other => {
            return Err(ForecastError::DataError(format!(
                "Column '{}' of type {} cannot be read as dates",
                column.name(),
                other
            )))
        }
    };

    Ok(parsed)
}

/// Days from 0001-01-01 (CE day 1) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(to_utc_midnight)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

/// Synthetic market data for demos and tests.
///
/// Price follows a slow upward drift, a yearly cycle and Gaussian noise;
/// rainfall peaks with the monsoon (around day-of-year 200); demand loosely
/// follows the yearly cycle.
pub fn demo_series(days: usize, start: NaiveDate, seed: u64) -> Result<TrainingSeries> {
    let mut rng = StdRng::seed_from_u64(seed);
    let price_noise = normal(80.0)?;
    let demand_noise = normal(5.0)?;
    let rain_noise = Exp::new(1.0 / 5.0)
        .map_err(|e| ForecastError::InvalidParameter(format!("rainfall noise: {}", e)))?;

    let dates = daily_timestamps(start, days);
    let drift_step = if days > 1 { 400.0 / (days - 1) as f64 } else { 0.0 };

    let mut prices = Vec::with_capacity(days);
    let mut rainfall = Vec::with_capacity(days);
    let mut demand = Vec::with_capacity(days);

    for (t, date) in dates.iter().enumerate() {
        let cycle = 2.0 * PI * t as f64 / 365.25;

        let price = 2500.0 + drift_step * t as f64 + 300.0 * cycle.sin() + price_noise.sample(&mut rng);
        prices.push(round2(price.max(500.0)));

        let day_of_year = date.ordinal() as f64;
        let monsoon = 120.0 * (-0.5 * ((day_of_year - 200.0) / 40.0).powi(2)).exp();
        rainfall.push(round2((monsoon + rain_noise.sample(&mut rng)).max(0.0)));

        let level = 50.0 + 20.0 * (cycle + 0.5).sin() + demand_noise.sample(&mut rng);
        demand.push(round2(level.clamp(0.0, 100.0)));
    }

    TrainingSeries::new(dates, prices)?
        .with_column(RAINFALL_COLUMN, rainfall)?
        .with_column(DEMAND_COLUMN, demand)
}

fn normal(std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std_dev)
        .map_err(|e| ForecastError::InvalidParameter(format!("noise distribution: {}", e)))
}

fn round2(value: f64) -> f64 {
    agro_math::round_to(value, 2)
}
