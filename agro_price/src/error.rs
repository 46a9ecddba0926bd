//! Error types for the agro_price crate

use agro_math::MathError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the agro_price crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A forecaster was asked to predict before any training succeeded,
    /// or no last-known price exists to fall back on
    #[error("Not trained: {0}")]
    NotTrained(String),

    /// Regional parameter lists disagree on layer count or layer shape
    #[error("Aggregation shape mismatch: {0}")]
    AggregationShape(String),

    /// Crop outside the supported set
    #[error("Unsupported crop '{crop}'. Choose from {supported}")]
    UnsupportedCrop { crop: String, supported: String },

    /// Region outside the supported set
    #[error("Unknown region '{region}'. Choose from {supported}")]
    UnknownRegion { region: String, supported: String },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Pipeline stages executed out of order
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Live market or weather collaborator failed
    #[error("Live data error: {0}")]
    LiveData(String),

    /// Error from numeric kernels
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
