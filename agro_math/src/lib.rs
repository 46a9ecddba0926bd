//! # Agro Math
//!
//! Numeric kernels shared by the price engine.
//! This crate provides descriptive statistics, a small dense least-squares
//! solver and the sliding-window sequence builder used to train
//! window-based forecasters.

use thiserror::Error;

pub mod regression;
pub mod sequences;
pub mod stats;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;

pub use regression::least_squares;
pub use sequences::sliding_windows;
pub use stats::{mean, round_to, std_dev};
