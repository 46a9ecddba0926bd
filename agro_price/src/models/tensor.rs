//! Shaped parameter tensors exchanged between regional models

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// One layer's parameters, stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTensor {
    shape: Vec<usize>,
    values: Vec<f64>,
}

/// Ordered per-layer parameters of one model
pub type ModelWeights = Vec<LayerTensor>;

impl LayerTensor {
    /// Create a tensor, checking that the values fill the shape exactly
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if shape.is_empty() || expected != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }

        Ok(Self { shape, values })
    }

    /// Caller guarantees `values.len()` equals the product of `shape`
    pub(crate) fn from_parts(shape: Vec<usize>, values: Vec<f64>) -> Self {
        Self { shape, values }
    }

    /// A one-dimensional tensor
    pub fn vector(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len()],
            values,
        }
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            values: vec![0.0; len],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Element-wise `self += other`; shapes must match
    pub(crate) fn accumulate(&mut self, other: &LayerTensor) {
        for (acc, value) in self.values.iter_mut().zip(other.values.iter()) {
            *acc += value;
        }
    }

    pub(crate) fn divide(&mut self, divisor: f64) {
        for value in &mut self.values {
            *value /= divisor;
        }
    }
}
