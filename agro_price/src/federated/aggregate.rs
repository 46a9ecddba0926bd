//! Federated averaging (FedAvg)

use crate::error::{ForecastError, Result};
use crate::models::{LayerTensor, ModelWeights};

/// Element-wise mean across regional parameter lists.
///
/// Every list must have the same number of layers and every layer the same
/// shape; otherwise nothing is averaged and `AggregationShape` is returned.
pub fn federated_average(regional: &[ModelWeights]) -> Result<ModelWeights> {
    let (first, rest) = regional.split_first().ok_or_else(|| {
        ForecastError::AggregationShape("No regional weights to average".to_string())
    })?;

    for (index, weights) in rest.iter().enumerate() {
        if weights.len() != first.len() {
            return Err(ForecastError::AggregationShape(format!(
                "Model {} has {} layers, expected {}",
                index + 1,
                weights.len(),
                first.len()
            )));
        }
        for (layer, (tensor, reference)) in weights.iter().zip(first.iter()).enumerate() {
            if tensor.shape() != reference.shape() {
                return Err(ForecastError::AggregationShape(format!(
                    "Model {} layer {} has shape {:?}, expected {:?}",
                    index + 1,
                    layer,
                    tensor.shape(),
                    reference.shape()
                )));
            }
        }
    }

    let count = regional.len() as f64;
    let averaged = (0..first.len())
        .map(|layer| {
            let mut sum = LayerTensor::zeros(first[layer].shape().to_vec());
            for weights in regional {
                sum.accumulate(&weights[layer]);
            }
            sum.divide(count);
            sum
        })
        .collect();

    Ok(averaged)
}
