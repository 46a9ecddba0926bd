//! Window-based feed-forward network for short-horizon prediction
//!
//! The network maps the last `window` prices to the next one through a
//! single `tanh` hidden layer. Inputs are expressed relative to the last
//! value of the window (`x / last - 1`) and the output is a relative change
//! from it, so the same parameters apply to any price level. This is what
//! makes averaging parameters across regions with different price levels
//! meaningful.

use crate::config::{EngineConfig, FederatedConfig};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, LayerTensor, ModelWeights, TrainedForecastModel};
use crate::series::TrainingSeries;
use agro_math::sliding_windows;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const SCALE_EPSILON: f64 = 1e-9;

/// Architecture and training hyper-parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WindowNetParams {
    pub window: usize,
    pub hidden_units: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub seed: u64,
}

impl WindowNetParams {
    /// Shock forecaster settings of the fusion engine
    pub fn shock(config: &EngineConfig) -> Self {
        Self {
            window: config.shock_window,
            hidden_units: config.shock_hidden_units,
            epochs: config.shock_epochs,
            learning_rate: config.shock_learning_rate,
            batch_size: config.shock_batch_size,
            seed: config.seed,
        }
    }

    /// Regional model settings of the federated pipeline
    pub fn federated(config: &FederatedConfig) -> Self {
        Self {
            window: config.window,
            hidden_units: config.hidden_units,
            epochs: config.epochs,
            learning_rate: config.learning_rate,
            batch_size: config.batch_size,
            seed: config.seed,
        }
    }
}

/// Untrained window network
#[derive(Debug, Clone)]
pub struct WindowNet {
    name: String,
    params: WindowNetParams,
}

/// Trained window network
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedWindowNet {
    name: String,
    window: usize,
    hidden: usize,
    /// hidden × window, row-major
    w1: Vec<f64>,
    b1: Vec<f64>,
    w2: Vec<f64>,
    b2: f64,
    /// Last `window` training values, the default autoregressive seed
    tail: Vec<f64>,
}

impl WindowNet {
    pub fn new(params: WindowNetParams) -> Result<Self> {
        if params.window == 0 || params.hidden_units == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window and hidden units must be positive".to_string(),
            ));
        }
        if params.epochs == 0 || params.batch_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "Epochs and batch size must be positive".to_string(),
            ));
        }
        if !(params.learning_rate > 0.0 && params.learning_rate.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Learning rate must be a positive finite number".to_string(),
            ));
        }

        Ok(Self {
            name: format!(
                "Window Net (window={}, hidden={})",
                params.window, params.hidden_units
            ),
            params,
        })
    }

    pub fn params(&self) -> &WindowNetParams {
        &self.params
    }

    /// Seeded Glorot-uniform initial parameters
    pub fn initial_weights(&self) -> TrainedWindowNet {
        let WindowNetParams {
            window,
            hidden_units: hidden,
            seed,
            ..
        } = self.params;
        let mut rng = StdRng::seed_from_u64(seed);

        let input_limit = (6.0 / (window + hidden) as f64).sqrt();
        let output_limit = (6.0 / (hidden + 1) as f64).sqrt();
        let input_dist = Uniform::new_inclusive(-input_limit, input_limit);
        let output_dist = Uniform::new_inclusive(-output_limit, output_limit);

        TrainedWindowNet {
            name: self.name.clone(),
            window,
            hidden,
            w1: (0..hidden * window).map(|_| input_dist.sample(&mut rng)).collect(),
            b1: vec![0.0; hidden],
            w2: (0..hidden).map(|_| output_dist.sample(&mut rng)).collect(),
            b2: 0.0,
            tail: Vec::new(),
        }
    }

    /// Train on a plain value sequence
    pub fn train_on_values(&self, values: &[f64]) -> Result<TrainedWindowNet> {
        let (inputs, targets) = sliding_windows(values, self.params.window)?;
        let samples: Vec<(Vec<f64>, f64)> = inputs
            .into_iter()
            .zip(targets)
            .map(|(input, target)| {
                let scale = window_scale(&input);
                (normalise(&input, scale), target / scale - 1.0)
            })
            .collect();

        let mut net = self.initial_weights();
        let mut rng = StdRng::seed_from_u64(self.params.seed.wrapping_add(1));
        let mut order: Vec<usize> = (0..samples.len()).collect();
        let mut gradients = Gradients::zeros(net.hidden, net.window);

        for _ in 0..self.params.epochs {
            order.shuffle(&mut rng);
            for batch in order.chunks(self.params.batch_size) {
                gradients.reset();
                for &index in batch {
                    let (input, target) = &samples[index];
                    net.backpropagate(input, *target, &mut gradients);
                }
                net.apply(&gradients, self.params.learning_rate / batch.len() as f64);
            }
        }

        if !net.is_finite() {
            return Err(ForecastError::DataError(format!(
                "{} diverged during training; lower the learning rate",
                self.name
            )));
        }

        net.tail = values[values.len() - self.params.window..].to_vec();
        Ok(net)
    }
}

impl ForecastModel for WindowNet {
    type Trained = TrainedWindowNet;

    fn train(&self, data: &TrainingSeries) -> Result<Self::Trained> {
        self.train_on_values(&data.prices())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn window_scale(window: &[f64]) -> f64 {
    match window.last() {
        Some(last) if last.abs() > SCALE_EPSILON => *last,
        _ => 1.0,
    }
}

fn normalise(window: &[f64], scale: f64) -> Vec<f64> {
    window.iter().map(|x| x / scale - 1.0).collect()
}

struct Gradients {
    w1: Vec<f64>,
    b1: Vec<f64>,
    w2: Vec<f64>,
    b2: f64,
}

impl Gradients {
    fn zeros(hidden: usize, window: usize) -> Self {
        Self {
            w1: vec![0.0; hidden * window],
            b1: vec![0.0; hidden],
            w2: vec![0.0; hidden],
            b2: 0.0,
        }
    }

    fn reset(&mut self) {
        self.w1.iter_mut().for_each(|g| *g = 0.0);
        self.b1.iter_mut().for_each(|g| *g = 0.0);
        self.w2.iter_mut().for_each(|g| *g = 0.0);
        self.b2 = 0.0;
    }
}

impl TrainedWindowNet {
    /// Rebuild a network from `[W1, b1, W2, b2]`
    pub fn from_weights(name: &str, weights: &[LayerTensor]) -> Result<Self> {
        let [w1, b1, w2, b2] = weights else {
            return Err(ForecastError::AggregationShape(format!(
                "Expected 4 layers, got {}",
                weights.len()
            )));
        };

        let (hidden, window) = match w1.shape() {
            [hidden, window] => (*hidden, *window),
            other => {
                return Err(ForecastError::AggregationShape(format!(
                    "Layer 0 must be a matrix, got shape {:?}",
                    other
                )))
            }
        };
        let expected: [(&LayerTensor, Vec<usize>); 3] =
            [(b1, vec![hidden]), (w2, vec![1, hidden]), (b2, vec![1])];
        for (index, (tensor, shape)) in expected.iter().enumerate() {
            if tensor.shape() != shape.as_slice() {
                return Err(ForecastError::AggregationShape(format!(
                    "Layer {} expected shape {:?}, got {:?}",
                    index + 1,
                    shape,
                    tensor.shape()
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            window,
            hidden,
            w1: w1.values().to_vec(),
            b1: b1.values().to_vec(),
            w2: w2.values().to_vec(),
            b2: b2.values()[0],
            tail: Vec::new(),
        })
    }

    /// Parameters as `[W1, b1, W2, b2]`
    pub fn weights(&self) -> ModelWeights {
        vec![
            LayerTensor::from_parts(vec![self.hidden, self.window], self.w1.clone()),
            LayerTensor::vector(self.b1.clone()),
            LayerTensor::from_parts(vec![1, self.hidden], self.w2.clone()),
            LayerTensor::vector(vec![self.b2]),
        ]
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Last training window, empty for networks rebuilt from weights
    pub fn tail(&self) -> &[f64] {
        &self.tail
    }

    /// Predict `horizon` steps, feeding each prediction into the next window
    pub fn roll_forward(&self, seed: &[f64], horizon: usize) -> Result<Vec<f64>> {
        if seed.len() < self.window {
            return Err(ForecastError::DataError(format!(
                "Seed window has {} values, need {}",
                seed.len(),
                self.window
            )));
        }

        let mut buffer = Vec::with_capacity(self.window + horizon);
        buffer.extend_from_slice(&seed[seed.len() - self.window..]);
        let mut forecast = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let next = self.step(&buffer[buffer.len() - self.window..]);
            forecast.push(next);
            buffer.push(next);
        }

        Ok(forecast)
    }

    fn hidden_activations(&self, input: &[f64]) -> Vec<f64> {
        self.w1
            .chunks(self.window)
            .zip(self.b1.iter())
            .map(|(row, bias)| {
                let z: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias;
                z.tanh()
            })
            .collect()
    }

    fn output(&self, hidden: &[f64]) -> f64 {
        hidden.iter().zip(self.w2.iter()).map(|(h, w)| h * w).sum::<f64>() + self.b2
    }

    /// One prediction from exactly `window` raw values
    fn step(&self, window: &[f64]) -> f64 {
        let scale = window_scale(window);
        let hidden = self.hidden_activations(&normalise(window, scale));
        scale * (1.0 + self.output(&hidden))
    }

    fn backpropagate(&self, input: &[f64], target: f64, grads: &mut Gradients) {
        let hidden = self.hidden_activations(input);
        let error = self.output(&hidden) - target;

        grads.b2 += error;
        for k in 0..self.hidden {
            grads.w2[k] += error * hidden[k];
            let dz = error * self.w2[k] * (1.0 - hidden[k] * hidden[k]);
            grads.b1[k] += dz;
            let row = &mut grads.w1[k * self.window..(k + 1) * self.window];
            for (g, x) in row.iter_mut().zip(input) {
                *g += dz * x;
            }
        }
    }

    fn apply(&mut self, grads: &Gradients, rate: f64) {
        let descend = |params: &mut [f64], grads: &[f64]| {
            for (p, g) in params.iter_mut().zip(grads) {
                *p -= rate * g;
            }
        };
        descend(&mut self.w1, &grads.w1);
        descend(&mut self.b1, &grads.b1);
        descend(&mut self.w2, &grads.w2);
        self.b2 -= rate * grads.b2;
    }

    fn is_finite(&self) -> bool {
        self.w1
            .iter()
            .chain(&self.b1)
            .chain(&self.w2)
            .chain(std::iter::once(&self.b2))
            .all(|v| v.is_finite())
    }
}

impl TrainedForecastModel for TrainedWindowNet {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be positive".to_string(),
            ));
        }
        let values = self.roll_forward(&self.tail, horizon)?;
        ForecastResult::new(values, horizon)
    }

    fn predict_next(&self, window: &[f64]) -> Result<f64> {
        Ok(self.roll_forward(window, 1)?[0])
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(window: usize) -> WindowNetParams {
        WindowNetParams {
            window,
            hidden_units: 4,
            epochs: 30,
            learning_rate: 0.05,
            batch_size: 8,
            seed: 42,
        }
    }

    #[test]
    fn test_weights_layout() {
        let net = WindowNet::new(params(5)).unwrap().initial_weights();
        let shapes: Vec<Vec<usize>> = net.weights().iter().map(|t| t.shape().to_vec()).collect();

        assert_eq!(shapes, vec![vec![4, 5], vec![4], vec![1, 4], vec![1]]);
    }

    #[test]
    fn test_weights_round_trip_preserves_predictions() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let trained = WindowNet::new(params(5)).unwrap().train_on_values(&values).unwrap();
        let rebuilt = TrainedWindowNet::from_weights("rebuilt", &trained.weights()).unwrap();

        let seed = &values[values.len() - 5..];
        assert_relative_eq!(
            trained.predict_next(seed).unwrap(),
            rebuilt.predict_next(seed).unwrap()
        );
    }

    #[test]
    fn test_same_seed_same_parameters() {
        let values: Vec<f64> = (0..40).map(|i| 50.0 + i as f64 * 0.1).collect();
        let net = WindowNet::new(params(5)).unwrap();

        assert_eq!(
            net.train_on_values(&values).unwrap().weights(),
            net.train_on_values(&values).unwrap().weights()
        );
    }

    #[test]
    fn test_roll_forward_is_bounded() {
        let values = vec![80.0; 30];
        let trained = WindowNet::new(params(5)).unwrap().train_on_values(&values).unwrap();

        let forecast = trained.roll_forward(&values, 12).unwrap();
        assert_eq!(forecast.len(), 12);
        assert!(forecast.iter().all(|v| v.is_finite()));
        // A flat series keeps its level
        assert_relative_eq!(forecast[0], 80.0, epsilon = 1.0);
        assert!(trained.roll_forward(&values[..3], 1).is_err());
    }

    #[test]
    fn test_from_weights_rejects_bad_layers() {
        let net = WindowNet::new(params(3)).unwrap().initial_weights();
        let mut weights = net.weights();
        weights.pop();
        assert!(matches!(
            TrainedWindowNet::from_weights("x", &weights),
            Err(ForecastError::AggregationShape(_))
        ));

        let mut weights = net.weights();
        weights[1] = LayerTensor::vector(vec![0.0; 7]);
        assert!(TrainedWindowNet::from_weights("x", &weights).is_err());
    }
}
