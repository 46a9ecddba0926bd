//! Sliding-window sequence construction for supervised time series learning

use crate::{MathError, Result};

/// Build overlapping `(inputs, targets)` pairs from a series.
///
/// For a series of length `N` this yields `N - window` samples where each
/// input holds `window` consecutive values and the target is the value that
/// immediately follows them.
pub fn sliding_windows(data: &[f64], window: usize) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window size must be greater than zero".to_string(),
        ));
    }
    if data.len() <= window {
        return Err(MathError::InsufficientData(format!(
            "Data length ({}) must exceed window size ({})",
            data.len(),
            window
        )));
    }

    let samples = data.len() - window;
    let mut inputs = Vec::with_capacity(samples);
    let mut targets = Vec::with_capacity(samples);

    for i in window..data.len() {
        inputs.push(data[i - window..i].to_vec());
        targets.push(data[i]);
    }

    Ok((inputs, targets))
}
