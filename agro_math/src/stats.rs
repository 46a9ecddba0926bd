//! Descriptive statistics and rounding helpers

use crate::{MathError, Result};

/// Arithmetic mean of a slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot calculate the mean of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation of a slice
pub fn std_dev(values: &[f64]) -> Result<f64> {
    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|&v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;

    Ok(variance.sqrt())
}

/// Mean of the first `n` values (or all of them when fewer are available)
pub fn mean_of_first(values: &[f64], n: usize) -> Result<f64> {
    if n == 0 {
        return Err(MathError::InvalidInput(
            "Number of leading values must be greater than zero".to_string(),
        ));
    }

    mean(&values[..n.min(values.len())])
}

/// Round a value to a fixed number of decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(std_dev(&values).unwrap(), 2.0);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(mean(&[]).is_err());
        assert!(std_dev(&[]).is_err());
    }

    #[test]
    fn test_mean_of_first() {
        let values = [10.0, 20.0, 30.0, 40.0];

        assert_relative_eq!(mean_of_first(&values, 2).unwrap(), 15.0);
        // Fewer values than requested uses what is there
        assert_relative_eq!(mean_of_first(&values, 7).unwrap(), 25.0);
        assert!(mean_of_first(&values, 0).is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2539.999999, 2), 2540.0);
        assert_eq!(round_to(0.076923, 4), 0.0769);
        assert_eq!(round_to(-1.005, 1), -1.0);
    }
}
