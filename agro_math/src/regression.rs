//! Dense least-squares fitting
//!
//! Solves the ridge-regularised normal equations `(XᵀX + λI)β = Xᵀy` with
//! Gaussian elimination and partial pivoting. The systems solved here are
//! small (a handful of trend and Fourier terms), so a dense solver is enough.

use crate::{MathError, Result};

const PIVOT_EPSILON: f64 = 1e-12;

/// Fit coefficients `β` minimising `‖Xβ - y‖² + ridge·‖β‖²`.
///
/// `design` holds one row per observation; every row must have the same
/// number of columns.
pub fn least_squares(design: &[Vec<f64>], target: &[f64], ridge: f64) -> Result<Vec<f64>> {
    if design.is_empty() {
        return Err(MathError::InsufficientData(
            "Design matrix has no rows".to_string(),
        ));
    }
    if design.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design matrix rows ({}) don't match target length ({})",
            design.len(),
            target.len()
        )));
    }
    if ridge < 0.0 {
        return Err(MathError::InvalidInput(
            "Ridge penalty must be non-negative".to_string(),
        ));
    }

    let columns = design[0].len();
    if columns == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if design.iter().any(|row| row.len() != columns) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have inconsistent lengths".to_string(),
        ));
    }
    if design.len() < columns {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} observations to fit {} coefficients, have {}",
            columns,
            columns,
            design.len()
        )));
    }

    // Accumulate XᵀX and Xᵀy
    let mut gram = vec![vec![0.0; columns]; columns];
    let mut moment = vec![0.0; columns];
    for (row, &y) in design.iter().zip(target.iter()) {
        for i in 0..columns {
            moment[i] += row[i] * y;
            for j in i..columns {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..columns {
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
        gram[i][i] += ridge;
    }

    solve_linear_system(gram, moment)
}

/// Solve `A·x = b` for a square matrix `A`
pub fn solve_linear_system(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = rhs.len();
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(
            "Matrix must be square and match the right-hand side".to_string(),
        ));
    }

    for col in 0..n {
        // Partial pivoting
        let pivot_row = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .unwrap_or(col);

        if matrix[pivot_row][col].abs() < PIVOT_EPSILON {
            return Err(MathError::SingularMatrix(format!(
                "Pivot in column {} is too small",
                col
            )));
        }

        matrix.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back substitution
    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }

    Ok(solution)
}
